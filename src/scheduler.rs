//! Cycle scheduling
//!
//! Runs one reconciliation pass, waits for the configured interval, and
//! repeats until the shutdown future resolves. A pass always runs to
//! completion before the wait starts, so two passes never overlap; a failed
//! pass is logged and the next one runs on schedule.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::SyncError;
use crate::events::EventSink;
use crate::logging::*;
use crate::reconcile::{CycleStats, Reconciler};

/// Why and after how many cycles the scheduler stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stopped<T> {
	/// Value the shutdown future resolved to
	pub reason: T,
	pub cycles: u64,
	pub failed_cycles: u64,
}

/// Drives periodic reconciliation of one source/replica pair
pub struct Scheduler {
	config: Arc<Config>,
	sink: Arc<dyn EventSink>,
	interval: Duration,
}

impl Scheduler {
	pub fn new(config: Config, sink: Arc<dyn EventSink>) -> Self {
		let interval = config.interval();
		Scheduler { config: Arc::new(config), sink, interval }
	}

	/// Override the wait between cycles
	pub fn interval(mut self, interval: Duration) -> Self {
		self.interval = interval;
		self
	}

	/// Run a single reconciliation pass on a blocking worker thread
	///
	/// Errors are logged here with their path context and returned.
	pub async fn run_cycle(&self) -> Result<CycleStats, SyncError> {
		let config = Arc::clone(&self.config);
		let sink = Arc::clone(&self.sink);

		let result = tokio::task::spawn_blocking(move || {
			Reconciler::new(config.algorithm, sink.as_ref())
				.create_replica(config.create_replica)
				.reconcile(&config.source, &config.replica)
		})
		.await
		.unwrap_or_else(|e| Err(SyncError::CycleAborted { message: e.to_string() }));

		match &result {
			Ok(stats) => debug!(
				"Cycle stats: {} dirs, {} updated, {} copied, {} removed, {} bytes",
				stats.dirs_visited,
				stats.files_updated,
				stats.entries_copied,
				stats.entries_removed,
				stats.bytes_copied
			),
			Err(e) => error!("Synchronization failed: {}", e),
		}
		result
	}

	/// Run exactly one cycle with start and completion messages
	pub async fn run_once(&self) -> Result<CycleStats, SyncError> {
		info!("Starting folder synchronization.");
		let stats = self.run_cycle().await?;
		info!("Synchronization completed.");
		Ok(stats)
	}

	/// Run cycles until `shutdown` resolves
	///
	/// `shutdown` is only observed between cycles, so an in-flight pass is
	/// never cut short.
	pub async fn run<F: Future>(&self, shutdown: F) -> Stopped<F::Output> {
		tokio::pin!(shutdown);
		let mut cycles = 0;
		let mut failed_cycles = 0;

		info!("Starting folder synchronization.");
		loop {
			cycles += 1;
			match self.run_cycle().await {
				Ok(_) => info!(
					"Synchronization completed. Waiting for next cycle after {} sec",
					self.interval.as_secs()
				),
				Err(_) => {
					failed_cycles += 1;
					warn!("Retrying in {} sec", self.interval.as_secs());
				}
			}

			tokio::select! {
				_ = tokio::time::sleep(self.interval) => {}
				reason = &mut shutdown => {
					return Stopped { reason, cycles, failed_cycles };
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::events::NoEventSink;
	use std::fs;
	use tempfile::TempDir;

	fn config_for(source: &std::path::Path, replica: &std::path::Path) -> Config {
		Config {
			source: source.to_path_buf(),
			replica: replica.to_path_buf(),
			interval_secs: 1,
			..Config::default()
		}
	}

	#[tokio::test]
	async fn test_run_cycle_converges() {
		let src = TempDir::new().unwrap();
		let rep = TempDir::new().unwrap();
		fs::write(src.path().join("a.txt"), "A").unwrap();

		let scheduler = Scheduler::new(config_for(src.path(), rep.path()), Arc::new(NoEventSink));
		let stats = scheduler.run_cycle().await.unwrap();
		assert_eq!(stats.entries_copied, 1);
		assert_eq!(fs::read_to_string(rep.path().join("a.txt")).unwrap(), "A");

		let stats = scheduler.run_once().await.unwrap();
		assert_eq!(stats.changes(), 0);
	}

	#[tokio::test]
	async fn test_failed_cycles_do_not_stop_the_loop() {
		let dir = TempDir::new().unwrap();
		let scheduler = Scheduler::new(
			config_for(&dir.path().join("missing"), &dir.path().join("replica")),
			Arc::new(NoEventSink),
		)
		.interval(Duration::from_millis(10));

		let stopped = scheduler.run(tokio::time::sleep(Duration::from_millis(100))).await;
		assert!(stopped.cycles >= 2);
		assert_eq!(stopped.failed_cycles, stopped.cycles);
	}

	#[tokio::test]
	async fn test_shutdown_reason_is_returned() {
		let src = TempDir::new().unwrap();
		let rep = TempDir::new().unwrap();
		let scheduler = Scheduler::new(config_for(src.path(), rep.path()), Arc::new(NoEventSink));

		let stopped = scheduler.run(async { 143u8 }).await;
		assert_eq!(stopped, Stopped { reason: 143, cycles: 1, failed_cycles: 0 });
	}
}

// vim: ts=4
