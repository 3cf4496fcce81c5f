//! Scheduler tests: repeated cycles, catch-and-continue, cancellation
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use dirsync::events::{EventSink, SyncEvent};
use dirsync::{Config, Scheduler};

#[derive(Default)]
struct Recorder {
	events: Mutex<Vec<SyncEvent>>,
}

impl EventSink for Recorder {
	fn on_event(&self, event: &SyncEvent) {
		self.events.lock().unwrap().push(event.clone());
	}
}

async fn wait_until(cond: impl Fn() -> bool) {
	while !cond() {
		tokio::time::sleep(Duration::from_millis(10)).await;
	}
}

#[tokio::test]
async fn test_changes_between_cycles_are_mirrored() {
	let root = TempDir::new().unwrap();
	let source = root.path().join("source");
	let replica = root.path().join("replica");
	fs::create_dir(&source).unwrap();
	fs::write(source.join("first.txt"), "1").unwrap();

	let config = Config {
		source: source.clone(),
		replica: replica.clone(),
		interval_secs: 1,
		..Config::default()
	};
	let recorder = Arc::new(Recorder::default());
	let scheduler =
		Scheduler::new(config, recorder.clone()).interval(Duration::from_millis(20));

	let shutdown = async {
		wait_until(|| replica.join("first.txt").exists()).await;
		fs::write(source.join("second.txt"), "2").unwrap();
		fs::remove_file(source.join("first.txt")).unwrap();
		wait_until(|| replica.join("second.txt").exists() && !replica.join("first.txt").exists())
			.await;
		"done"
	};

	let stopped = tokio::time::timeout(Duration::from_secs(10), scheduler.run(shutdown))
		.await
		.expect("scheduler should stop once the shutdown future resolves");

	assert_eq!(stopped.reason, "done");
	assert!(stopped.cycles >= 2);
	assert_eq!(stopped.failed_cycles, 0);

	let events = recorder.events.lock().unwrap();
	assert!(events.contains(&SyncEvent::RemovedFile { replica: replica.join("first.txt") }));
	assert!(events.contains(&SyncEvent::CopiedFile {
		source: source.join("second.txt"),
		replica: replica.join("second.txt"),
	}));
}

#[tokio::test]
async fn test_recovers_after_source_reappears() {
	let root = TempDir::new().unwrap();
	let source = root.path().join("source");
	let replica = root.path().join("replica");

	let config = Config {
		source: source.clone(),
		replica: replica.clone(),
		interval_secs: 1,
		..Config::default()
	};
	let scheduler = Scheduler::new(config, Arc::new(Recorder::default()))
		.interval(Duration::from_millis(20));

	let shutdown = async {
		tokio::time::sleep(Duration::from_millis(60)).await;
		fs::create_dir(&source).unwrap();
		fs::write(source.join("late.txt"), "late").unwrap();
		wait_until(|| replica.join("late.txt").exists()).await;
	};

	let stopped = tokio::time::timeout(Duration::from_secs(10), scheduler.run(shutdown))
		.await
		.expect("scheduler should keep cycling after failures");
	assert!(stopped.failed_cycles >= 1);
	assert!(stopped.cycles > stopped.failed_cycles);
}

// vim: ts=4
