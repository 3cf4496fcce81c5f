//! Signal handling for graceful termination

use tracing::{debug, warn};

/// Exit status after SIGINT (128 + 2)
pub const EXIT_SIGINT: u8 = 130;

/// Exit status after SIGTERM (128 + 15)
pub const EXIT_SIGTERM: u8 = 143;

/// Resolve once SIGINT or SIGTERM arrives, yielding the exit status to use
#[cfg(unix)]
pub async fn shutdown_signal() -> u8 {
	use tokio::signal::unix::{signal, SignalKind};

	let mut sigterm = match signal(SignalKind::terminate()) {
		Ok(stream) => stream,
		Err(e) => {
			warn!("Failed to setup SIGTERM handler: {}. Process will not handle SIGTERM gracefully.", e);
			return ctrl_c().await;
		}
	};

	let mut sigint = match signal(SignalKind::interrupt()) {
		Ok(stream) => stream,
		Err(e) => {
			warn!("Failed to setup SIGINT handler: {}. Process will not handle SIGINT gracefully.", e);
			sigterm.recv().await;
			return EXIT_SIGTERM;
		}
	};

	tokio::select! {
		_ = sigterm.recv() => {
			debug!("Received SIGTERM, exiting gracefully...");
			EXIT_SIGTERM
		}
		_ = sigint.recv() => {
			debug!("Received SIGINT, exiting gracefully...");
			EXIT_SIGINT
		}
	}
}

#[cfg(not(unix))]
pub async fn shutdown_signal() -> u8 {
	ctrl_c().await
}

async fn ctrl_c() -> u8 {
	if let Err(e) = tokio::signal::ctrl_c().await {
		warn!("Failed to listen for Ctrl-C: {}. Running until killed.", e);
		std::future::pending::<()>().await;
	}
	debug!("Received Ctrl-C, exiting gracefully...");
	EXIT_SIGINT
}

// vim: ts=4
