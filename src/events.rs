//! Mirroring events and the sinks that receive them
//!
//! The reconciler reports every change it makes through an [`EventSink`]
//! handed to it by the caller, so the core never touches global logging state.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::logging::*;

/// A change applied to the replica
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
	/// Replica file overwritten because its content differed
	Updated { source: PathBuf, replica: PathBuf },

	/// Whole directory tree copied into the replica
	CopiedDir { source: PathBuf, replica: PathBuf },

	/// Single file copied into the replica
	CopiedFile { source: PathBuf, replica: PathBuf },

	/// Directory tree removed from the replica
	RemovedDir { replica: PathBuf },

	/// File removed from the replica
	RemovedFile { replica: PathBuf },
}

impl SyncEvent {
	/// Replica path affected by this event
	pub fn replica_path(&self) -> &Path {
		match self {
			SyncEvent::Updated { replica, .. }
			| SyncEvent::CopiedDir { replica, .. }
			| SyncEvent::CopiedFile { replica, .. }
			| SyncEvent::RemovedDir { replica }
			| SyncEvent::RemovedFile { replica } => replica,
		}
	}
}

impl fmt::Display for SyncEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SyncEvent::Updated { source, replica } => write!(
				f,
				"Updated file (content changed): {} -> {}",
				source.display(),
				replica.display()
			),
			SyncEvent::CopiedDir { source, replica } => {
				write!(f, "Copied new directory: {} -> {}", source.display(), replica.display())
			}
			SyncEvent::CopiedFile { source, replica } => {
				write!(f, "Copied file: {} -> {}", source.display(), replica.display())
			}
			SyncEvent::RemovedDir { replica } => write!(f, "Removed directory: {}", replica.display()),
			SyncEvent::RemovedFile { replica } => write!(f, "Removed file: {}", replica.display()),
		}
	}
}

/// Receiver for mirroring events
pub trait EventSink: Send + Sync {
	fn on_event(&self, event: &SyncEvent);
}

impl<T: Fn(&SyncEvent) + Send + Sync> EventSink for T {
	fn on_event(&self, event: &SyncEvent) {
		self(event);
	}
}

/// Logs each event at INFO
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
	fn on_event(&self, event: &SyncEvent) {
		info!("{}", event);
	}
}

/// Discards all events
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEventSink;

impl EventSink for NoEventSink {
	fn on_event(&self, _event: &SyncEvent) {}
}


// vim: ts=4
