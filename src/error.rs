//! Error types for dirsync operations

use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Main error type for mirroring operations
#[derive(Debug)]
pub enum SyncError {
	/// Source directory does not exist
	SourceMissing { path: PathBuf },

	/// Replica directory does not exist and may not be created
	ReplicaMissing { path: PathBuf },

	/// Path exists but is not a directory
	NotADirectory { path: PathBuf },

	/// I/O error with the path and the operation that failed
	Io { path: PathBuf, operation: &'static str, source: io::Error },

	/// File copy failed; either side may be at fault
	Copy { from: PathBuf, to: PathBuf, source: io::Error },

	/// Invalid configuration
	InvalidConfig { message: String },

	/// Cycle did not run to completion (worker panicked or was cancelled)
	CycleAborted { message: String },
}

impl SyncError {
	/// Wrap an I/O error with the path it happened on
	pub fn io(path: &Path, operation: &'static str, source: io::Error) -> Self {
		SyncError::Io { path: path.to_path_buf(), operation, source }
	}

	/// Path the error refers to, if any
	pub fn path(&self) -> Option<&Path> {
		match self {
			SyncError::SourceMissing { path }
			| SyncError::ReplicaMissing { path }
			| SyncError::NotADirectory { path }
			| SyncError::Io { path, .. } => Some(path),
			SyncError::Copy { to, .. } => Some(to),
			SyncError::InvalidConfig { .. } | SyncError::CycleAborted { .. } => None,
		}
	}
}

impl fmt::Display for SyncError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SyncError::SourceMissing { path } => {
				write!(f, "Source directory does not exist: {}", path.display())
			}
			SyncError::ReplicaMissing { path } => {
				write!(f, "Replica directory does not exist: {}", path.display())
			}
			SyncError::NotADirectory { path } => {
				write!(f, "Not a directory: {}", path.display())
			}
			SyncError::Io { path, operation, source } => {
				write!(f, "I/O error while {} {}: {}", operation, path.display(), source)
			}
			SyncError::Copy { from, to, source } => write!(
				f,
				"I/O error while copying {} to {}: {}",
				from.display(),
				to.display(),
				source
			),
			SyncError::InvalidConfig { message } => {
				write!(f, "Invalid configuration: {}", message)
			}
			SyncError::CycleAborted { message } => write!(f, "Cycle aborted: {}", message),
		}
	}
}

impl Error for SyncError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			SyncError::Io { source, .. } => Some(source),
			SyncError::Copy { source, .. } => Some(source),
			_ => None,
		}
	}
}

/// Extension to attach path context to `io::Result`
pub trait IoContext<T> {
	fn with_path(self, path: &Path, operation: &'static str) -> Result<T, SyncError>;
}

impl<T> IoContext<T> for io::Result<T> {
	fn with_path(self, path: &Path, operation: &'static str) -> Result<T, SyncError> {
		self.map_err(|e| SyncError::io(path, operation, e))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_io_error_display_has_context() {
		let err = SyncError::io(
			Path::new("/tmp/replica/a.txt"),
			"removing",
			io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
		);
		let msg = err.to_string();
		assert!(msg.contains("removing"));
		assert!(msg.contains("/tmp/replica/a.txt"));
		assert!(msg.contains("denied"));
		assert_eq!(err.path(), Some(Path::new("/tmp/replica/a.txt")));
	}

	#[test]
	fn test_with_path_maps_error() {
		let res: io::Result<()> = Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
		match res.with_path(Path::new("x"), "hashing") {
			Err(SyncError::Io { operation, .. }) => assert_eq!(operation, "hashing"),
			other => panic!("unexpected: {:?}", other),
		}
	}

	#[test]
	fn test_copy_error_names_both_paths() {
		let err = SyncError::Copy {
			from: PathBuf::from("/src/a.txt"),
			to: PathBuf::from("/rep/a.txt"),
			source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
		};
		assert_eq!(err.to_string(), "I/O error while copying /src/a.txt to /rep/a.txt: denied");
		assert_eq!(err.path(), Some(Path::new("/rep/a.txt")));
		assert!(err.source().is_some());
	}

	#[test]
	fn test_source_missing_display() {
		let err = SyncError::SourceMissing { path: PathBuf::from("/nope") };
		assert_eq!(err.to_string(), "Source directory does not exist: /nope");
		assert!(err.source().is_none());
	}
}

// vim: ts=4
