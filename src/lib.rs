//! # dirsync - One-way Periodic Directory Mirroring
//!
//! dirsync keeps a replica directory byte-identical to a source directory.
//! Each cycle compares both trees level by level, using content digests to
//! spot changed files, then overwrites, copies, and removes entries until the
//! replica matches. Nothing in the source is ever modified.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dirsync::events::TracingSink;
//! use dirsync::hash::HashAlgorithm;
//! use dirsync::reconcile::Reconciler;
//! use std::path::Path;
//!
//! fn main() -> Result<(), dirsync::SyncError> {
//!     let sink = TracingSink;
//!     let stats = Reconciler::new(HashAlgorithm::Sha256, &sink)
//!         .reconcile(Path::new("./source"), Path::new("./replica"))?;
//!     println!("{} changes", stats.changes());
//!     Ok(())
//! }
//! ```

pub mod compare;
pub mod config;
pub mod error;
pub mod events;
pub mod hash;
pub mod logging;
pub mod reconcile;
pub mod scheduler;
pub mod utils;
pub mod validation;

// Re-export commonly used types and functions
pub use config::Config;
pub use error::SyncError;
pub use events::{EventSink, SyncEvent};
pub use hash::{Digest, HashAlgorithm};
pub use reconcile::{CycleStats, Reconciler};
pub use scheduler::{Scheduler, Stopped};

// vim: ts=4
