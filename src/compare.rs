//! Directory pair comparison
//!
//! Classifies the direct children of a source/replica directory pair. Nothing
//! on disk is modified here.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;

use crate::error::{IoContext, SyncError};
use crate::hash::{files_equal, HashAlgorithm};
use crate::logging::*;

/// Kind of a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
	File,
	Dir,
	/// Special files, dangling links, or entries that vanished while listing
	Other,
}

impl EntryKind {
	/// Classify a path, following symlinks
	pub fn of(path: &Path) -> EntryKind {
		Self::from_metadata(fs::metadata(path))
	}

	/// Classify a path without following symlinks; a link is always `Other`
	pub fn of_link(path: &Path) -> EntryKind {
		Self::from_metadata(fs::symlink_metadata(path))
	}

	fn from_metadata(meta: io::Result<fs::Metadata>) -> EntryKind {
		match meta {
			Ok(meta) if meta.is_dir() => EntryKind::Dir,
			Ok(meta) if meta.is_file() => EntryKind::File,
			_ => EntryKind::Other,
		}
	}
}

/// Which side of the pair a directory listing belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
	/// Links are followed; the directory must exist
	Source,
	/// Links are entries of their own; a missing directory lists as empty
	Replica,
}

/// Classification of one directory pair's children
///
/// `common_files`, `common_dirs`, `type_changed`, `source_only`, `replica_only`
/// and `skipped` are disjoint. `diff_files` is a subset of `common_files`.
/// A replica entry that cannot be classified is replaced when the source has
/// a regular file or directory of that name, and removed when it has none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comparison {
	pub common_files: BTreeSet<OsString>,
	pub common_dirs: BTreeSet<OsString>,
	pub diff_files: BTreeSet<OsString>,
	/// Kinds differ between the two sides
	pub type_changed: BTreeSet<OsString>,
	pub source_only: BTreeSet<OsString>,
	pub replica_only: BTreeSet<OsString>,
	pub skipped: BTreeSet<OsString>,
}

impl Comparison {
	/// True when this level needs no update, copy, or removal
	pub fn is_converged(&self) -> bool {
		self.diff_files.is_empty()
			&& self.type_changed.is_empty()
			&& self.source_only.is_empty()
			&& self.replica_only.is_empty()
	}
}

/// List a directory's children with their kinds
fn list_dir(dir: &Path, side: Side) -> Result<BTreeMap<OsString, EntryKind>, SyncError> {
	let mut entries = BTreeMap::new();
	let read_dir = match fs::read_dir(dir) {
		Ok(rd) => rd,
		Err(e) if e.kind() == io::ErrorKind::NotFound && side == Side::Replica => {
			return Ok(entries)
		}
		Err(e) => return Err(SyncError::io(dir, "listing", e)),
	};

	for entry in read_dir {
		let entry = entry.with_path(dir, "listing")?;
		let kind = match side {
			Side::Source => EntryKind::of(&entry.path()),
			Side::Replica => EntryKind::of_link(&entry.path()),
		};
		entries.insert(entry.file_name(), kind);
	}
	Ok(entries)
}

/// Compare the direct children of `source` and `replica`
///
/// Common files are checked for content differences with `algorithm`; size
/// and timestamps are never consulted. Source links are followed, replica
/// links are not: a link in the replica is never common with a source entry,
/// so it gets replaced or removed instead of written through.
///
/// A missing replica lists as empty; a missing source is an error.
pub fn compare_dirs(
	source: &Path,
	replica: &Path,
	algorithm: HashAlgorithm,
) -> Result<Comparison, SyncError> {
	let src_entries = list_dir(source, Side::Source)?;
	let rep_entries = list_dir(replica, Side::Replica)?;
	let mut cmp = Comparison::default();

	for (name, src_kind) in &src_entries {
		match (src_kind, rep_entries.get(name)) {
			(EntryKind::Other, _) => {
				warn!("Skipping special or unreadable entry: {}", source.join(name).display());
				cmp.skipped.insert(name.clone());
			}
			(_, None) => {
				cmp.source_only.insert(name.clone());
			}
			(EntryKind::File, Some(EntryKind::File)) => {
				if !files_equal(&source.join(name), &replica.join(name), algorithm)? {
					cmp.diff_files.insert(name.clone());
				}
				cmp.common_files.insert(name.clone());
			}
			(EntryKind::Dir, Some(EntryKind::Dir)) => {
				cmp.common_dirs.insert(name.clone());
			}
			(_, Some(_)) => {
				cmp.type_changed.insert(name.clone());
			}
		}
	}

	for (name, rep_kind) in &rep_entries {
		if src_entries.contains_key(name) {
			continue;
		}
		if *rep_kind == EntryKind::Other {
			debug!("Removing unclassified replica entry: {}", replica.join(name).display());
		}
		cmp.replica_only.insert(name.clone());
	}

	Ok(cmp)
}


// vim: ts=4
