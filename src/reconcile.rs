//! One-way reconciliation of a replica tree against its source
//!
//! Each directory level is handled in a fixed order: overwrite files whose
//! content differs, replace entries whose kind changed, copy entries that only
//! exist in the source, remove entries that only exist in the replica. Common
//! subdirectories are then visited depth first. Pending directory pairs are
//! kept on an explicit stack, so tree depth never grows the call stack.

use filetime::FileTime;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::compare::{compare_dirs, Comparison, EntryKind};
use crate::error::{IoContext, SyncError};
use crate::events::{EventSink, SyncEvent};
use crate::hash::HashAlgorithm;
use crate::logging::*;

/// Counters for one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
	pub dirs_visited: usize,
	pub files_updated: usize,
	pub entries_copied: usize,
	pub entries_removed: usize,
	pub bytes_copied: u64,
}

impl CycleStats {
	/// Number of update, copy, and remove events emitted
	pub fn changes(&self) -> usize {
		self.files_updated + self.entries_copied + self.entries_removed
	}
}

/// A source directory and its replica counterpart
#[derive(Debug, Clone)]
struct DirPair {
	source: PathBuf,
	replica: PathBuf,
}

impl DirPair {
	fn child(&self, name: &OsStr) -> DirPair {
		DirPair { source: self.source.join(name), replica: self.replica.join(name) }
	}
}

/// Converges a replica tree to its source
pub struct Reconciler<'a> {
	algorithm: HashAlgorithm,
	create_replica: bool,
	sink: &'a dyn EventSink,
}

impl<'a> Reconciler<'a> {
	pub fn new(algorithm: HashAlgorithm, sink: &'a dyn EventSink) -> Self {
		Reconciler { algorithm, create_replica: true, sink }
	}

	/// Whether a missing top-level replica is created (default) or an error
	pub fn create_replica(mut self, create: bool) -> Self {
		self.create_replica = create;
		self
	}

	/// Run one full pass over `source` and `replica`
	///
	/// Stops at the first filesystem error; the replica is then left
	/// partially converged until the next pass.
	pub fn reconcile(&self, source: &Path, replica: &Path) -> Result<CycleStats, SyncError> {
		self.check_roots(source, replica)?;

		let mut stats = CycleStats::default();
		let mut pending =
			vec![DirPair { source: source.to_path_buf(), replica: replica.to_path_buf() }];

		while let Some(pair) = pending.pop() {
			debug!("Reconciling {} -> {}", pair.source.display(), pair.replica.display());
			let cmp = compare_dirs(&pair.source, &pair.replica, self.algorithm)?;

			self.update_files(&pair, &cmp, &mut stats)?;
			self.change_entries(&pair, &cmp, &mut stats)?;
			stats.dirs_visited += 1;

			// Reversed so that children pop in name order
			for name in cmp.common_dirs.iter().rev() {
				pending.push(pair.child(name));
			}
		}

		Ok(stats)
	}

	fn check_roots(&self, source: &Path, replica: &Path) -> Result<(), SyncError> {
		match fs::metadata(source) {
			Ok(meta) if meta.is_dir() => {}
			Ok(_) => return Err(SyncError::NotADirectory { path: source.to_path_buf() }),
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				return Err(SyncError::SourceMissing { path: source.to_path_buf() })
			}
			Err(e) => return Err(SyncError::io(source, "reading", e)),
		}

		match fs::metadata(replica) {
			Ok(meta) if meta.is_dir() => Ok(()),
			Ok(_) => Err(SyncError::NotADirectory { path: replica.to_path_buf() }),
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				if !self.create_replica {
					return Err(SyncError::ReplicaMissing { path: replica.to_path_buf() });
				}
				fs::create_dir_all(replica).with_path(replica, "creating directory")?;
				info!("Created replica directory: {}", replica.display());
				Ok(())
			}
			Err(e) => Err(SyncError::io(replica, "reading", e)),
		}
	}

	fn update_files(
		&self,
		pair: &DirPair,
		cmp: &Comparison,
		stats: &mut CycleStats,
	) -> Result<(), SyncError> {
		for name in &cmp.diff_files {
			let child = pair.child(name);
			make_writable(&child.replica)?;
			stats.bytes_copied += copy_file_with_metadata(&child.source, &child.replica)?;
			stats.files_updated += 1;
			self.sink.on_event(&SyncEvent::Updated { source: child.source, replica: child.replica });
		}
		Ok(())
	}

	/// Replace, copy, and remove the entries of one replica directory
	///
	/// A read-only replica directory is made writable for the duration and
	/// gets its previous mode back afterwards.
	fn change_entries(
		&self,
		pair: &DirPair,
		cmp: &Comparison,
		stats: &mut CycleStats,
	) -> Result<(), SyncError> {
		if cmp.type_changed.is_empty() && cmp.source_only.is_empty() && cmp.replica_only.is_empty() {
			return Ok(());
		}

		let locked = make_writable(&pair.replica)?;
		let result = self
			.replace_changed(pair, cmp, stats)
			.and_then(|()| self.copy_new(pair, cmp, stats))
			.and_then(|()| self.remove_extra(pair, cmp, stats));
		if let Some(perms) = locked {
			fs::set_permissions(&pair.replica, perms)
				.with_path(&pair.replica, "changing permissions")?;
		}
		result
	}

	fn replace_changed(
		&self,
		pair: &DirPair,
		cmp: &Comparison,
		stats: &mut CycleStats,
	) -> Result<(), SyncError> {
		for name in &cmp.type_changed {
			let child = pair.child(name);
			self.remove_entry(&child.replica, stats)?;
			self.copy_entry(&child, stats)?;
		}
		Ok(())
	}

	fn copy_new(
		&self,
		pair: &DirPair,
		cmp: &Comparison,
		stats: &mut CycleStats,
	) -> Result<(), SyncError> {
		for name in &cmp.source_only {
			self.copy_entry(&pair.child(name), stats)?;
		}
		Ok(())
	}

	fn remove_extra(
		&self,
		pair: &DirPair,
		cmp: &Comparison,
		stats: &mut CycleStats,
	) -> Result<(), SyncError> {
		for name in &cmp.replica_only {
			self.remove_entry(&pair.replica.join(name), stats)?;
		}
		Ok(())
	}

	fn copy_entry(&self, child: &DirPair, stats: &mut CycleStats) -> Result<(), SyncError> {
		let event = match EntryKind::of(&child.source) {
			EntryKind::Dir => {
				stats.bytes_copied += copy_tree(&child.source, &child.replica)?;
				SyncEvent::CopiedDir { source: child.source.clone(), replica: child.replica.clone() }
			}
			EntryKind::File => {
				stats.bytes_copied += copy_file_with_metadata(&child.source, &child.replica)?;
				SyncEvent::CopiedFile { source: child.source.clone(), replica: child.replica.clone() }
			}
			EntryKind::Other => {
				warn!("Source entry vanished before copy: {}", child.source.display());
				return Ok(());
			}
		};
		stats.entries_copied += 1;
		self.sink.on_event(&event);
		Ok(())
	}

	fn remove_entry(&self, path: &Path, stats: &mut CycleStats) -> Result<(), SyncError> {
		// Not following links: a link to a directory is removed, never its target
		let meta = fs::symlink_metadata(path).with_path(path, "inspecting")?;
		let event = if meta.is_dir() {
			unlock_tree(path)?;
			fs::remove_dir_all(path).with_path(path, "removing")?;
			SyncEvent::RemovedDir { replica: path.to_path_buf() }
		} else {
			fs::remove_file(path).with_path(path, "removing")?;
			SyncEvent::RemovedFile { replica: path.to_path_buf() }
		};
		stats.entries_removed += 1;
		self.sink.on_event(&event);
		Ok(())
	}
}

/// Owner-writable version of `perms`, or `None` if the owner can already write
#[cfg(unix)]
fn writable_permissions(perms: &fs::Permissions) -> Option<fs::Permissions> {
	use std::os::unix::fs::PermissionsExt;
	if perms.mode() & 0o200 != 0 {
		return None;
	}
	Some(fs::Permissions::from_mode(perms.mode() | 0o200))
}

#[cfg(not(unix))]
fn writable_permissions(perms: &fs::Permissions) -> Option<fs::Permissions> {
	if !perms.readonly() {
		return None;
	}
	let mut perms = perms.clone();
	#[allow(clippy::permissions_set_readonly_false)]
	perms.set_readonly(false);
	Some(perms)
}

/// Give the owner write access to a replica file or directory
///
/// Returns the previous permissions when they had to be changed.
fn make_writable(path: &Path) -> Result<Option<fs::Permissions>, SyncError> {
	let original = fs::metadata(path).with_path(path, "inspecting")?.permissions();
	match writable_permissions(&original) {
		Some(perms) => {
			fs::set_permissions(path, perms).with_path(path, "changing permissions")?;
			Ok(Some(original))
		}
		None => Ok(None),
	}
}

/// Make every directory under `root` writable so its entries can be deleted
fn unlock_tree(root: &Path) -> Result<(), SyncError> {
	let mut pending = vec![root.to_path_buf()];
	while let Some(dir) = pending.pop() {
		make_writable(&dir)?;
		for entry in fs::read_dir(&dir).with_path(&dir, "listing")? {
			let entry = entry.with_path(&dir, "listing")?;
			// file_type() does not follow links
			if entry.file_type().with_path(&entry.path(), "inspecting")?.is_dir() {
				pending.push(entry.path());
			}
		}
	}
	Ok(())
}

/// Carry access and modification times over from `from` to `to`
fn copy_times(from: &fs::Metadata, to: &Path) -> Result<(), SyncError> {
	filetime::set_file_times(
		to,
		FileTime::from_last_access_time(from),
		FileTime::from_last_modification_time(from),
	)
	.with_path(to, "setting times on")
}

/// Copy a file's content, permissions, and timestamps; returns bytes copied
pub fn copy_file_with_metadata(source: &Path, replica: &Path) -> Result<u64, SyncError> {
	let bytes = fs::copy(source, replica).map_err(|e| SyncError::Copy {
		from: source.to_path_buf(),
		to: replica.to_path_buf(),
		source: e,
	})?;
	let meta = fs::metadata(source).with_path(source, "reading")?;
	copy_times(&meta, replica)?;
	Ok(bytes)
}

/// Copy a whole directory tree; returns bytes copied
///
/// Directory permissions and times are applied after the directory's
/// contents are written, deepest directories first.
pub fn copy_tree(source: &Path, replica: &Path) -> Result<u64, SyncError> {
	let mut bytes = 0;
	let mut created: Vec<(PathBuf, PathBuf)> = Vec::new();
	let mut pending = vec![(source.to_path_buf(), replica.to_path_buf())];

	while let Some((from, to)) = pending.pop() {
		fs::create_dir(&to).with_path(&to, "creating directory")?;

		for entry in fs::read_dir(&from).with_path(&from, "listing")? {
			let entry = entry.with_path(&from, "listing")?;
			let (src, dst) = (entry.path(), to.join(entry.file_name()));
			match EntryKind::of(&src) {
				EntryKind::Dir => pending.push((src, dst)),
				EntryKind::File => bytes += copy_file_with_metadata(&src, &dst)?,
				EntryKind::Other => warn!("Skipping special or unreadable entry: {}", src.display()),
			}
		}
		created.push((from, to));
	}

	for (from, to) in created.iter().rev() {
		let meta = fs::metadata(from).with_path(from, "reading")?;
		fs::set_permissions(to, meta.permissions()).with_path(to, "changing permissions")?;
		copy_times(&meta, to)?;
	}

	Ok(bytes)
}


// vim: ts=4
