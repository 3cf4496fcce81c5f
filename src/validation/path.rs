//! Path validation functions

use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};

use super::ValidationError;

/// Resolve a path to an absolute, normalized form
///
/// The deepest existing ancestor is canonicalized so that symlinks resolve;
/// the components below it, which do not exist yet, are kept as written.
pub fn resolve_path(path: &Path) -> io::Result<PathBuf> {
	let absolute =
		if path.is_absolute() { path.to_path_buf() } else { std::env::current_dir()?.join(path) };

	let mut normalized = PathBuf::new();
	for component in absolute.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				normalized.pop();
			}
			other => normalized.push(other.as_os_str()),
		}
	}

	let mut tail: Vec<OsString> = Vec::new();
	let mut head = normalized.as_path();
	loop {
		if let Ok(mut resolved) = head.canonicalize() {
			resolved.extend(tail.iter().rev());
			return Ok(resolved);
		}
		match (head.parent(), head.file_name()) {
			(Some(parent), Some(name)) => {
				tail.push(name.to_os_string());
				head = parent;
			}
			_ => return Ok(normalized),
		}
	}
}

/// Check if path is within a root directory (or is the root itself)
pub fn is_path_within_root(path: &Path, root: &Path) -> bool {
	path.starts_with(root)
}

/// Validate that source and replica trees are disjoint
///
/// Mirroring a tree into itself (or a tree into its own parent) would make
/// each cycle copy or delete its own output.
pub fn validate_disjoint_trees(source: &Path, replica: &Path) -> Result<(), ValidationError> {
	let resolve = |p: &Path| {
		resolve_path(p).map_err(|e| {
			ValidationError::PathError(format!("Cannot resolve {}: {}", p.display(), e))
		})
	};
	let (src, rep) = (resolve(source)?, resolve(replica)?);

	if is_path_within_root(&rep, &src) || is_path_within_root(&src, &rep) {
		return Err(ValidationError::PathError(format!(
			"Source {} and replica {} overlap",
			src.display(),
			rep.display()
		)));
	}
	Ok(())
}


// vim: ts=4
