//! Configuration value checks

use std::path::Path;

use super::ValidationError;

/// Interval between cycles must be at least one second
pub fn validate_interval_secs(interval_secs: u64) -> Result<(), ValidationError> {
	if interval_secs == 0 {
		return Err(ValidationError::ConfigError("Interval must be greater than 0".to_string()));
	}
	Ok(())
}

/// A required path must not be empty
pub fn validate_path_given(what: &str, path: &Path) -> Result<(), ValidationError> {
	if path.as_os_str().is_empty() {
		return Err(ValidationError::ConfigError(format!("{} path is required", what)));
	}
	Ok(())
}


// vim: ts=4
