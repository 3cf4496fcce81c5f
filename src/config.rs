//! Configuration for dirsync
//!
//! Settings follow a priority chain:
//! 1. Built-in defaults (Config::default())
//! 2. Config file (TOML, given with `--config`)
//! 3. Environment variables (DIRSYNC_* prefix)
//! 4. CLI arguments (highest priority)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{IoContext, SyncError};
use crate::hash::HashAlgorithm;
use crate::validation::{validate_disjoint_trees, validate_interval_secs, validate_path_given};
use crate::validation::{ValidationError, Validator};

/// Environment variable selecting the hash algorithm
pub const ENV_ALGORITHM: &str = "DIRSYNC_ALGORITHM";

/// Environment variable controlling top-level replica creation
pub const ENV_CREATE_REPLICA: &str = "DIRSYNC_CREATE_REPLICA";

/// Settings for a mirroring run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
	/// Authoritative directory, never modified
	pub source: PathBuf,

	/// Mirror directory, fully managed
	pub replica: PathBuf,

	/// Seconds between the end of one cycle and the start of the next
	pub interval_secs: u64,

	/// File that log lines are appended to
	pub log_file: PathBuf,

	/// Content hash used for equality checks
	pub algorithm: HashAlgorithm,

	/// Create the top-level replica directory when it is missing
	pub create_replica: bool,

	/// Run a single cycle and exit
	pub once: bool,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			source: PathBuf::new(),
			replica: PathBuf::new(),
			interval_secs: 60,
			log_file: PathBuf::from("dirsync.log"),
			algorithm: HashAlgorithm::default(),
			create_replica: true,
			once: false,
		}
	}
}

impl Config {
	/// Load settings from a TOML file; missing keys keep their defaults
	pub fn from_file(path: &Path) -> Result<Config, SyncError> {
		let text = fs::read_to_string(path).with_path(path, "reading config")?;
		Self::from_toml(&text).map_err(|message| SyncError::InvalidConfig {
			message: format!("{}: {}", path.display(), message),
		})
	}

	/// Parse settings from TOML text
	pub fn from_toml(text: &str) -> Result<Config, String> {
		toml::from_str(text).map_err(|e| e.to_string())
	}

	/// Apply DIRSYNC_* overrides from the process environment
	pub fn apply_env(&mut self) -> Result<(), SyncError> {
		self.apply_env_from(|key| std::env::var(key).ok())
	}

	/// Apply DIRSYNC_* overrides using `lookup` to read variables
	pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), SyncError>
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(value) = lookup(ENV_ALGORITHM) {
			self.algorithm = value.parse().map_err(|message| SyncError::InvalidConfig { message })?;
		}
		if let Some(value) = lookup(ENV_CREATE_REPLICA) {
			self.create_replica = parse_bool(&value).ok_or_else(|| SyncError::InvalidConfig {
				message: format!("{} must be true or false, got '{}'", ENV_CREATE_REPLICA, value),
			})?;
		}
		Ok(())
	}

	pub fn interval(&self) -> Duration {
		Duration::from_secs(self.interval_secs)
	}
}

impl Validator for Config {
	fn validate(&self) -> Result<(), ValidationError> {
		validate_path_given("source", &self.source)?;
		validate_path_given("replica", &self.replica)?;
		validate_path_given("log file", &self.log_file)?;
		validate_interval_secs(self.interval_secs)?;
		validate_disjoint_trees(&self.source, &self.replica)
	}
}

fn parse_bool(value: &str) -> Option<bool> {
	match value.to_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Some(true),
		"0" | "false" | "no" | "off" => Some(false),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use tempfile::TempDir;

	#[test]
	fn test_config_default() {
		let config = Config::default();
		assert_eq!(config.interval_secs, 60);
		assert_eq!(config.algorithm, HashAlgorithm::Sha256);
		assert!(config.create_replica);
		assert!(!config.once);
	}

	#[test]
	fn test_config_from_toml_partial() {
		let config = Config::from_toml("algorithm = \"blake3\"\ncreateReplica = false\n").unwrap();
		assert_eq!(config.algorithm, HashAlgorithm::Blake3);
		assert!(!config.create_replica);
		assert_eq!(config.interval_secs, 60);
	}

	#[test]
	fn test_config_from_toml_rejects_bad_algorithm() {
		assert!(Config::from_toml("algorithm = \"md5\"").is_err());
	}

	#[test]
	fn test_config_toml_round_trip() {
		let config = Config { interval_secs: 5, ..Config::default() };
		let text = toml::to_string(&config).expect("Failed to serialize");
		assert!(text.contains("intervalSecs = 5"));
		assert_eq!(Config::from_toml(&text).unwrap(), config);
	}

	#[test]
	fn test_config_from_missing_file() {
		let dir = TempDir::new().unwrap();
		let err = Config::from_file(&dir.path().join("none.toml")).unwrap_err();
		assert!(err.to_string().contains("reading config"));
	}

	#[test]
	fn test_env_overrides() {
		let env: HashMap<&str, &str> =
			[(ENV_ALGORITHM, "BLAKE3"), (ENV_CREATE_REPLICA, "no")].into_iter().collect();
		let mut config = Config::default();
		config.apply_env_from(|k| env.get(k).map(|v| v.to_string())).unwrap();
		assert_eq!(config.algorithm, HashAlgorithm::Blake3);
		assert!(!config.create_replica);

		let mut config = Config::default();
		let err = config.apply_env_from(|k| (k == ENV_CREATE_REPLICA).then(|| "maybe".to_string()));
		assert!(err.is_err());
	}

	#[test]
	fn test_validate() {
		let dir = TempDir::new().unwrap();
		let source = dir.path().join("source");
		std::fs::create_dir(&source).unwrap();

		let mut config = Config {
			source: source.clone(),
			replica: dir.path().join("replica"),
			interval_secs: 1,
			..Config::default()
		};
		assert!(config.validate().is_ok());

		config.interval_secs = 0;
		assert!(config.validate().is_err());

		config.interval_secs = 10;
		config.replica = source.join("nested");
		assert!(config.validate().unwrap_err().to_string().contains("overlap"));
	}
}

// vim: ts=4
