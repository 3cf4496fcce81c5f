/// Config loading tests
/// Tests that configuration files are loaded and merged with environment overrides
use std::fs;
use tempfile::TempDir;

use dirsync::config::{Config, ENV_ALGORITHM, ENV_CREATE_REPLICA};
use dirsync::validation::Validator;
use dirsync::{HashAlgorithm, SyncError};

#[test]
fn test_config_file_full() {
	let temp_dir = TempDir::new().expect("Failed to create temp dir");
	let source = temp_dir.path().join("data");
	fs::create_dir(&source).unwrap();

	let config_path = temp_dir.path().join("dirsync.toml");
	let config_content = format!(
		"source = {:?}\nreplica = {:?}\nintervalSecs = 30\nlogFile = {:?}\nalgorithm = \"blake3\"\n",
		source.display().to_string(),
		temp_dir.path().join("mirror").display().to_string(),
		temp_dir.path().join("sync.log").display().to_string(),
	);
	fs::write(&config_path, config_content).expect("Failed to write config file");

	let config = Config::from_file(&config_path).expect("Config should load");
	assert_eq!(config.source, source);
	assert_eq!(config.interval_secs, 30);
	assert_eq!(config.algorithm, HashAlgorithm::Blake3);
	assert!(config.create_replica);
	assert!(config.validate().is_ok());
}

#[test]
fn test_config_file_empty_uses_defaults() {
	let temp_dir = TempDir::new().unwrap();
	let config_path = temp_dir.path().join("empty.toml");
	fs::write(&config_path, "").unwrap();

	let config = Config::from_file(&config_path).unwrap();
	assert_eq!(config, Config::default());
}

#[test]
fn test_config_file_syntax_error_names_the_file() {
	let temp_dir = TempDir::new().unwrap();
	let config_path = temp_dir.path().join("broken.toml");
	fs::write(&config_path, "intervalSecs = = 3").unwrap();

	match Config::from_file(&config_path) {
		Err(SyncError::InvalidConfig { message }) => assert!(message.contains("broken.toml")),
		other => panic!("expected InvalidConfig, got {:?}", other),
	}
}

#[test]
fn test_environment_overrides_file() {
	let mut config = Config::from_toml("algorithm = \"blake3\"\ncreateReplica = true").unwrap();
	config
		.apply_env_from(|key| match key {
			k if k == ENV_ALGORITHM => Some("sha256".to_string()),
			k if k == ENV_CREATE_REPLICA => Some("false".to_string()),
			_ => None,
		})
		.unwrap();
	assert_eq!(config.algorithm, HashAlgorithm::Sha256);
	assert!(!config.create_replica);
}

#[test]
fn test_environment_rejects_unknown_algorithm() {
	let mut config = Config::default();
	let err = config
		.apply_env_from(|key| (key == ENV_ALGORITHM).then(|| "crc32".to_string()))
		.unwrap_err();
	assert!(err.to_string().contains("Unknown hash algorithm"));
}

// vim: ts=4
