use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use dirsync::events::TracingSink;
use dirsync::logging::{self, *};
use dirsync::utils::shutdown_signal;
use dirsync::validation::Validator;
use dirsync::{Config, HashAlgorithm, Scheduler, SyncError};

fn cli() -> Command {
	Command::new("dirsync")
		.version(env!("CARGO_PKG_VERSION"))
		.about("Synchronize two folders with logging and periodic execution")
		.arg(
			Arg::new("source")
				.required_unless_present("config")
				.value_parser(value_parser!(PathBuf))
				.help("Path to the source folder"),
		)
		.arg(
			Arg::new("replica")
				.required_unless_present("config")
				.value_parser(value_parser!(PathBuf))
				.help("Path to the replica folder"),
		)
		.arg(
			Arg::new("interval")
				.required_unless_present("config")
				.value_parser(value_parser!(u64).range(1..))
				.help("Synchronization interval in seconds"),
		)
		.arg(
			Arg::new("log_file_path")
				.required_unless_present("config")
				.value_parser(value_parser!(PathBuf))
				.help("Path to the log file"),
		)
		.arg(
			Arg::new("algorithm")
				.short('a')
				.long("algorithm")
				.value_name("ALGORITHM")
				.value_parser(value_parser!(HashAlgorithm))
				.help("Content hash: sha256 (default) or blake3"),
		)
		.arg(
			Arg::new("config")
				.short('c')
				.long("config")
				.value_name("FILE")
				.value_parser(value_parser!(PathBuf))
				.help("TOML config file"),
		)
		.arg(
			Arg::new("no_create_replica")
				.long("no-create-replica")
				.action(ArgAction::SetTrue)
				.help("Fail instead of creating a missing replica folder"),
		)
		.arg(
			Arg::new("once")
				.long("once")
				.action(ArgAction::SetTrue)
				.help("Run a single cycle and exit"),
		)
}

/// Defaults, then config file, then environment, then command line
fn load_config(matches: &ArgMatches) -> Result<Config, SyncError> {
	let mut config = match matches.get_one::<PathBuf>("config") {
		Some(path) => Config::from_file(path)?,
		None => Config::default(),
	};
	config.apply_env()?;

	if let Some(source) = matches.get_one::<PathBuf>("source") {
		config.source = source.clone();
	}
	if let Some(replica) = matches.get_one::<PathBuf>("replica") {
		config.replica = replica.clone();
	}
	if let Some(interval) = matches.get_one::<u64>("interval") {
		config.interval_secs = *interval;
	}
	if let Some(log_file) = matches.get_one::<PathBuf>("log_file_path") {
		config.log_file = log_file.clone();
	}
	if let Some(algorithm) = matches.get_one::<HashAlgorithm>("algorithm") {
		config.algorithm = *algorithm;
	}
	if matches.get_flag("no_create_replica") {
		config.create_replica = false;
	}
	if matches.get_flag("once") {
		config.once = true;
	}

	config.validate()?;
	Ok(config)
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
	let matches = cli().get_matches();

	let config = match load_config(&matches) {
		Ok(config) => config,
		Err(e) => {
			eprintln!("dirsync: {}", e);
			return Ok(ExitCode::from(2));
		}
	};
	logging::init_tracing(&config.log_file)?;

	let once = config.once;
	let scheduler = Scheduler::new(config, Arc::new(TracingSink));

	if once {
		return Ok(match scheduler.run_once().await {
			Ok(_) => ExitCode::SUCCESS,
			Err(_) => ExitCode::FAILURE,
		});
	}

	let stopped = scheduler.run(shutdown_signal()).await;
	info!(
		"Stopping after {} cycles ({} failed)",
		stopped.cycles, stopped.failed_cycles
	);
	Ok(ExitCode::from(stopped.reason))
}


// vim: ts=4
