//! Logging prelude and subscriber setup
//!
//! Re-exports the common tracing macros and builds the subscriber used by the
//! binary: every line goes to stdout and is appended to the log file.
//!
//! # Usage
//!
//! ```ignore
//! use crate::logging::*;
//!
//! info!("This is an info message");
//! warn!("This is a warning");
//! ```

pub use tracing::{debug, error, info, warn};

use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::{IoContext, SyncError};

/// Timestamp layout of each line, e.g. `2026-10-17 09:30:00,123`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Formats events as `[timestamp]-[LEVEL] - message`
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
	S: Subscriber + for<'a> LookupSpan<'a>,
	N: for<'a> FormatFields<'a> + 'static,
{
	fn format_event(
		&self,
		ctx: &FmtContext<'_, S, N>,
		mut writer: Writer<'_>,
		event: &Event<'_>,
	) -> fmt::Result {
		let now = chrono::Local::now();
		write!(writer, "[{}]-[{}] - ", now.format(TIMESTAMP_FORMAT), event.metadata().level())?;
		ctx.field_format().format_fields(writer.by_ref(), event)?;
		writeln!(writer)
	}
}

/// Initialize tracing with stdout and log-file output
///
/// By default, logs at INFO level and above are written. Control the level
/// with the `RUST_LOG` environment variable:
///
/// ```bash
/// RUST_LOG=debug dirsync src dst 10 sync.log
/// RUST_LOG=dirsync::reconcile=debug dirsync src dst 10 sync.log
/// ```
pub fn init_tracing(log_file: &Path) -> Result<(), SyncError> {
	if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
		fs::create_dir_all(parent).with_path(parent, "creating log directory")?;
	}
	let file = OpenOptions::new()
		.create(true)
		.append(true)
		.open(log_file)
		.with_path(log_file, "opening log file")?;

	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer().event_format(LineFormat).with_writer(std::io::stdout))
		.with(
			tracing_subscriber::fmt::layer()
				.event_format(LineFormat)
				.with_ansi(false)
				.with_writer(Mutex::new(file)),
		)
		.try_init()
		.map_err(|e| SyncError::InvalidConfig { message: format!("logging already set up: {}", e) })
}


// vim: ts=4
