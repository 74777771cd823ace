//! Diagnostic logging bootstrap.
//!
//! All modules log through the `log` facade. The binary calls
//! [`init_logging`] once and holds the returned handle until exit; `RUST_LOG`
//! overrides the default `info` filter. With a log file configured, every
//! line is appended there and duplicated to stderr.

use std::path::Path;

use flexi_logger::{
    DeferredNow, Duplicate, FileSpec, FlexiLoggerError, Logger, LoggerHandle, WriteMode,
};
use log::Record;

const DEFAULT_SPEC: &str = "info";

/// `2025-06-09 15:30:00 [INFO] message`
fn line_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> std::io::Result<()> {
    write!(
        w,
        "{} [{}] {}",
        now.format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.args()
    )
}

fn build_logger(logger: Logger, log_file: Option<&Path>) -> Result<Logger, FlexiLoggerError> {
    let logger = logger.format(line_format).write_mode(WriteMode::Direct);
    match log_file {
        Some(path) => Ok(logger
            .log_to_file(FileSpec::try_from(path)?.suppress_timestamp())
            .append()
            .duplicate_to_stderr(Duplicate::All)),
        None => Ok(logger.log_to_stderr()),
    }
}

/// Start the global logger. Drop the handle only at exit.
pub fn init_logging(log_file: Option<&Path>) -> Result<LoggerHandle, FlexiLoggerError> {
    build_logger(Logger::try_with_env_or_str(DEFAULT_SPEC)?, log_file)?.start()
}
