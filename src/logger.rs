use std::sync::Arc;
use std::time::Duration;

use spdlog::sink::{RotatingFileSink, RotationPolicy, StdStream, StdStreamSink};
use spdlog::{Level, LevelFilter, Logger};

use crate::config::{Config, LogLevel};

impl From<LogLevel> for Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Critical => Level::Critical,
            LogLevel::Error => Level::Error,
            LogLevel::Warn => Level::Warn,
            LogLevel::Info => Level::Info,
            LogLevel::Debug => Level::Debug,
            LogLevel::Trace => Level::Trace,
        }
    }
}

/// Configured level, Warn when nothing is configured. `verbose` raises it to at
/// least Debug.
pub fn log_level(config: &Config, verbose: bool) -> Level {
    let configured = config.log.as_ref().map(|log| log.level);
    match (verbose, configured) {
        (true, Some(LogLevel::Trace)) => Level::Trace,
        (true, _) => Level::Debug,
        (false, Some(level)) => level.into(),
        (false, None) => Level::Warn,
    }
}

/// Replaces the default logger. Stdout carries reports, so the console sink
/// writes to stderr.
pub fn configure_logger(config: &Config, verbose: bool) -> spdlog::Result<()> {
    let level = log_level(config, verbose);
    let mut builder = Logger::builder();

    let log_to_console = config.log.as_ref().map(|log| log.log_to_console).unwrap_or(true);
    if log_to_console || verbose {
        let stderr = Arc::new(StdStreamSink::builder()
            .std_stream(StdStream::Stderr)
            .build()?);
        builder.sink(stderr);
    }

    if let Some(location) = config.log.as_ref().and_then(|log| log.location.as_ref()) {
        let daily_sink = Arc::new(RotatingFileSink::builder()
            .base_path(location)
            .rotation_policy(RotationPolicy::Daily { hour: 0, minute: 0 })
            .max_files(30)
            .rotate_on_open(false)
            .build()?);
        builder.sink(daily_sink);
    }

    let logger = Arc::new(builder.build()?);
    logger.set_flush_level_filter(LevelFilter::MoreSevereEqual(Level::Warn));
    logger.set_flush_period(Some(Duration::from_secs(2)));
    logger.set_level_filter(LevelFilter::MoreSevereEqual(level));

    spdlog::set_default_logger(logger);
    Ok(())
}
