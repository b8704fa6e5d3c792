//! Process-wide tracing setup.

use std::env;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Filter directive variable, read when no level is passed.
pub const TRACE_ENV: &str = "MPSOLVE_TRACE";
/// `pretty` (default) or `json`.
pub const LOG_FORMAT_ENV: &str = "MPSOLVE_LOG_FORMAT";
/// Optional file that receives a copy of every event.
pub const LOG_FILE_ENV: &str = "MPSOLVE_LOG_FILE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    InvalidFilter(String),
    InvalidFormat(String),
    LogFile { path: String, message: String },
    Init(String),
}

impl LoggingError {
    pub fn code(&self) -> &'static str {
        match self {
            LoggingError::InvalidFilter(_) => "LOGGING_INVALID_FILTER",
            LoggingError::InvalidFormat(_) => "LOGGING_INVALID_FORMAT",
            LoggingError::LogFile { .. } => "LOGGING_FILE",
            LoggingError::Init(_) => "LOGGING_INIT",
        }
    }
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggingError::InvalidFilter(msg) => {
                write!(f, "[{}] Invalid log filter: {}", self.code(), msg)
            }
            LoggingError::InvalidFormat(value) => write!(
                f,
                "[{}] Invalid {} '{}' (expected 'json' or 'pretty')",
                self.code(),
                LOG_FORMAT_ENV,
                value
            ),
            LoggingError::LogFile { path, message } => write!(
                f,
                "[{}] Failed to open log file {}: {}",
                self.code(),
                path,
                message
            ),
            LoggingError::Init(msg) => {
                write!(f, "[{}] Failed to initialize logging: {}", self.code(), msg)
            }
        }
    }
}

impl std::error::Error for LoggingError {}

fn open_log_file(path: &str) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| LoggingError::LogFile {
            path: path.to_string(),
            message: err.to_string(),
        })
}

fn map_init_err<E: fmt::Display>(err: E) -> LoggingError {
    LoggingError::Init(err.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

fn parse_format(value: &str) -> Result<LogFormat, LoggingError> {
    if value.eq_ignore_ascii_case("pretty") {
        Ok(LogFormat::Pretty)
    } else if value.eq_ignore_ascii_case("json") {
        Ok(LogFormat::Json)
    } else {
        Err(LoggingError::InvalidFormat(value.to_string()))
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// One formatted output; ANSI colours only on terminals.
fn output_layer<W>(writer: W, format: LogFormat, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi);
    match format {
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if level.eq_ignore_ascii_case("off") {
        Ok(EnvFilter::default().add_directive(LevelFilter::OFF.into()))
    } else {
        EnvFilter::try_new(level).map_err(|err| LoggingError::InvalidFilter(err.to_string()))
    }
}

/// Install a global subscriber writing to stderr.
///
/// When `level` is None, `MPSOLVE_TRACE` is read; if that is unset too the
/// filter is `off`. Returns `false` without touching anything if a
/// subscriber is already installed.
pub fn enable_logging(level: Option<&str>) -> Result<bool, LoggingError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }

    let level_value = level
        .map(str::to_string)
        .or_else(|| env::var(TRACE_ENV).ok())
        .unwrap_or_else(|| "off".to_string());
    let filter = build_filter(&level_value)?;

    let format = parse_format(
        &env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "pretty".to_string()),
    )?;
    let mut layers = vec![output_layer(io::stderr, format, true)];
    if let Ok(path) = env::var(LOG_FILE_ENV) {
        layers.push(output_layer(open_log_file(&path)?, format, false));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(map_init_err)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parsing() {
        assert!(build_filter("off").is_ok());
        assert!(build_filter("OFF").is_ok());
        assert!(build_filter("mpsolve=debug,warn").is_ok());
        let err = build_filter("mpsolve=[").unwrap_err();
        assert_eq!(err.code(), "LOGGING_INVALID_FILTER");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(parse_format("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(parse_format("JSON").unwrap(), LogFormat::Json);
        assert_eq!(
            parse_format("xml").unwrap_err(),
            LoggingError::InvalidFormat("xml".to_string())
        );
    }

    #[test]
    fn test_error_display() {
        let err = LoggingError::InvalidFormat("xml".to_string());
        assert_eq!(
            err.to_string(),
            "[LOGGING_INVALID_FORMAT] Invalid MPSOLVE_LOG_FORMAT 'xml' (expected 'json' or 'pretty')"
        );
    }
}
