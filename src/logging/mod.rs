//! Logging setup
//!
//! The crate itself only emits `tracing` events. Binaries and test harnesses
//! that want to see them can install a subscriber through this module.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: standard tracing filter, takes precedence
//! - `DIOPI_ASCEND_LOG_LEVEL`: error, warn, info, debug or trace
//! - `DIOPI_ASCEND_LOG_FORMAT`: "human" or "json"
//! - `DIOPI_DEBUG_ACLOPRUNNER`: when present, the level is at least info so
//!   the per-run trace line is printed

use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::debug_trace_from_env;

static TRACING_INITIALIZED: OnceCell<()> = OnceCell::new();

const LOG_LEVEL_ENV: &str = "DIOPI_ASCEND_LOG_LEVEL";
const LOG_FORMAT_ENV: &str = "DIOPI_ASCEND_LOG_FORMAT";

/// Errors that can occur while installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("a global subscriber is already installed: {0}")]
    AlreadyInstalled(String),
}

/// Ordered from quietest to most verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "human" | "pretty" => Some(LogFormat::Human),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Subscriber configuration
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    /// Include file and line of the event
    pub with_file_info: bool,
    /// Emit span close events (with timing)
    pub with_span_events: bool,
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level and format from `DIOPI_ASCEND_LOG_*`, defaults otherwise.
    ///
    /// The run trace is logged at info, so `DIOPI_DEBUG_ACLOPRUNNER` raises
    /// the level to at least [`LogLevel::Info`].
    pub fn from_env() -> Self {
        let mut level = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|s| LogLevel::parse(&s))
            .unwrap_or_default();
        if debug_trace_from_env() {
            level = level.max(LogLevel::Info);
        }
        let format = std::env::var(LOG_FORMAT_ENV)
            .ok()
            .and_then(|s| LogFormat::parse(&s))
            .unwrap_or_default();
        Self::new().with_level(level).with_format(format)
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_file_info(mut self, with_file_info: bool) -> Self {
        self.with_file_info = with_file_info;
        self
    }

    pub fn with_span_events(mut self, with_span_events: bool) -> Self {
        self.with_span_events = with_span_events;
        self
    }
}

/// Install a subscriber configured from the environment. Idempotent; a
/// subscriber installed by someone else is left alone.
pub fn init_logging_default() {
    init_with_config(&LoggingConfig::from_env());
}

/// Install a subscriber with `config`. Idempotent.
pub fn init_with_config(config: &LoggingConfig) {
    TRACING_INITIALIZED.get_or_init(|| {
        if let Err(err) = try_init(config) {
            eprintln!("diopi-ascend: logging not initialized: {}", err);
        }
    });
}

fn try_init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_env_filter(config.level)?;
    let span_events = if config.with_span_events {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_file(config.with_file_info)
                    .with_line_number(config.with_file_info)
                    .with_span_events(span_events),
            )
            .try_init(),
        LogFormat::Human => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(config.with_file_info)
                    .with_line_number(config.with_file_info)
                    .with_span_events(span_events),
            )
            .try_init(),
    };
    result.map_err(|e| LoggingError::AlreadyInstalled(e.to_string()))
}

/// `RUST_LOG` wins; otherwise the configured level applies crate-wide
fn build_env_filter(level: LogLevel) -> Result<EnvFilter, LoggingError> {
    if let Ok(rust_log) = std::env::var("RUST_LOG") {
        return EnvFilter::try_new(rust_log).map_err(|e| LoggingError::InvalidFilter(e.to_string()));
    }
    Ok(EnvFilter::new(level.as_filter_str()))
}

/// Whether [`init_with_config`] has run in this process
pub fn is_initialized() -> bool {
    TRACING_INITIALIZED.get().is_some()
}
