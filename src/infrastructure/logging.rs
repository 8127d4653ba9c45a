//! Logging setup for the analyzer
//!
//! The passes emit `tracing` spans and events; this module installs the
//! subscriber that renders them. Configuration comes either from code
//! ([`LogConfig`]) or from the `[logging]` section of the config file.

use std::path::Path;
use tracing::Level;
use tracing_appender::{
    non_blocking::{NonBlocking, WorkerGuard},
    rolling,
};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::Registry,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter, Layer,
};

use crate::frontend::config::{LogFormatConfig, LoggingConfig};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatConfig> for LogFormat {
    fn from(format: LogFormatConfig) -> Self {
        match format {
            LogFormatConfig::Pretty => LogFormat::Pretty,
            LogFormatConfig::Compact => LogFormat::Compact,
            LogFormatConfig::Json => LogFormat::Json,
        }
    }
}

/// Log output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    /// Daily rolling files `<directory>/<prefix>.YYYY-MM-DD`
    File { directory: String, prefix: String },
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Emit span open/close events (one per pass).
    pub span_events: bool,
    /// Extra filter directives, e.g. "pearl_sema::analysis=trace"
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Pretty,
            output: LogOutput::Stderr,
            span_events: false,
            filter: None,
        }
    }
}

impl From<&LoggingConfig> for LogConfig {
    /// An unrecognized level string falls back to `INFO`.
    fn from(config: &LoggingConfig) -> Self {
        Self {
            level: config.level.parse().unwrap_or(Level::INFO),
            format: config.format.into(),
            filter: config.filter.clone(),
            ..Self::default()
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the non-blocking writer when dropped and must be
/// held for as long as logging is needed. Fails if a global subscriber is
/// already installed.
pub fn init_logging(config: LogConfig) -> Result<WorkerGuard, TryInitError> {
    let (writer, guard) = match &config.output {
        LogOutput::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogOutput::Stderr => tracing_appender::non_blocking(std::io::stderr()),
        LogOutput::File { directory, prefix } => {
            tracing_appender::non_blocking(rolling::daily(directory, prefix))
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer(&config, writer))
        .try_init()?;
    Ok(guard)
}

fn fmt_layer(config: &LogConfig, writer: NonBlocking) -> Box<dyn Layer<Registry> + Send + Sync> {
    let filter = build_filter(config);
    let spans = span_events_config(config.span_events);
    let layer = fmt::layer().with_writer(writer).with_span_events(spans);

    match config.format {
        LogFormat::Pretty => layer.pretty().with_filter(filter).boxed(),
        LogFormat::Compact => layer.compact().with_filter(filter).boxed(),
        LogFormat::Json => layer.json().with_filter(filter).boxed(),
    }
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    let base = EnvFilter::from_default_env().add_directive(config.level.into());
    let Some(directives) = &config.filter else {
        return base;
    };

    directives
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .fold(base, |filter, directive| match directive.parse() {
            Ok(parsed) => filter.add_directive(parsed),
            Err(_) => {
                eprintln!("ignoring invalid log filter directive: {directive}");
                filter
            }
        })
}

fn span_events_config(enabled: bool) -> FmtSpan {
    if enabled {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

/// Verbose stderr logging for local runs.
pub fn init_dev_logging() -> Result<WorkerGuard, TryInitError> {
    init_logging(LogConfig {
        level: Level::DEBUG,
        format: LogFormat::Pretty,
        output: LogOutput::Stderr,
        span_events: true,
        filter: Some("pearl_sema=debug".to_string()),
    })
}

/// JSON logs in daily files under `log_dir`.
pub fn init_prod_logging(log_dir: impl AsRef<Path>) -> Result<WorkerGuard, TryInitError> {
    init_logging(LogConfig {
        level: Level::INFO,
        format: LogFormat::Json,
        output: LogOutput::File {
            directory: log_dir.as_ref().to_string_lossy().to_string(),
            prefix: "pearl-sema".to_string(),
        },
        span_events: false,
        filter: Some("pearl_sema=info".to_string()),
    })
}
