//! Logging infrastructure for Vitrine.

use std::io;
use std::path::PathBuf;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Log file path (if file logging enabled).
    pub file_path: Option<PathBuf>,
    /// Include source location.
    pub source_location: bool,
    /// Include span events.
    pub span_events: bool,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing_subscriber::filter::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing_subscriber::filter::LevelFilter::TRACE,
            LogLevel::Debug => tracing_subscriber::filter::LevelFilter::DEBUG,
            LogLevel::Info => tracing_subscriber::filter::LevelFilter::INFO,
            LogLevel::Warn => tracing_subscriber::filter::LevelFilter::WARN,
            LogLevel::Error => tracing_subscriber::filter::LevelFilter::ERROR,
        }
    }
}

impl LogLevel {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON structured format.
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            file_path: None,
            source_location: false,
            span_events: false,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables, with `level` used when
    /// neither `VITRINE_LOG_LEVEL` nor `RUST_LOG` names a level.
    pub fn from_env_or(level: LogLevel) -> Self {
        Self::from_lookup_or(level, |var| std::env::var(var).ok())
    }

    /// Create config from an arbitrary variable lookup.
    fn from_lookup_or<F>(level: LogLevel, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            level,
            ..Self::default()
        };
        let flag = |v: String| v.to_lowercase() == "true" || v == "1";

        if let Some(level) = lookup("VITRINE_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            if let Some(l) = LogLevel::parse(&level) {
                config.level = l;
            }
        }

        if let Some(format) = lookup("VITRINE_LOG_FORMAT") {
            config.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            };
        }

        if let Some(file_path) = lookup("VITRINE_LOG_FILE") {
            config.file_path = Some(PathBuf::from(file_path));
        }

        if let Some(source_location) = lookup("VITRINE_LOG_SOURCE") {
            config.source_location = flag(source_location);
        }

        if let Some(span_events) = lookup("VITRINE_LOG_SPANS") {
            config.span_events = flag(span_events);
        }

        config
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn stderr_layer(config: &LogConfig) -> BoxedLayer {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_span_events(config.span_events());

    match config.format {
        LogFormat::Pretty => layer
            .with_ansi(true)
            .with_target(true)
            .with_file(config.source_location)
            .with_line_number(config.source_location)
            .boxed(),
        LogFormat::Compact => layer.compact().with_ansi(true).boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

fn file_layer(config: &LogConfig, file: std::fs::File) -> BoxedLayer {
    let layer = fmt::layer()
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_span_events(config.span_events());

    match config.format {
        LogFormat::Pretty => layer
            .with_target(true)
            .with_file(config.source_location)
            .with_line_number(config.source_location)
            .boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

/// Initialize logging with the given configuration.
///
/// `RUST_LOG` directives, when present and valid, take precedence over
/// `config.level`.
pub fn init(config: LogConfig) -> Result<(), LogError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let mut layers = vec![stderr_layer(&config)];

    if let Some(file_path) = &config.file_path {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        layers.push(file_layer(&config, file));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| LogError::InitError(e.to_string()))
}

/// Logging errors.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to initialize logging: {0}")]
    InitError(String),

    #[error("failed to open log file: {0}")]
    FileError(#[from] io::Error),
}

/// Convenience macros re-exported from tracing.
pub use tracing::{debug, error, info, trace, warn};

/// Pipeline spans and timing.
pub mod spans;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("info"), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("Warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("warn"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("error"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse("trace"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::parse("invalid"), None);
    }

    #[test]
    fn test_log_level_from() {
        use tracing_subscriber::filter::LevelFilter;
        assert_eq!(LevelFilter::from(LogLevel::Trace), LevelFilter::TRACE);
        assert_eq!(LevelFilter::from(LogLevel::Debug), LevelFilter::DEBUG);
        assert_eq!(LevelFilter::from(LogLevel::Info), LevelFilter::INFO);
        assert_eq!(LevelFilter::from(LogLevel::Warn), LevelFilter::WARN);
        assert_eq!(LevelFilter::from(LogLevel::Error), LevelFilter::ERROR);
    }

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file_path.is_none());
        assert!(!config.source_location);
        assert!(!config.span_events);
    }

    #[test]
    fn test_config_from_lookup() {
        let config = LogConfig::from_lookup_or(LogLevel::default(), lookup(&[
            ("VITRINE_LOG_LEVEL", "debug"),
            ("VITRINE_LOG_FORMAT", "json"),
            ("VITRINE_LOG_FILE", "/tmp/vitrine.log"),
            ("VITRINE_LOG_SOURCE", "true"),
            ("VITRINE_LOG_SPANS", "1"),
        ]));

        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file_path, Some(PathBuf::from("/tmp/vitrine.log")));
        assert!(config.source_location);
        assert!(config.span_events);
    }

    #[test]
    fn test_rust_log_fallback() {
        let config = LogConfig::from_lookup_or(LogLevel::default(), lookup(&[("RUST_LOG", "warn")]));
        assert_eq!(config.level, LogLevel::Warn);

        let config = LogConfig::from_lookup_or(LogLevel::default(), lookup(&[
            ("VITRINE_LOG_LEVEL", "error"),
            ("RUST_LOG", "warn"),
        ]));
        assert_eq!(config.level, LogLevel::Error);
    }

    #[test]
    fn test_fallback_level_only_applies_without_env_level() {
        let config = LogConfig::from_lookup_or(LogLevel::Warn, lookup(&[]));
        assert_eq!(config.level, LogLevel::Warn);

        let config =
            LogConfig::from_lookup_or(LogLevel::Warn, lookup(&[("VITRINE_LOG_LEVEL", "debug")]));
        assert_eq!(config.level, LogLevel::Debug);

        let config =
            LogConfig::from_lookup_or(LogLevel::Warn, lookup(&[("VITRINE_LOG_LEVEL", "loud")]));
        assert_eq!(config.level, LogLevel::Warn);
    }

    #[test]
    fn test_unopenable_log_file_is_an_error() {
        let dir = std::env::temp_dir().join("vitrine-log-test-missing-dir");
        let config = LogConfig {
            file_path: Some(dir.join("nested").join("vitrine.log")),
            ..LogConfig::default()
        };

        assert!(matches!(init(config), Err(LogError::FileError(_))));
    }

    #[test]
    fn test_unknown_format_falls_back_to_pretty() {
        let config = LogConfig::from_lookup_or(LogLevel::default(), lookup(&[("VITRINE_LOG_FORMAT", "xml")]));
        assert_eq!(config.format, LogFormat::Pretty);
    }
}
