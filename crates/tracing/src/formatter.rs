use std::fmt::{self, Display};

use clap::ValueEnum;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::layers::BoxedLayer;

/// Represents the logging format.
///
/// This enum defines the supported formats for logging output. All formats write to stderr so
/// that command output on stdout stays machine readable.
#[derive(Debug, Copy, Clone, ValueEnum, Eq, PartialEq)]
pub enum LogFormat {
    /// Represents JSON formatting for logs.
    Json,

    /// Represents logfmt (key=value) formatting for logs.
    LogFmt,

    /// Represents terminal-friendly formatting for logs.
    Terminal,
}

impl LogFormat {
    /// Applies the specified logging format to create a new layer.
    ///
    /// `color` is the configured color mode, or `None` to disable ANSI escape codes. The
    /// `RUST_LOG_STYLE` environment variable takes precedence over it.
    pub fn apply(&self, filter: EnvFilter, color: Option<String>) -> BoxedLayer<Registry> {
        let ansi = match color {
            Some(color) => std::env::var("RUST_LOG_STYLE")
                .map(|style| style != "never")
                .unwrap_or(color != "never"),
            None => false,
        };

        match self {
            LogFormat::Json => tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(ansi)
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(filter)
                .boxed(),
            LogFormat::LogFmt => {
                tracing_logfmt::builder().layer().with_writer(std::io::stderr).with_filter(filter).boxed()
            }
            LogFormat::Terminal => tracing_subscriber::fmt::layer()
                .with_ansi(ansi)
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(filter)
                .boxed(),
        }
    }
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Json => write!(f, "json"),
            LogFormat::LogFmt => write!(f, "log-fmt"),
            LogFormat::Terminal => write!(f, "terminal"),
        }
    }
}
