//! Tracing setup for txlens.
//!
//! Builds a [tracing_subscriber] registry with a single stdout layer whose format, filter and
//! color are chosen on the command line.
//!
//! ```no_run
//! use txlens_tracing::{LayerInfo, LogFormat, Tracer, TxlensTracer};
//!
//! let stdout = LayerInfo::new(LogFormat::Terminal, "info".to_string(), String::new(), None);
//! TxlensTracer::new().with_stdout(stdout).init().expect("failed to init tracing");
//! ```

mod formatter;
mod layers;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Directive, layer::SubscriberExt, util::SubscriberInitExt};

pub use formatter::LogFormat;
// Re-export tracing crates
pub use tracing;
pub use tracing_subscriber;

use layers::Layers;

/// A tracer that can be initialized once per process.
pub trait Tracer {
    /// Installs the tracer as the global default subscriber.
    fn init(self) -> eyre::Result<()>;
}

/// Configuration of the stdout layer.
#[derive(Debug, Clone)]
pub struct LayerInfo {
    format: LogFormat,
    default_directive: String,
    filters: String,
    color: Option<String>,
}

impl LayerInfo {
    /// Creates a new [LayerInfo].
    ///
    /// `default_directive` applies when `RUST_LOG` is unset, `filters` is a comma separated
    /// list of extra directives, and `color` is the color mode or `None` for plain output.
    pub fn new(
        format: LogFormat,
        default_directive: String,
        filters: String,
        color: Option<String>,
    ) -> Self {
        Self { format, default_directive, filters, color }
    }
}

impl Default for LayerInfo {
    fn default() -> Self {
        Self {
            format: LogFormat::Terminal,
            default_directive: LevelFilter::WARN.to_string(),
            filters: String::new(),
            color: Some("always".to_string()),
        }
    }
}

/// The txlens tracer.
#[derive(Debug, Clone, Default)]
pub struct TxlensTracer {
    stdout: LayerInfo,
}

impl TxlensTracer {
    /// Creates a tracer with the default stdout layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stdout layer configuration.
    pub fn with_stdout(mut self, config: LayerInfo) -> Self {
        self.stdout = config;
        self
    }
}

impl Tracer for TxlensTracer {
    fn init(self) -> eyre::Result<()> {
        let mut layers = Layers::new();

        let default_directive = self.stdout.default_directive.parse::<Directive>()?;
        layers.stdout(
            self.stdout.format,
            default_directive,
            &self.stdout.filters,
            self.stdout.color,
        )?;

        tracing_subscriber::registry().with(layers.into_inner()).try_init()?;
        Ok(())
    }
}
