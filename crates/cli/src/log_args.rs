//! clap [Args](clap::Args) for logging configuration.

use std::fmt::{self, Display};

use clap::{ArgAction, Args, ValueEnum};
use tracing::{level_filters::LevelFilter, Level};
use txlens_tracing::{
    tracing_subscriber::filter::Directive, LayerInfo, LogFormat, Tracer, TxlensTracer,
};

/// The log configuration. Logs go to stderr, keeping stdout for command output.
#[derive(Debug, Args)]
#[clap(next_help_heading = "LOGGING")]
pub struct LogArgs {
    /// The format to use for logs.
    #[clap(long = "log.stdout.format", value_name = "FORMAT", global = true, default_value_t = LogFormat::Terminal)]
    pub log_stdout_format: LogFormat,

    /// Extra comma separated filter directives, e.g. `txlens_common=trace`.
    #[clap(long = "log.stdout.filter", value_name = "FILTER", global = true, default_value = "")]
    pub log_stdout_filter: String,

    /// Whether log lines are colored.
    #[clap(long, value_name = "COLOR", global = true, default_value_t = ColorMode::Always)]
    pub color: ColorMode,

    /// The verbosity settings for the tracer.
    #[clap(flatten)]
    pub verbosity: Verbosity,
}

impl LogArgs {
    /// Initializes tracing with the configured options from cli args.
    pub fn init_tracing(&self) -> eyre::Result<()> {
        let color = match self.color {
            ColorMode::Never => None,
            mode => Some(mode.to_string()),
        };
        let stdout = LayerInfo::new(
            self.log_stdout_format,
            self.verbosity.directive().to_string(),
            self.log_stdout_filter.clone(),
            color,
        );

        TxlensTracer::new().with_stdout(stdout).init()
    }
}

/// The color mode for the cli.
#[derive(Debug, Copy, Clone, ValueEnum, Eq, PartialEq)]
pub enum ColorMode {
    /// Colors on
    Always,
    /// Colors on unless `RUST_LOG_STYLE=never`
    Auto,
    /// Colors off
    Never,
}

impl Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self {
            ColorMode::Always => "always",
            ColorMode::Auto => "auto",
            ColorMode::Never => "never",
        };
        f.write_str(mode)
    }
}

/// Verbosity flags.
#[derive(Debug, Copy, Clone, Args)]
#[clap(next_help_heading = "DISPLAY")]
pub struct Verbosity {
    /// Set the minimum log level.
    ///
    /// -v     Warnings & Errors
    /// -vv    Info
    /// -vvv   Debug
    /// -vvvv  Traces (warning: very verbose!)
    #[clap(short, long, action = ArgAction::Count, global = true, default_value_t = 1, verbatim_doc_comment, help_heading = "DISPLAY")]
    verbosity: u8,

    /// Silence all log output.
    #[clap(long, alias = "silent", short = 'q', global = true, help_heading = "DISPLAY")]
    quiet: bool,
}

impl Verbosity {
    /// The filter [Directive] for the `-v` count, `off` when quiet.
    pub fn directive(&self) -> Directive {
        if self.quiet {
            LevelFilter::OFF.into()
        } else {
            LevelFilter::from_level(self.level()).into()
        }
    }

    /// The most verbose level enabled by the `-v` count.
    pub fn level(&self) -> Level {
        match self.verbosity.saturating_sub(1) {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[clap(flatten)]
        logs: LogArgs,
    }

    #[test]
    fn test_verbosity_levels() {
        let default = Harness::parse_from(["txlens"]);
        assert_eq!(default.logs.verbosity.level(), Level::WARN);

        let debug = Harness::parse_from(["txlens", "-vvv"]);
        assert_eq!(debug.logs.verbosity.directive().to_string(), "debug");

        let quiet = Harness::parse_from(["txlens", "-q"]);
        assert_eq!(quiet.logs.verbosity.directive().to_string(), "off");
    }

    #[test]
    fn test_log_format_flag() {
        let args = Harness::parse_from(["txlens", "--log.stdout.format", "json", "--color", "never"]);
        assert_eq!(args.logs.log_stdout_format, LogFormat::Json);
        assert_eq!(args.logs.color, ColorMode::Never);
    }
}
