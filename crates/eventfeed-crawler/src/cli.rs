//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use eventfeed_core::{TracingConfig, TracingOutputFormat};
use tracing::Level;

/// eventfeed - Aggregate event calendars into one JSON file
#[derive(Debug, Parser)]
#[command(name = "eventfeed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "EVENTFEED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Where to write the aggregated events (overrides the config file)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

/// Log output formats selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Multi-line, human readable
    Pretty,
    /// One line per event
    Compact,
    /// One JSON object per event
    Json,
}

impl From<LogFormat> for TracingOutputFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
            LogFormat::Json => Self::Json,
        }
    }
}

impl Cli {
    /// Returns the tracing setup selected by the flags.
    pub fn tracing_config(&self) -> TracingConfig {
        let config = match self.log_format {
            LogFormat::Json => TracingConfig::scheduled(),
            _ if self.debug => TracingConfig::verbose(),
            _ => TracingConfig::default(),
        };
        let config = config.with_format(self.log_format.into());
        if self.debug {
            config.with_level(Level::DEBUG)
        } else {
            config
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["eventfeed"]).unwrap();
        assert!(cli.output.is_none());
        assert!(!cli.debug);
        assert_eq!(cli.log_format, LogFormat::Pretty);

        let tracing = cli.tracing_config();
        assert_eq!(tracing.level, Level::INFO);
        assert_eq!(tracing.format, TracingOutputFormat::Pretty);
    }

    #[test]
    fn flags() {
        let cli = Cli::try_parse_from([
            "eventfeed",
            "--config",
            "crawler.toml",
            "-o",
            "public/events.json",
            "--debug",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("crawler.toml")));
        assert_eq!(cli.output, Some(PathBuf::from("public/events.json")));

        let tracing = cli.tracing_config();
        assert_eq!(tracing.level, Level::DEBUG);
        assert_eq!(tracing.format, TracingOutputFormat::Json);
    }

    #[test]
    fn debug_enables_source_locations() {
        let cli = Cli::try_parse_from(["eventfeed", "-v", "--log-format", "compact"]).unwrap();
        let tracing = cli.tracing_config();
        assert_eq!(tracing.format, TracingOutputFormat::Compact);
        assert!(tracing.include_location);
    }

    #[test]
    fn rejects_unknown_log_format() {
        assert!(Cli::try_parse_from(["eventfeed", "--log-format", "xml"]).is_err());
    }
}
