//! Command-line interface
//!
//! `stablemcp` with no subcommand serves on stdio. Flags given here win over
//! the `STABLEMCP_*` environment read by [`Config::from_env`].

use clap::{Parser, Subcommand, ValueEnum};

use crate::{config::Config, version::BuildInfo};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Log filter directive, e.g. `info` or `stablemcp=trace` (overrides --debug)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Output format for informational commands
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Serve JSON-RPC on stdin/stdout (default)
    Server,
    /// Print build information
    Version,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl Arguments {
    pub fn command_or_default(&self) -> Command {
        self.command.unwrap_or(Command::Server)
    }

    /// Layers the flags over `config`. Absent flags leave it untouched.
    pub fn apply(&self, config: &mut Config) {
        if self.debug {
            config.debug = true;
        }
        if let Some(level) = &self.log_level {
            config.log_level = Some(level.clone());
        }
    }
}

pub fn render_version(info: &BuildInfo, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => info.to_json(),
        OutputFormat::Text => info.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Arguments {
        Arguments::try_parse_from(std::iter::once("stablemcp").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn definition_is_consistent() {
        Arguments::command().debug_assert();
    }

    #[test]
    fn server_is_the_default_command() {
        let args = parse(&[]);

        assert_eq!(args.command, None);
        assert_eq!(args.command_or_default(), Command::Server);
        assert_eq!(args.output, OutputFormat::Json);
        assert!(!args.debug);
        assert_eq!(args.log_level, None);
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let args = parse(&["version", "-o", "text"]);
        assert_eq!(args.command_or_default(), Command::Version);
        assert_eq!(args.output, OutputFormat::Text);

        let args = parse(&["--debug", "server", "--log-level", "warn"]);
        assert_eq!(args.command_or_default(), Command::Server);
        assert!(args.debug);
        assert_eq!(args.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn unknown_output_format_is_rejected() {
        let err = Arguments::try_parse_from(["stablemcp", "version", "--output", "yaml"])
            .expect_err("expected error");

        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn flags_override_environment_config() {
        let mut config = Config {
            log_level: Some("info".to_string()),
            ..Config::default()
        };

        parse(&["-d", "-l", "trace"]).apply(&mut config);

        assert!(config.debug);
        assert_eq!(config.log_level.as_deref(), Some("trace"));
    }

    #[test]
    fn absent_flags_keep_environment_config() {
        let mut config = Config {
            debug: true,
            log_level: Some("warn".to_string()),
            ..Config::default()
        };

        parse(&["server"]).apply(&mut config);

        assert!(config.debug);
        assert_eq!(config.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn version_renders_in_requested_format() {
        let info = BuildInfo::current();

        assert!(render_version(&info, OutputFormat::Json).starts_with("{\n  \"buildDate\""));
        assert!(render_version(&info, OutputFormat::Text).starts_with("StableMCP Version: "));
    }
}
