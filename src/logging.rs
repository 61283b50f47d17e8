use std::{fmt::Display, str::FromStr};

use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use crate::mcp::rpc::{Request, Response};

pub const TRANSCRIPT_TARGET: &str = "stablemcp::transcript";
pub const TRANSCRIPT_PREFIX: &str = "MCPServer:";

/// Where log lines go. Stdout shares the stream with protocol responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    #[default]
    Stderr,
}

impl LogTarget {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "stdout" => Self::Stdout,
            _ => Self::Stderr,
        }
    }
}

impl FromStr for LogTarget {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(value))
    }
}

impl std::fmt::Display for LogTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides `directive`; an
/// unparsable directive falls back to `info`.
pub fn init_logging(target: LogTarget, directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_target(false).compact();

    let installed = match target {
        LogTarget::Stdout => builder.with_writer(std::io::stdout).try_init(),
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
    };

    match installed {
        Ok(()) => info!(output = %target, "logger initialized"),
        Err(_) => debug!(output = %target, "logger already initialized"),
    }
}

/// Renders `value` as indented JSON with sorted keys.
///
/// Values are routed through `serde_json::Value`, whose maps are ordered, so
/// struct field order never leaks into the transcript.
pub fn render<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_value(value)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|err| format!("<unrenderable: {err}>"))
}

pub fn log_inbound(request: &Request) {
    info!(
        target: TRANSCRIPT_TARGET,
        "{TRANSCRIPT_PREFIX} received request: {}",
        render(request)
    );
}

pub fn log_outbound(response: &Response) {
    info!(
        target: TRANSCRIPT_TARGET,
        "{TRANSCRIPT_PREFIX} sending response: {}",
        render(response)
    );
}

pub fn log_event(message: impl Display) {
    info!(target: TRANSCRIPT_TARGET, "{TRANSCRIPT_PREFIX} {message}");
}
