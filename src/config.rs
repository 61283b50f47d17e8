use std::env;

use thiserror::Error;

use crate::{logging::LogTarget, ReplyPolicy};

pub const DEFAULT_SERVER_NAME: &str = "stablemcp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server_name: String,
    pub log_output: LogTarget,
    pub debug: bool,
    /// Filter directive; takes precedence over `debug` when set.
    pub log_level: Option<String>,
    pub error_replies: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("STABLEMCP_SERVER_NAME must not be empty")]
    EmptyServerName,
    #[error("{var} must be one of true, false, 1, 0")]
    InvalidBool { var: &'static str },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_name: DEFAULT_SERVER_NAME.to_string(),
            log_output: LogTarget::Stderr,
            debug: false,
            log_level: None,
            error_replies: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let server_name = match lookup("STABLEMCP_SERVER_NAME") {
            Some(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(ConfigError::EmptyServerName);
                }
                name
            }
            None => defaults.server_name,
        };

        let log_output = lookup("STABLEMCP_LOG_OUTPUT")
            .map(|value| LogTarget::parse(&value))
            .unwrap_or(defaults.log_output);
        let debug = parse_bool(&lookup, "STABLEMCP_DEBUG")?.unwrap_or(defaults.debug);
        let log_level = lookup("STABLEMCP_LOG_LEVEL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let error_replies =
            parse_bool(&lookup, "STABLEMCP_ERROR_REPLIES")?.unwrap_or(defaults.error_replies);

        Ok(Self {
            server_name,
            log_output,
            debug,
            log_level,
            error_replies,
        })
    }

    pub fn reply_policy(&self) -> ReplyPolicy {
        if self.error_replies {
            ReplyPolicy::Conformant
        } else {
            ReplyPolicy::Silent
        }
    }
}

fn parse_bool(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<bool>, ConfigError> {
    lookup(var)
        .map(|value| match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(ConfigError::InvalidBool { var }),
        })
        .transpose()
}
