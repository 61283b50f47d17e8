//! Stdio server lifecycle
//!
//! A [`Server`] owns its identity, capability registry and codec. `run` reads,
//! dispatches and answers one message at a time until the input stream ends.

use serde::Serialize;
use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader, Stdin, Stdout};
use tracing::{error, info, warn};

use crate::errors::CodecError;
use crate::logging::{self, LogTarget};
use crate::mcp::{
    codec::Codec,
    dispatch::{Dispatch, Dispatcher, ReplyPolicy, State},
    registry::CapabilityRegistry,
};

pub const BASELINE_TOOL: &str = "exampleTool";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerIdentity {
    pub name: String,
    pub version: String,
}

impl ServerIdentity {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Stop,
}

pub struct Server<R, W> {
    identity: ServerIdentity,
    registry: CapabilityRegistry,
    codec: Codec<R, W>,
    state: State,
    policy: ReplyPolicy,
    debug: bool,
    log_level: Option<String>,
}

pub type StdioServer = Server<BufReader<Stdin>, Stdout>;

impl StdioServer {
    /// Binds a server to the process's standard input and output.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::with_io(
            name,
            version,
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
        )
    }
}

impl<R, W> Server<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn with_io(
        name: impl Into<String>,
        version: impl Into<String>,
        reader: R,
        writer: W,
    ) -> Self {
        Self {
            identity: ServerIdentity::new(name, version),
            registry: CapabilityRegistry::new(),
            codec: Codec::new(reader, writer),
            state: State::Uninitialized,
            policy: ReplyPolicy::default(),
            debug: false,
            log_level: None,
        }
    }

    pub fn with_reply_policy(mut self, policy: ReplyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_log_level(mut self, log_level: Option<String>) -> Self {
        self.log_level = log_level;
        self
    }

    /// Configures logging and registers the baseline tool. Safe to repeat.
    pub fn initialize(&mut self, log_target: LogTarget) {
        logging::init_logging(log_target, self.log_directive());
        self.register_baseline_tools();
    }

    /// An explicit level wins over the debug flag.
    pub fn log_directive(&self) -> &str {
        match (&self.log_level, self.debug) {
            (Some(level), _) => level.as_str(),
            (None, true) => "debug",
            (None, false) => "info",
        }
    }

    pub fn register_baseline_tools(&mut self) {
        self.registry
            .register(BASELINE_TOOL, json!({ "version": "1.0" }));
    }

    /// Processes messages until the input stream is exhausted.
    ///
    /// Malformed messages and failed writes are logged and skipped. Only a
    /// failing read is returned as an error.
    pub async fn run(&mut self) -> Result<(), CodecError> {
        info!(
            name = %self.identity.name,
            version = %self.identity.version,
            policy = ?self.policy,
            "mcp server loop started"
        );

        loop {
            if self.handle_next().await? == Step::Stop {
                return Ok(());
            }
        }
    }

    pub async fn handle_next(&mut self) -> Result<Step, CodecError> {
        let request = match self.codec.decode().await {
            Ok(request) => request,
            Err(CodecError::Closed) => {
                info!("input stream closed, shutting down");
                self.state = State::Closed;
                return Ok(Step::Stop);
            }
            Err(err) if err.is_terminal() => {
                error!(error = %err, "failed to read from input stream");
                self.state = State::Closed;
                return Err(err);
            }
            Err(err) => {
                warn!(error = %err, "error decoding request");
                return Ok(Step::Continue);
            }
        };

        logging::log_inbound(&request);

        let Dispatch { response, state } =
            Dispatcher::new(&self.identity, &self.registry, self.policy)
                .dispatch(self.state, &request);
        self.state = state;

        if let Some(response) = response {
            logging::log_outbound(&response);
            if let Err(err) = self.codec.encode(&response).await {
                error!(error = %err, id = %response.id, "error encoding response");
            }
        }

        Ok(Step::Continue)
    }

    pub fn identity(&self) -> &ServerIdentity {
        &self.identity
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CapabilityRegistry {
        &mut self.registry
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn writer(&self) -> &W {
        self.codec.writer()
    }
}
