//! Request routing for the MCP engine
//!
//! Validates the JSON-RPC envelope, applies lifecycle gating and maps each
//! method onto at most one [`Response`].

use tracing::{debug, error, warn};

use crate::logging::{self, render};
use crate::mcp::{
    registry::CapabilityRegistry,
    rpc::{
        HandshakeResult, Request, Response, RpcError, HANDSHAKE_PROTOCOL_VERSION,
        INVALID_REQUEST, JSONRPC_VERSION, METHOD_NOT_FOUND, SERVER_NOT_INITIALIZED,
    },
    server::ServerIdentity,
};

pub const INITIALIZE: &str = "initialize";
pub const INITIALIZE_NOTIFICATION: &str = "notifications/initialize";
pub const INITIALIZED_NOTIFICATION: &str = "notifications/initialized";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum State {
    #[default]
    Uninitialized,
    Ready,
    Closed,
}

/// How rejected requests are answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplyPolicy {
    /// Rejections are logged and never answered; only `initialize` replies.
    #[default]
    Silent,
    /// Requests carrying an `id` get a JSON-RPC error object, and every method
    /// but `initialize` is refused until the handshake completes.
    Conformant,
}

#[derive(Debug)]
pub struct Dispatch {
    pub response: Option<Response>,
    pub state: State,
}

impl Dispatch {
    fn silent(state: State) -> Self {
        Self {
            response: None,
            state,
        }
    }
}

pub struct Dispatcher<'a> {
    identity: &'a ServerIdentity,
    registry: &'a CapabilityRegistry,
    policy: ReplyPolicy,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        identity: &'a ServerIdentity,
        registry: &'a CapabilityRegistry,
        policy: ReplyPolicy,
    ) -> Self {
        Self {
            identity,
            registry,
            policy,
        }
    }

    pub fn dispatch(&self, state: State, request: &Request) -> Dispatch {
        // Guard for callers driving a `Dispatcher` directly. `Server` stops
        // decoding once the stream has ended, so it never dispatches here.
        if state == State::Closed {
            warn!(method = %request.method, "server closed, dropping message");
            return Dispatch::silent(state);
        }

        if request.jsonrpc != JSONRPC_VERSION {
            warn!(
                version = %request.jsonrpc,
                method = %request.method,
                "invalid JSON-RPC version"
            );
            return self.reject(state, request, INVALID_REQUEST, "Invalid Request");
        }

        if self.policy == ReplyPolicy::Conformant
            && state == State::Uninitialized
            && request.method != INITIALIZE
        {
            warn!(method = %request.method, "message received before initialize");
            return self.reject(
                state,
                request,
                SERVER_NOT_INITIALIZED,
                "Server not initialized",
            );
        }

        match request.method.as_str() {
            INITIALIZE => self.initialize(request),
            INITIALIZE_NOTIFICATION | INITIALIZED_NOTIFICATION => {
                logging::log_event(format_args!(
                    "server initialized with capabilities: {}",
                    render(self.registry.snapshot())
                ));
                Dispatch::silent(state)
            }
            method => {
                warn!(method = %method, "unknown method");
                self.reject(state, request, METHOD_NOT_FOUND, "Method not found")
            }
        }
    }

    fn initialize(&self, request: &Request) -> Dispatch {
        let Some(id) = request.reply_id() else {
            debug!("initialize sent as a notification, not replying");
            return Dispatch::silent(State::Ready);
        };

        let handshake = HandshakeResult {
            protocol_version: HANDSHAKE_PROTOCOL_VERSION,
            server_info: self.identity,
            capabilities: self.registry.snapshot(),
        };

        let response = match Response::success(id.clone(), &handshake) {
            Ok(response) => Some(response),
            Err(err) => {
                error!(error = %err, id = %id, "failed to encode initialize result");
                None
            }
        };

        Dispatch {
            response,
            state: State::Ready,
        }
    }

    fn reject(&self, state: State, request: &Request, code: i64, message: &str) -> Dispatch {
        let response = match (self.policy, request.reply_id()) {
            (ReplyPolicy::Conformant, Some(id)) => Some(Response::error(
                id.clone(),
                RpcError::new(code, message).with_data(request.method.clone()),
            )),
            _ => None,
        };

        Dispatch { response, state }
    }
}
