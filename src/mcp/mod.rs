//! Model Context Protocol (MCP) engine speaking JSON-RPC over stdio
//!
//! Provides the message codec, the capability registry, request dispatch and
//! the server lifecycle that ties them together.

pub mod codec;
pub mod dispatch;
pub mod registry;
pub mod rpc;
pub mod server;
