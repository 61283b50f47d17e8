pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod mcp;
pub mod version;

pub use mcp::dispatch::{ReplyPolicy, State};
pub use mcp::server::{Server, ServerIdentity, StdioServer};
