//! MCP (Model Context Protocol) Server Implementation
//!
//! This module provides a complete MCP server implementation following the
//! JSON-RPC 2.0 specification and MCP protocol version 2025-06-18, speaking
//! newline-delimited JSON over stdio.


pub mod errors;
pub mod protocol;
pub mod server;
pub mod tools;

pub use errors::McpError;
pub use protocol::{CallToolParams, CallToolResult, Tool, ToolContent};
pub use server::{McpServer, ToolHandler};
