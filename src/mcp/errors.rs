//! MCP Error Handling
//!
//! Maps server-side failures onto JSON-RPC error responses with the
//! appropriate error codes.

use crate::mcp::protocol::{JsonRpcError, error_codes, mcp_error_codes};
use thiserror::Error;

/// MCP-specific errors that can occur during server operation
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Protocol version not supported: {version}. Supported versions: {supported:?}")]
    UnsupportedProtocolVersion {
        version: String,
        supported: Vec<String>,
    },

    #[error("Tool not found: {name}")]
    ToolNotFound { name: String },

    #[error("Invalid parameters: {message}")]
    InvalidParameters { message: String },
}

impl McpError {
    /// Convert to a JSON-RPC error with the matching error code
    #[inline]
    pub fn to_jsonrpc_error(&self) -> JsonRpcError {
        match self {
            Self::UnsupportedProtocolVersion { .. } => JsonRpcError::new(
                mcp_error_codes::INVALID_PROTOCOL_VERSION,
                self.to_string(),
                None,
            ),
            Self::ToolNotFound { .. } => {
                JsonRpcError::new(mcp_error_codes::TOOL_NOT_FOUND, self.to_string(), None)
            }
            Self::InvalidParameters { .. } => {
                JsonRpcError::new(error_codes::INVALID_PARAMS, self.to_string(), None)
            }
        }
    }
}
