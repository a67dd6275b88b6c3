//! MCP Tools Implementation
//!
//! Concrete tool handlers for documentation search and ChimeraX command
//! execution. Tool failures are reported as tool results with `is_error`
//! set, not as JSON-RPC transport errors, so the calling agent sees a
//! diagnostic it can act on.

use crate::chimerax::{ChimeraxClient, ChimeraxError};
use crate::docs::{Category, DocSearch, SearchResult};
use crate::mcp::protocol::*;
use crate::mcp::server::ToolHandler;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

const DEFAULT_MAX_RESULTS: usize = 5;

/// Semantic documentation search tool handler
pub struct DocsSearchHandler {
    search: Arc<DocSearch>,
}

/// Exact command lookup tool handler
pub struct DocsLookupHandler {
    search: Arc<DocSearch>,
}

/// ChimeraX command execution tool handler
pub struct ChimeraxRunHandler {
    client: Arc<ChimeraxClient>,
}

/// ChimeraX connectivity status tool handler
pub struct ChimeraxStatusHandler {
    client: Arc<ChimeraxClient>,
}

fn text_result(value: &serde_json::Value) -> Result<CallToolResult> {
    Ok(CallToolResult {
        content: vec![ToolContent::Text {
            text: serde_json::to_string_pretty(value)?,
        }],
        is_error: Some(false),
    })
}

fn error_result(message: String) -> CallToolResult {
    CallToolResult {
        content: vec![ToolContent::Text { text: message }],
        is_error: Some(true),
    }
}

fn result_records(results: &[SearchResult]) -> Vec<serde_json::Value> {
    results
        .iter()
        .map(|r| {
            json!({
                "title": r.title,
                "section": r.section,
                "content": r.content,
                "category": r.category,
                "source_file": r.source_file,
                "command_name": r.command_name,
            })
        })
        .collect()
}

impl DocsSearchHandler {
    #[inline]
    pub fn new(search: Arc<DocSearch>) -> Self {
        Self { search }
    }

    /// Create the docs_search tool definition
    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "docs_search".to_string(),
            description: Some(
                "Search the ChimeraX user documentation by meaning".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Natural-language search query"
                    },
                    "category": {
                        "type": "string",
                        "enum": ["commands", "tools", "tutorials", "concepts", "devel"],
                        "description": "Optional: restrict results to one documentation category"
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "Maximum number of results (default: 5)"
                    }
                },
                "required": ["query"],
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for DocsSearchHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult> {
        let args = params.arguments.unwrap_or_default();

        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Missing required parameter: query"))?;

        let category = match args.get("category").and_then(|v| v.as_str()) {
            Some(raw) => match raw.parse::<Category>() {
                Ok(category) => Some(category),
                Err(e) => return Ok(error_result(e)),
            },
            None => None,
        };

        let max_results = args
            .get("max_results")
            .and_then(|v| v.as_u64())
            .map_or(DEFAULT_MAX_RESULTS, |n| n.max(1) as usize);

        debug!(
            "docs_search: query='{}', category={:?}, max_results={}",
            query, category, max_results
        );

        if let Err(e) = self.search.ensure_index().await {
            error!("Failed to build index for search: {:#}", e);
            return Ok(error_result(format!("Failed to build index: {:#}", e)));
        }

        match self.search.search(query, category, max_results).await {
            Ok(results) => text_result(&json!({
                "status": "ok",
                "results": result_records(&results),
            })),
            Err(e) => {
                error!("Search failed: {:#}", e);
                Ok(error_result(format!("Search error: {:#}", e)))
            }
        }
    }
}

impl DocsLookupHandler {
    #[inline]
    pub fn new(search: Arc<DocSearch>) -> Self {
        Self { search }
    }

    /// Create the docs_lookup tool definition
    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "docs_lookup".to_string(),
            description: Some(
                "Look up the reference documentation for a ChimeraX command by its exact name"
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "command_name": {
                        "type": "string",
                        "description": "Exact command name, e.g. 'color' or 'open'"
                    }
                },
                "required": ["command_name"],
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for DocsLookupHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult> {
        let args = params.arguments.unwrap_or_default();

        let command_name = args
            .get("command_name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Missing required parameter: command_name"))?;

        debug!("docs_lookup: command_name='{}'", command_name);

        if let Err(e) = self.search.ensure_index().await {
            error!("Failed to build index for lookup: {:#}", e);
            return Ok(error_result(format!("Failed to build index: {:#}", e)));
        }

        match self.search.lookup(command_name).await {
            Ok(results) => text_result(&json!({
                "status": "ok",
                "results": result_records(&results),
            })),
            Err(e) => {
                error!("Lookup failed: {:#}", e);
                Ok(error_result(format!("Lookup error: {:#}", e)))
            }
        }
    }
}

impl ChimeraxRunHandler {
    #[inline]
    pub fn new(client: Arc<ChimeraxClient>) -> Self {
        Self { client }
    }

    /// Create the chimerax_run tool definition
    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "chimerax_run".to_string(),
            description: Some(
                "Execute a ChimeraX command via its REST API. The command runs \
                 with full ChimeraX privileges; only use with trusted input."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "description": "The ChimeraX command to execute, e.g. 'open 1a0s'"
                    }
                },
                "required": ["command"],
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for ChimeraxRunHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult> {
        let args = params.arguments.unwrap_or_default();

        let command = args
            .get("command")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Missing required parameter: command"))?;

        debug!("chimerax_run: command='{}'", command);

        if !self.client.is_running() {
            return Ok(error_result("ChimeraX is not running".to_string()));
        }

        let result = match self.client.run_command(command) {
            Ok(result) => result,
            Err(ChimeraxError::ConnectionLost) => {
                return Ok(error_result("Lost connection to ChimeraX".to_string()));
            }
            Err(e) => return Ok(error_result(e.to_string())),
        };

        // A ChimeraX-level error still arrives as HTTP 200
        if let Some(error) = result.error {
            return Ok(error_result(format!(
                "{}: {}",
                error.error_type, error.message
            )));
        }

        let mut response = json!({ "status": "ok" });
        let output = result.output();
        if !output.is_empty() {
            response["output"] = json!(output);
        }
        let warnings = result.warnings();
        if !warnings.is_empty() {
            response["warnings"] = json!(warnings);
        }
        let json_values: Vec<_> = result
            .json_values
            .iter()
            .filter(|v| !v.is_null())
            .collect();
        if !json_values.is_empty() {
            response["json_values"] = json!(json_values);
        }

        text_result(&response)
    }
}

impl ChimeraxStatusHandler {
    #[inline]
    pub fn new(client: Arc<ChimeraxClient>) -> Self {
        Self { client }
    }

    /// Create the chimerax_status tool definition
    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "chimerax_status".to_string(),
            description: Some("Check whether the ChimeraX REST server is running".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for ChimeraxStatusHandler {
    #[inline]
    async fn handle(&self, _params: CallToolParams) -> Result<CallToolResult> {
        if !self.client.is_running() {
            return text_result(&json!({ "status": "ok", "running": false }));
        }

        let version = self
            .client
            .version()
            .unwrap_or_else(|_| "unknown".to_string());

        text_result(&json!({
            "status": "ok",
            "running": true,
            "version": version,
        }))
    }
}
