#[cfg(test)]
mod tests;

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::ChimeraxConfig;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Errors from talking to the ChimeraX REST API
#[derive(Debug, Error)]
pub enum ChimeraxError {
    #[error("Lost connection to ChimeraX")]
    ConnectionLost,
    #[error("HTTP error: {0}")]
    Status(u16),
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Client for the REST API a running ChimeraX exposes via
/// `remotecontrol rest start`.
#[derive(Debug, Clone)]
pub struct ChimeraxClient {
    base_url: Url,
    agent: ureq::Agent,
}

/// Normalized result of one ChimeraX command. The REST API answers in JSON
/// mode (`json true`) or plain text depending on how the server was started;
/// both are mapped onto this shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandResult {
    #[serde(default, rename = "python values")]
    pub python_values: Vec<Value>,
    #[serde(default, rename = "json values")]
    pub json_values: Vec<Value>,
    #[serde(default, rename = "log messages")]
    pub log_messages: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub error: Option<CommandError>,
}

/// Error reported by ChimeraX itself for a command that reached it
#[derive(Debug, Clone, Deserialize)]
pub struct CommandError {
    #[serde(default, rename = "type")]
    pub error_type: String,
    #[serde(default)]
    pub message: String,
}

impl CommandResult {
    /// Human-readable output lines. ChimeraX logs `session.logger.info()`
    /// output at the 'note' level, so both levels are included.
    #[inline]
    pub fn output(&self) -> String {
        let mut lines: Vec<&str> = Vec::new();
        for level in ["info", "note"] {
            if let Some(messages) = self.log_messages.get(level) {
                lines.extend(messages.iter().map(String::as_str));
            }
        }
        lines.join("\n")
    }

    /// Warning-level log lines, if any
    #[inline]
    pub fn warnings(&self) -> &[String] {
        self.log_messages
            .get("warning")
            .map_or(&[][..], Vec::as_slice)
    }
}

impl ChimeraxClient {
    #[inline]
    pub fn new(config: &ChimeraxConfig) -> Result<Self, crate::ChimeraxMcpError> {
        let base_url = config
            .base_url()
            .map_err(|e| crate::ChimeraxMcpError::Config(e.to_string()))?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self { base_url, agent })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        self
    }

    /// True iff the ChimeraX REST server answers with HTTP 200
    #[inline]
    pub fn is_running(&self) -> bool {
        match self.run_url("version") {
            Ok(url) => self.agent.get(url.as_str()).call().is_ok(),
            Err(_) => false,
        }
    }

    /// Execute one ChimeraX command and normalize the response
    #[inline]
    pub fn run_command(&self, command: &str) -> Result<CommandResult, ChimeraxError> {
        debug!("Running ChimeraX command: {}", command);

        let url = self
            .run_url(command)
            .map_err(|e| ChimeraxError::Transport(e.to_string()))?;

        let body = self
            .agent
            .get(url.as_str())
            .call()
            .map_err(map_ureq_error)?
            .body_mut()
            .read_to_string()
            .map_err(|e| ChimeraxError::Transport(e.to_string()))?;

        Ok(parse_response(&body))
    }

    /// ChimeraX version string
    #[inline]
    pub fn version(&self) -> Result<String, ChimeraxError> {
        let result = self.run_command("version")?;
        Ok(result.output().trim().to_string())
    }

    /// Currently open models. Prefers the structured `json values` entry;
    /// falls back to one record per output line.
    #[inline]
    pub fn models(&self) -> Result<Vec<Value>, ChimeraxError> {
        let result = self.run_command("info models")?;

        if let Some(first) = result.json_values.iter().find(|v| !v.is_null()) {
            return Ok(match first {
                Value::Array(items) => items.clone(),
                other => vec![other.clone()],
            });
        }

        Ok(result
            .output()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| serde_json::json!({ "info": line }))
            .collect())
    }

    fn run_url(&self, command: &str) -> Result<Url, url::ParseError> {
        let mut url = self.base_url.join("/run")?;
        url.query_pairs_mut().append_pair("command", command);
        Ok(url)
    }
}

fn map_ureq_error(error: ureq::Error) -> ChimeraxError {
    match error {
        ureq::Error::StatusCode(status) => ChimeraxError::Status(status),
        ureq::Error::ConnectionFailed | ureq::Error::HostNotFound | ureq::Error::Io(_) => {
            ChimeraxError::ConnectionLost
        }
        other => ChimeraxError::Transport(other.to_string()),
    }
}

/// Parse a REST response body, falling back to plain-text normalization when
/// the server was started without `json true`.
fn parse_response(body: &str) -> CommandResult {
    match serde_json::from_str::<CommandResult>(body) {
        Ok(result) => result,
        Err(e) => {
            debug!("Response is not JSON ({}), treating as plain text", e);
            let text = body.trim();
            let mut log_messages = HashMap::new();
            if !text.is_empty() {
                log_messages.insert("info".to_string(), vec![text.to_string()]);
            }
            CommandResult {
                log_messages,
                ..CommandResult::default()
            }
        }
    }
}
