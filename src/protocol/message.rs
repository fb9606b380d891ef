//! Wire message types for the DevTools Protocol.
//!
//! Defines the message format exchanged with the remote debugging endpoint:
//! integer-correlated command requests, their responses, and unsolicited
//! events.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

use super::Command;

// ============================================================================
// Request
// ============================================================================

/// A command request to the debugging endpoint.
///
/// # Format
///
/// ```json
/// {
///   "id": 7,
///   "method": "Page.navigate",
///   "params": { "url": "https://example.com" }
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// Monotonic identifier for request/response correlation.
    pub id: u64,

    /// Command with method and params.
    #[serde(flatten)]
    pub command: Command,
}

impl Request {
    /// Creates a new request.
    #[inline]
    #[must_use]
    pub fn new(id: u64, command: Command) -> Self {
        Self { id, command }
    }
}

// ============================================================================
// Response
// ============================================================================

/// A command response from the debugging endpoint.
///
/// # Format
///
/// Success:
/// ```json
/// { "id": 7, "result": { ... } }
/// ```
///
/// Error:
/// ```json
/// { "id": 7, "error": { "code": -32000, "message": "..." } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// Matches the request `id`.
    pub id: u64,

    /// Result payload (if success).
    #[serde(default)]
    pub result: Option<Value>,

    /// Error payload (if error).
    #[serde(default)]
    pub error: Option<CommandError>,
}

impl Response {
    /// Returns `true` if this is an error response.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Extracts the result value, returning an error if the command failed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the endpoint rejected the command.
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            Some(err) => Err(Error::protocol(err.to_string())),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }

}

// ============================================================================
// CommandError
// ============================================================================

/// Error payload of a failed command.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandError {
    /// JSON-RPC style error code.
    pub code: i64,

    /// Human-readable error message.
    pub message: String,

    /// Optional additional detail.
    #[serde(default)]
    pub data: Option<String>,
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.data {
            Some(data) => write!(f, "{} (code {}): {}", self.message, self.code, data),
            None => write!(f, "{} (code {})", self.message, self.code),
        }
    }
}

// ============================================================================
// Event
// ============================================================================

/// An unsolicited event from the debugging endpoint.
///
/// # Format
///
/// ```json
/// { "method": "Page.loadEventFired", "params": { "timestamp": 123.4 } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Event method name (`Domain.event`).
    pub method: String,

    /// Event payload.
    #[serde(default)]
    pub params: Value,
}

// ============================================================================
// Incoming
// ============================================================================

/// Any message received from the endpoint.
///
/// Responses carry an `id`; events carry a `method`. Tried in that order.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Incoming {
    /// Response to a previously issued request.
    Response(Response),
    /// Unsolicited event.
    Event(Event),
}

// ============================================================================
// Tests
// ============================================================================
