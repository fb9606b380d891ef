//! JavaScript evaluation.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::{Command, RuntimeCommand};

use super::BrowserSession;

// ============================================================================
// BrowserSession - Evaluation
// ============================================================================

impl BrowserSession {
    /// Evaluates a JavaScript expression in the page context.
    ///
    /// Returned promises are awaited; the result is requested by value and
    /// must therefore be JSON-serializable. This is the universal execution
    /// primitive: most higher-level methods route a generated snippet
    /// through it.
    ///
    /// The call races the protocol response against `timeout` (session
    /// default when `None`). Losing the race abandons the in-flight call
    /// without cancelling it; the expression may still complete on the
    /// remote side with no observer.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] before a successful connect
    /// - [`Error::Timeout`] if the response loses the race
    /// - [`Error::Evaluation`] if the page-side execution throws
    ///
    /// # Example
    ///
    /// ```ignore
    /// let href = session.evaluate("window.location.href", None).await?;
    /// ```
    pub async fn evaluate(&self, expression: &str, timeout: Option<Duration>) -> Result<Value> {
        let connection = self.conn()?;
        self.throttle().await;

        debug!(expression_len = expression.len(), "Evaluating script");

        let command = Command::Runtime(RuntimeCommand::Evaluate {
            expression: expression.to_string(),
            await_promise: true,
            return_by_value: true,
        });

        let response = connection
            .send_with_timeout(command, self.resolve_timeout(timeout))
            .await?;
        let payload = response.into_result()?;

        if let Some(details) = payload.get("exceptionDetails") {
            return Err(Error::evaluation(exception_description(details)));
        }

        let value = payload
            .get("result")
            .and_then(|r| r.get("value"))
            .cloned()
            .unwrap_or(Value::Null);

        Ok(value)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Extracts a readable description from `exceptionDetails`.
fn exception_description(details: &Value) -> String {
    details
        .get("exception")
        .and_then(|e| e.get("description"))
        .and_then(|d| d.as_str())
        .or_else(|| details.get("text").and_then(|t| t.as_str()))
        .unwrap_or("unknown exception")
        .to_string()
}

/// Embeds a string as a JavaScript string literal.
///
/// All dynamic values interpolated into generated scripts go through this,
/// so arbitrary text (quotes, backticks, newlines) cannot break out of the
/// literal.
pub(crate) fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

// ============================================================================
// Tests
// ============================================================================
