//! Single-element convenience extractors.
//!
//! Unlike `click` and `type_text`, these resolve to `None` for a missing
//! element instead of erroring. The asymmetry is deliberate: interaction on
//! a missing element is a failure, reading from one is an answer.

use serde_json::Value;

use crate::error::Result;

use super::BrowserSession;
use super::script::js_string;

// ============================================================================
// BrowserSession - Extraction
// ============================================================================

impl BrowserSession {
    /// Gets the outer HTML of the first element matching a selector.
    ///
    /// Resolves to `None` when no element matches.
    pub async fn get_html(&self, selector: &str) -> Result<Option<String>> {
        let script = format!(
            "(() => {{\n\
               const element = document.querySelector({selector});\n\
               return element ? element.outerHTML : null;\n\
             }})()",
            selector = js_string(selector),
        );

        let value = self.evaluate(&script, None).await?;
        Ok(string_or_none(value))
    }

    /// Gets the trimmed text content of the first element matching a selector.
    ///
    /// Resolves to `None` when no element matches.
    pub async fn get_text(&self, selector: &str) -> Result<Option<String>> {
        let script = format!(
            "(() => {{\n\
               const element = document.querySelector({selector});\n\
               return element ? element.textContent.trim() : null;\n\
             }})()",
            selector = js_string(selector),
        );

        let value = self.evaluate(&script, None).await?;
        Ok(string_or_none(value))
    }

    /// Gets an attribute of the first element matching a selector.
    ///
    /// Resolves to `None` when no element matches or the attribute is absent.
    pub async fn get_attribute(&self, selector: &str, attribute: &str) -> Result<Option<String>> {
        let script = format!(
            "(() => {{\n\
               const element = document.querySelector({selector});\n\
               return element ? element.getAttribute({attribute}) : null;\n\
             }})()",
            selector = js_string(selector),
            attribute = js_string(attribute),
        );

        let value = self.evaluate(&script, None).await?;
        Ok(string_or_none(value))
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Maps an evaluated value to `Some(String)` or `None` for null.
fn string_or_none(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

// ============================================================================
// Tests
// ============================================================================
