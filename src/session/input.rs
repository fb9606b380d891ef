//! Interaction primitives: click, type, wait-for-selector.
//!
//! Each method generates a page-side script and routes it through
//! [`BrowserSession::evaluate`]. Dynamic values (selectors, text) are
//! embedded as JSON string literals, never string-interpolated raw.

use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};

use super::BrowserSession;
use super::script::js_string;

// ============================================================================
// Constants
// ============================================================================

/// Settle delay between scrolling an element into view and clicking it.
///
/// A fixed wait, not a polled stability check.
const CLICK_SETTLE_MS: u64 = 500;

/// Page-side polling interval for `wait_for_selector`.
const POLL_INTERVAL_MS: u64 = 100;

/// Extra headroom the outer evaluate guard gets over the page-side deadline,
/// so the inner loop can observe its own timeout and reject cleanly.
const WAIT_GUARD_HEADROOM: Duration = Duration::from_secs(1);

/// Marker the page-side wait loop rejects with on deadline.
const WAIT_TIMEOUT_MARKER: &str = "Timed out waiting for selector";

// ============================================================================
// TypeOptions
// ============================================================================

/// Options for [`BrowserSession::type_text`].
#[derive(Debug, Clone, Copy)]
pub struct TypeOptions {
    /// Clear the element's current value before typing.
    pub clear_first: bool,
}

impl Default for TypeOptions {
    fn default() -> Self {
        Self { clear_first: true }
    }
}

// ============================================================================
// BrowserSession - Interaction
// ============================================================================

impl BrowserSession {
    /// Clicks the first element matching a CSS selector.
    ///
    /// Scrolls the element into the viewport, waits briefly for the scroll
    /// to settle, then invokes the native click.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Evaluation`] if no element matches the selector
    /// (the generated script rejects) or the click itself throws.
    pub async fn click(&self, selector: &str, timeout: Option<Duration>) -> Result<()> {
        debug!(selector = %selector, "Clicking element");

        let script = format!(
            "new Promise((resolve, reject) => {{\n\
               const selector = {selector};\n\
               const element = document.querySelector(selector);\n\
               if (!element) {{\n\
                 reject(new Error('Element not found: ' + selector));\n\
                 return;\n\
               }}\n\
               element.scrollIntoView({{ behavior: 'smooth', block: 'center' }});\n\
               setTimeout(() => {{\n\
                 try {{\n\
                   element.click();\n\
                   resolve(true);\n\
                 }} catch (error) {{\n\
                   reject(new Error('Click failed: ' + error.message));\n\
                 }}\n\
               }}, {settle});\n\
             }})",
            selector = js_string(selector),
            settle = CLICK_SETTLE_MS,
        );

        self.evaluate(&script, timeout).await?;
        Ok(())
    }

    /// Types text into the first element matching a CSS selector.
    ///
    /// Focuses the element, optionally clears it, sets the value, then
    /// dispatches synthetic `input` and `change` events so reactive
    /// frameworks observing the element register the change. Uses the
    /// session default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Evaluation`] if no element matches the selector.
    pub async fn type_text(
        &self,
        selector: &str,
        text: &str,
        options: TypeOptions,
    ) -> Result<()> {
        debug!(selector = %selector, text_len = text.len(), "Typing into element");

        let clear = if options.clear_first {
            "element.value = '';\n               "
        } else {
            ""
        };

        let script = format!(
            "new Promise((resolve, reject) => {{\n\
               const selector = {selector};\n\
               const element = document.querySelector(selector);\n\
               if (!element) {{\n\
                 reject(new Error('Element not found: ' + selector));\n\
                 return;\n\
               }}\n\
               element.focus();\n\
               {clear}element.value = {text};\n\
               element.dispatchEvent(new Event('input', {{ bubbles: true }}));\n\
               element.dispatchEvent(new Event('change', {{ bubbles: true }}));\n\
               resolve(true);\n\
             }})",
            selector = js_string(selector),
            clear = clear,
            text = js_string(text),
        );

        self.evaluate(&script, None).await?;
        Ok(())
    }

    /// Waits for a CSS selector to match, polling page-side every 100ms.
    ///
    /// The whole polling loop runs inside a single evaluation; the outer
    /// evaluate guard gets one second of headroom over `timeout` so the
    /// inner loop rejects on its own deadline first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] once the budget is exhausted without a
    /// match.
    pub async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let budget = self.resolve_timeout(timeout);
        let budget_ms = budget.as_millis() as u64;

        debug!(selector = %selector, budget_ms, "Waiting for selector");

        let script = format!(
            "new Promise((resolve, reject) => {{\n\
               const selector = {selector};\n\
               const startTime = Date.now();\n\
               const deadline = {budget_ms};\n\
               function checkForElement() {{\n\
                 if (document.querySelector(selector)) {{\n\
                   resolve(true);\n\
                   return;\n\
                 }}\n\
                 if (Date.now() - startTime > deadline) {{\n\
                   reject(new Error('{marker}: ' + selector));\n\
                   return;\n\
                 }}\n\
                 setTimeout(checkForElement, {poll});\n\
               }}\n\
               checkForElement();\n\
             }})",
            selector = js_string(selector),
            budget_ms = budget_ms,
            marker = WAIT_TIMEOUT_MARKER,
            poll = POLL_INTERVAL_MS,
        );

        match self.evaluate(&script, Some(budget + WAIT_GUARD_HEADROOM)).await {
            Ok(_) => Ok(()),
            Err(Error::Evaluation { message }) if message.contains(WAIT_TIMEOUT_MARKER) => Err(
                Error::timeout(format!("wait for selector {selector}"), budget_ms),
            ),
            Err(e) => Err(e),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_options_default() {
        assert!(TypeOptions::default().clear_first);
    }

    #[test]
    fn test_constants() {
        assert_eq!(CLICK_SETTLE_MS, 500);
        assert_eq!(POLL_INTERVAL_MS, 100);
        assert_eq!(WAIT_GUARD_HEADROOM, Duration::from_secs(1));
    }
}
