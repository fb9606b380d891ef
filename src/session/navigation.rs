//! Navigation and page lifecycle methods.

use std::time::{Duration, Instant};

use tokio::time::timeout;
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::{Command, PageCommand};

use super::BrowserSession;

// ============================================================================
// BrowserSession - Navigation
// ============================================================================

impl BrowserSession {
    /// Navigates to a URL and waits for the page load event.
    ///
    /// The navigate command and the subsequent `Page.loadEventFired` wait
    /// share one budget: the load wait gets whatever remains of `timeout`
    /// (session default when `None`) after the navigate round-trip, so the
    /// whole call is bounded even for a page that never fires load.
    ///
    /// On success the document generation is bumped: node references
    /// obtained before this call are invalidated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Navigation`] if the navigate command is rejected,
    /// the endpoint reports an error (e.g. DNS failure), or the budget runs
    /// out before the load event.
    pub async fn open(&self, url: &str, timeout_budget: Option<Duration>) -> Result<()> {
        let connection = self.conn()?;
        self.throttle().await;

        let budget = self.resolve_timeout(timeout_budget);
        let started = Instant::now();

        debug!(url = %url, budget_ms = budget.as_millis() as u64, "Navigating");

        // Register before navigating so the event cannot be missed.
        let load_fired = connection.wait_for_event("Page.loadEventFired");

        let command = Command::Page(PageCommand::Navigate {
            url: url.to_string(),
        });
        let result = connection
            .send_with_timeout(command, budget)
            .await
            .and_then(|response| response.into_result())
            .map_err(|e| Error::navigation(url, e.to_string()))?;

        // Chrome reports navigation failures (DNS, TLS, ...) in-band.
        if let Some(error_text) = result.get("errorText").and_then(|v| v.as_str())
            && !error_text.is_empty()
        {
            return Err(Error::navigation(url, error_text));
        }

        self.bump_generation();

        let remaining = budget.saturating_sub(started.elapsed());
        match timeout(remaining, load_fired).await {
            Ok(Ok(_)) => {
                debug!(url = %url, "Navigation complete");
                Ok(())
            }
            Ok(Err(_)) => Err(Error::navigation(url, "connection closed before load event")),
            Err(_) => Err(Error::navigation(
                url,
                format!(
                    "load event not received within {}ms",
                    budget.as_millis()
                ),
            )),
        }
    }

    /// Waits for the document to finish loading.
    ///
    /// Resolves immediately if `document.readyState` is already `complete`;
    /// otherwise resolves when the load event fires. Single-shot: call again
    /// after a new navigation.
    pub async fn wait_for_load(&self, timeout_budget: Option<Duration>) -> Result<()> {
        let script = "\
            new Promise((resolve) => {\n\
              if (document.readyState === 'complete') {\n\
                resolve(true);\n\
              } else {\n\
                window.addEventListener('load', () => resolve(true), { once: true });\n\
              }\n\
            })";

        self.evaluate(script, timeout_budget).await?;
        Ok(())
    }

    /// Gets the current page URL.
    pub async fn current_url(&self) -> Result<String> {
        let value = self.evaluate("window.location.href", None).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Gets the current page title.
    pub async fn title(&self) -> Result<String> {
        let value = self.evaluate("document.title", None).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }
}
