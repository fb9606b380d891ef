//! Viewport screenshot capture.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::{Command, PageCommand};

use super::BrowserSession;

// ============================================================================
// BrowserSession - Screenshot
// ============================================================================

impl BrowserSession {
    /// Captures the current viewport as a PNG.
    ///
    /// Returns the base64-encoded image data as delivered by the protocol.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Screenshot`] if the capture command fails.
    pub async fn screenshot(&self) -> Result<String> {
        debug!("Capturing screenshot");

        let command = Command::Page(PageCommand::CaptureScreenshot {
            format: "png".to_string(),
            quality: None,
        });

        let result = self
            .command(command)
            .await
            .and_then(|response| response.into_result())
            .map_err(|e| Error::screenshot(e.to_string()))?;

        result
            .get("data")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| Error::screenshot("response missing data field"))
    }

    /// Captures the current viewport as a PNG and writes it to a file.
    ///
    /// The write is a synchronous side effect; the base64 data is returned
    /// either way.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Screenshot`] if the capture fails or the payload is
    /// not valid base64, [`Error::Io`] if the write fails.
    pub async fn save_screenshot(&self, path: impl AsRef<Path>) -> Result<String> {
        let data = self.screenshot().await?;

        let bytes = Base64Standard
            .decode(&data)
            .map_err(|e| Error::screenshot(format!("invalid base64 payload: {e}")))?;
        std::fs::write(path.as_ref(), bytes)?;

        debug!(path = %path.as_ref().display(), "Screenshot saved");
        Ok(data)
    }
}
