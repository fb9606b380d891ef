//! Debugging endpoint discovery.
//!
//! A Chromium-family browser started with `--remote-debugging-port` serves a
//! JSON target list over plain HTTP at `/json/list`; each debuggable page
//! advertises its WebSocket URL there. This module resolves a
//! [`ConnectOptions`] to the concrete WebSocket URL the transport dials.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// ConnectOptions
// ============================================================================

/// Connection options for a debugging endpoint.
///
/// # Example
///
/// ```ignore
/// use cdp_session::{ConnectOptions, Target};
///
/// // First page target on the default endpoint
/// let opts = ConnectOptions::default();
///
/// // Specific port, target picked by URL substring
/// let opts = ConnectOptions {
///     port: 9333,
///     target: Target::UrlContains("example.com".into()),
///     ..ConnectOptions::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Debugging endpoint host.
    pub host: String,
    /// Debugging endpoint port.
    pub port: u16,
    /// Target selection strategy.
    pub target: Target,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9222,
            target: Target::FirstPage,
        }
    }
}

impl ConnectOptions {
    /// Creates options for a host and port with first-page target selection.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            target: Target::FirstPage,
        }
    }

    /// Creates options that dial a WebSocket debugger URL directly,
    /// skipping HTTP discovery.
    #[must_use]
    pub fn websocket_url(url: impl Into<String>) -> Self {
        Self {
            target: Target::WebSocketUrl(url.into()),
            ..Self::default()
        }
    }

    /// Returns the HTTP URL of the target list.
    fn list_url(&self) -> Result<Url> {
        Url::parse(&format!("http://{}:{}/json/list", self.host, self.port))
            .map_err(|e| Error::connection(format!("invalid endpoint address: {e}")))
    }
}

// ============================================================================
// Target
// ============================================================================

/// Target selection strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// First target of type `page` in the list.
    FirstPage,
    /// Target with this exact id.
    Id(String),
    /// First `page` target whose URL contains this substring.
    UrlContains(String),
    /// Dial this WebSocket URL directly; no discovery request is made.
    WebSocketUrl(String),
}

// ============================================================================
// TargetInfo
// ============================================================================

/// One entry of the `/json/list` target list.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetInfo {
    /// Target id.
    pub id: String,
    /// Target type (`page`, `iframe`, `service_worker`, ...).
    #[serde(rename = "type")]
    pub target_type: String,
    /// Page title.
    #[serde(default)]
    pub title: String,
    /// Page URL.
    #[serde(default)]
    pub url: String,
    /// WebSocket URL for attaching a debugger.
    ///
    /// Absent when another client is already attached.
    #[serde(rename = "webSocketDebuggerUrl", default)]
    pub web_socket_debugger_url: Option<String>,
}

// ============================================================================
// Discovery
// ============================================================================

/// Resolves connection options to a WebSocket debugger URL.
///
/// # Errors
///
/// Returns [`Error::Connection`] if the endpoint is unreachable, the target
/// list cannot be parsed, or no target matches the selection.
pub async fn discover(options: &ConnectOptions) -> Result<String> {
    if let Target::WebSocketUrl(url) = &options.target {
        return Ok(url.clone());
    }

    let list_url = options.list_url()?;
    debug!(url = %list_url, "Discovering debugging targets");

    let targets: Vec<TargetInfo> = reqwest::get(list_url.clone())
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| Error::connection(format!("target discovery failed: {e}")))?
        .json()
        .await
        .map_err(|e| Error::connection(format!("invalid target list: {e}")))?;

    debug!(count = targets.len(), "Targets discovered");

    let target = pick_target(&targets, &options.target)
        .ok_or_else(|| Error::connection(format!("no target matches {:?}", options.target)))?;

    target
        .web_socket_debugger_url
        .clone()
        .ok_or_else(|| {
            Error::connection(format!(
                "target {} has no webSocketDebuggerUrl (another client attached?)",
                target.id
            ))
        })
}

/// Picks the target matching the selection strategy.
fn pick_target<'a>(targets: &'a [TargetInfo], selection: &Target) -> Option<&'a TargetInfo> {
    match selection {
        Target::FirstPage => targets.iter().find(|t| t.target_type == "page"),
        Target::Id(id) => targets.iter().find(|t| &t.id == id),
        Target::UrlContains(fragment) => targets
            .iter()
            .find(|t| t.target_type == "page" && t.url.contains(fragment.as_str())),
        Target::WebSocketUrl(_) => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
