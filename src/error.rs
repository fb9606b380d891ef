//! Error types for the CDP session client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use cdp_session::{BrowserSession, Result};
//!
//! async fn example(session: &BrowserSession) -> Result<()> {
//!     session.click("#submit", None).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`], [`Error::NotConnected`] |
//! | Navigation | [`Error::Navigation`] |
//! | Execution | [`Error::Evaluation`], [`Error::Timeout`] |
//! | DOM | [`Error::StaleNode`] |
//! | Capture | [`Error::Screenshot`] |
//! | Protocol | [`Error::Protocol`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`] |
//!
//! Element-not-found is not a variant of its own: `click` and `type_text`
//! surface a missing element as [`Error::Evaluation`] (the generated script
//! rejects), while the `get_*` extractors resolve to `None` instead of
//! erroring. That asymmetry is part of the facade's contract.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Connection to the debugging endpoint failed.
    ///
    /// Returned when the transport cannot be established, target discovery
    /// fails, or a required protocol domain cannot be enabled. Fatal to the
    /// session; the caller must reconnect.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Connection closed unexpectedly.
    ///
    /// Returned when the WebSocket is lost mid-operation.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Session is not connected.
    ///
    /// Returned when an operation is issued before a successful `connect()`
    /// or after `disconnect()`.
    #[error("Not connected to a debugging target")]
    NotConnected,

    // ========================================================================
    // Navigation Errors
    // ========================================================================
    /// Navigation request rejected or timed out.
    #[error("Failed to navigate to {url}: {message}")]
    Navigation {
        /// URL that was being navigated to.
        url: String,
        /// Description of the navigation failure.
        message: String,
    },

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// Page-side JavaScript threw an exception.
    ///
    /// Carries the exception description reported by the runtime.
    #[error("JavaScript error: {message}")]
    Evaluation {
        /// Exception description from the page.
        message: String,
    },

    /// Operation lost its race against the timeout.
    ///
    /// The in-flight protocol call is abandoned, not cancelled: it may still
    /// complete on the remote side with no observer. Treat a timeout as "no
    /// confirmed outcome", not "operation aborted".
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // DOM Errors
    // ========================================================================
    /// Node reference used after a newer navigation.
    ///
    /// Protocol node ids are only valid for the DOM tree they were issued
    /// against; a navigation invalidates every previously obtained reference.
    #[error("Stale node {node_id}: issued for document generation {issued}, current is {current}")]
    StaleNode {
        /// The stale protocol node id.
        node_id: i64,
        /// Document generation the reference was issued under.
        issued: u64,
        /// Current document generation of the session.
        current: u64,
    },

    // ========================================================================
    // Capture Errors
    // ========================================================================
    /// Screenshot capture failed.
    #[error("Failed to capture screenshot: {message}")]
    Screenshot {
        /// Description of the capture failure.
        message: String,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Protocol violation or command error response.
    ///
    /// Returned when the remote end rejects a command or replies with a
    /// message the client cannot interpret.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// Channel receive error.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a navigation error.
    #[inline]
    pub fn navigation(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates an evaluation error.
    #[inline]
    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Creates a stale node error.
    #[inline]
    pub fn stale_node(node_id: i64, issued: u64, current: u64) -> Self {
        Self::StaleNode {
            node_id,
            issued,
            current,
        }
    }

    /// Creates a screenshot error.
    #[inline]
    pub fn screenshot(message: impl Into<String>) -> Self {
        Self::Screenshot {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionClosed
                | Self::NotConnected
                | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed on retry against the same session.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::StaleNode { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
