//! Rate-limited, single-session Chrome DevTools Protocol client.
//!
//! This library provides a high-level facade for remote-controlling one
//! browser page over an existing remote-debugging endpoint.
//!
//! # Architecture
//!
//! The client rides on the DevTools Protocol as transport:
//!
//! - **Local end (Rust)**: sends commands, receives responses and events
//!   over a WebSocket
//! - **Remote end (browser)**: a Chromium-family browser started with
//!   `--remote-debugging-port`
//!
//! Key design principles:
//!
//! - One [`BrowserSession`] owns: one WebSocket connection + one event loop
//! - Every action passes a cooperative rate-limit gate (default 400ms)
//! - Every round-trip races a timeout; losing abandons the call, it does
//!   not cancel it
//! - DOM node references are generation-tagged and invalidated by
//!   navigation
//!
//! # Quick Start
//!
//! ```no_run
//! use cdp_session::{BrowserSession, ConnectOptions, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Attach to a browser on the default debugging port
//!     let session = BrowserSession::default();
//!     session.connect(ConnectOptions::default()).await?;
//!
//!     // Navigate and extract
//!     session.open("https://example.com", None).await?;
//!     session.wait_for_selector("h1", None).await?;
//!     if let Some(heading) = session.get_text("h1").await? {
//!         println!("{heading}");
//!     }
//!
//!     session.disconnect().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`session`] | The [`BrowserSession`] facade |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`protocol`] | DevTools wire message types (internal) |
//! | [`transport`] | WebSocket transport and target discovery (internal) |
//!
//! # Concurrency
//!
//! A session is a single logical conversation: operations issued
//! sequentially execute in issuance order, and concurrent invocation on one
//! session is not a supported usage pattern. Run independent sessions
//! against independent targets for parallel automation.

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// DevTools Protocol message types.
///
/// Internal module defining command/response/event structures.
pub mod protocol;

/// The browser session facade.
///
/// Contains [`BrowserSession`] and its option/descriptor types.
pub mod session;

/// WebSocket transport layer.
///
/// Internal module handling target discovery and the connection event loop.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Session types
pub use session::{
    BrowserSession, ElementDescriptor, ExtractOptions, NodeRef, SessionOptions, TypeOptions,
};

// Connection types
pub use transport::{ConnectOptions, Target, TargetInfo};

// Error types
pub use error::{Error, Result};
