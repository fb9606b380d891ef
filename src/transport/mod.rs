//! WebSocket transport layer.
//!
//! Internal module handling target discovery and the WebSocket connection
//! to the remote debugging endpoint.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`connection`] | Event loop, correlation, event waiters |
//! | [`endpoint`] | `/json/list` target discovery |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

/// Debugging endpoint discovery.
pub mod endpoint;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::Connection;
pub use endpoint::{ConnectOptions, Target, TargetInfo, discover};
