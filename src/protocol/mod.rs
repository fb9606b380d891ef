//! DevTools Protocol message types.
//!
//! Internal module defining the command/response/event structures exchanged
//! with the remote debugging endpoint.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`command`] | Typed commands per CDP domain |
//! | [`message`] | Wire messages: [`Request`], [`Response`], [`Event`] |

// ============================================================================
// Submodules
// ============================================================================

/// Typed command definitions.
pub mod command;

/// Wire message types.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{Command, DomCommand, NetworkCommand, PageCommand, RuntimeCommand};
pub use message::{CommandError, Event, Incoming, Request, Response};
