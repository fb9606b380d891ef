//! The browser session facade.
//!
//! [`BrowserSession`] is the crate's one public entry point: a facade over a
//! single remote-debugging connection, split by concern.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | Session struct, options, lifecycle, rate-limit gate |
//! | `script` | JavaScript evaluation |
//! | `navigation` | URL navigation, load waiting, URL/title |
//! | `input` | Click, type, wait-for-selector |
//! | `extract` | Single-element HTML/text/attribute extractors |
//! | `screenshot` | Viewport capture |
//! | `dom` | DOM-domain primitives and [`NodeRef`] |
//! | `elements` | Selector-fallback batch extraction |
//!
//! # Example
//!
//! ```ignore
//! let session = BrowserSession::default();
//! session.connect(ConnectOptions::default()).await?;
//!
//! session.open("https://example.com", None).await?;
//! session.wait_for_selector("h1", None).await?;
//! let heading = session.get_text("h1").await?;
//!
//! session.disconnect().await;
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod core;
mod dom;
mod elements;
mod extract;
mod input;
mod navigation;
mod screenshot;
mod script;

// ============================================================================
// Re-exports
// ============================================================================

pub use core::{BrowserSession, SessionOptions};
pub use dom::NodeRef;
pub use elements::{ElementDescriptor, ExtractOptions};
pub use input::TypeOptions;
