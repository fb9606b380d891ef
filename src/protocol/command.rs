//! Command definitions organized by CDP domain.
//!
//! Commands serialize to the DevTools Protocol wire form
//! `{"method": "Domain.method", "params": {...}}`.
//!
//! # Command Domains
//!
//! | Domain | Commands |
//! |--------|----------|
//! | `Network` | Event observation (enable only) |
//! | `Page` | Lifecycle, navigation, screenshot |
//! | `Runtime` | JavaScript evaluation |
//! | `DOM` | Node queries, markup, attributes |

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;

// ============================================================================
// Command Wrapper
// ============================================================================

/// All protocol commands organized by domain.
///
/// This enum wraps domain-specific command enums for unified serialization.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Command {
    /// Network domain commands.
    Network(NetworkCommand),
    /// Page domain commands.
    Page(PageCommand),
    /// Runtime domain commands.
    Runtime(RuntimeCommand),
    /// DOM domain commands.
    Dom(DomCommand),
}

impl Command {
    /// Returns the protocol method name, for logging and timeout context.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::Network(NetworkCommand::Enable {}) => "Network.enable",
            Self::Page(PageCommand::Enable {}) => "Page.enable",
            Self::Page(PageCommand::Navigate { .. }) => "Page.navigate",
            Self::Page(PageCommand::CaptureScreenshot { .. }) => "Page.captureScreenshot",
            Self::Runtime(RuntimeCommand::Enable {}) => "Runtime.enable",
            Self::Runtime(RuntimeCommand::Evaluate { .. }) => "Runtime.evaluate",
            Self::Runtime(RuntimeCommand::CallFunctionOn { .. }) => "Runtime.callFunctionOn",
            Self::Dom(DomCommand::Enable {}) => "DOM.enable",
            Self::Dom(DomCommand::GetDocument {}) => "DOM.getDocument",
            Self::Dom(DomCommand::QuerySelector { .. }) => "DOM.querySelector",
            Self::Dom(DomCommand::QuerySelectorAll { .. }) => "DOM.querySelectorAll",
            Self::Dom(DomCommand::GetOuterHtml { .. }) => "DOM.getOuterHTML",
            Self::Dom(DomCommand::GetAttributes { .. }) => "DOM.getAttributes",
            Self::Dom(DomCommand::ResolveNode { .. }) => "DOM.resolveNode",
        }
    }
}

// ============================================================================
// Network Commands
// ============================================================================

/// Network domain commands.
///
/// Only enabled for event observation; no interception surface.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum NetworkCommand {
    /// Enable network event observation.
    #[serde(rename = "Network.enable")]
    Enable {},
}

// ============================================================================
// Page Commands
// ============================================================================

/// Page domain commands for lifecycle, navigation and capture.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum PageCommand {
    /// Enable page lifecycle events (required for `Page.loadEventFired`).
    #[serde(rename = "Page.enable")]
    Enable {},

    /// Navigate to URL.
    #[serde(rename = "Page.navigate")]
    Navigate {
        /// URL to navigate to.
        url: String,
    },

    /// Capture a screenshot of the current viewport.
    #[serde(rename = "Page.captureScreenshot")]
    CaptureScreenshot {
        /// Image format (`png` or `jpeg`).
        format: String,
        /// Compression quality (JPEG only).
        #[serde(skip_serializing_if = "Option::is_none")]
        quality: Option<u8>,
    },
}

// ============================================================================
// Runtime Commands
// ============================================================================

/// Runtime domain commands for JavaScript execution.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum RuntimeCommand {
    /// Enable runtime events.
    #[serde(rename = "Runtime.enable")]
    Enable {},

    /// Evaluate an expression in the page context.
    #[serde(rename = "Runtime.evaluate")]
    Evaluate {
        /// JavaScript expression to evaluate.
        expression: String,
        /// Await a returned promise before resolving.
        #[serde(rename = "awaitPromise")]
        await_promise: bool,
        /// Return the result by value (must be JSON-serializable).
        #[serde(rename = "returnByValue")]
        return_by_value: bool,
    },

    /// Call a function with a remote object as `this`.
    #[serde(rename = "Runtime.callFunctionOn")]
    CallFunctionOn {
        /// Remote object to bind as `this`.
        #[serde(rename = "objectId")]
        object_id: String,
        /// Function source text.
        #[serde(rename = "functionDeclaration")]
        function_declaration: String,
        /// Return the result by value.
        #[serde(rename = "returnByValue")]
        return_by_value: bool,
    },
}

// ============================================================================
// DOM Commands
// ============================================================================

/// DOM domain commands for node introspection.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum DomCommand {
    /// Enable DOM introspection.
    #[serde(rename = "DOM.enable")]
    Enable {},

    /// Fetch the root document node.
    #[serde(rename = "DOM.getDocument")]
    GetDocument {},

    /// Resolve the first match for a selector under a context node.
    #[serde(rename = "DOM.querySelector")]
    QuerySelector {
        /// Context node to search under.
        #[serde(rename = "nodeId")]
        node_id: i64,
        /// CSS selector.
        selector: String,
    },

    /// Resolve all matches for a selector under a context node.
    #[serde(rename = "DOM.querySelectorAll")]
    QuerySelectorAll {
        /// Context node to search under.
        #[serde(rename = "nodeId")]
        node_id: i64,
        /// CSS selector.
        selector: String,
    },

    /// Fetch the serialized markup of a node.
    #[serde(rename = "DOM.getOuterHTML")]
    GetOuterHtml {
        /// Target node.
        #[serde(rename = "nodeId")]
        node_id: i64,
    },

    /// Fetch a node's attributes as an interleaved flat name/value list.
    #[serde(rename = "DOM.getAttributes")]
    GetAttributes {
        /// Target node.
        #[serde(rename = "nodeId")]
        node_id: i64,
    },

    /// Resolve a node id to a remote object reference.
    #[serde(rename = "DOM.resolveNode")]
    ResolveNode {
        /// Target node.
        #[serde(rename = "nodeId")]
        node_id: i64,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_serialization() {
        let command = Command::Dom(DomCommand::Enable {});
        let json = serde_json::to_value(&command).expect("serialize");

        assert_eq!(json["method"], "DOM.enable");
        assert!(json["params"].as_object().expect("params object").is_empty());
    }

    #[test]
    fn test_navigate_serialization() {
        let command = Command::Page(PageCommand::Navigate {
            url: "https://example.com".to_string(),
        });
        let json = serde_json::to_value(&command).expect("serialize");

        assert_eq!(json["method"], "Page.navigate");
        assert_eq!(json["params"]["url"], "https://example.com");
    }

    #[test]
    fn test_evaluate_serialization() {
        let command = Command::Runtime(RuntimeCommand::Evaluate {
            expression: "1 + 1".to_string(),
            await_promise: true,
            return_by_value: true,
        });
        let json = serde_json::to_value(&command).expect("serialize");

        assert_eq!(json["method"], "Runtime.evaluate");
        assert_eq!(json["params"]["expression"], "1 + 1");
        assert_eq!(json["params"]["awaitPromise"], true);
        assert_eq!(json["params"]["returnByValue"], true);
    }

    #[test]
    fn test_query_selector_serialization() {
        let command = Command::Dom(DomCommand::QuerySelectorAll {
            node_id: 1,
            selector: ".result".to_string(),
        });
        let json = serde_json::to_value(&command).expect("serialize");

        assert_eq!(json["method"], "DOM.querySelectorAll");
        assert_eq!(json["params"]["nodeId"], 1);
        assert_eq!(json["params"]["selector"], ".result");
    }

    #[test]
    fn test_screenshot_quality_omitted_for_png() {
        let command = Command::Page(PageCommand::CaptureScreenshot {
            format: "png".to_string(),
            quality: None,
        });
        let json = serde_json::to_value(&command).expect("serialize");

        assert_eq!(json["params"]["format"], "png");
        assert!(json["params"].get("quality").is_none());
    }

    #[test]
    fn test_method_names() {
        let command = Command::Dom(DomCommand::GetOuterHtml { node_id: 5 });
        assert_eq!(command.method(), "DOM.getOuterHTML");

        let command = Command::Runtime(RuntimeCommand::CallFunctionOn {
            object_id: "obj-1".to_string(),
            function_declaration: "function() {}".to_string(),
            return_by_value: true,
        });
        assert_eq!(command.method(), "Runtime.callFunctionOn");
    }
}
