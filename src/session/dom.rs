//! DOM-domain primitives.
//!
//! A lower-level extraction path that talks to the protocol's DOM domain
//! directly instead of evaluating JavaScript. Node references obtained here
//! are only valid for the DOM tree they were issued against: every
//! [`NodeRef`] is tagged with the document generation it was issued under,
//! and using one after a newer navigation fails fast with
//! [`Error::StaleNode`].

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::{Command, DomCommand, RuntimeCommand};

use super::BrowserSession;

// ============================================================================
// NodeRef
// ============================================================================

/// A generation-tagged reference to a protocol DOM node.
///
/// Obtained from [`BrowserSession::get_document`] and the `dom_query_*`
/// methods; consumed by the other DOM-domain methods. Invalidated by
/// navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef {
    node_id: i64,
    generation: u64,
}

impl NodeRef {
    /// Returns the protocol node id.
    #[inline]
    #[must_use]
    pub fn node_id(&self) -> i64 {
        self.node_id
    }

    /// Returns the document generation this reference was issued under.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

// ============================================================================
// BrowserSession - DOM Domain
// ============================================================================

impl BrowserSession {
    /// Fetches the root document node.
    ///
    /// Required as the default query context for the selector methods below.
    pub async fn get_document(&self) -> Result<NodeRef> {
        let command = Command::Dom(DomCommand::GetDocument {});
        let result = self.command(command).await?.into_result()?;

        let node_id = result
            .get("root")
            .and_then(|root| root.get("nodeId"))
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::protocol("DOM.getDocument response missing root.nodeId"))?;

        Ok(self.node_ref(node_id))
    }

    /// Resolves the first match for a selector under a context node.
    ///
    /// Defaults to a freshly fetched document root when `context` is `None`.
    /// Resolves to `None` when nothing matches.
    pub async fn dom_query_selector(
        &self,
        selector: &str,
        context: Option<&NodeRef>,
    ) -> Result<Option<NodeRef>> {
        let context_id = self.context_node_id(context).await?;

        let command = Command::Dom(DomCommand::QuerySelector {
            node_id: context_id,
            selector: selector.to_string(),
        });
        let result = self.command(command).await?.into_result()?;

        let node_id = result
            .get("nodeId")
            .and_then(Value::as_i64)
            .unwrap_or_default();

        // The protocol reports "no match" as node id 0.
        if node_id == 0 {
            return Ok(None);
        }
        Ok(Some(self.node_ref(node_id)))
    }

    /// Resolves all matches for a selector under a context node.
    ///
    /// Defaults to a freshly fetched document root when `context` is `None`.
    pub async fn dom_query_selector_all(
        &self,
        selector: &str,
        context: Option<&NodeRef>,
    ) -> Result<Vec<NodeRef>> {
        let context_id = self.context_node_id(context).await?;

        let command = Command::Dom(DomCommand::QuerySelectorAll {
            node_id: context_id,
            selector: selector.to_string(),
        });
        let result = self.command(command).await?.into_result()?;

        let nodes = result
            .get("nodeIds")
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_i64)
                    .map(|id| self.node_ref(id))
                    .collect()
            })
            .unwrap_or_default();

        Ok(nodes)
    }

    /// Fetches the serialized markup of a node.
    pub async fn dom_get_outer_html(&self, node: &NodeRef) -> Result<String> {
        self.check_fresh(node)?;

        let command = Command::Dom(DomCommand::GetOuterHtml {
            node_id: node.node_id,
        });
        let result = self.command(command).await?.into_result()?;

        result
            .get("outerHTML")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::protocol("DOM.getOuterHTML response missing outerHTML"))
    }

    /// Fetches a node's attributes as a name/value map.
    ///
    /// The protocol delivers attributes as an interleaved flat list
    /// (`["id", "x", "class", "y"]`); this method reassembles it.
    pub async fn dom_get_attributes(&self, node: &NodeRef) -> Result<HashMap<String, String>> {
        self.check_fresh(node)?;

        let command = Command::Dom(DomCommand::GetAttributes {
            node_id: node.node_id,
        });
        let result = self.command(command).await?.into_result()?;

        let flat = result
            .get("attributes")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::protocol("DOM.getAttributes response missing attributes"))?;

        Ok(parse_attributes(flat))
    }

    /// Reads a node's text content via a remote function call.
    ///
    /// Resolves the node to a remote object first (`DOM.resolveNode`), then
    /// binds a `textContent` reader to it with `Runtime.callFunctionOn`.
    pub async fn dom_get_text_content(&self, node: &NodeRef) -> Result<String> {
        self.check_fresh(node)?;

        let command = Command::Dom(DomCommand::ResolveNode {
            node_id: node.node_id,
        });
        let result = self.command(command).await?.into_result()?;

        let object_id = result
            .get("object")
            .and_then(|o| o.get("objectId"))
            .and_then(Value::as_str)
            .ok_or_else(|| Error::protocol("DOM.resolveNode response missing object.objectId"))?
            .to_string();

        let command = Command::Runtime(RuntimeCommand::CallFunctionOn {
            object_id,
            function_declaration: "function() { return this.textContent; }".to_string(),
            return_by_value: true,
        });
        let result = self.command(command).await?.into_result()?;

        let text = result
            .get("result")
            .and_then(|r| r.get("value"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        debug!(node_id = node.node_id, text_len = text.len(), "Read node text");
        Ok(text)
    }
}

// ============================================================================
// BrowserSession - Internal
// ============================================================================

impl BrowserSession {
    /// Tags a protocol node id with the current document generation.
    pub(crate) fn node_ref(&self, node_id: i64) -> NodeRef {
        NodeRef {
            node_id,
            generation: self.current_generation(),
        }
    }

    /// Fails fast if the reference predates the current document.
    pub(crate) fn check_fresh(&self, node: &NodeRef) -> Result<()> {
        let current = self.current_generation();
        if node.generation != current {
            return Err(Error::stale_node(node.node_id, node.generation, current));
        }
        Ok(())
    }

    /// Resolves the context node id for a selector query.
    async fn context_node_id(&self, context: Option<&NodeRef>) -> Result<i64> {
        match context {
            Some(node) => {
                self.check_fresh(node)?;
                Ok(node.node_id)
            }
            None => Ok(self.get_document().await?.node_id),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Reassembles the protocol's interleaved flat attribute list into a map.
fn parse_attributes(flat: &[Value]) -> HashMap<String, String> {
    flat.chunks_exact(2)
        .filter_map(|pair| {
            let name = pair[0].as_str()?;
            let value = pair[1].as_str()?;
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
