//! Batch element extraction with selector fallback.
//!
//! [`BrowserSession::extract_elements`] lets a caller supply several
//! candidate selectors for the "same" semantic element across page variants
//! and get a best-effort match: selectors are tried in priority order, and
//! the first one that produces any matches wins.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::error::Result;

use super::BrowserSession;
use super::dom::NodeRef;
use super::script::js_string;

// ============================================================================
// ExtractOptions
// ============================================================================

/// Options for [`BrowserSession::extract_elements`].
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Attach each element's attributes (via the DOM domain).
    pub include_attributes: bool,
    /// Attach each element's trimmed text content (via evaluation).
    pub include_text: bool,
    /// Maximum number of descriptors per call.
    pub max_elements: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            include_attributes: true,
            include_text: true,
            max_elements: 50,
        }
    }
}

// ============================================================================
// ElementDescriptor
// ============================================================================

/// A transient description of one matched element.
///
/// Consumed immediately by the caller; the embedded [`NodeRef`] is
/// invalidated by the next navigation like any other node reference.
#[derive(Debug, Clone)]
pub struct ElementDescriptor {
    /// The selector that produced this match.
    pub selector: String,
    /// Protocol node reference.
    pub node: NodeRef,
    /// Attribute map, when requested.
    pub attributes: Option<HashMap<String, String>>,
    /// Trimmed text content, when requested.
    pub text: Option<String>,
}

// ============================================================================
// BrowserSession - Batch Extraction
// ============================================================================

impl BrowserSession {
    /// Extracts element descriptors for the first selector that matches.
    ///
    /// Tries each selector in order against `DOM.querySelectorAll`; for the
    /// first one yielding any matches it builds a descriptor per node
    /// (capped at `max_elements`), attaching attributes and text as
    /// requested, then stops trying further selectors.
    ///
    /// Degrades gracefully: per-selector and per-element failures are
    /// logged and skipped, never propagated — the call returns fewer
    /// results rather than erroring. An empty `Vec` means no selector
    /// matched anything.
    ///
    /// # Example
    ///
    /// ```ignore
    /// // Several candidate layouts for the same result list
    /// let results = session
    ///     .extract_elements(&["div.g", "div.result", "article"], Default::default())
    ///     .await?;
    /// ```
    pub async fn extract_elements<S: AsRef<str>>(
        &self,
        selectors: &[S],
        options: ExtractOptions,
    ) -> Result<Vec<ElementDescriptor>> {
        self.throttle().await;

        let mut results = Vec::new();

        for selector in selectors {
            let selector = selector.as_ref();

            let nodes = match self.dom_query_selector_all(selector, None).await {
                Ok(nodes) => nodes,
                Err(e) => {
                    debug!(selector = %selector, error = %e, "Selector failed, trying next");
                    continue;
                }
            };

            if nodes.is_empty() {
                continue;
            }

            debug!(selector = %selector, matches = nodes.len(), "Selector matched");

            let texts = if options.include_text {
                self.collect_texts(selector, options.max_elements)
                    .await
                    .unwrap_or_default()
            } else {
                Vec::new()
            };

            for (index, node) in nodes.iter().take(options.max_elements).enumerate() {
                let attributes = if options.include_attributes {
                    match self.dom_get_attributes(node).await {
                        Ok(attributes) => Some(attributes),
                        Err(e) => {
                            debug!(node_id = node.node_id(), error = %e, "Skipping element");
                            continue;
                        }
                    }
                } else {
                    None
                };

                let text = if options.include_text {
                    Some(texts.get(index).cloned().unwrap_or_default())
                } else {
                    None
                };

                results.push(ElementDescriptor {
                    selector: selector.to_string(),
                    node: *node,
                    attributes,
                    text,
                });
            }

            if !results.is_empty() {
                break;
            }
        }

        Ok(results)
    }

    /// Collects trimmed text content for every match of a selector, in
    /// document order, with one evaluation.
    async fn collect_texts(&self, selector: &str, max_elements: usize) -> Result<Vec<String>> {
        let script = format!(
            "(() => {{\n\
               const elements = document.querySelectorAll({selector});\n\
               const texts = [];\n\
               for (const element of elements) {{\n\
                 if (texts.length >= {max}) break;\n\
                 texts.push((element.textContent || '').trim());\n\
               }}\n\
               return texts;\n\
             }})()",
            selector = js_string(selector),
            max = max_elements,
        );

        let value = self.evaluate(&script, None).await?;

        let texts = value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(texts)
    }
}

// ============================================================================
// Tests
// ============================================================================
