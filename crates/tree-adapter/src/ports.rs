//! Capability traits consumed by the synthesis engine
//!
//! The engine never touches a rendering engine directly. All tree access
//! goes through `TreeAdapter`, all expression resolution through
//! `EvalOracle`, so the whole pipeline can run against a virtual document.

use serde::{Deserialize, Serialize};

use crate::errors::OracleError;

/// Opaque handle to a node inside a live tree
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Bounding box of a node, in document coordinates
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// True when the box has no renderable area
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Computed style subset relevant to visibility
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComputedStyle {
    pub display: String,
    pub visibility: String,
    pub opacity: f64,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: "block".to_string(),
            visibility: "visible".to_string(),
            opacity: 1.0,
        }
    }
}

impl ComputedStyle {
    /// True when the style alone hides the node
    pub fn hides(&self) -> bool {
        self.display == "none" || self.visibility == "hidden" || self.opacity <= 0.0
    }
}

/// Navigation and inspection capability over an attributed tree
pub trait TreeAdapter: Send + Sync {
    /// Root element of the document
    fn root(&self) -> NodeId;

    /// Tag name, lowercase; `None` when the handle is stale or the node
    /// has no tag
    fn tag(&self, node: NodeId) -> Option<String>;

    /// Attribute name/value pairs; insertion order is not significant
    fn attributes(&self, node: NodeId) -> Vec<(String, String)>;

    /// Single attribute lookup
    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.attributes(node)
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Element children in document order
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Concatenation of the node's own text-node children, untrimmed
    fn direct_text(&self, node: NodeId) -> String;

    /// Text of the node and all its descendants
    fn full_text(&self, node: NodeId) -> String {
        let mut out = self.direct_text(node);
        for child in self.children(node) {
            out.push_str(&self.full_text(child));
        }
        out
    }

    fn computed_style(&self, node: NodeId) -> ComputedStyle;

    fn bounding_box(&self, node: NodeId) -> Rect;

    /// Shadow scope attached to `host`, if any
    fn shadow_root(&self, host: NodeId) -> Option<NodeId>;

    /// Host element when `node` is a shadow scope root
    fn shadow_host(&self, node: NodeId) -> Option<NodeId>;

    /// Nearest enclosing shadow scope root, `None` when the node lives in
    /// the document scope
    ///
    /// Shadow scope roots are detached: their `parent` is `None` and the
    /// way out is `shadow_host`.
    fn containing_shadow_root(&self, node: NodeId) -> Option<NodeId> {
        let mut current = node;
        loop {
            if self.shadow_host(current).is_some() {
                return Some(current);
            }
            current = self.parent(current)?;
        }
    }

    /// Topmost element at the given document coordinates
    fn node_from_point(&self, x: f64, y: f64) -> Option<NodeId>;

    /// 1-based index among all element siblings
    fn sibling_index(&self, node: NodeId) -> usize {
        match self.parent(node) {
            Some(parent) => {
                self.children(parent)
                    .iter()
                    .position(|&c| c == node)
                    .unwrap_or(0)
                    + 1
            }
            None => 1,
        }
    }

    /// 1-based index among same-tag siblings
    fn same_tag_index(&self, node: NodeId) -> usize {
        let tag = match self.tag(node) {
            Some(t) => t,
            None => return 1,
        };
        match self.parent(node) {
            Some(parent) => {
                let mut index = 0;
                for sibling in self.children(parent) {
                    if self.tag(sibling).as_deref() == Some(tag.as_str()) {
                        index += 1;
                    }
                    if sibling == node {
                        return index;
                    }
                }
                1
            }
            None => 1,
        }
    }

    /// Depth from the document root (root = 0)
    fn depth(&self, node: NodeId) -> usize {
        let mut depth = 0;
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            depth += 1;
            current = parent;
        }
        depth
    }
}

/// Expression resolution capability
///
/// `evaluate` resolves a locator expression against a scope to the ordered
/// set of matching nodes. Malformed expressions fail with a local
/// `OracleError::Syntax` and never abort a whole synthesis pass.
pub trait EvalOracle: Send + Sync {
    fn evaluate(&self, expression: &str, scope: NodeId) -> Result<Vec<NodeId>, OracleError>;

    /// Exactly one match, and that match is the target
    fn matches(&self, expression: &str, scope: NodeId, target: NodeId) -> bool {
        match self.evaluate(expression, scope) {
            Ok(found) => found.len() == 1 && found[0] == target,
            Err(_) => false,
        }
    }

    /// Number of matches, zero on malformed expressions
    fn count(&self, expression: &str, scope: NodeId) -> usize {
        self.evaluate(expression, scope)
            .map(|found| found.len())
            .unwrap_or(0)
    }
}
