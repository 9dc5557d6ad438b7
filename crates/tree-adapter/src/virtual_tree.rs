//! In-memory attributed tree implementing `TreeAdapter`
//!
//! Documents deserialize from a compact JSON shape so fixtures can live in
//! test data and CLI input files:
//!
//! ```json
//! {
//!   "tag": "div",
//!   "attrs": { "id": "root" },
//!   "text": "hello",
//!   "children": [ ... ],
//!   "shadow": { "tag": "#fragment", "children": [ ... ] },
//!   "style": { "display": "none" },
//!   "rect": [0.0, 0.0, 100.0, 20.0]
//! }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::ports::{ComputedStyle, NodeId, Rect, TreeAdapter};

/// Declarative node used to build a `VirtualTree` from JSON
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NodeSpec {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
    #[serde(default)]
    pub shadow: Option<Box<NodeSpec>>,
    #[serde(default)]
    pub style: Option<StyleSpec>,
    #[serde(default)]
    pub rect: Option<[f64; 4]>,
}

/// Visibility-relevant style overrides; unset fields keep defaults
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StyleSpec {
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub opacity: Option<f64>,
}

#[derive(Clone, Debug)]
struct VNode {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    shadow_root: Option<NodeId>,
    shadow_host: Option<NodeId>,
    style: ComputedStyle,
    rect: Rect,
}

/// Arena-backed virtual document
pub struct VirtualTree {
    nodes: Vec<VNode>,
    root: NodeId,
}

impl VirtualTree {
    /// Build a tree from a declarative spec; the spec node becomes the root
    pub fn from_spec(spec: &NodeSpec) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        let root = tree.insert(spec, None, None);
        tree.root = root;
        tree
    }

    /// Parse a JSON document into a tree
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let spec: NodeSpec = serde_json::from_str(raw)?;
        Ok(Self::from_spec(&spec))
    }

    fn insert(&mut self, spec: &NodeSpec, parent: Option<NodeId>, host: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(VNode {
            tag: spec.tag.to_ascii_lowercase(),
            attrs: spec
                .attrs
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            text: spec.text.clone(),
            parent,
            children: Vec::new(),
            shadow_root: None,
            shadow_host: host,
            style: resolve_style(spec.style.as_ref()),
            rect: resolve_rect(spec.rect),
        });
        for child in &spec.children {
            let child_id = self.insert(child, Some(id), None);
            self.nodes[id.0 as usize].children.push(child_id);
        }
        if let Some(shadow) = &spec.shadow {
            // Scope roots are detached: no parent, linked through the host
            let scope_id = self.insert(shadow, None, Some(id));
            self.nodes[id.0 as usize].shadow_root = Some(scope_id);
        }
        id
    }

    fn node(&self, id: NodeId) -> Option<&VNode> {
        self.nodes.get(id.0 as usize)
    }

    /// Total node count, scope roots included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node matching a predicate, preorder over the document scope
    pub fn find<F>(&self, pred: F) -> Option<NodeId>
    where
        F: Fn(NodeId) -> bool,
    {
        self.preorder(self.root)
            .into_iter()
            .find(|&node| pred(node))
    }

    /// First node carrying the given id attribute, searching the document
    /// scope and every shadow scope
    pub fn node_by_id(&self, id_value: &str) -> Option<NodeId> {
        (0..self.nodes.len() as u32)
            .map(NodeId)
            .find(|&node| self.attribute(node, "id").as_deref() == Some(id_value))
    }

    /// Preorder traversal of one scope, not crossing shadow boundaries
    pub fn preorder(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![scope];
        while let Some(node) = stack.pop() {
            out.push(node);
            if let Some(vnode) = self.node(node) {
                for &child in vnode.children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        out
    }
}

fn resolve_style(spec: Option<&StyleSpec>) -> ComputedStyle {
    let mut style = ComputedStyle::default();
    if let Some(spec) = spec {
        if let Some(display) = &spec.display {
            style.display = display.clone();
        }
        if let Some(visibility) = &spec.visibility {
            style.visibility = visibility.clone();
        }
        if let Some(opacity) = spec.opacity {
            style.opacity = opacity;
        }
    }
    style
}

fn resolve_rect(spec: Option<[f64; 4]>) -> Rect {
    match spec {
        Some([x, y, width, height]) => Rect {
            x,
            y,
            width,
            height,
        },
        // Fixtures rarely care about geometry; default to a visible box
        None => Rect {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        },
    }
}

impl TreeAdapter for VirtualTree {
    fn root(&self) -> NodeId {
        self.root
    }

    fn tag(&self, node: NodeId) -> Option<String> {
        self.node(node)
            .map(|n| n.tag.clone())
            .filter(|tag| !tag.is_empty())
    }

    fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        self.node(node).map(|n| n.attrs.clone()).unwrap_or_default()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn direct_text(&self, node: NodeId) -> String {
        self.node(node).map(|n| n.text.clone()).unwrap_or_default()
    }

    fn computed_style(&self, node: NodeId) -> ComputedStyle {
        self.node(node)
            .map(|n| n.style.clone())
            .unwrap_or_default()
    }

    fn bounding_box(&self, node: NodeId) -> Rect {
        self.node(node).map(|n| n.rect.clone()).unwrap_or_default()
    }

    fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.node(host).and_then(|n| n.shadow_root)
    }

    fn shadow_host(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.shadow_host)
    }

    fn node_from_point(&self, x: f64, y: f64) -> Option<NodeId> {
        // Last hit in preorder wins, matching paint order of a flat document
        let mut hit = None;
        for node in self.preorder(self.root) {
            let rect = self.bounding_box(node);
            if x >= rect.x && x <= rect.x + rect.width && y >= rect.y && y <= rect.y + rect.height {
                hit = Some(node);
            }
        }
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VirtualTree {
        VirtualTree::from_json(
            r#"{
                "tag": "html",
                "children": [
                    { "tag": "body", "children": [
                        { "tag": "div", "attrs": { "id": "app" }, "children": [
                            { "tag": "span", "text": "one" },
                            { "tag": "span", "text": "two" }
                        ]}
                    ]}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_navigation() {
        let tree = sample();
        let app = tree.node_by_id("app").unwrap();
        assert_eq!(tree.tag(app).as_deref(), Some("div"));
        let spans = tree.children(app);
        assert_eq!(spans.len(), 2);
        assert_eq!(tree.direct_text(spans[1]), "two");
        assert_eq!(tree.sibling_index(spans[1]), 2);
        assert_eq!(tree.same_tag_index(spans[1]), 2);
        assert_eq!(tree.depth(spans[0]), 3);
    }

    #[test]
    fn test_shadow_scope_is_detached() {
        let tree = VirtualTree::from_json(
            r##"{
                "tag": "html",
                "children": [
                    { "tag": "my-widget", "shadow": {
                        "tag": "#fragment",
                        "children": [ { "tag": "button", "text": "Go" } ]
                    }}
                ]
            }"##,
        )
        .unwrap();
        let host = tree.find(|n| tree.tag(n).as_deref() == Some("my-widget")).unwrap();
        let scope = tree.shadow_root(host).unwrap();
        assert_eq!(tree.parent(scope), None);
        assert_eq!(tree.shadow_host(scope), Some(host));
        let button = tree.children(scope)[0];
        assert_eq!(tree.containing_shadow_root(button), Some(scope));
        // Document preorder never reaches into the scope
        assert!(!tree.preorder(tree.root()).contains(&button));
    }

    #[test]
    fn test_style_defaults() {
        let tree = VirtualTree::from_json(
            r#"{ "tag": "div", "style": { "display": "none" } }"#,
        )
        .unwrap();
        let style = tree.computed_style(tree.root());
        assert!(style.hides());
        assert_eq!(style.opacity, 1.0);
    }
}
