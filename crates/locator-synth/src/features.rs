//! Feature extraction
//!
//! `FeatureExtractor::analyze` turns a node into an immutable
//! `FeatureSnapshot`: attributes classified into stability tiers, visible
//! text, position, ancestry context, accessibility hints, framework
//! fingerprint and per-attribute uniqueness flags. Extraction fully
//! succeeds or fails with `InvalidElement`; results are cached per node
//! identity + attribute fingerprint with a short TTL.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;
use tree_adapter::{normalize_space, NodeId, Rect, TreeAdapter};

use crate::errors::SynthError;
use crate::heuristics::{
    self, detect_framework, FrameworkKind, PRIORITY_ATTRS,
};

const INTERACTIVE_TAGS: &[&str] = &[
    "a", "button", "input", "select", "textarea", "option", "label", "summary", "details",
];

const INTERACTIVE_ROLES: &[&str] = &[
    "button", "link", "tab", "menuitem", "checkbox", "radio", "switch", "textbox", "combobox",
];

const LIST_TAGS: &[&str] = &["ul", "ol", "dl", "menu"];

/// Core identity of the node
#[derive(Clone, Debug, Serialize)]
pub struct BasicFeatures {
    pub tag: String,
    pub id: Option<String>,
    pub class_name: Option<String>,
    pub role: Option<String>,
    pub is_visible: bool,
    pub is_interactive: bool,
    pub is_svg_context: bool,
}

/// Attributes split into stability tiers; every attribute lands in at most
/// one tier, the framework tier is never part of `stable`
#[derive(Clone, Debug, Default, Serialize)]
pub struct AttributeFeatures {
    pub all: Vec<(String, String)>,
    pub priority: Vec<(String, String)>,
    pub data: Vec<(String, String)>,
    pub aria: Vec<(String, String)>,
    pub framework: Vec<(String, String)>,
    pub stable: Vec<(String, String)>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct TextFeatures {
    /// Own text-node children, whitespace-normalized so it compares the
    /// way `normalize-space(text())` does; empty when the node is invisible
    pub direct: String,
    /// Whole subtree text, whitespace-normalized
    pub full: String,
    /// Descendant-only text, whitespace-normalized
    pub inner: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct PositionFeatures {
    pub rect: Rect,
    pub sibling_index: usize,
    pub same_tag_index: usize,
    pub depth: usize,
}

/// Compact description of a neighboring node
#[derive(Clone, Debug, Serialize)]
pub struct NodeSummary {
    pub tag: String,
    pub id: Option<String>,
    pub class_name: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ContextFeatures {
    pub parent: Option<NodeSummary>,
    pub children: Vec<NodeSummary>,
    pub in_form: bool,
    pub in_table: bool,
    pub in_list: bool,
    pub in_shadow_scope: bool,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AccessibilityFeatures {
    pub role: Option<String>,
    pub aria_label: Option<String>,
    pub title: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct FrameworkFingerprint {
    pub kind: FrameworkKind,
    pub matched_attrs: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct UniquenessFeatures {
    /// Names of stable attributes whose (name, value) pair occurs exactly
    /// once in the document scope
    pub attributes_known_unique: Vec<String>,
}

/// Immutable feature snapshot of one node at a point in time
#[derive(Clone, Debug, Serialize)]
pub struct FeatureSnapshot {
    pub basic: BasicFeatures,
    pub attributes: AttributeFeatures,
    pub text: TextFeatures,
    pub position: PositionFeatures,
    pub context: ContextFeatures,
    pub accessibility: AccessibilityFeatures,
    pub framework: FrameworkFingerprint,
    pub uniqueness: UniquenessFeatures,
}

/// Extractor with its own short-TTL cache
pub struct FeatureExtractor {
    cache: DashMap<(u32, u64), (Arc<FeatureSnapshot>, Instant)>,
    ttl: Duration,
}

impl FeatureExtractor {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: DashMap::new(),
            ttl,
        }
    }

    /// Analyze a node, serving a cached snapshot when identity and
    /// attribute fingerprint are unchanged within the TTL
    pub fn analyze(
        &self,
        tree: &dyn TreeAdapter,
        node: NodeId,
    ) -> Result<Arc<FeatureSnapshot>, SynthError> {
        let tag = tree
            .tag(node)
            .filter(|t| !t.is_empty() && !t.starts_with('#'))
            .ok_or_else(|| SynthError::InvalidElement("node has no tag".to_string()))?;

        let attrs = tree.attributes(node);
        let key = (node.0, attr_fingerprint(&attrs));
        if let Some(entry) = self.cache.get(&key) {
            if entry.1.elapsed() <= self.ttl {
                debug!(node = node.0, "feature cache hit");
                return Ok(entry.0.clone());
            }
        }
        // Stale entries for this key are dropped on touch
        self.cache.remove(&key);

        let snapshot = Arc::new(self.extract(tree, node, tag, attrs));
        self.cache.insert(key, (snapshot.clone(), Instant::now()));
        Ok(snapshot)
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    fn extract(
        &self,
        tree: &dyn TreeAdapter,
        node: NodeId,
        tag: String,
        attrs: Vec<(String, String)>,
    ) -> FeatureSnapshot {
        let attributes = classify_attributes(&attrs);
        let (kind, matched_attrs) = detect_framework(&attrs);

        let style = tree.computed_style(node);
        let rect = tree.bounding_box(node);
        let is_visible = !style.hides() && !rect.is_empty();

        let direct_raw = normalize_space(&tree.direct_text(node));
        let full = normalize_space(&tree.full_text(node));
        let direct = if is_visible { direct_raw } else { String::new() };
        let inner = {
            let mut descendant = String::new();
            for child in tree.children(node) {
                descendant.push_str(&tree.full_text(child));
                descendant.push(' ');
            }
            normalize_space(&descendant)
        };

        let id = attr_of(&attrs, "id");
        let class_name = attr_of(&attrs, "class");
        let role = attr_of(&attrs, "role");

        let is_interactive = INTERACTIVE_TAGS.contains(&tag.as_str())
            || role
                .as_deref()
                .map(|r| INTERACTIVE_ROLES.contains(&r))
                .unwrap_or(false)
            || attrs.iter().any(|(n, _)| n == "onclick" || n == "tabindex");

        let is_svg_context = tag == "svg" || ancestor_has_tag(tree, node, "svg");

        let context = build_context(tree, node);
        let uniqueness = check_uniqueness(tree, &attributes.stable);

        FeatureSnapshot {
            basic: BasicFeatures {
                tag,
                id,
                class_name,
                role: role.clone(),
                is_visible,
                is_interactive,
                is_svg_context,
            },
            attributes,
            text: TextFeatures {
                direct,
                full,
                inner,
            },
            position: PositionFeatures {
                rect,
                sibling_index: tree.sibling_index(node),
                same_tag_index: tree.same_tag_index(node),
                depth: tree.depth(node),
            },
            context,
            accessibility: AccessibilityFeatures {
                role,
                aria_label: attr_of(&attrs, "aria-label"),
                title: attr_of(&attrs, "title"),
            },
            framework: FrameworkFingerprint {
                kind,
                matched_attrs,
            },
            uniqueness,
        }
    }
}

fn attr_of(attrs: &[(String, String)], name: &str) -> Option<String> {
    attrs
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.clone())
        .filter(|v| !v.is_empty())
}

/// Hash of sorted attribute name/value pairs
pub fn attr_fingerprint(attrs: &[(String, String)]) -> u64 {
    let mut sorted: Vec<&(String, String)> = attrs.iter().collect();
    sorted.sort();
    let mut hasher = DefaultHasher::new();
    for (name, value) in sorted {
        name.hash(&mut hasher);
        value.hash(&mut hasher);
    }
    hasher.finish()
}

/// Assign every attribute to exactly one stability tier
fn classify_attributes(attrs: &[(String, String)]) -> AttributeFeatures {
    let mut out = AttributeFeatures {
        all: attrs.to_vec(),
        ..Default::default()
    };
    for (name, value) in attrs {
        let pair = (name.clone(), value.clone());
        if PRIORITY_ATTRS.contains(&name.as_str()) {
            if heuristics::is_random_token(value) {
                out.framework.push(pair);
            } else {
                out.priority.push(pair.clone());
                out.stable.push(pair);
            }
        } else if name.starts_with("data-") {
            if heuristics::is_stable_data_attr(name, value) {
                out.data.push(pair.clone());
                out.stable.push(pair);
            } else {
                out.framework.push(pair);
            }
        } else if name.starts_with("aria-") {
            if heuristics::is_random_token(value) {
                out.framework.push(pair);
            } else {
                out.aria.push(pair.clone());
                out.stable.push(pair);
            }
        } else if heuristics::is_framework_attr_name(name) || heuristics::is_random_token(value) {
            out.framework.push(pair);
        }
        // class/style and other leftovers belong to no tier
    }
    out
}

fn ancestor_has_tag(tree: &dyn TreeAdapter, node: NodeId, tag: &str) -> bool {
    let mut current = node;
    while let Some(parent) = tree.parent(current) {
        if tree.tag(parent).as_deref() == Some(tag) {
            return true;
        }
        current = parent;
    }
    false
}

fn summarize(tree: &dyn TreeAdapter, node: NodeId) -> Option<NodeSummary> {
    let tag = tree.tag(node)?;
    let attrs = tree.attributes(node);
    Some(NodeSummary {
        tag,
        id: attr_of(&attrs, "id"),
        class_name: attr_of(&attrs, "class"),
    })
}

fn build_context(tree: &dyn TreeAdapter, node: NodeId) -> ContextFeatures {
    let mut in_form = false;
    let mut in_table = false;
    let mut in_list = false;
    let mut current = node;
    while let Some(parent) = tree.parent(current) {
        match tree.tag(parent).as_deref() {
            Some("form") => in_form = true,
            Some("table") => in_table = true,
            Some(tag) if LIST_TAGS.contains(&tag) => in_list = true,
            _ => {}
        }
        current = parent;
    }

    ContextFeatures {
        parent: tree.parent(node).and_then(|p| summarize(tree, p)),
        children: tree
            .children(node)
            .into_iter()
            .filter_map(|c| summarize(tree, c))
            .collect(),
        in_form,
        in_table,
        in_list,
        in_shadow_scope: tree.containing_shadow_root(node).is_some(),
    }
}

/// Stable attributes whose (name, value) occurs exactly once tree-wide
fn check_uniqueness(tree: &dyn TreeAdapter, stable: &[(String, String)]) -> UniquenessFeatures {
    let mut unique = Vec::new();
    for (name, value) in stable {
        let mut count = 0;
        let mut stack = vec![tree.root()];
        while let Some(n) = stack.pop() {
            if tree.attribute(n, name).as_deref() == Some(value) {
                count += 1;
                if count > 1 {
                    break;
                }
            }
            stack.extend(tree.children(n));
        }
        if count == 1 {
            unique.push(name.clone());
        }
    }
    UniquenessFeatures {
        attributes_known_unique: unique,
    }
}
