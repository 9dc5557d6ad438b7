//! Helpers shared across strategies
//!
//! Anchor discovery, container detection and positional path building all
//! live here so the strategies stay small and the rules stay consistent.

use tree_adapter::{EvalOracle, NodeId, TreeAdapter};

use crate::expr;
use crate::heuristics::{filtered_class_tokens, is_random_token};

/// Tags treated as semantic containers
pub const CONTAINER_TAGS: &[&str] = &[
    "ul", "ol", "dl", "table", "form", "nav", "section", "article", "aside", "header", "footer",
    "main", "fieldset", "dialog",
];

/// Roles treated as semantic containers
pub const CONTAINER_ROLES: &[&str] = &[
    "list", "table", "form", "navigation", "region", "dialog", "menu", "toolbar", "tablist",
];

/// Class keywords that mark a container-ish wrapper
pub const CONTAINER_CLASS_KEYWORDS: &[&str] = &[
    "nav", "menu", "list", "table", "form", "card", "panel", "container", "sidebar", "toolbar",
    "modal",
];

/// Tags that behave like a clickable control around text
pub const BUTTON_LIKE_TAGS: &[&str] = &["button", "a", "label", "summary"];

/// Roles that behave like a clickable control
pub const BUTTON_LIKE_ROLES: &[&str] = &["button", "link", "tab", "menuitem"];

/// Non-empty id whose value does not look machine-generated
pub fn trustworthy_id(tree: &dyn TreeAdapter, node: NodeId) -> Option<String> {
    tree.attribute(node, "id")
        .filter(|v| !v.is_empty() && !is_random_token(v))
}

/// An expression that identifies `node` on its own, or `None`
///
/// Tried in trust order: id, name, stable data/test attribute, single
/// filtered class, bare tag. Every candidate is oracle-checked for
/// uniqueness within `scope` before being returned.
pub fn unique_expr_for(
    tree: &dyn TreeAdapter,
    oracle: &dyn EvalOracle,
    scope: NodeId,
    node: NodeId,
) -> Option<String> {
    let tag = tree.tag(node)?;
    let mut tries = Vec::new();

    if let Some(id) = trustworthy_id(tree, node) {
        tries.push(expr::attr_eq(&tag, "id", &id));
    }
    if let Some(name) = tree.attribute(node, "name").filter(|v| !is_random_token(v)) {
        tries.push(expr::attr_eq(&tag, "name", &name));
    }
    for attr in crate::heuristics::TEST_DATA_ATTRS {
        if let Some(value) = tree.attribute(node, attr) {
            tries.push(expr::attr_eq(&tag, attr, &value));
        }
    }
    if let Some(class) = tree.attribute(node, "class") {
        if let Some(token) = filtered_class_tokens(&class).into_iter().next() {
            tries.push(expr::class_contains(&tag, &token));
        }
    }
    tries.push(format!("//{tag}"));

    tries
        .into_iter()
        .find(|candidate| oracle.matches(candidate, scope, node))
}

/// Whether the node is a semantic container by tag, role or class keyword
pub fn is_semantic_container(tree: &dyn TreeAdapter, node: NodeId) -> bool {
    match tree.tag(node) {
        Some(tag) if CONTAINER_TAGS.contains(&tag.as_str()) => return true,
        Some(_) => {}
        None => return false,
    }
    if let Some(role) = tree.attribute(node, "role") {
        if CONTAINER_ROLES.contains(&role.as_str()) {
            return true;
        }
    }
    if let Some(class) = tree.attribute(node, "class") {
        let lower = class.to_ascii_lowercase();
        return CONTAINER_CLASS_KEYWORDS
            .iter()
            .any(|kw| lower.contains(kw));
    }
    false
}

/// Nearest ancestor that is uniquely identifiable or a semantic container,
/// returned with its own identifying expression
pub fn find_container_ancestor(
    tree: &dyn TreeAdapter,
    oracle: &dyn EvalOracle,
    scope: NodeId,
    node: NodeId,
) -> Option<(NodeId, String)> {
    let mut current = node;
    while let Some(parent) = tree.parent(current) {
        if trustworthy_id(tree, parent).is_some() || is_semantic_container(tree, parent) {
            if let Some(expression) = unique_expr_for(tree, oracle, scope, parent) {
                return Some((parent, expression));
            }
        }
        current = parent;
    }
    None
}

/// Whether the node reads as a clickable control
pub fn is_button_like(tree: &dyn TreeAdapter, node: NodeId) -> bool {
    if let Some(tag) = tree.tag(node) {
        if BUTTON_LIKE_TAGS.contains(&tag.as_str()) {
            return true;
        }
    }
    tree.attribute(node, "role")
        .map(|role| BUTTON_LIKE_ROLES.contains(&role.as_str()))
        .unwrap_or(false)
}

/// Positional path from `base` (exclusive) down to `node`, e.g.
/// `div[2]/span[1]`; `None` when `node` is not under `base`
pub fn relative_positional_path(
    tree: &dyn TreeAdapter,
    base: NodeId,
    node: NodeId,
) -> Option<String> {
    let mut segments = Vec::new();
    let mut current = node;
    while current != base {
        let tag = tree.tag(current)?;
        segments.push(expr::positional_segment(&tag, tree.same_tag_index(current)));
        current = tree.parent(current)?;
    }
    segments.reverse();
    Some(segments.join("/"))
}

/// 1-based rank of `target` within the matches of `expression`
pub fn rank_among_matches(
    oracle: &dyn EvalOracle,
    expression: &str,
    scope: NodeId,
    target: NodeId,
) -> Option<usize> {
    oracle
        .evaluate(expression, scope)
        .ok()?
        .iter()
        .position(|&n| n == target)
        .map(|i| i + 1)
}
