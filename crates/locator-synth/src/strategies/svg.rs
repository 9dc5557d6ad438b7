//! SVG strategy
//!
//! SVG content rarely has stable attributes of its own, so the strategy
//! leans on accessible naming: aria-label, `<title>`/`<desc>` text, a
//! labeled ancestor control, then class/viewBox/child signatures, and a
//! position-indexed svg path as the last formulation.

use tree_adapter::NodeId;

use crate::errors::SynthError;
use crate::expr;
use crate::heuristics::filtered_class_tokens;
use crate::strategies::support::{rank_among_matches, relative_positional_path};
use crate::strategies::{Formulation, Strategy, StrategyContext, SynthEnv};

const PRIORITY: i32 = 85;

/// Ancestor levels searched for a labeled control
const LABEL_ANCESTOR_LEVELS: usize = 3;

/// Pinned prefix length for path-data signatures
const PATH_DATA_PREFIX: usize = 20;

pub struct SvgStrategy;

impl Strategy for SvgStrategy {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn is_applicable(&self, _env: &SynthEnv<'_>, ctx: &StrategyContext) -> bool {
        ctx.snapshot.basic.is_svg_context
    }

    fn generate(
        &self,
        env: &SynthEnv<'_>,
        ctx: &StrategyContext,
    ) -> Result<Option<Formulation>, SynthError> {
        let svg_root = match self.svg_root(env, ctx) {
            Some(found) => found,
            None => return Ok(None),
        };

        // Inner suffix when the target sits below the svg root
        let suffix = if svg_root == env.target {
            String::new()
        } else {
            match relative_positional_path(env.tree, svg_root, env.target) {
                Some(path) => format!("/{path}"),
                None => return Ok(None),
            }
        };

        let mut formulations = Vec::new();
        for root_expr in self.root_formulations(env, svg_root) {
            formulations.push(Formulation::new(format!("{root_expr}{suffix}")));
        }
        Ok(env.first_valid(formulations))
    }
}

impl SvgStrategy {
    fn svg_root(&self, env: &SynthEnv<'_>, ctx: &StrategyContext) -> Option<NodeId> {
        if ctx.snapshot.basic.tag == "svg" {
            return Some(env.target);
        }
        let mut current = env.target;
        while let Some(parent) = env.tree.parent(current) {
            if env.tree.tag(parent).as_deref() == Some("svg") {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// Formulations identifying the svg root, in documented order
    fn root_formulations(&self, env: &SynthEnv<'_>, svg_root: NodeId) -> Vec<String> {
        let tree = env.tree;
        let mut out = Vec::new();

        if let Some(label) = tree.attribute(svg_root, "aria-label") {
            out.push(expr::local_name(
                "svg",
                Some(&format!("@aria-label={}", expr::literal(&label))),
            ));
        }

        // <title> / <desc> text reaches the svg through the ancestor axis
        for child in tree.children(svg_root) {
            let tag = tree.tag(child);
            if matches!(tag.as_deref(), Some("title" | "desc")) {
                let text = tree_adapter::normalize_space(&tree.direct_text(child));
                if !text.is_empty() {
                    let name = tag.unwrap_or_default();
                    out.push(format!(
                        "//*[local-name()={} and normalize-space(text())={}]/ancestor::*[local-name()='svg'][1]",
                        expr::literal(&name),
                        expr::literal(&text)
                    ));
                }
            }
        }

        // Labeled ancestor control scoping the svg
        let mut current = svg_root;
        for _ in 0..LABEL_ANCESTOR_LEVELS {
            let parent = match tree.parent(current) {
                Some(p) => p,
                None => break,
            };
            if let Some(tag) = tree.tag(parent) {
                for attr in ["aria-label", "title"] {
                    if let Some(label) = tree.attribute(parent, attr) {
                        out.push(format!(
                            "//{tag}[@{attr}={lit}]//*[local-name()='svg']",
                            lit = expr::literal(&label)
                        ));
                    }
                }
            }
            current = parent;
        }

        if let Some(class) = tree.attribute(svg_root, "class") {
            for token in filtered_class_tokens(&class) {
                out.push(expr::local_name(
                    "svg",
                    Some(&format!("contains(@class,{})", expr::literal(&token))),
                ));
            }
        }

        if let Some(view_box) = tree.attribute(svg_root, "viewBox") {
            out.push(expr::local_name(
                "svg",
                Some(&format!("@viewBox={}", expr::literal(&view_box))),
            ));
        }

        // Child path/use signatures
        for child in tree.children(svg_root) {
            match tree.tag(child).as_deref() {
                Some("use") => {
                    if let Some(href) = tree
                        .attribute(child, "href")
                        .or_else(|| tree.attribute(child, "xlink:href"))
                    {
                        out.push(format!(
                            "//*[local-name()='use' and @href={}]/ancestor::*[local-name()='svg'][1]",
                            expr::literal(&href)
                        ));
                    }
                }
                Some("path") => {
                    if let Some(d) = tree.attribute(child, "d") {
                        let prefix: String = d.chars().take(PATH_DATA_PREFIX).collect();
                        out.push(format!(
                            "//*[local-name()='path' and contains(@d,{})]/ancestor::*[local-name()='svg'][1]",
                            expr::literal(&prefix)
                        ));
                    }
                }
                _ => {}
            }
        }

        // Position-indexed svg path as the final formulation
        let all_svg = expr::local_name("svg", None);
        if let Some(rank) = rank_among_matches(env.oracle, &all_svg, env.scope, svg_root) {
            out.push(expr::indexed(&all_svg, rank));
        }

        out
    }
}
