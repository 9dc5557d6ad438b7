//! Text-content strategy
//!
//! Highest-priority strategy: short visible text is the most human-stable
//! feature an element has. When the same text occurs elsewhere in the
//! tree the strategy escalates through container scoping, anchor
//! relativity and finally an index-qualified form.

use tracing::debug;

use crate::errors::SynthError;
use crate::expr;
use crate::strategies::support::{
    find_container_ancestor, is_button_like, rank_among_matches, unique_expr_for,
};
use crate::strategies::{Formulation, Strategy, StrategyContext, SynthEnv};

const PRIORITY: i32 = 110;

/// How many ancestor levels may hold the button-like wrapper
const BUTTON_ANCESTOR_LEVELS: usize = 2;

pub struct TextStrategy;

impl Strategy for TextStrategy {
    fn name(&self) -> &'static str {
        "text"
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn is_applicable(&self, env: &SynthEnv<'_>, ctx: &StrategyContext) -> bool {
        let text = &ctx.snapshot.text.direct;
        !text.is_empty() && text.chars().count() <= env.config.max_text_len
    }

    fn generate(
        &self,
        env: &SynthEnv<'_>,
        ctx: &StrategyContext,
    ) -> Result<Option<Formulation>, SynthError> {
        let text = ctx.snapshot.text.direct.clone();
        let tag = ctx.snapshot.basic.tag.clone();

        let any_tag = format!("//*[normalize-space(text())={}]", expr::literal(&text));
        let duplicates = env.oracle.count(&any_tag, env.scope);
        debug!(text = %text, duplicates, "text strategy occurrence count");

        if duplicates >= 2 {
            return Ok(self.disambiguate(env, ctx, &text, &tag));
        }

        let mut formulations = Vec::new();
        // A button-like wrapper with the same accumulated text makes a
        // stronger anchor than the bare text node
        if let Some(wrapper) = button_wrapper_with_text(env, &text) {
            formulations.push(Formulation::new(format!(
                "{wrapper}//{tag}[normalize-space(text())={}]",
                expr::literal(&text)
            )));
        }
        formulations.push(Formulation::new(expr::text_eq(&tag, &text)));
        formulations.push(Formulation::new(any_tag));

        Ok(env.first_valid(formulations))
    }

    fn score(&self, env: &SynthEnv<'_>, _ctx: &StrategyContext) -> i32 {
        PRIORITY + env.config.scores.text_boost
    }
}

impl TextStrategy {
    /// Escalation ladder for duplicated text: container scope, then a
    /// unique anchor, then an index-qualified expression
    fn disambiguate(
        &self,
        env: &SynthEnv<'_>,
        ctx: &StrategyContext,
        text: &str,
        tag: &str,
    ) -> Option<Formulation> {
        let own = expr::text_eq(tag, text);
        let mut formulations = Vec::new();

        if let Some((_, container)) =
            find_container_ancestor(env.tree, env.oracle, env.scope, env.target)
        {
            formulations.push(Formulation::new(format!(
                "{container}//{tag}[normalize-space(text())={}]",
                expr::literal(text)
            )));
        }

        if let Some(anchored) = anchor_relative(env, ctx, tag) {
            formulations.push(Formulation::new(anchored));
        }

        if let Some(rank) = rank_among_matches(env.oracle, &own, env.scope, env.target) {
            formulations.push(Formulation::new(expr::indexed(&own, rank)));
        }

        env.first_valid(formulations)
    }
}

/// Expression for a nearby button-like ancestor sharing the target's text
fn button_wrapper_with_text(env: &SynthEnv<'_>, text: &str) -> Option<String> {
    let mut current = env.target;
    for _ in 0..BUTTON_ANCESTOR_LEVELS {
        let parent = env.tree.parent(current)?;
        if is_button_like(env.tree, parent) {
            let full = tree_adapter::normalize_space(&env.tree.full_text(parent));
            if full == text {
                let tag = env.tree.tag(parent)?;
                return Some(format!(
                    "//{tag}[normalize-space(.)={}]",
                    expr::literal(text)
                ));
            }
        }
        current = parent;
    }
    None
}

/// Anchor-relative formulation against a uniquely identifiable sibling
fn anchor_relative(env: &SynthEnv<'_>, _ctx: &StrategyContext, tag: &str) -> Option<String> {
    let parent = env.tree.parent(env.target)?;
    let siblings = env.tree.children(parent);
    let pos = siblings.iter().position(|&s| s == env.target)?;

    // Nearest siblings make the most readable anchors
    let mut order: Vec<usize> = (0..siblings.len()).filter(|&i| i != pos).collect();
    order.sort_by_key(|&i| (i as isize - pos as isize).unsigned_abs());

    for i in order {
        if let Some(anchor) = unique_expr_for(env.tree, env.oracle, env.scope, siblings[i]) {
            let axis = if i < pos {
                "following-sibling"
            } else {
                "preceding-sibling"
            };
            let offset = same_tag_offset(env, &siblings, i, pos, tag);
            return Some(format!("{anchor}/{axis}::{tag}[{offset}]"));
        }
    }
    None
}

/// Position of the target among the anchor's same-tag siblings on the axis
fn same_tag_offset(
    env: &SynthEnv<'_>,
    siblings: &[tree_adapter::NodeId],
    anchor_idx: usize,
    target_idx: usize,
    tag: &str,
) -> usize {
    let range: Vec<usize> = if anchor_idx < target_idx {
        (anchor_idx + 1..=target_idx).collect()
    } else {
        (target_idx..anchor_idx).rev().collect()
    };
    let mut offset = 0;
    for idx in range {
        if env.tree.tag(siblings[idx]).as_deref() == Some(tag) {
            offset += 1;
        }
        if idx == target_idx {
            break;
        }
    }
    offset.max(1)
}
