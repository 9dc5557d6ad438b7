//! Anchor-relative strategy
//!
//! When a nearby node is independently unique, express the target relative
//! to it: sibling axes first (closest anchors), then ancestors within a
//! few levels, then a unique child through the parent axis.

use tree_adapter::NodeId;

use crate::errors::SynthError;
use crate::strategies::support::{relative_positional_path, unique_expr_for};
use crate::strategies::{Formulation, Strategy, StrategyContext, SynthEnv};

const PRIORITY: i32 = 95;

pub struct AnchorStrategy;

impl Strategy for AnchorStrategy {
    fn name(&self) -> &'static str {
        "anchor"
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn is_applicable(&self, env: &SynthEnv<'_>, _ctx: &StrategyContext) -> bool {
        self.sibling_anchor(env).is_some()
            || self.ancestor_anchor(env).is_some()
            || self.child_anchor(env).is_some()
    }

    fn generate(
        &self,
        env: &SynthEnv<'_>,
        ctx: &StrategyContext,
    ) -> Result<Option<Formulation>, SynthError> {
        let tag = &ctx.snapshot.basic.tag;
        let mut formulations = Vec::new();

        if let Some((anchor_expr, axis, offset, adjacent)) = self.sibling_anchor(env) {
            let bonus = if adjacent {
                env.config.scores.anchor_proximity_bonus
            } else {
                0
            };
            formulations
                .push(Formulation::new(format!("{anchor_expr}/{axis}::{tag}[{offset}]")).with_bonus(bonus));
        }

        if let Some((ancestor, anchor_expr)) = self.ancestor_anchor(env) {
            formulations.push(Formulation::new(format!("{anchor_expr}//{tag}")));
            if let Some(path) = relative_positional_path(env.tree, ancestor, env.target) {
                formulations.push(Formulation::new(format!("{anchor_expr}/{path}")));
            }
        }

        if let Some(child_expr) = self.child_anchor(env) {
            formulations.push(Formulation::new(format!("{child_expr}/parent::{tag}")));
        }

        Ok(env.first_valid(formulations))
    }
}

impl AnchorStrategy {
    /// Nearest uniquely identifiable sibling: (expr, axis, offset, adjacent)
    fn sibling_anchor(&self, env: &SynthEnv<'_>) -> Option<(String, &'static str, usize, bool)> {
        let tag = env.tree.tag(env.target)?;
        let parent = env.tree.parent(env.target)?;
        let siblings = env.tree.children(parent);
        let pos = siblings.iter().position(|&s| s == env.target)?;

        let mut order: Vec<usize> = (0..siblings.len()).filter(|&i| i != pos).collect();
        order.sort_by_key(|&i| (i as isize - pos as isize).unsigned_abs());

        for i in order {
            let anchor_expr = match unique_expr_for(env.tree, env.oracle, env.scope, siblings[i]) {
                Some(found) => found,
                None => continue,
            };
            let (axis, range): (&'static str, Vec<usize>) = if i < pos {
                ("following-sibling", (i + 1..=pos).collect())
            } else {
                ("preceding-sibling", (pos..i).rev().collect())
            };
            let mut offset = 0;
            for idx in range {
                if env.tree.tag(siblings[idx]).as_deref() == Some(tag.as_str()) {
                    offset += 1;
                }
                if idx == pos {
                    break;
                }
            }
            let adjacent = (i as isize - pos as isize).unsigned_abs() == 1;
            return Some((anchor_expr, axis, offset.max(1), adjacent));
        }
        None
    }

    /// Uniquely identifiable ancestor within the configured level budget
    fn ancestor_anchor(&self, env: &SynthEnv<'_>) -> Option<(NodeId, String)> {
        let mut current = env.target;
        for _ in 0..env.config.anchor_ancestor_levels {
            let parent = env.tree.parent(current)?;
            if let Some(expression) = unique_expr_for(env.tree, env.oracle, env.scope, parent) {
                return Some((parent, expression));
            }
            current = parent;
        }
        None
    }

    /// Uniquely identifiable direct child
    fn child_anchor(&self, env: &SynthEnv<'_>) -> Option<String> {
        env.tree
            .children(env.target)
            .into_iter()
            .find_map(|child| unique_expr_for(env.tree, env.oracle, env.scope, child))
    }
}
