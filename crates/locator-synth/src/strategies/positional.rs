//! Positional strategy
//!
//! Last-resort structural paths. A bare index is brittle, so the path is
//! anchored wherever possible: under a trustworthy-id ancestor first, then
//! a class-scoped ancestor, then a sibling with a stable id, and only then
//! a document-wide tag index.

use tree_adapter::NodeId;

use crate::errors::SynthError;
use crate::expr;
use crate::heuristics::filtered_class_tokens;
use crate::strategies::support::{rank_among_matches, relative_positional_path, trustworthy_id};
use crate::strategies::{Formulation, Strategy, StrategyContext, SynthEnv};

const PRIORITY: i32 = 60;

pub struct PositionalStrategy;

impl Strategy for PositionalStrategy {
    fn name(&self) -> &'static str {
        "positional"
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn is_applicable(&self, env: &SynthEnv<'_>, _ctx: &StrategyContext) -> bool {
        env.tree.parent(env.target).is_some()
    }

    fn generate(
        &self,
        env: &SynthEnv<'_>,
        ctx: &StrategyContext,
    ) -> Result<Option<Formulation>, SynthError> {
        let tag = &ctx.snapshot.basic.tag;
        let mut formulations = Vec::new();

        if let Some((ancestor, id)) = self.id_ancestor(env) {
            if let Some(path) = relative_positional_path(env.tree, ancestor, env.target) {
                formulations.push(Formulation::new(format!(
                    "//*[@id={}]/{path}",
                    expr::literal(&id)
                )));
            }
        }

        if let Some((ancestor, scoped)) = self.class_ancestor(env) {
            if let Some(path) = relative_positional_path(env.tree, ancestor, env.target) {
                formulations.push(Formulation::new(format!("{scoped}/{path}")));
            }
        }

        if let Some(axis_path) = self.sibling_axis_path(env, tag) {
            formulations.push(Formulation::new(axis_path));
        }

        let all = format!("//{tag}");
        if let Some(rank) = rank_among_matches(env.oracle, &all, env.scope, env.target) {
            formulations.push(Formulation::new(expr::indexed(&all, rank)));
        }

        Ok(env.first_valid(formulations))
    }
}

impl PositionalStrategy {
    /// Nearest ancestor with a trustworthy id
    fn id_ancestor(&self, env: &SynthEnv<'_>) -> Option<(NodeId, String)> {
        let mut current = env.target;
        while let Some(parent) = env.tree.parent(current) {
            if let Some(id) = trustworthy_id(env.tree, parent) {
                return Some((parent, id));
            }
            current = parent;
        }
        None
    }

    /// Nearest ancestor whose class scopes it uniquely
    fn class_ancestor(&self, env: &SynthEnv<'_>) -> Option<(NodeId, String)> {
        let mut current = env.target;
        while let Some(parent) = env.tree.parent(current) {
            if let (Some(tag), Some(class)) =
                (env.tree.tag(parent), env.tree.attribute(parent, "class"))
            {
                for token in filtered_class_tokens(&class) {
                    let scoped = expr::class_contains(&tag, &token);
                    if env.oracle.matches(&scoped, env.scope, parent) {
                        return Some((parent, scoped));
                    }
                }
            }
            current = parent;
        }
        None
    }

    /// Axis step off a sibling carrying a trustworthy id
    fn sibling_axis_path(&self, env: &SynthEnv<'_>, tag: &str) -> Option<String> {
        let parent = env.tree.parent(env.target)?;
        let siblings = env.tree.children(parent);
        let pos = siblings.iter().position(|&s| s == env.target)?;

        let mut order: Vec<usize> = (0..siblings.len()).filter(|&i| i != pos).collect();
        order.sort_by_key(|&i| (i as isize - pos as isize).unsigned_abs());

        for i in order {
            let (sib_tag, id) = match (
                env.tree.tag(siblings[i]),
                trustworthy_id(env.tree, siblings[i]),
            ) {
                (Some(t), Some(id)) => (t, id),
                _ => continue,
            };
            let axis = if i < pos {
                "following-sibling"
            } else {
                "preceding-sibling"
            };
            // Offset counts same-tag siblings between anchor and target
            let span: Vec<usize> = if i < pos {
                (i + 1..=pos).collect()
            } else {
                (pos..i).collect()
            };
            let offset = span
                .iter()
                .filter(|&&idx| env.tree.tag(siblings[idx]).as_deref() == Some(tag))
                .count()
                .max(1);
            return Some(format!(
                "{anchor}/{axis}::{tag}[{offset}]",
                anchor = expr::attr_eq(&sib_tag, "id", &id)
            ));
        }
        None
    }
}
