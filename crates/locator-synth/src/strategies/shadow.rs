//! Shadow-boundary strategy
//!
//! Targets living inside detached shadow scopes are unreachable from a
//! document-level expression. The strategy resolves every shadow host in
//! the chain with its own expression, validates the trailing segment
//! inside the innermost scope, and joins the segments with the
//! shadow-piercing separator.

use tree_adapter::NodeId;

use crate::errors::SynthError;
use crate::expr;
use crate::heuristics::filtered_class_tokens;
use crate::strategies::support::{rank_among_matches, relative_positional_path, trustworthy_id};
use crate::strategies::{Formulation, Strategy, StrategyContext, SynthEnv};

const PRIORITY: i32 = 90;

pub struct ShadowStrategy;

impl Strategy for ShadowStrategy {
    fn name(&self) -> &'static str {
        "shadow"
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn is_applicable(&self, _env: &SynthEnv<'_>, ctx: &StrategyContext) -> bool {
        ctx.in_shadow
    }

    fn generate(
        &self,
        env: &SynthEnv<'_>,
        ctx: &StrategyContext,
    ) -> Result<Option<Formulation>, SynthError> {
        // Host chain, outermost first, with the scope each host lives in
        let mut chain: Vec<(NodeId, NodeId)> = Vec::new();
        let mut scope_root = match env.tree.containing_shadow_root(env.target) {
            Some(root) => root,
            None => return Ok(None),
        };
        let innermost_scope = scope_root;
        loop {
            let host = match env.tree.shadow_host(scope_root) {
                Some(host) => host,
                None => break,
            };
            let host_scope = env
                .tree
                .containing_shadow_root(host)
                .unwrap_or(env.scope);
            chain.push((host, host_scope));
            match env.tree.containing_shadow_root(host) {
                Some(outer) => scope_root = outer,
                None => break,
            }
        }
        chain.reverse();

        let mut segments = Vec::new();
        for (host, host_scope) in chain {
            match self.host_expr(env, host, host_scope) {
                Some(segment) => segments.push(segment),
                None => return Ok(None),
            }
        }

        let trailing = match self.inner_expr(env, ctx, innermost_scope) {
            Some(found) => found,
            None => return Ok(None),
        };
        segments.push(trailing);

        let expression = segments.join(" >>> ");
        if env.validated(&expression) {
            Ok(Some(Formulation::new(expression)))
        } else {
            Ok(None)
        }
    }
}

impl ShadowStrategy {
    /// Expression resolving one host uniquely within its own scope
    fn host_expr(&self, env: &SynthEnv<'_>, host: NodeId, scope: NodeId) -> Option<String> {
        let tag = env.tree.tag(host)?;
        let mut tries = Vec::new();
        if let Some(id) = trustworthy_id(env.tree, host) {
            tries.push(expr::attr_eq(&tag, "id", &id));
        }
        if let Some(class) = env.tree.attribute(host, "class") {
            for token in filtered_class_tokens(&class) {
                tries.push(expr::class_contains(&tag, &token));
            }
        }
        let bare = format!("//{tag}");
        tries.push(bare.clone());
        // Rank within the host's own scope, not the sibling-relative index
        if let Some(rank) = rank_among_matches(env.oracle, &bare, scope, host) {
            tries.push(expr::indexed(&bare, rank));
        }

        tries
            .into_iter()
            .find(|candidate| env.oracle.matches(candidate, scope, host))
    }

    /// Trailing segment, validated inside the innermost shadow scope
    fn inner_expr(
        &self,
        env: &SynthEnv<'_>,
        ctx: &StrategyContext,
        scope: NodeId,
    ) -> Option<String> {
        let snap = &ctx.snapshot;
        let tag = &snap.basic.tag;
        let mut tries = Vec::new();

        if !snap.text.direct.is_empty() {
            tries.push(expr::text_eq(tag, &snap.text.direct));
        }
        if let Some(id) = &snap.basic.id {
            tries.push(expr::attr_eq(tag, "id", id));
        }
        for (attr, value) in &snap.attributes.stable {
            if attr != "id" {
                tries.push(expr::attr_eq(tag, attr, value));
            }
        }
        // Scope-relative positional path; the evaluator roots relative
        // paths at the scope node
        if let Some(path) = relative_positional_path(env.tree, scope, env.target) {
            tries.push(path);
        }

        tries
            .into_iter()
            .find(|candidate| env.oracle.matches(candidate, scope, env.target))
    }
}
