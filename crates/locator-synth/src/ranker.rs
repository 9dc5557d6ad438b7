//! Strategy manager and candidate ranking
//!
//! Runs every applicable strategy in priority order, contains per-strategy
//! failures, applies cross-cutting score adjustments, and picks a primary
//! candidate with up to two alternatives.

use tracing::{debug, warn};

use crate::errors::SynthError;
use crate::heuristics::class_list_is_machine_generated;
use crate::strategies::{
    AnchorStrategy, AttributeStrategy, Candidate, ContainerStrategy, PositionalStrategy,
    ShadowStrategy, Strategy, StrategyContext, SvgStrategy, SynthEnv, TextStrategy,
};

/// How many runner-up candidates a ranking keeps
const MAX_ALTERNATIVES: usize = 2;

/// Outcome of one ranking pass
#[derive(Debug)]
pub struct RankedCandidates {
    pub primary: Candidate,
    pub alternatives: Vec<Candidate>,
}

pub struct StrategyManager {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Default for StrategyManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyManager {
    /// Manager with the full built-in strategy set
    pub fn new() -> Self {
        let mut manager = Self {
            strategies: Vec::new(),
        };
        manager.register(Box::new(TextStrategy));
        manager.register(Box::new(AttributeStrategy));
        manager.register(Box::new(AnchorStrategy));
        manager.register(Box::new(ContainerStrategy));
        manager.register(Box::new(ShadowStrategy));
        manager.register(Box::new(SvgStrategy));
        manager.register(Box::new(PositionalStrategy));
        manager
    }

    /// Append a strategy and restore descending priority order. The sort is
    /// stable, so equal-priority strategies keep registration order.
    pub fn register(&mut self, strategy: Box<dyn Strategy>) {
        self.strategies.push(strategy);
        self.strategies.sort_by_key(|s| std::cmp::Reverse(s.priority()));
    }

    /// Generate and rank candidates for the target in `env`.
    ///
    /// Strategy errors are contained here: a failing strategy is logged and
    /// skipped, never allowed to block its peers.
    pub fn rank(
        &self,
        env: &SynthEnv<'_>,
        ctx: &StrategyContext,
    ) -> Result<RankedCandidates, SynthError> {
        let mut candidates = Vec::new();
        let mut any_applicable = false;

        for strategy in &self.strategies {
            if !strategy.is_applicable(env, ctx) {
                continue;
            }
            any_applicable = true;
            match strategy.generate(env, ctx) {
                Ok(Some(formulation)) => {
                    let score = strategy.score(env, ctx) + formulation.bonus;
                    debug!(
                        strategy = strategy.name(),
                        expression = %formulation.expression,
                        score,
                        "strategy produced a candidate"
                    );
                    candidates.push(Candidate {
                        strategy: strategy.name().to_string(),
                        expression: formulation.expression,
                        score,
                        priority: strategy.priority(),
                        provisional: false,
                    });
                }
                Ok(None) => {
                    debug!(strategy = strategy.name(), "no valid formulation");
                }
                Err(err) => {
                    warn!(strategy = strategy.name(), error = %err, "strategy failed; continuing");
                }
            }
        }

        if !any_applicable {
            return Err(SynthError::NoApplicableStrategy);
        }
        if candidates.is_empty() {
            return Err(SynthError::AllStrategiesFailed);
        }

        self.adjust_scores(env, ctx, &mut candidates);

        // Stable sort keeps priority order among equal scores
        candidates.sort_by_key(|c| std::cmp::Reverse(c.score));

        let primary = candidates.remove(0);
        candidates.truncate(MAX_ALTERNATIVES);
        Ok(RankedCandidates {
            primary,
            alternatives: candidates,
        })
    }

    /// Cross-cutting adjustments no single strategy can see
    fn adjust_scores(
        &self,
        env: &SynthEnv<'_>,
        ctx: &StrategyContext,
        candidates: &mut [Candidate],
    ) {
        let machine_classes = ctx
            .snapshot
            .basic
            .class_name
            .as_deref()
            .map(class_list_is_machine_generated)
            .unwrap_or(false);
        if !machine_classes {
            return;
        }
        for candidate in candidates.iter_mut() {
            if candidate.strategy == "attribute" {
                candidate.score -= env.config.scores.random_class_penalty;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SynthConfig;
    use crate::features::FeatureExtractor;
    use std::time::Duration;
    use tree_adapter::{NodeId, NodeSpec, TreeAdapter, VirtualTree, XPathOracle};

    fn tree_from(json: &str) -> VirtualTree {
        let spec: NodeSpec = serde_json::from_str(json).unwrap();
        VirtualTree::from_spec(&spec)
    }

    fn context_for(tree: &VirtualTree, target: NodeId) -> StrategyContext {
        let extractor = FeatureExtractor::new(Duration::from_secs(5));
        let snapshot = extractor.analyze(tree, target).unwrap();
        StrategyContext::new(snapshot)
    }

    #[test]
    fn test_text_outranks_attribute() {
        let tree = tree_from(
            r#"{"tag":"html","children":[{"tag":"body","children":[
                {"tag":"button","attrs":{"id":"save"},"text":"Save changes"}
            ]}]}"#,
        );
        let target = tree.node_by_id("save").unwrap();
        let oracle = XPathOracle::new(&tree);
        let config = SynthConfig::default();
        let env = SynthEnv {
            tree: &tree,
            oracle: &oracle,
            scope: tree.root(),
            target,
            config: &config,
        };
        let ctx = context_for(&tree, target);

        let ranked = StrategyManager::new().rank(&env, &ctx).unwrap();
        assert_eq!(ranked.primary.strategy, "text");
        assert_eq!(ranked.primary.score, 210);
        assert!(ranked
            .alternatives
            .iter()
            .any(|c| c.strategy == "attribute"));
        assert!(ranked.alternatives.len() <= 2);
    }

    #[test]
    fn test_machine_classes_penalize_attribute_candidates() {
        let tree = tree_from(
            r#"{"tag":"html","children":[{"tag":"body","children":[
                {"tag":"div","attrs":{"class":"css-1x2y3z4","data-testid":"panel"}},
                {"tag":"div","attrs":{"class":"sidebar"}}
            ]}]}"#,
        );
        let target = tree
            .find(|n| tree.attribute(n, "data-testid").is_some())
            .unwrap();
        let oracle = XPathOracle::new(&tree);
        let config = SynthConfig::default();
        let env = SynthEnv {
            tree: &tree,
            oracle: &oracle,
            scope: tree.root(),
            target,
            config: &config,
        };
        let ctx = context_for(&tree, target);

        let ranked = StrategyManager::new().rank(&env, &ctx).unwrap();
        let attribute = std::iter::once(&ranked.primary)
            .chain(ranked.alternatives.iter())
            .find(|c| c.strategy == "attribute")
            .expect("attribute candidate present");
        // 100 base + 25 data bonus - 50 machine-class penalty
        assert_eq!(attribute.score, 75);
    }

    #[test]
    fn test_bare_root_has_no_applicable_strategy() {
        let tree = tree_from(r#"{"tag":"html"}"#);
        let oracle = XPathOracle::new(&tree);
        let config = SynthConfig::default();
        let env = SynthEnv {
            tree: &tree,
            oracle: &oracle,
            scope: tree.root(),
            target: tree.root(),
            config: &config,
        };
        let ctx = context_for(&tree, tree.root());

        let err = StrategyManager::new().rank(&env, &ctx).unwrap_err();
        assert!(matches!(err, SynthError::NoApplicableStrategy));
        assert!(err.is_contained());
    }
}
