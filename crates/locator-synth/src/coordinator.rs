//! Synthesis coordinator
//!
//! Owns the feature extractor, strategy manager and result cache, and
//! exposes the engine's entry points. `generate` never returns an error:
//! every failure path degrades to a position-indexed fallback first and to
//! a structured failure result last.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use tree_adapter::{EvalOracle, NodeId, TreeAdapter};

use crate::cache::ResultCache;
use crate::config::SynthConfig;
use crate::errors::SynthError;
use crate::expr;
use crate::features::{FeatureExtractor, FeatureSnapshot};
use crate::ranker::StrategyManager;
use crate::strategies::support::trustworthy_id;
use crate::strategies::{Candidate, StrategyContext, SynthEnv};

/// Condensed description of the target element, carried in every result
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ElementSummary {
    pub tag: String,
    pub text: String,
    pub id: Option<String>,
    pub class_name: Option<String>,
}

/// Outcome of one generation pass
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    pub primary: Option<Candidate>,
    pub alternatives: Vec<Candidate>,
    pub element: ElementSummary,
    pub error: Option<String>,
    /// Unix timestamp in milliseconds; cached results keep the original
    pub timestamp: u64,
    #[serde(skip)]
    pub snapshot: Option<Arc<FeatureSnapshot>>,
}

/// Outcome of checking one expression against one target
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub unique: bool,
    pub correct: bool,
    pub match_count: usize,
    pub message: Option<String>,
}

/// Receiver for finished generation results
///
/// The single awaitable seam in the engine; generation itself is
/// synchronous.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn deliver(&self, result: &GenerationResult) -> Result<(), SynthError>;
}

pub struct Synthesizer {
    extractor: FeatureExtractor,
    results: ResultCache,
    manager: StrategyManager,
    config: SynthConfig,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synthesizer {
    pub fn new() -> Self {
        Self::with_config(SynthConfig::default())
    }

    pub fn with_config(config: SynthConfig) -> Self {
        Self {
            extractor: FeatureExtractor::new(config.feature_ttl),
            results: ResultCache::new(config.result_ttl),
            manager: StrategyManager::new(),
            config,
        }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Generate a locator for `target`.
    ///
    /// Never returns an error: strategy failures fall back to a
    /// position-indexed path, and only when even that cannot be built does
    /// the result report failure.
    pub fn generate(
        &self,
        tree: &dyn TreeAdapter,
        oracle: &dyn EvalOracle,
        target: NodeId,
    ) -> GenerationResult {
        let tag = match tree.tag(target).filter(|t| !t.starts_with('#')) {
            Some(tag) => tag,
            None => {
                return self.failure(
                    ElementSummary::default(),
                    None,
                    SynthError::InvalidElement("node has no element tag".into()),
                );
            }
        };

        let fingerprint = self.fingerprint(tree, target, &tag);
        if let Some(cached) = self.results.get(&fingerprint) {
            debug!(%fingerprint, "returning cached result");
            return cached;
        }

        let snapshot = match self.extractor.analyze(tree, target) {
            Ok(snapshot) => snapshot,
            Err(err) => return self.failure(ElementSummary::default(), None, err),
        };
        let element = summarize(&snapshot);

        let env = SynthEnv {
            tree,
            oracle,
            scope: tree.root(),
            target,
            config: &self.config,
        };
        let ctx = StrategyContext::new(Arc::clone(&snapshot));

        match self.manager.rank(&env, &ctx) {
            Ok(ranked) => {
                info!(
                    strategy = %ranked.primary.strategy,
                    expression = %ranked.primary.expression,
                    score = ranked.primary.score,
                    "locator generated"
                );
                let result = GenerationResult {
                    success: true,
                    primary: Some(ranked.primary),
                    alternatives: ranked.alternatives,
                    element,
                    error: None,
                    timestamp: now_millis(),
                    snapshot: Some(snapshot),
                };
                self.results.put(fingerprint, result.clone());
                self.results.evict_expired();
                result
            }
            Err(err) => {
                warn!(error = %err, "strategies exhausted, trying positional fallback");
                match self.fallback_expression(tree, target) {
                    Some(expression) => {
                        // Provisional: the fallback skips oracle validation
                        let candidate = Candidate {
                            strategy: "fallback".to_string(),
                            expression,
                            score: self.config.scores.fallback_score,
                            priority: 0,
                            provisional: true,
                        };
                        GenerationResult {
                            success: true,
                            primary: Some(candidate),
                            alternatives: Vec::new(),
                            element,
                            error: None,
                            timestamp: now_millis(),
                            snapshot: Some(snapshot),
                        }
                    }
                    None => self.failure(
                        element,
                        Some(snapshot),
                        SynthError::FallbackFailed(err.to_string()),
                    ),
                }
            }
        }
    }

    /// Check an expression against an expected target
    pub fn validate(
        &self,
        oracle: &dyn EvalOracle,
        scope: NodeId,
        expression: &str,
        target: NodeId,
    ) -> ValidationReport {
        match oracle.evaluate(expression, scope) {
            Ok(matches) => {
                let unique = matches.len() == 1;
                let correct = matches.contains(&target);
                ValidationReport {
                    valid: unique && correct,
                    unique,
                    correct,
                    match_count: matches.len(),
                    message: if unique && correct {
                        None
                    } else {
                        Some(format!(
                            "expression matched {} node(s), target {}",
                            matches.len(),
                            if correct { "included" } else { "not included" }
                        ))
                    },
                }
            }
            Err(err) => ValidationReport {
                valid: false,
                unique: false,
                correct: false,
                match_count: 0,
                message: Some(err.to_string()),
            },
        }
    }

    /// Generate and hand the result to `sink`.
    ///
    /// Delivery failures are logged, never propagated; the caller still
    /// gets the result.
    pub async fn generate_and_deliver(
        &self,
        tree: &dyn TreeAdapter,
        oracle: &dyn EvalOracle,
        target: NodeId,
        sink: &dyn ResultSink,
    ) -> GenerationResult {
        let result = self.generate(tree, oracle, target);
        if let Err(err) = sink.deliver(&result).await {
            warn!(error = %err, "result delivery failed");
        }
        result
    }

    pub fn clear_caches(&self) {
        self.results.clear();
        self.extractor.clear();
    }

    fn failure(
        &self,
        element: ElementSummary,
        snapshot: Option<Arc<FeatureSnapshot>>,
        err: SynthError,
    ) -> GenerationResult {
        warn!(error = %err, "generation failed");
        GenerationResult {
            success: false,
            primary: None,
            alternatives: Vec::new(),
            element,
            error: Some(err.to_string()),
            timestamp: now_millis(),
            snapshot,
        }
    }

    /// Cache key: tag-indexed ancestor path plus an attribute hash. Two
    /// structurally identical nodes with different attributes never share
    /// a key.
    fn fingerprint(&self, tree: &dyn TreeAdapter, target: NodeId, tag: &str) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut segments = vec![expr::positional_segment(tag, tree.same_tag_index(target))];
        let mut current = target;
        while let Some(parent) = tree.parent(current) {
            if let Some(ptag) = tree.tag(parent) {
                segments.push(expr::positional_segment(&ptag, tree.same_tag_index(parent)));
            }
            current = parent;
        }
        segments.reverse();

        let mut attrs = tree.attributes(target);
        attrs.sort();
        let mut hasher = DefaultHasher::new();
        attrs.hash(&mut hasher);
        format!("{}|{:016x}", segments.join("/"), hasher.finish())
    }

    /// Position-indexed path anchored at the nearest trustworthy-id
    /// ancestor, or at the document root when no such ancestor exists
    fn fallback_expression(&self, tree: &dyn TreeAdapter, target: NodeId) -> Option<String> {
        let mut segments = Vec::new();
        let mut current = target;
        loop {
            let tag = tree.tag(current)?;
            match tree.parent(current) {
                Some(parent) => {
                    segments.push(expr::positional_segment(&tag, tree.same_tag_index(current)));
                    if let Some(id) = trustworthy_id(tree, parent) {
                        segments.reverse();
                        return Some(format!(
                            "//*[@id={}]/{}",
                            expr::literal(&id),
                            segments.join("/")
                        ));
                    }
                    current = parent;
                }
                None => {
                    // Reached the root; absolute path from it
                    segments.push(tag);
                    segments.reverse();
                    return Some(format!("/{}", segments.join("/")));
                }
            }
        }
    }
}

fn summarize(snapshot: &FeatureSnapshot) -> ElementSummary {
    ElementSummary {
        tag: snapshot.basic.tag.clone(),
        text: snapshot.text.direct.clone(),
        id: snapshot.basic.id.clone(),
        class_name: snapshot.basic.class_name.clone(),
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_adapter::{VirtualTree, XPathOracle};

    fn tree() -> VirtualTree {
        VirtualTree::from_json(
            r#"{
                "tag": "html",
                "children": [
                    { "tag": "body", "children": [
                        { "tag": "main", "attrs": { "id": "content" }, "children": [
                            { "tag": "div", "children": [
                                { "tag": "span", "text": "Status" },
                                { "tag": "span" }
                            ]}
                        ]}
                    ]}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_generate_reports_invalid_element_instead_of_erroring() {
        let tree = VirtualTree::from_json(
            r##"{"tag":"html","children":[{"tag":"#comment"}]}"##,
        )
        .unwrap();
        let oracle = XPathOracle::new(&tree);
        let synthesizer = Synthesizer::new();
        let comment = tree.children(tree.root())[0];
        let result = synthesizer.generate(&tree, &oracle, comment);
        assert!(!result.success);
        assert!(result.primary.is_none());
        assert!(result.error.as_deref().unwrap_or("").contains("Invalid"));
    }

    #[test]
    fn test_fallback_anchors_at_id_ancestor() {
        let tree = tree();
        let synthesizer = Synthesizer::new();
        // Second span: no text, no attributes
        let container = tree.node_by_id("content").unwrap();
        let div = tree.children(container)[0];
        let bare_span = tree.children(div)[1];
        let expression = synthesizer.fallback_expression(&tree, bare_span).unwrap();
        assert_eq!(expression, "//*[@id='content']/div[1]/span[2]");
    }

    #[test]
    fn test_fallback_is_absolute_without_id_ancestor() {
        let tree = VirtualTree::from_json(
            r#"{"tag":"html","children":[{"tag":"body","children":[{"tag":"p"}]}]}"#,
        )
        .unwrap();
        let synthesizer = Synthesizer::new();
        let body = tree.children(tree.root())[0];
        let p = tree.children(body)[0];
        let expression = synthesizer.fallback_expression(&tree, p).unwrap();
        assert_eq!(expression, "/html/body[1]/p[1]");
    }

    #[test]
    fn test_validate_reports_ambiguity() {
        let tree = tree();
        let oracle = XPathOracle::new(&tree);
        let synthesizer = Synthesizer::new();
        let container = tree.node_by_id("content").unwrap();
        let div = tree.children(container)[0];
        let first_span = tree.children(div)[0];

        let report = synthesizer.validate(&oracle, tree.root(), "//span", first_span);
        assert!(!report.valid);
        assert!(!report.unique);
        assert!(report.correct);
        assert_eq!(report.match_count, 2);

        let report = synthesizer.validate(
            &oracle,
            tree.root(),
            "//span[normalize-space(text())='Status']",
            first_span,
        );
        assert!(report.valid);
        assert_eq!(report.match_count, 1);
        assert!(report.message.is_none());
    }

    #[test]
    fn test_validate_surfaces_syntax_errors() {
        let tree = tree();
        let oracle = XPathOracle::new(&tree);
        let synthesizer = Synthesizer::new();
        let report = synthesizer.validate(&oracle, tree.root(), "///[", tree.root());
        assert!(!report.valid);
        assert!(report.message.is_some());
    }

    #[test]
    fn test_cached_result_is_returned_verbatim() {
        let tree = tree();
        let oracle = XPathOracle::new(&tree);
        let synthesizer = Synthesizer::new();
        let container = tree.node_by_id("content").unwrap();
        let div = tree.children(container)[0];
        let first_span = tree.children(div)[0];

        let first = synthesizer.generate(&tree, &oracle, first_span);
        let second = synthesizer.generate(&tree, &oracle, first_span);
        assert!(first.success);
        assert_eq!(first.timestamp, second.timestamp);
        assert_eq!(
            first.primary.as_ref().map(|c| &c.expression),
            second.primary.as_ref().map(|c| &c.expression)
        );
    }
}
