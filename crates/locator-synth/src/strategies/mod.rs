//! Candidate-generating strategies
//!
//! Peer implementations of one `Strategy` contract. Each strategy decides
//! applicability from the feature snapshot, tries an internal ordered list
//! of formulations, and returns its first oracle-validated expression.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tree_adapter::{EvalOracle, NodeId, TreeAdapter};

use crate::config::SynthConfig;
use crate::errors::SynthError;
use crate::features::FeatureSnapshot;
use crate::heuristics::FrameworkKind;

pub mod anchor;
pub mod attribute;
pub mod container;
pub mod positional;
pub mod shadow;
pub mod support;
pub mod svg;
pub mod text;

pub use anchor::AnchorStrategy;
pub use attribute::AttributeStrategy;
pub use container::ContainerStrategy;
pub use positional::PositionalStrategy;
pub use shadow::ShadowStrategy;
pub use svg::SvgStrategy;
pub use text::TextStrategy;

/// One locator candidate proposed by a strategy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub strategy: String,
    pub expression: String,
    pub score: i32,
    pub priority: i32,
    /// Provisional candidates skipped oracle validation (fallback only)
    #[serde(default)]
    pub provisional: bool,
}

/// A winning formulation plus its formulation-specific score bonus
#[derive(Clone, Debug)]
pub struct Formulation {
    pub expression: String,
    pub bonus: i32,
}

impl Formulation {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            bonus: 0,
        }
    }

    pub fn with_bonus(mut self, bonus: i32) -> Self {
        self.bonus = bonus;
        self
    }
}

/// Everything a strategy needs to generate and validate candidates
pub struct SynthEnv<'a> {
    pub tree: &'a dyn TreeAdapter,
    pub oracle: &'a dyn EvalOracle,
    /// Evaluation scope for validation; the document root
    pub scope: NodeId,
    pub target: NodeId,
    pub config: &'a SynthConfig,
}

impl<'a> SynthEnv<'a> {
    /// Expression resolves to exactly the target from the document scope
    pub fn validated(&self, expression: &str) -> bool {
        self.oracle.matches(expression, self.scope, self.target)
    }

    /// First formulation that the oracle validates
    pub fn first_valid<I>(&self, formulations: I) -> Option<Formulation>
    where
        I: IntoIterator<Item = Formulation>,
    {
        formulations
            .into_iter()
            .find(|f| self.validated(&f.expression))
    }
}

/// Shared per-generation context built once by the strategy manager
#[derive(Clone)]
pub struct StrategyContext {
    pub snapshot: Arc<FeatureSnapshot>,
    pub framework: FrameworkKind,
    pub in_shadow: bool,
}

impl StrategyContext {
    pub fn new(snapshot: Arc<FeatureSnapshot>) -> Self {
        let framework = snapshot.framework.kind;
        let in_shadow = snapshot.context.in_shadow_scope;
        Self {
            snapshot,
            framework,
            in_shadow,
        }
    }
}

/// Candidate strategy contract
///
/// `generate` returns at most one expression: the first formulation in the
/// strategy's internal order that passes oracle validation. Errors are
/// contained by the manager; a failing strategy never blocks its peers.
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Higher priority is tried and weighted first
    fn priority(&self) -> i32;

    fn is_applicable(&self, env: &SynthEnv<'_>, ctx: &StrategyContext) -> bool;

    fn generate(
        &self,
        env: &SynthEnv<'_>,
        ctx: &StrategyContext,
    ) -> Result<Option<Formulation>, SynthError>;

    /// Base score of this strategy's candidates; default is the priority
    fn score(&self, env: &SynthEnv<'_>, ctx: &StrategyContext) -> i32 {
        let _ = (env, ctx);
        self.priority()
    }
}
