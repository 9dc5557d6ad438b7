//! Strategy-based locator synthesis engine
//!
//! Given one target node in a live attributed tree, synthesize the most
//! stable expression that the evaluation oracle resolves to exactly that
//! node:
//! - feature extraction with attribute stability tiers
//! - ordered candidate strategies (text, attribute, anchor, container,
//!   shadow, svg, positional)
//! - cross-strategy scoring, ranking and tie-breaks
//! - position-indexed fallback when every strategy comes up empty
//! - TTL-bounded result caching and a validation entry point

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod errors;
pub mod expr;
pub mod features;
pub mod heuristics;
pub mod ranker;
pub mod strategies;

pub use cache::*;
pub use config::*;
pub use coordinator::*;
pub use errors::*;
pub use features::*;
pub use ranker::*;
pub use strategies::{Candidate, Formulation, Strategy, StrategyContext, SynthEnv};
