//! Attribute strategy
//!
//! Builds candidates from the stable attribute tiers, in pinned trust
//! order: id, name, the remaining priority attributes, filtered class
//! names (single then pair), stable data attributes.

use crate::errors::SynthError;
use crate::expr;
use crate::heuristics::filtered_class_tokens;
use crate::strategies::{Formulation, Strategy, StrategyContext, SynthEnv};

const PRIORITY: i32 = 100;

pub struct AttributeStrategy;

impl Strategy for AttributeStrategy {
    fn name(&self) -> &'static str {
        "attribute"
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn is_applicable(&self, _env: &SynthEnv<'_>, ctx: &StrategyContext) -> bool {
        !ctx.snapshot.attributes.stable.is_empty()
            || ctx
                .snapshot
                .basic
                .class_name
                .as_deref()
                .map(|c| !filtered_class_tokens(c).is_empty())
                .unwrap_or(false)
    }

    fn generate(
        &self,
        env: &SynthEnv<'_>,
        ctx: &StrategyContext,
    ) -> Result<Option<Formulation>, SynthError> {
        let snap = &ctx.snapshot;
        let tag = &snap.basic.tag;
        let scores = &env.config.scores;
        let mut formulations = Vec::new();

        let stable_value = |name: &str| {
            snap.attributes
                .stable
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
        };

        if let Some(id) = stable_value("id") {
            formulations.push(
                Formulation::new(expr::attr_eq(tag, "id", &id)).with_bonus(scores.id_bonus),
            );
        }
        if let Some(name) = stable_value("name") {
            formulations.push(
                Formulation::new(expr::attr_eq(tag, "name", &name)).with_bonus(scores.name_bonus),
            );
        }
        for (attr, value) in &snap.attributes.priority {
            if attr == "id" || attr == "name" {
                continue;
            }
            formulations.push(
                Formulation::new(expr::attr_eq(tag, attr, value))
                    .with_bonus(scores.priority_attr_bonus),
            );
        }

        if let Some(class) = snap.basic.class_name.as_deref() {
            let tokens = filtered_class_tokens(class);
            for token in &tokens {
                formulations.push(
                    Formulation::new(expr::class_contains(tag, token))
                        .with_bonus(scores.class_bonus),
                );
            }
            for pair in tokens.windows(2) {
                formulations.push(
                    Formulation::new(expr::class_pair(tag, &pair[0], &pair[1]))
                        .with_bonus(scores.class_bonus),
                );
            }
        }

        for (attr, value) in &snap.attributes.data {
            formulations.push(
                Formulation::new(expr::attr_eq(tag, attr, value))
                    .with_bonus(scores.data_attr_bonus),
            );
        }

        Ok(env.first_valid(formulations))
    }
}
