//! Container-context strategy
//!
//! Scopes a text match under the nearest ancestor that is uniquely
//! identifiable or a semantic container, so the same label stays
//! resolvable when it repeats elsewhere on the page.

use crate::errors::SynthError;
use crate::expr;
use crate::strategies::support::find_container_ancestor;
use crate::strategies::{Formulation, Strategy, StrategyContext, SynthEnv};

const PRIORITY: i32 = 90;

pub struct ContainerStrategy;

impl Strategy for ContainerStrategy {
    fn name(&self) -> &'static str {
        "container"
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn is_applicable(&self, env: &SynthEnv<'_>, ctx: &StrategyContext) -> bool {
        !ctx.snapshot.text.direct.is_empty()
            && find_container_ancestor(env.tree, env.oracle, env.scope, env.target).is_some()
    }

    fn generate(
        &self,
        env: &SynthEnv<'_>,
        ctx: &StrategyContext,
    ) -> Result<Option<Formulation>, SynthError> {
        let (_, container) =
            match find_container_ancestor(env.tree, env.oracle, env.scope, env.target) {
                Some(found) => found,
                None => return Ok(None),
            };
        let tag = &ctx.snapshot.basic.tag;
        let text = &ctx.snapshot.text.direct;

        let formulations = vec![
            Formulation::new(format!(
                "{container}//{tag}[normalize-space(text())={}]",
                expr::literal(text)
            )),
            Formulation::new(format!(
                "{container}//{tag}[contains(text(),{})]",
                expr::literal(text)
            )),
        ];
        Ok(env.first_valid(formulations))
    }
}
