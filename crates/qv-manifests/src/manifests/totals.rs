//! Totals manifest: one big number per series, no splits

use qv_core::Splits;

use super::{Manifest, Visualization};
use crate::predicates::no_splits;
use crate::resolve::{Adjustment, Resolve, NORMAL_PRIORITY_ACTION};
use crate::rules::{Action, RulesEvaluator};
use crate::ManifestError;

pub fn manifest() -> Result<Manifest, ManifestError> {
    let rules = RulesEvaluator::builder()
        .rule(
            "has splits",
            no_splits().negate(),
            Action::new(|_| {
                Resolve::automatic(
                    NORMAL_PRIORITY_ACTION,
                    "Totals shows no splits; removing them",
                    Adjustment::splits(Splits::empty()),
                )
            }),
        )
        .otherwise(Action::new(|ctx| Resolve::ready(if ctx.is_selected_visualization { 10 } else { 3 })))
        .build()?;

    Manifest::new(Visualization::Totals, rules)
}
