//! Heatmap manifest: two splits crossed, one measure as the color

use tracing::debug;

use super::{Manifest, Visualization};
use crate::actions::{manual_dimension_selection, manual_measures_selection};
use crate::predicates::{number_of_series_is_not, number_of_splits_is_not};
use crate::resolve::{Adjustment, Resolve, HIGH_PRIORITY_ACTION};
use crate::rules::{Action, RuleContext, RulesEvaluator};
use crate::ManifestError;

const HEATMAP_LIMIT: u32 = 25;

pub fn manifest() -> Result<Manifest, ManifestError> {
    let rules = RulesEvaluator::builder()
        .rule(
            "not two splits",
            number_of_splits_is_not(2),
            manual_dimension_selection("The Heatmap requires exactly two splits"),
        )
        .rule("not one series", number_of_series_is_not(1), manual_measures_selection())
        .otherwise(Action::new(adjust_splits))
        .build()?;

    Manifest::new(Visualization::Heatmap, rules)
}

fn adjust_splits(ctx: &RuleContext<'_>) -> Resolve {
    let mut changed = false;
    let splits = ctx.splits.map(|(_, split)| {
        let mut split = split.clone();
        if split.sort.is_none() {
            split = split.change_sort(ctx.data_cube.default_sort());
            changed = true;
        }
        if split.limit.is_none() {
            split = split.change_limit(Some(HEATMAP_LIMIT));
            changed = true;
        }
        split
    });

    if changed {
        debug!("Heatmap filled in sorts and limits");
        Resolve::automatic(HIGH_PRIORITY_ACTION, "Heatmap adjusted sorts and limits", Adjustment::splits(splits))
    } else {
        Resolve::ready(if ctx.is_selected_visualization { 10 } else { 3 })
    }
}
