//! Bar chart manifest

use qv_core::DimensionKind;
use tracing::debug;

use super::{Manifest, Visualization};
use crate::actions::{manual_dimension_selection, remove_excessive_splits};
use crate::predicates::{has_disallowed_split_kind, no_splits, supported_splits_count};
use crate::resolutions::Resolutions;
use crate::resolve::{Adjustment, Resolve, NORMAL_PRIORITY_ACTION};
use crate::rules::{Action, RuleContext, RulesEvaluator};
use crate::ManifestError;

pub const BAR_CHART_MAX_SPLITS: usize = 2;

const BAR_LIMIT: u32 = 25;
/// Bars suit yes/no dimensions well
const BOOLEAN_BOOST: u32 = 2;

pub fn manifest() -> Result<Manifest, ManifestError> {
    let rules = RulesEvaluator::builder()
        .rule(
            "no splits",
            no_splits(),
            manual_dimension_selection("The Bar Chart requires at least one split"),
        )
        .rule(
            "too many splits",
            supported_splits_count(BAR_CHART_MAX_SPLITS),
            remove_excessive_splits(Visualization::BarChart.title(), BAR_CHART_MAX_SPLITS),
        )
        .rule(
            "time split",
            has_disallowed_split_kind(vec![DimensionKind::Time]),
            Action::new(|ctx| {
                Resolve::manual(
                    NORMAL_PRIORITY_ACTION,
                    "The Bar Chart does not support time splits",
                    Resolutions::some_dimensions(ctx.data_cube),
                )
            }),
        )
        .otherwise(Action::new(adjust_splits))
        .build()?;

    Manifest::new(Visualization::BarChart, rules)
}

fn adjust_splits(ctx: &RuleContext<'_>) -> Resolve {
    let cube = ctx.data_cube;
    let mut changed = false;
    let mut boost = 0;

    let splits = ctx.splits.map(|(_, split)| {
        let kind = split.kind(cube);
        if kind == Some(DimensionKind::Boolean) {
            boost = BOOLEAN_BOOST;
        }

        let mut split = split.clone();
        if split.sort.is_none() {
            split = split.change_sort(cube.default_sort());
            changed = true;
        }
        if split.limit.is_none() && kind != Some(DimensionKind::Time) {
            split = split.change_limit(Some(BAR_LIMIT));
            changed = true;
        }
        split
    });

    let mut adjustment = Adjustment::splits(splits);
    if ctx.colors.is_some() {
        adjustment = adjustment.clearing_colors();
        changed = true;
    }

    if changed {
        debug!("Bar chart filled in sorts and limits");
        Resolve::automatic(5 + boost, "Bar Chart adjusted sorts and limits", adjustment)
    } else {
        Resolve::ready(if ctx.is_selected_visualization { 10 } else { 7 + boost })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{state_with_splits, wiki_cube};
    use qv_core::{Colors, QueryState};

    fn evaluate(state: &QueryState, selected: bool) -> Resolve {
        manifest().unwrap().evaluate(state, selected)
    }

    #[test]
    fn test_no_splits_is_manual() {
        let resolve = evaluate(&state_with_splits(wiki_cube(), &[]), true);
        assert!(resolve.is_manual());
        assert_eq!(resolve.description(), Some("The Bar Chart requires at least one split"));
        assert_eq!(resolve.resolutions().len(), 2);
    }

    #[test]
    fn test_time_split_is_manual() {
        let resolve = evaluate(&state_with_splits(wiki_cube(), &["country", "time"]), false);
        assert!(resolve.is_manual());
        assert_eq!(resolve.description(), Some("The Bar Chart does not support time splits"));
    }

    #[test]
    fn test_sorts_and_limits_filled_in() {
        let state = state_with_splits(wiki_cube(), &["country", "channel"]);
        let resolve = evaluate(&state, false);

        assert_eq!(resolve.score(), 5);
        let adjusted = resolve.adjustment().unwrap().apply(&state);
        for split in adjusted.splits() {
            assert_eq!(split.sort, Some(adjusted.data_cube().default_sort()));
            assert_eq!(split.limit, Some(25));
        }
        assert_eq!(evaluate(&adjusted, false), Resolve::ready(7));
        assert_eq!(evaluate(&adjusted, true), Resolve::ready(10));
    }

    #[test]
    fn test_boolean_split_is_boosted() {
        let state = state_with_splits(wiki_cube(), &["is_robot"]);
        let resolve = evaluate(&state, false);
        assert_eq!(resolve.score(), 7);

        let adjusted = resolve.adjustment().unwrap().apply(&state);
        assert_eq!(evaluate(&adjusted, false), Resolve::ready(9));
    }

    #[test]
    fn test_colors_are_cleared() {
        let state = state_with_splits(wiki_cube(), &["country"]).change_colors(Some(Colors::new("country")));
        let resolve = evaluate(&state, false);

        assert!(resolve.adjustment().unwrap().clear_colors);
    }
}
