//! Table manifest

use qv_core::{DimensionKind, SortDirection};
use tracing::debug;

use super::{strategy_sort, Manifest, Visualization};
use crate::actions::{manual_dimension_selection, remove_excessive_splits};
use crate::predicates::{no_splits, supported_splits_count};
use crate::resolve::{Adjustment, Resolve};
use crate::rules::{Action, RuleContext, RulesEvaluator};
use crate::ManifestError;

pub const TABLE_MAX_SPLITS: usize = 3;

const FIRST_SPLIT_LIMIT: u32 = 50;
const NESTED_SPLIT_LIMIT: u32 = 5;

pub fn manifest() -> Result<Manifest, ManifestError> {
    Manifest::new(Visualization::Table, rules(TABLE_MAX_SPLITS)?)
}

pub(crate) fn rules(max_splits: usize) -> Result<RulesEvaluator, ManifestError> {
    RulesEvaluator::builder()
        .rule(
            "no splits",
            no_splits(),
            manual_dimension_selection("The Table requires at least one split"),
        )
        .rule(
            "too many splits",
            supported_splits_count(max_splits),
            remove_excessive_splits(Visualization::Table.title(), max_splits),
        )
        .otherwise(Action::new(adjust_splits))
        .build()
}

/// Fill in sorts and limits, drop colors; all corrections in one pass
fn adjust_splits(ctx: &RuleContext<'_>) -> Resolve {
    let cube = ctx.data_cube;
    let mut auto_changed = false;

    let splits = ctx.splits.map(|(idx, split)| {
        let dimension = ctx.split_dimension(split);
        let mut split = split.clone();

        if split.sort.is_none() {
            let sort = dimension.and_then(|d| strategy_sort(cube, d, SortDirection::Descending));
            match sort {
                Some(sort) => split = split.change_sort(sort),
                None => {
                    split = split.change_sort(cube.default_sort());
                    auto_changed = true;
                }
            }
        }

        // TODO: time splits sorted through a strategy stay unlimited and are not
        // reported as changed; decide whether they should get a limit too
        let is_time = dimension.map_or(false, |d| d.kind == DimensionKind::Time);
        if split.limit.is_none() && (auto_changed || !is_time) {
            let limit = if idx == 0 { FIRST_SPLIT_LIMIT } else { NESTED_SPLIT_LIMIT };
            split = split.change_limit(Some(limit));
            auto_changed = true;
        }

        split
    });

    let mut adjustment = Adjustment::splits(splits);
    if ctx.colors.is_some() {
        adjustment = adjustment.clearing_colors();
        auto_changed = true;
    }

    if auto_changed {
        debug!("Table adjusted sorts, limits or colors");
        Resolve::automatic(6, "Table adjusted sorts, limits and colors", adjustment)
    } else {
        Resolve::ready(if ctx.is_selected_visualization { 10 } else { 8 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cube_from, state_with_splits, wiki_config, wiki_cube, wiki_cube_with_country_strategy};
    use qv_core::{Colors, QueryState, Sort, SortStrategy, Split, Splits};

    fn evaluate(state: &QueryState, selected: bool) -> Resolve {
        manifest().unwrap().evaluate(state, selected)
    }

    fn adjusted_splits(resolve: &Resolve) -> &Splits {
        resolve.adjustment().unwrap().splits.as_ref().unwrap()
    }

    fn sorted(reference: &str, limit: u32) -> Split {
        Split::new(reference)
            .change_sort(Sort::Series { reference: "count".to_string(), direction: SortDirection::Descending })
            .change_limit(Some(limit))
    }

    #[test]
    fn test_no_splits_is_manual() {
        let state = state_with_splits(wiki_cube(), &[]);
        for selected in [true, false] {
            let resolve = evaluate(&state, selected);
            assert!(resolve.is_manual());
            assert_eq!(resolve.description(), Some("The Table requires at least one split"));
        }
        assert!(rules(TABLE_MAX_SPLITS).unwrap().evaluate(&RuleContext::new(&state, false)).is_manual());
    }

    #[test]
    fn test_default_sort_and_first_limit() {
        let state = state_with_splits(wiki_cube(), &["country"]);
        let resolve = evaluate(&state, false);

        assert!(resolve.is_automatic());
        assert_eq!(resolve.score(), 6);
        let split = adjusted_splits(&resolve).get(0).unwrap();
        assert_eq!(
            split.sort,
            Some(Sort::Series { reference: "count".to_string(), direction: SortDirection::Descending })
        );
        assert_eq!(split.limit, Some(50));
    }

    #[test]
    fn test_self_sort_strategy() {
        let cube = wiki_cube_with_country_strategy(SortStrategy::SelfValue);
        let state = state_with_splits(cube, &["country"]);
        let resolve = evaluate(&state, false);

        assert!(resolve.is_automatic());
        let split = adjusted_splits(&resolve).get(0).unwrap();
        assert_eq!(
            split.sort,
            Some(Sort::Dimension { reference: "country".to_string(), direction: SortDirection::Descending })
        );
        assert_eq!(split.limit, Some(50));
    }

    #[test]
    fn test_reference_sort_strategy() {
        let state = state_with_splits(wiki_cube(), &["page"]);
        let resolve = evaluate(&state, false);

        let split = adjusted_splits(&resolve).get(0).unwrap();
        assert_eq!(
            split.sort,
            Some(Sort::Series { reference: "added".to_string(), direction: SortDirection::Descending })
        );
        assert_eq!(split.limit, Some(50));
    }

    #[test]
    fn test_nested_splits_get_smaller_limit() {
        let state = state_with_splits(wiki_cube(), &["country", "channel", "time"]);
        let resolve = evaluate(&state, false);

        let limits: Vec<Option<u32>> = adjusted_splits(&resolve).iter().map(|s| s.limit).collect();
        assert_eq!(limits, vec![Some(50), Some(5), Some(5)]);
    }

    #[test]
    fn test_time_split_with_strategy_stays_unlimited() {
        let mut config = wiki_config();
        config.dimensions[0].sort_strategy = Some(SortStrategy::SelfValue);
        let cube = cube_from(config);
        let state = state_with_splits(cube, &["time"]);

        // the strategy sort is not an automatic change and time splits need no limit
        assert_eq!(evaluate(&state, false), Resolve::ready(8));
    }

    #[test]
    fn test_time_split_without_strategy_gets_limit() {
        let state = state_with_splits(wiki_cube(), &["time"]);
        let resolve = evaluate(&state, false);

        let split = adjusted_splits(&resolve).get(0).unwrap();
        assert_eq!(split.limit, Some(50));
    }

    #[test]
    fn test_existing_sort_on_non_time_split_still_gets_limit() {
        let split = Split::new("country")
            .change_sort(Sort::Dimension { reference: "country".to_string(), direction: SortDirection::Ascending });
        let state = QueryState::from_cube(wiki_cube()).change_splits(Splits::from_split(split));
        let resolve = evaluate(&state, false);

        assert!(resolve.is_automatic());
        let adjusted = adjusted_splits(&resolve).get(0).unwrap();
        assert_eq!(adjusted.limit, Some(50));
        assert_eq!(
            adjusted.sort,
            Some(Sort::Dimension { reference: "country".to_string(), direction: SortDirection::Ascending })
        );
    }

    #[test]
    fn test_too_many_splits_truncated_in_order() {
        let state = state_with_splits(wiki_cube(), &["country", "channel", "page", "time"]);
        let resolve = evaluate(&state, false);

        assert!(resolve.is_automatic());
        let references: Vec<&str> = adjusted_splits(&resolve).iter().map(|s| s.reference.as_str()).collect();
        assert_eq!(references, ["country", "channel", "page"]);
    }

    #[test]
    fn test_three_splits_with_max_two() {
        let evaluator = rules(2).unwrap();
        let state = state_with_splits(wiki_cube(), &["page", "country", "channel"]);
        let resolve = evaluator.evaluate(&RuleContext::new(&state, false));

        assert!(resolve.is_automatic());
        let references: Vec<&str> = adjusted_splits(&resolve).iter().map(|s| s.reference.as_str()).collect();
        assert_eq!(references, ["page", "country"]);
    }

    #[test]
    fn test_colors_are_cleared() {
        let state = QueryState::from_cube(wiki_cube())
            .change_splits(Splits::new(vec![sorted("country", 50), sorted("channel", 5)]))
            .change_colors(Some(Colors::new("channel")));
        let resolve = evaluate(&state, true);

        assert!(resolve.is_automatic());
        assert_eq!(resolve.score(), 6);
        let adjustment = resolve.adjustment().unwrap();
        assert!(adjustment.clear_colors);
        assert_eq!(adjustment.splits.as_ref(), Some(state.splits()));
        assert!(adjustment.apply(&state).colors().is_none());
    }

    #[test]
    fn test_ready_priority_depends_on_selection() {
        let state = QueryState::from_cube(wiki_cube()).change_splits(Splits::from_split(sorted("country", 10)));

        assert_eq!(evaluate(&state, true), Resolve::ready(10));
        assert_eq!(evaluate(&state, false), Resolve::ready(8));
    }

    #[test]
    fn test_adjustment_is_idempotent() {
        let cube = wiki_cube();
        let cases: [&[&str]; 4] = [&["country"], &["time"], &["country", "time"], &["page", "channel", "delta"]];
        for references in cases {
            let state = state_with_splits(cube.clone(), references);
            let resolve = evaluate(&state, true);
            assert!(resolve.is_automatic(), "{:?} should need adjusting", references);

            let adjusted = resolve.adjustment().unwrap().apply(&state);
            assert_eq!(evaluate(&adjusted, true), Resolve::ready(10), "{:?} should settle", references);
        }
    }
}
