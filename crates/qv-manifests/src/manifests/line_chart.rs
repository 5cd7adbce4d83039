//! Line chart manifest
//!
//! A line chart plots its last split along the x axis, so that split has to
//! be on a continuous dimension, sorted by its own value.

use qv_core::{DimensionKind, Sort, SortDirection, SortStrategy, Split};
use tracing::debug;

use super::{strategy_sort, Manifest, Visualization};
use crate::actions::remove_excessive_splits;
use crate::predicates::{has_continuous_split, last_split_is_continuous, no_splits, supported_splits_count};
use crate::resolutions::Resolutions;
use crate::resolve::{Adjustment, Resolve, NORMAL_PRIORITY_ACTION};
use crate::rules::{Action, RuleContext, RulesEvaluator};
use crate::ManifestError;

pub const LINE_CHART_MAX_SPLITS: usize = 2;

const BASE_SCORE: u32 = 4;
const TIME_BOOST: u32 = 3;
const SELECTED_BOOST: u32 = 2;

pub fn manifest() -> Result<Manifest, ManifestError> {
    let rules = RulesEvaluator::builder()
        .rule(
            "no splits",
            no_splits(),
            Action::new(|ctx| {
                Resolve::manual(
                    NORMAL_PRIORITY_ACTION,
                    "The Line Chart requires a continuous dimension split",
                    Resolutions::continuous_dimensions(ctx.data_cube),
                )
            }),
        )
        .rule(
            "too many splits",
            supported_splits_count(LINE_CHART_MAX_SPLITS),
            remove_excessive_splits(Visualization::LineChart.title(), LINE_CHART_MAX_SPLITS),
        )
        .rule("continuous last split", last_split_is_continuous(), Action::new(normalize_last_split))
        .rule("continuous split elsewhere", has_continuous_split(), Action::new(move_continuous_last))
        .otherwise(Action::new(|ctx| {
            Resolve::manual(
                NORMAL_PRIORITY_ACTION,
                "The Line Chart needs one continuous dimension split",
                Resolutions::continuous_dimensions(ctx.data_cube),
            )
        }))
        .build()?;

    Manifest::new(Visualization::LineChart, rules)
}

/// Sort, limit and bucket the x-axis split
fn normalize_last_split(ctx: &RuleContext<'_>) -> Resolve {
    let Some(last) = ctx.splits.last() else {
        return Resolve::never();
    };
    let Some(dimension) = ctx.split_dimension(last) else {
        return Resolve::never();
    };

    let self_sort = Sort::Dimension {
        reference: dimension.name.clone(),
        direction: SortDirection::Ascending,
    };
    let sort = match &dimension.sort_strategy {
        Some(SortStrategy::Reference(_)) => last
            .sort
            .clone()
            .or_else(|| strategy_sort(ctx.data_cube, dimension, SortDirection::Ascending))
            .unwrap_or(self_sort),
        _ => self_sort,
    };

    let is_time = dimension.kind == DimensionKind::Time;
    let mut split: Split = last.clone();
    if split.sort.as_ref() != Some(&sort) {
        split = split.change_sort(sort);
    }
    if is_time && split.limit.is_some() {
        split = split.change_limit(None);
    }
    if split.bucket.is_none() {
        split = split.change_bucket(dimension.default_bucket());
    }

    let mut score = BASE_SCORE;
    if is_time {
        score += TIME_BOOST;
    }
    if ctx.is_selected_visualization {
        score += SELECTED_BOOST;
    }

    if &split == last {
        return Resolve::ready(if ctx.is_selected_visualization { 10 } else { score });
    }

    debug!("Line chart normalized split on '{}'", split.reference);
    let last_index = ctx.splits.len() - 1;
    let splits = ctx
        .splits
        .map(|(idx, s)| if idx == last_index { split.clone() } else { s.clone() });
    Resolve::automatic(score, format!("Line Chart plots {} along the x axis", dimension.title), Adjustment::splits(splits))
}

/// Move the last continuous split to the end so it becomes the x axis
fn move_continuous_last(ctx: &RuleContext<'_>) -> Resolve {
    let continuous = ctx
        .splits
        .iter()
        .rev()
        .find(|split| split.kind(ctx.data_cube).map_or(false, |kind| kind.is_continuous()));
    let Some(split) = continuous else {
        return Resolve::never();
    };

    Resolve::automatic(
        NORMAL_PRIORITY_ACTION,
        format!("Line Chart moves the split on {} last", split.reference),
        Adjustment::splits(ctx.splits.add_split(split.clone())),
    )
}
