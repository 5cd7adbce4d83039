//! Immutable query state
//!
//! Every change derives a new [`QueryState`]; values are compared
//! structurally and can be shared freely between threads.

mod config;
mod filter;
mod series;
mod splits;

pub use config::QueryStateConfig;
pub use filter::{ClausePredicate, Filter, FilterClause, NumberRange, SetAction, TimePeriod, TimeRange};
pub use series::{Series, SeriesFormat, SeriesList};
pub use splits::{Bucket, Sort, SortDirection, Split, Splits};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::cube::DataCube;

/// Color legend assignment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Colors {
    pub dimension: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl Colors {
    pub fn new(dimension: impl Into<String>) -> Self {
        Self {
            dimension: dimension.into(),
            limit: None,
        }
    }
}

/// Comparison period, as an ISO-8601 duration to shift the time filter by
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeShift(Option<String>);

impl TimeShift {
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn new(duration: impl Into<String>) -> Self {
        Self(Some(duration.into()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn duration(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// In-progress selection layered over the committed filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    /// Visualization that owns the selection
    pub owner: String,
    pub delta: Filter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,
}

/// Snapshot of the exploration: what is filtered, split and measured
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    data_cube: Arc<DataCube>,
    filter: Filter,
    splits: Splits,
    series: SeriesList,
    pinned: IndexSet<String>,
    colors: Option<Colors>,
    time_shift: TimeShift,
    highlight: Option<Highlight>,
}

impl QueryState {
    /// Fresh state seeded with the cube's defaults
    pub fn from_cube(data_cube: Arc<DataCube>) -> Self {
        let series = SeriesList::from_measures(data_cube.default_selected_measures().iter().cloned());
        let splits = data_cube
            .default_splits()
            .iter()
            .filter_map(|name| data_cube.dimension(name))
            .map(Split::from_dimension)
            .collect();
        let pinned = data_cube.default_pinned_dimensions().iter().cloned().collect();

        Self {
            data_cube,
            filter: Filter::empty(),
            splits,
            series,
            pinned,
            colors: None,
            time_shift: TimeShift::empty(),
            highlight: None,
        }
    }

    pub fn data_cube(&self) -> &Arc<DataCube> {
        &self.data_cube
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn splits(&self) -> &Splits {
        &self.splits
    }

    pub fn series(&self) -> &SeriesList {
        &self.series
    }

    pub fn pinned(&self) -> &IndexSet<String> {
        &self.pinned
    }

    pub fn colors(&self) -> Option<&Colors> {
        self.colors.as_ref()
    }

    pub fn time_shift(&self) -> &TimeShift {
        &self.time_shift
    }

    pub fn highlight(&self) -> Option<&Highlight> {
        self.highlight.as_ref()
    }

    pub fn has_comparison(&self) -> bool {
        !self.time_shift.is_empty()
    }

    pub fn change_filter(&self, filter: Filter) -> Self {
        Self { filter, ..self.clone() }
    }

    pub fn change_splits(&self, splits: Splits) -> Self {
        Self { splits, ..self.clone() }
    }

    pub fn add_split(&self, split: Split) -> Self {
        self.change_splits(self.splits.add_split(split))
    }

    pub fn remove_split(&self, reference: &str) -> Self {
        self.change_splits(self.splits.remove_split(reference))
    }

    pub fn change_series(&self, series: SeriesList) -> Self {
        Self { series, ..self.clone() }
    }

    pub fn change_colors(&self, colors: Option<Colors>) -> Self {
        Self { colors, ..self.clone() }
    }

    pub fn change_time_shift(&self, time_shift: TimeShift) -> Self {
        Self { time_shift, ..self.clone() }
    }

    pub fn pin(&self, dimension: impl Into<String>) -> Self {
        let mut pinned = self.pinned.clone();
        pinned.insert(dimension.into());
        Self { pinned, ..self.clone() }
    }

    pub fn unpin(&self, dimension: &str) -> Self {
        let mut pinned = self.pinned.clone();
        pinned.shift_remove(dimension);
        Self { pinned, ..self.clone() }
    }

    pub fn change_highlight(&self, highlight: Option<Highlight>) -> Self {
        Self { highlight, ..self.clone() }
    }

    /// Commit the highlight delta into the filter
    pub fn accept_highlight(&self) -> Self {
        match &self.highlight {
            Some(highlight) => Self {
                filter: self.filter.merge(&highlight.delta),
                highlight: None,
                ..self.clone()
            },
            None => self.clone(),
        }
    }

    /// Filter including an uncommitted highlight
    pub fn effective_filter(&self) -> Filter {
        match &self.highlight {
            Some(highlight) => self.filter.merge(&highlight.delta),
            None => self.filter.clone(),
        }
    }

    /// Move to another cube, dropping references it cannot satisfy
    pub fn change_data_cube(&self, data_cube: Arc<DataCube>) -> Self {
        Self { data_cube, ..self.clone() }.constrain_to_cube()
    }

    /// Drop every reference the current cube does not declare
    pub fn constrain_to_cube(&self) -> Self {
        let cube = &self.data_cube;
        let colors = self
            .colors
            .clone()
            .filter(|colors| cube.has_dimension(&colors.dimension));
        let pinned = self.pinned.iter().filter(|d| cube.has_dimension(d)).cloned().collect();
        let highlight = self.highlight.clone().and_then(|highlight| {
            let delta = highlight.delta.constrain_to_cube(cube);
            (!delta.is_empty()).then_some(Highlight { delta, ..highlight })
        });

        Self {
            data_cube: cube.clone(),
            filter: self.filter.constrain_to_cube(cube),
            splits: self.splits.constrain_to_cube(cube),
            series: self.series.constrain_to_cube(cube),
            pinned,
            colors,
            time_shift: self.time_shift.clone(),
            highlight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::{DataCubeConfig, Dimension, DimensionKind, Measure};

    fn cube() -> Arc<DataCube> {
        Arc::new(
            DataCube::from_config(DataCubeConfig {
                name: "wiki".to_string(),
                dimensions: vec![
                    Dimension::new("time", DimensionKind::Time),
                    Dimension::new("channel", DimensionKind::String),
                    Dimension::new("page", DimensionKind::String),
                ],
                measures: vec![Measure::new("count"), Measure::new("added")],
                default_selected_measures: vec!["added".to_string()],
                default_pinned_dimensions: vec!["channel".to_string()],
                default_splits: vec!["time".to_string()],
                ..Default::default()
            })
            .unwrap(),
        )
    }

    #[test]
    fn test_from_cube_seeds_defaults() {
        let state = QueryState::from_cube(cube());

        assert_eq!(state.series(), &SeriesList::from_measures(["added"]));
        assert_eq!(state.splits().len(), 1);
        assert_eq!(state.splits().get(0).unwrap().bucket, Some(Bucket::Duration("P1D".to_string())));
        assert!(state.pinned().contains("channel"));
        assert!(state.colors().is_none());
    }

    #[test]
    fn test_value_semantics() {
        let state = QueryState::from_cube(cube());
        let same = QueryState::from_cube(cube());
        assert_eq!(state, same);

        let changed = state.add_split(Split::new("page"));
        assert_ne!(state, changed);
        assert_eq!(state.splits().len(), 1);
        assert_eq!(changed.splits().len(), 2);
    }

    #[test]
    fn test_accept_highlight() {
        let delta = Filter::from_clauses(vec![FilterClause::include("page", vec!["Main".to_string()])]).unwrap();
        let state = QueryState::from_cube(cube()).change_highlight(Some(Highlight {
            owner: "table".to_string(),
            delta,
            measure: None,
        }));

        assert!(state.filter().is_empty());
        assert!(state.effective_filter().has_clause_for("page"));

        let accepted = state.accept_highlight();
        assert!(accepted.highlight().is_none());
        assert!(accepted.filter().has_clause_for("page"));
    }

    #[test]
    fn test_change_data_cube_drops_stale_references() {
        let state = QueryState::from_cube(cube())
            .add_split(Split::new("page"))
            .change_colors(Some(Colors::new("page")))
            .pin("page");

        let smaller = Arc::new(
            DataCube::from_config(DataCubeConfig {
                name: "wiki".to_string(),
                dimensions: vec![Dimension::new("time", DimensionKind::Time)],
                measures: vec![Measure::new("count")],
                ..Default::default()
            })
            .unwrap(),
        );

        let moved = state.change_data_cube(smaller);
        assert_eq!(moved.splits().len(), 1);
        assert!(moved.colors().is_none());
        assert!(moved.pinned().is_empty());
        assert!(moved.series().is_empty());
    }

    #[test]
    fn test_pin_unpin_keeps_order() {
        let state = QueryState::from_cube(cube()).pin("page").pin("time");
        let order: Vec<&str> = state.pinned().iter().map(String::as_str).collect();
        assert_eq!(order, ["channel", "page", "time"]);

        let unpinned = state.unpin("page");
        let order: Vec<&str> = unpinned.pinned().iter().map(String::as_str).collect();
        assert_eq!(order, ["channel", "time"]);
    }

    #[test]
    fn test_time_shift() {
        let state = QueryState::from_cube(cube());
        assert!(!state.has_comparison());
        let shifted = state.change_time_shift(TimeShift::new("P1D"));
        assert_eq!(shifted.time_shift().duration(), Some("P1D"));
    }
}
