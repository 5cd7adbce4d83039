//! Serializable description of a query state

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{Colors, Filter, FilterClause, QueryState, Series, SeriesList, Split, Splits, TimeShift};
use crate::cube::DataCube;
use crate::StateError;

/// Query state as read from a JSON file, referencing cube members by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryStateConfig {
    #[serde(default)]
    pub splits: Vec<Split>,

    /// Selected series; the cube's default measures when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<Vec<Series>>,

    #[serde(default)]
    pub filter: Vec<FilterClause>,

    #[serde(default)]
    pub pinned: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Colors>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_shift: Option<String>,
}

impl QueryState {
    /// Build a state from its config, rejecting references the cube lacks
    pub fn from_config(data_cube: Arc<DataCube>, config: QueryStateConfig) -> Result<Self, StateError> {
        let unknown_dimension = config
            .splits
            .iter()
            .map(|s| &s.reference)
            .chain(config.filter.iter().map(|c| &c.reference))
            .chain(config.pinned.iter())
            .chain(config.colors.iter().map(|c| &c.dimension))
            .find(|name| !data_cube.has_dimension(name));
        if let Some(name) = unknown_dimension {
            return Err(StateError::UnknownDimension(name.clone()));
        }

        let base = QueryState::from_cube(data_cube.clone());

        let series = match config.series {
            Some(series) => {
                if let Some(s) = series.iter().find(|s| !data_cube.has_measure(&s.reference)) {
                    return Err(StateError::UnknownMeasure(s.reference.clone()));
                }
                series.into_iter().fold(SeriesList::empty(), |list, s| list.add(s))
            }
            None => base.series().clone(),
        };

        let filter = Filter::from_clauses(config.filter)?;
        let time_shift = config.time_shift.map(TimeShift::new).unwrap_or_default();

        let mut state = base
            .change_splits(Splits::new(config.splits))
            .change_series(series)
            .change_filter(filter)
            .change_colors(config.colors)
            .change_time_shift(time_shift);
        for dimension in config.pinned {
            state = state.pin(dimension);
        }
        Ok(state)
    }
}
