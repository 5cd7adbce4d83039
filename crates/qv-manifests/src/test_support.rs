//! Shared fixtures for the manifest tests

use std::sync::Arc;

use qv_core::{
    DataCube, DataCubeConfig, Dimension, DimensionKind, Measure, QueryState, SortStrategy, Split, Splits,
};

pub(crate) fn wiki_config() -> DataCubeConfig {
    DataCubeConfig {
        name: "wiki".to_string(),
        dimensions: vec![
            Dimension::new("time", DimensionKind::Time),
            Dimension::new("country", DimensionKind::String),
            Dimension::new("channel", DimensionKind::String),
            Dimension::new("page", DimensionKind::String)
                .with_sort_strategy(SortStrategy::Reference("added".to_string())),
            Dimension::new("delta", DimensionKind::Number),
            Dimension::new("is_robot", DimensionKind::Boolean),
        ],
        measures: vec![
            Measure::new("count"),
            Measure::new("added"),
            Measure::new("deleted").lower_is_better(),
        ],
        default_sort_measure: Some("count".to_string()),
        default_selected_measures: vec!["count".to_string(), "added".to_string()],
        time_attribute: Some("time".to_string()),
        ..Default::default()
    }
}

pub(crate) fn cube_from(config: DataCubeConfig) -> Arc<DataCube> {
    Arc::new(DataCube::from_config(config).expect("fixture cube is valid"))
}

pub(crate) fn wiki_cube() -> Arc<DataCube> {
    cube_from(wiki_config())
}

/// Wiki cube where `country` carries the given sort strategy
pub(crate) fn wiki_cube_with_country_strategy(strategy: SortStrategy) -> Arc<DataCube> {
    let mut config = wiki_config();
    for dimension in config.dimensions.iter_mut().filter(|d| d.name == "country") {
        dimension.sort_strategy = Some(strategy.clone());
    }
    cube_from(config)
}

/// Default state with bare splits on `references`
pub(crate) fn state_with_splits(cube: Arc<DataCube>, references: &[&str]) -> QueryState {
    QueryState::from_cube(cube).change_splits(references.iter().map(|r| Split::new(*r)).collect::<Splits>())
}
