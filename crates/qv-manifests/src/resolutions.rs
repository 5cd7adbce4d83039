//! Canned suggestions for getting out of an invalid configuration

use qv_core::{DataCube, DimensionKind, SeriesList, Split, Splits};

use crate::resolve::{Adjustment, Resolution};

/// How many string dimensions `some_dimensions` suggests
const SUGGESTED_SPLIT_DIMENSIONS: usize = 2;

pub struct Resolutions;

impl Resolutions {
    /// One split suggestion for each of the first two string dimensions
    pub fn some_dimensions(data_cube: &DataCube) -> Vec<Resolution> {
        data_cube
            .dimensions_by_kind(DimensionKind::String)
            .take(SUGGESTED_SPLIT_DIMENSIONS)
            .map(|dimension| {
                Resolution::new(
                    format!("Add a split on {}", dimension.title),
                    Adjustment::splits(Splits::from_split(Split::from_dimension(dimension))),
                )
            })
            .collect()
    }

    /// One split suggestion for every time or number dimension
    pub fn continuous_dimensions(data_cube: &DataCube) -> Vec<Resolution> {
        data_cube
            .continuous_dimensions()
            .map(|dimension| {
                Resolution::new(
                    format!("Add a split on {}", dimension.title),
                    Adjustment::splits(Splits::from_split(Split::from_dimension(dimension))),
                )
            })
            .collect()
    }

    /// Select the cube's default measures; nothing when none are declared
    pub fn default_selected_measures(data_cube: &DataCube) -> Vec<Resolution> {
        let measures: Vec<_> = data_cube
            .default_selected_measures()
            .iter()
            .filter_map(|name| data_cube.measure(name))
            .collect();
        if measures.is_empty() {
            return Vec::new();
        }

        let titles: Vec<&str> = measures.iter().map(|m| m.title.as_str()).collect();
        vec![Resolution::new(
            format!("Select default measures: {}", titles.join(", ")),
            Adjustment::series(SeriesList::from_measures(measures.iter().map(|m| m.name.clone()))),
        )]
    }

    /// Select the first declared measure as the only series
    pub fn first_measure(data_cube: &DataCube) -> Vec<Resolution> {
        data_cube
            .measures()
            .first()
            .map(|measure| {
                Resolution::new(
                    format!("Select measure: {}", measure.title),
                    Adjustment::series(SeriesList::from_measures([measure.name.clone()])),
                )
            })
            .into_iter()
            .collect()
    }
}
