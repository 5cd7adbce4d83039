//! Derive a data cube from an Arrow schema

use ahash::AHashSet;
use arrow::datatypes::{DataType, Schema};
use tracing::debug;

use super::{make_title, DataCube, DataCubeConfig, Dimension, DimensionKind, Measure};
use crate::CubeError;

/// Name of the row-count measure every introspected cube carries
pub const COUNT_MEASURE: &str = "count";

impl DataCube {
    /// Build a cube whose dimensions and measures mirror the schema's fields
    ///
    /// Temporal fields become time dimensions, text and boolean fields become
    /// categorical dimensions and numeric fields become both a number
    /// dimension and a `sum_<field>` measure. The `count` measure is always
    /// present and is the default sort measure. Generated measure names that
    /// clash with a field get a `_measure` suffix.
    pub fn from_schema(name: &str, schema: &Schema) -> Result<Self, CubeError> {
        let mut taken: AHashSet<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
        let count_measure = reserve_name(COUNT_MEASURE, &mut taken);

        let mut dimensions = Vec::new();
        let mut measures = vec![Measure::new(count_measure.clone()).with_title(make_title(COUNT_MEASURE))];
        let mut time_attribute = None;

        for field in schema.fields() {
            let kind = match field.data_type() {
                DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => DimensionKind::Time,
                DataType::Utf8 | DataType::LargeUtf8 => {
                    let name_lower = field.name().to_lowercase();
                    if name_lower.contains("date") || name_lower.contains("timestamp") {
                        DimensionKind::Time
                    } else {
                        DimensionKind::String
                    }
                }
                DataType::Boolean => DimensionKind::Boolean,
                data_type if data_type.is_numeric() => {
                    let measure = reserve_name(&format!("sum_{}", field.name()), &mut taken);
                    measures.push(Measure::new(measure).with_title(format!("Sum of {}", field.name())));
                    DimensionKind::Number
                }
                other => {
                    debug!("Skipping field '{}' with unsupported type {:?}", field.name(), other);
                    continue;
                }
            };

            if kind == DimensionKind::Time && time_attribute.is_none() {
                time_attribute = Some(field.name().clone());
            }
            dimensions.push(Dimension::new(field.name().clone(), kind));
        }

        Self::from_config(DataCubeConfig {
            name: name.to_string(),
            dimensions,
            measures,
            default_sort_measure: Some(count_measure.clone()),
            default_selected_measures: vec![count_measure],
            time_attribute,
            ..Default::default()
        })
    }
}

/// `base`, or the first `base_measure[_N]` not already taken
fn reserve_name(base: &str, taken: &mut AHashSet<String>) -> String {
    let mut name = base.to_string();
    let mut attempt = 1;
    while taken.contains(&name) {
        name = match attempt {
            1 => format!("{}_measure", base),
            n => format!("{}_measure_{}", base, n),
        };
        attempt += 1;
    }
    taken.insert(name.clone());
    name
}
