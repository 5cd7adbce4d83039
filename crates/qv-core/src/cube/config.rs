//! Serializable data cube configuration

use serde::{Deserialize, Serialize};

use super::{Dimension, Measure};

/// Data cube description as read from a JSON file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCubeConfig {
    pub name: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub dimensions: Vec<Dimension>,

    #[serde(default)]
    pub measures: Vec<Measure>,

    /// Measure used for the fallback sort; first measure when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_sort_measure: Option<String>,

    #[serde(default)]
    pub default_selected_measures: Vec<String>,

    #[serde(default)]
    pub default_pinned_dimensions: Vec<String>,

    /// Dimensions split on when a fresh query state is created
    #[serde(default)]
    pub default_splits: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_attribute: Option<String>,
}
