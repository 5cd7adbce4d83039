//! Data cube catalog: the dimensions and measures a query can reference

mod config;
mod schema;

pub use config::DataCubeConfig;
pub use schema::COUNT_MEASURE;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::state::{Bucket, Sort, SortDirection};
use crate::CubeError;

/// Kind of values a dimension holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionKind {
    String,
    Number,
    Time,
    Boolean,
}

impl DimensionKind {
    /// Time and number dimensions can be plotted along a continuous axis
    pub fn is_continuous(&self) -> bool {
        matches!(self, DimensionKind::Time | DimensionKind::Number)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionKind::String => "string",
            DimensionKind::Number => "number",
            DimensionKind::Time => "time",
            DimensionKind::Boolean => "boolean",
        }
    }
}

impl fmt::Display for DimensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How splits on a dimension are sorted when the user did not pick a sort
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortStrategy {
    /// Sort by the dimension's own value
    SelfValue,
    /// Sort by another dimension or measure
    Reference(String),
}

impl From<String> for SortStrategy {
    fn from(value: String) -> Self {
        if value == "self" {
            SortStrategy::SelfValue
        } else {
            SortStrategy::Reference(value)
        }
    }
}

impl From<SortStrategy> for String {
    fn from(strategy: SortStrategy) -> Self {
        match strategy {
            SortStrategy::SelfValue => "self".to_string(),
            SortStrategy::Reference(reference) => reference,
        }
    }
}

/// A dimension of the data cube
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    pub name: String,
    #[serde(default)]
    pub title: String,
    pub kind: DimensionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_strategy: Option<SortStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    /// Bucketing choices offered for this dimension, preferred first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub granularities: Vec<Bucket>,
}

impl Dimension {
    pub fn new(name: impl Into<String>, kind: DimensionKind) -> Self {
        let name = name.into();
        Self {
            title: make_title(&name),
            name,
            kind,
            sort_strategy: None,
            expression: None,
            granularities: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_sort_strategy(mut self, strategy: SortStrategy) -> Self {
        self.sort_strategy = Some(strategy);
        self
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    pub fn with_granularities(mut self, granularities: Vec<Bucket>) -> Self {
        self.granularities = granularities;
        self
    }

    pub fn is_continuous(&self) -> bool {
        self.kind.is_continuous()
    }

    /// Bucket used when a split on this dimension is created without one
    pub fn default_bucket(&self) -> Option<Bucket> {
        if let Some(bucket) = self.granularities.first() {
            return Some(bucket.clone());
        }
        match self.kind {
            DimensionKind::Time => Some(Bucket::Duration("P1D".to_string())),
            _ => None,
        }
    }
}

/// A measure of the data cube
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub lower_is_better: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Measure {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            title: make_title(&name),
            name,
            lower_is_better: false,
            format: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn lower_is_better(mut self) -> Self {
        self.lower_is_better = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Member {
    Dimension(usize),
    Measure(usize),
}

/// Validated dataset metadata
///
/// Dimensions and measures share one namespace so that a sort or a
/// filter reference resolves to exactly one member.
#[derive(Debug, Clone, PartialEq)]
pub struct DataCube {
    name: String,
    title: String,
    dimensions: Vec<Dimension>,
    measures: Vec<Measure>,
    default_sort_measure: Option<String>,
    default_selected_measures: Vec<String>,
    default_pinned_dimensions: Vec<String>,
    default_splits: Vec<String>,
    time_attribute: Option<String>,
    lookup: AHashMap<String, Member>,
}

impl DataCube {
    /// Validate a configuration and build the cube
    pub fn from_config(config: DataCubeConfig) -> Result<Self, CubeError> {
        if config.name.trim().is_empty() {
            return Err(CubeError::EmptyName);
        }
        if config.measures.is_empty() {
            return Err(CubeError::NoMeasures(config.name));
        }

        let mut lookup = AHashMap::new();
        let mut dimensions = config.dimensions;
        let mut measures = config.measures;

        for (idx, dimension) in dimensions.iter_mut().enumerate() {
            if dimension.title.is_empty() {
                dimension.title = make_title(&dimension.name);
            }
            if lookup.insert(dimension.name.clone(), Member::Dimension(idx)).is_some() {
                return Err(CubeError::DuplicateName(dimension.name.clone()));
            }
        }
        for (idx, measure) in measures.iter_mut().enumerate() {
            if measure.title.is_empty() {
                measure.title = make_title(&measure.name);
            }
            if lookup.insert(measure.name.clone(), Member::Measure(idx)).is_some() {
                return Err(CubeError::DuplicateName(measure.name.clone()));
            }
        }

        for dimension in &dimensions {
            if let Some(SortStrategy::Reference(reference)) = &dimension.sort_strategy {
                if !lookup.contains_key(reference) {
                    return Err(CubeError::UnknownSortReference {
                        dimension: dimension.name.clone(),
                        reference: reference.clone(),
                    });
                }
            }
        }

        let is_measure = |name: &str| matches!(lookup.get(name), Some(Member::Measure(_)));
        let is_dimension = |name: &str| matches!(lookup.get(name), Some(Member::Dimension(_)));

        if let Some(measure) = &config.default_sort_measure {
            if !is_measure(measure) {
                return Err(CubeError::UnknownMeasure(measure.clone()));
            }
        }
        if let Some(measure) = config.default_selected_measures.iter().find(|m| !is_measure(m)) {
            return Err(CubeError::UnknownMeasure(measure.clone()));
        }
        if let Some(dimension) = config
            .default_pinned_dimensions
            .iter()
            .chain(config.default_splits.iter())
            .find(|d| !is_dimension(d))
        {
            return Err(CubeError::UnknownDimension(dimension.clone()));
        }
        if let Some(time_attribute) = &config.time_attribute {
            let is_time = match lookup.get(time_attribute) {
                Some(Member::Dimension(idx)) => dimensions[*idx].kind == DimensionKind::Time,
                _ => false,
            };
            if !is_time {
                return Err(CubeError::InvalidTimeAttribute(time_attribute.clone()));
            }
        }

        let title = if config.title.is_empty() {
            make_title(&config.name)
        } else {
            config.title
        };

        Ok(Self {
            name: config.name,
            title,
            dimensions,
            measures,
            default_sort_measure: config.default_sort_measure,
            default_selected_measures: config.default_selected_measures,
            default_pinned_dimensions: config.default_pinned_dimensions,
            default_splits: config.default_splits,
            time_attribute: config.time_attribute,
            lookup,
        })
    }

    /// Parse a JSON cube configuration and validate it
    pub fn from_json(json: &str) -> Result<Self, CubeError> {
        let config: DataCubeConfig = serde_json::from_str(json)?;
        Self::from_config(config)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        match self.lookup.get(name) {
            Some(Member::Dimension(idx)) => self.dimensions.get(*idx),
            _ => None,
        }
    }

    pub fn measure(&self, name: &str) -> Option<&Measure> {
        match self.lookup.get(name) {
            Some(Member::Measure(idx)) => self.measures.get(*idx),
            _ => None,
        }
    }

    pub fn has_dimension(&self, name: &str) -> bool {
        self.dimension(name).is_some()
    }

    pub fn has_measure(&self, name: &str) -> bool {
        self.measure(name).is_some()
    }

    pub fn dimensions_by_kind(&self, kind: DimensionKind) -> impl Iterator<Item = &Dimension> {
        self.dimensions.iter().filter(move |d| d.kind == kind)
    }

    pub fn continuous_dimensions(&self) -> impl Iterator<Item = &Dimension> {
        self.dimensions.iter().filter(|d| d.is_continuous())
    }

    /// The configured time attribute, or the first time dimension
    pub fn time_dimension(&self) -> Option<&Dimension> {
        match &self.time_attribute {
            Some(name) => self.dimension(name),
            None => self.dimensions_by_kind(DimensionKind::Time).next(),
        }
    }

    pub fn default_sort_measure(&self) -> &Measure {
        self.default_sort_measure
            .as_deref()
            .and_then(|name| self.measure(name))
            .unwrap_or(&self.measures[0])
    }

    /// Sort applied to splits that have neither a sort nor a sort strategy
    pub fn default_sort(&self) -> Sort {
        Sort::Series {
            reference: self.default_sort_measure().name.clone(),
            direction: SortDirection::Descending,
        }
    }

    pub fn default_selected_measures(&self) -> &[String] {
        &self.default_selected_measures
    }

    pub fn default_pinned_dimensions(&self) -> &[String] {
        &self.default_pinned_dimensions
    }

    pub fn default_splits(&self) -> &[String] {
        &self.default_splits
    }
}

/// Turn an identifier such as `page_views` into `Page Views`
pub fn make_title(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
