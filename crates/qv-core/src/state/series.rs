//! Selected measures and their display format

use serde::{Deserialize, Serialize};

use crate::cube::DataCube;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "pattern", rename_all = "lowercase")]
pub enum SeriesFormat {
    #[default]
    Default,
    Exact,
    Percent,
    Custom(String),
}

/// A measure selected for display
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Series {
    pub reference: String,
    #[serde(default)]
    pub format: SeriesFormat,
}

impl Series {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            format: SeriesFormat::Default,
        }
    }

    pub fn with_format(mut self, format: SeriesFormat) -> Self {
        self.format = format;
        self
    }
}

/// Ordered list of series, one per measure
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesList {
    series: Vec<Series>,
}

impl SeriesList {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from measure names, keeping the first occurrence of each
    pub fn from_measures<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .fold(Self::empty(), |list, name| list.add(Series::new(name)))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Series> {
        self.series.iter()
    }

    pub fn get(&self, reference: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.reference == reference)
    }

    pub fn has(&self, reference: &str) -> bool {
        self.get(reference).is_some()
    }

    /// Append a series; a series already selected keeps its position
    pub fn add(&self, series: Series) -> Self {
        if self.has(&series.reference) {
            return self.replace(series);
        }
        let mut list = self.series.clone();
        list.push(series);
        Self { series: list }
    }

    pub fn remove(&self, reference: &str) -> Self {
        Self {
            series: self.series.iter().filter(|s| s.reference != reference).cloned().collect(),
        }
    }

    pub fn replace(&self, series: Series) -> Self {
        Self {
            series: self
                .series
                .iter()
                .map(|s| if s.reference == series.reference { series.clone() } else { s.clone() })
                .collect(),
        }
    }

    pub fn constrain_to_cube(&self, cube: &DataCube) -> Self {
        Self {
            series: self.series.iter().filter(|s| cube.has_measure(&s.reference)).cloned().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SeriesList {
    type Item = &'a Series;
    type IntoIter = std::slice::Iter<'a, Series>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.iter()
    }
}
