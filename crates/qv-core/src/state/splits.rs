//! Split (group-by) definitions

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cube::{DataCube, Dimension, DimensionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Sort order of a split's rows
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Sort {
    /// Sort by a dimension value
    Dimension { reference: String, direction: SortDirection },
    /// Sort by a selected measure
    Series { reference: String, direction: SortDirection },
}

impl Sort {
    pub fn reference(&self) -> &str {
        match self {
            Sort::Dimension { reference, .. } | Sort::Series { reference, .. } => reference,
        }
    }

    pub fn direction(&self) -> SortDirection {
        match self {
            Sort::Dimension { direction, .. } | Sort::Series { direction, .. } => *direction,
        }
    }

    pub fn change_direction(&self, direction: SortDirection) -> Sort {
        match self {
            Sort::Dimension { reference, .. } => Sort::Dimension { reference: reference.clone(), direction },
            Sort::Series { reference, .. } => Sort::Series { reference: reference.clone(), direction },
        }
    }
}

/// Bucketing granularity of a split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    /// ISO-8601 duration such as `PT1H` or `P1D`
    Duration(String),
    /// Bin size for numeric dimensions
    Number(f64),
}

/// One group-by step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<Bucket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl Split {
    /// Bare split on a reference, without bucket, sort or limit
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            bucket: None,
            sort: None,
            limit: None,
        }
    }

    /// Split on a dimension using its default bucketing
    pub fn from_dimension(dimension: &Dimension) -> Self {
        Self {
            reference: dimension.name.clone(),
            bucket: dimension.default_bucket(),
            sort: None,
            limit: None,
        }
    }

    pub fn change_sort(&self, sort: Sort) -> Self {
        Self { sort: Some(sort), ..self.clone() }
    }

    pub fn clear_sort(&self) -> Self {
        Self { sort: None, ..self.clone() }
    }

    pub fn change_limit(&self, limit: Option<u32>) -> Self {
        Self { limit, ..self.clone() }
    }

    pub fn change_bucket(&self, bucket: Option<Bucket>) -> Self {
        Self { bucket, ..self.clone() }
    }

    /// Kind of the split dimension; `None` when the cube no longer has it
    pub fn kind(&self, cube: &DataCube) -> Option<DimensionKind> {
        cube.dimension(&self.reference).map(|d| d.kind)
    }
}

/// Ordered sequence of splits; order is nesting order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Splits {
    splits: Vec<Split>,
}

impl Splits {
    pub fn new(splits: Vec<Split>) -> Self {
        Self { splits }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_split(split: Split) -> Self {
        Self { splits: vec![split] }
    }

    pub fn len(&self) -> usize {
        self.splits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Split> {
        self.splits.get(index)
    }

    pub fn last(&self) -> Option<&Split> {
        self.splits.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Split> {
        self.splits.iter()
    }

    pub fn as_slice(&self) -> &[Split] {
        &self.splits
    }

    pub fn has_split_on(&self, reference: &str) -> bool {
        self.splits.iter().any(|s| s.reference == reference)
    }

    pub fn find_split_for_dimension(&self, reference: &str) -> Option<&Split> {
        self.splits.iter().find(|s| s.reference == reference)
    }

    /// Kinds of the split dimensions, in split order
    pub fn kinds(&self, cube: &DataCube) -> Vec<Option<DimensionKind>> {
        self.splits.iter().map(|s| s.kind(cube)).collect()
    }

    /// Append a split, replacing an existing split on the same reference
    pub fn add_split(&self, split: Split) -> Self {
        let mut splits: Vec<Split> = self
            .splits
            .iter()
            .filter(|s| s.reference != split.reference)
            .cloned()
            .collect();
        splits.push(split);
        Self { splits }
    }

    pub fn remove_split(&self, reference: &str) -> Self {
        Self {
            splits: self.splits.iter().filter(|s| s.reference != reference).cloned().collect(),
        }
    }

    /// Replace the split on `reference` in place, keeping its position
    pub fn replace(&self, reference: &str, split: Split) -> Self {
        Self {
            splits: self
                .splits
                .iter()
                .map(|s| if s.reference == reference { split.clone() } else { s.clone() })
                .collect(),
        }
    }

    /// Insert at `index`, moving an existing split on the same reference
    pub fn insert(&self, index: usize, split: Split) -> Self {
        let mut splits: Vec<Split> = self
            .splits
            .iter()
            .filter(|s| s.reference != split.reference)
            .cloned()
            .collect();
        let index = index.min(splits.len());
        splits.insert(index, split);
        Self { splits }
    }

    /// Keep the first `len` splits in their original order
    pub fn truncate(&self, len: usize) -> Self {
        Self {
            splits: self.splits.iter().take(len).cloned().collect(),
        }
    }

    pub fn map<F>(&self, f: F) -> Self
    where
        F: FnMut((usize, &Split)) -> Split,
    {
        Self {
            splits: self.splits.iter().enumerate().map(f).collect(),
        }
    }

    /// Drop splits on dimensions the cube lacks and sorts on unknown references
    pub fn constrain_to_cube(&self, cube: &DataCube) -> Self {
        let splits = self
            .splits
            .iter()
            .filter_map(|split| {
                if !cube.has_dimension(&split.reference) {
                    warn!("Dropping split on unknown dimension '{}'", split.reference);
                    return None;
                }
                match &split.sort {
                    Some(Sort::Dimension { reference, .. }) if !cube.has_dimension(reference) => {
                        Some(split.clear_sort())
                    }
                    Some(Sort::Series { reference, .. }) if !cube.has_measure(reference) => {
                        Some(split.clear_sort())
                    }
                    _ => Some(split.clone()),
                }
            })
            .collect();
        Self { splits }
    }
}

impl<'a> IntoIterator for &'a Splits {
    type Item = &'a Split;
    type IntoIter = std::slice::Iter<'a, Split>;

    fn into_iter(self) -> Self::IntoIter {
        self.splits.iter()
    }
}

impl FromIterator<Split> for Splits {
    fn from_iter<I: IntoIterator<Item = Split>>(iter: I) -> Self {
        Self { splits: iter.into_iter().collect() }
    }
}
