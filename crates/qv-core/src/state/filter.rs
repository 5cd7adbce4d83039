//! Filter clauses

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cube::{DataCube, DimensionKind};
use crate::StateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetAction {
    Include,
    Exclude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    Latest,
    Current,
    Previous,
}

/// Half-open numeric range; either bound may be open
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumberRange {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl NumberRange {
    pub fn contains(&self, value: f64) -> bool {
        self.start.map_or(true, |start| value >= start) && self.end.map_or(true, |end| value < end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// What a clause requires of its dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClausePredicate {
    Set { action: SetAction, values: Vec<String> },
    NumberRange { ranges: Vec<NumberRange>, exclude: bool },
    FixedTime { ranges: Vec<TimeRange> },
    /// Relative time window, `duration` being an ISO-8601 duration
    RelativeTime { period: TimePeriod, duration: String },
    Boolean { values: Vec<bool>, exclude: bool },
}

impl ClausePredicate {
    /// Whether the predicate can apply to a dimension of `kind`
    pub fn fits_kind(&self, kind: DimensionKind) -> bool {
        match self {
            ClausePredicate::Set { .. } => kind == DimensionKind::String,
            ClausePredicate::NumberRange { .. } => kind == DimensionKind::Number,
            ClausePredicate::FixedTime { .. } | ClausePredicate::RelativeTime { .. } => kind == DimensionKind::Time,
            ClausePredicate::Boolean { .. } => kind == DimensionKind::Boolean,
        }
    }
}

/// A dimension bound to a predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterClause {
    pub reference: String,
    #[serde(flatten)]
    pub predicate: ClausePredicate,
}

impl FilterClause {
    pub fn new(reference: impl Into<String>, predicate: ClausePredicate) -> Self {
        Self {
            reference: reference.into(),
            predicate,
        }
    }

    pub fn include(reference: impl Into<String>, values: Vec<String>) -> Self {
        Self::new(reference, ClausePredicate::Set { action: SetAction::Include, values })
    }

    pub fn exclude(reference: impl Into<String>, values: Vec<String>) -> Self {
        Self::new(reference, ClausePredicate::Set { action: SetAction::Exclude, values })
    }

    pub fn latest(reference: impl Into<String>, duration: impl Into<String>) -> Self {
        Self::new(
            reference,
            ClausePredicate::RelativeTime { period: TimePeriod::Latest, duration: duration.into() },
        )
    }
}

/// Ordered filter clauses with at most one clause per dimension
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter {
    clauses: Vec<FilterClause>,
}

impl Filter {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from clauses, rejecting two clauses on one dimension
    pub fn from_clauses(clauses: Vec<FilterClause>) -> Result<Self, StateError> {
        clauses
            .into_iter()
            .try_fold(Self::empty(), |filter, clause| filter.add_clause(clause))
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn clause_for(&self, reference: &str) -> Option<&FilterClause> {
        self.clauses.iter().find(|c| c.reference == reference)
    }

    pub fn has_clause_for(&self, reference: &str) -> bool {
        self.clause_for(reference).is_some()
    }

    /// Append a clause; a second clause on the same dimension is an error
    pub fn add_clause(&self, clause: FilterClause) -> Result<Self, StateError> {
        if self.has_clause_for(&clause.reference) {
            return Err(StateError::DuplicateClause(clause.reference));
        }
        let mut clauses = self.clauses.clone();
        clauses.push(clause);
        Ok(Self { clauses })
    }

    /// Replace the clause on the same dimension in place, or append
    pub fn set_clause(&self, clause: FilterClause) -> Self {
        let mut clauses = self.clauses.clone();
        match clauses.iter_mut().find(|c| c.reference == clause.reference) {
            Some(existing) => *existing = clause,
            None => clauses.push(clause),
        }
        Self { clauses }
    }

    pub fn remove_clause(&self, reference: &str) -> Self {
        Self {
            clauses: self.clauses.iter().filter(|c| c.reference != reference).cloned().collect(),
        }
    }

    /// Combine with another filter; its clauses win on shared dimensions
    pub fn merge(&self, other: &Filter) -> Self {
        other
            .clauses
            .iter()
            .cloned()
            .fold(self.clone(), |filter, clause| filter.set_clause(clause))
    }

    /// Clause on the cube's time dimension, if any
    pub fn time_clause(&self, cube: &DataCube) -> Option<&FilterClause> {
        cube.time_dimension().and_then(|time| self.clause_for(&time.name))
    }

    /// Drop clauses on unknown dimensions or with a predicate of the wrong kind
    pub fn constrain_to_cube(&self, cube: &DataCube) -> Self {
        let clauses = self
            .clauses
            .iter()
            .filter(|clause| match cube.dimension(&clause.reference) {
                Some(dimension) if clause.predicate.fits_kind(dimension.kind) => true,
                _ => {
                    warn!("Dropping filter clause on '{}'", clause.reference);
                    false
                }
            })
            .cloned()
            .collect();
        Self { clauses }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::{DataCubeConfig, Dimension, Measure};
    use chrono::TimeZone;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_one_clause_per_dimension() {
        let filter = Filter::empty()
            .add_clause(FilterClause::include("country", strings(&["France"])))
            .unwrap();

        let err = filter
            .add_clause(FilterClause::exclude("country", strings(&["Spain"])))
            .unwrap_err();
        assert!(matches!(err, StateError::DuplicateClause(reference) if reference == "country"));

        assert!(Filter::from_clauses(vec![
            FilterClause::include("country", strings(&["France"])),
            FilterClause::include("country", strings(&["Spain"])),
        ])
        .is_err());
    }

    #[test]
    fn test_set_clause_replaces_in_place() {
        let filter = Filter::from_clauses(vec![
            FilterClause::latest("time", "P1D"),
            FilterClause::include("country", strings(&["France"])),
        ])
        .unwrap();

        let changed = filter.set_clause(FilterClause::latest("time", "P1W"));
        assert_eq!(changed.len(), 2);
        assert_eq!(changed.clauses()[0], FilterClause::latest("time", "P1W"));
        assert_eq!(filter.clauses()[0], FilterClause::latest("time", "P1D"));
    }

    #[test]
    fn test_merge_prefers_other() {
        let committed = Filter::from_clauses(vec![
            FilterClause::include("country", strings(&["France"])),
            FilterClause::latest("time", "P1D"),
        ])
        .unwrap();
        let delta = Filter::from_clauses(vec![
            FilterClause::include("country", strings(&["Spain"])),
            FilterClause::include("channel", strings(&["en"])),
        ])
        .unwrap();

        let merged = committed.merge(&delta);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.clause_for("country"), delta.clause_for("country"));
        assert!(merged.has_clause_for("time"));
    }

    #[test]
    fn test_constrain_to_cube() {
        let cube = DataCube::from_config(DataCubeConfig {
            name: "sales".to_string(),
            dimensions: vec![
                Dimension::new("time", DimensionKind::Time),
                Dimension::new("country", DimensionKind::String),
            ],
            measures: vec![Measure::new("count")],
            ..Default::default()
        })
        .unwrap();

        let filter = Filter::from_clauses(vec![
            FilterClause::include("country", strings(&["France"])),
            FilterClause::include("time", strings(&["wrong kind"])),
            FilterClause::include("gone", strings(&["x"])),
        ])
        .unwrap();

        let constrained = filter.constrain_to_cube(&cube);
        assert_eq!(constrained.len(), 1);
        assert!(constrained.has_clause_for("country"));
        assert!(constrained.time_clause(&cube).is_none());
    }

    #[test]
    fn test_ranges() {
        let range = NumberRange { start: Some(1.0), end: None };
        assert!(range.contains(1.0));
        assert!(!range.contains(0.5));

        let day = TimeRange {
            start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        };
        assert!(day.contains(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()));
        assert!(!day.contains(day.end));
    }

    #[test]
    fn test_clause_json_shape() {
        let clause: FilterClause = serde_json::from_str(
            r#"{ "reference": "country", "type": "set", "action": "exclude", "values": ["Spain"] }"#,
        )
        .unwrap();
        assert_eq!(clause, FilterClause::exclude("country", strings(&["Spain"])));
    }
}
