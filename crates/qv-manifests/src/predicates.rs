//! Predicate library
//!
//! Each function returns an independent [`Predicate`] parameterized by the
//! thresholds given when the rule chain is authored.

use std::fmt;
use std::str::FromStr;

use qv_core::DimensionKind;

use crate::rules::{Predicate, RuleContext};
use crate::ManifestError;

/// Matches the kind of one split position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindSelector {
    /// `*`: any split, including one on a dimension the cube lacks
    Any,
    /// `time`
    Is(DimensionKind),
    /// `!time`
    Not(DimensionKind),
}

impl KindSelector {
    /// A split on a missing dimension has no kind and matches only `Any`
    pub fn matches(&self, kind: Option<DimensionKind>) -> bool {
        match (self, kind) {
            (KindSelector::Any, _) => true,
            (KindSelector::Is(expected), Some(kind)) => *expected == kind,
            (KindSelector::Not(excluded), Some(kind)) => *excluded != kind,
            (_, None) => false,
        }
    }

    /// Parse a list such as `["*", "!time"]`
    pub fn parse_list(selectors: &[&str]) -> Result<Vec<KindSelector>, ManifestError> {
        selectors.iter().map(|s| s.parse()).collect()
    }
}

fn parse_kind(kind: &str) -> Option<DimensionKind> {
    match kind {
        "string" => Some(DimensionKind::String),
        "number" => Some(DimensionKind::Number),
        "time" => Some(DimensionKind::Time),
        "boolean" => Some(DimensionKind::Boolean),
        _ => None,
    }
}

impl FromStr for KindSelector {
    type Err = ManifestError;

    fn from_str(selector: &str) -> Result<Self, Self::Err> {
        if selector == "*" {
            return Ok(KindSelector::Any);
        }
        let unknown = || ManifestError::UnknownKindSelector(selector.to_string());
        match selector.strip_prefix('!') {
            Some(kind) => parse_kind(kind).map(KindSelector::Not).ok_or_else(unknown),
            None => parse_kind(selector).map(KindSelector::Is).ok_or_else(unknown),
        }
    }
}

impl fmt::Display for KindSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KindSelector::Any => f.write_str("*"),
            KindSelector::Is(kind) => write!(f, "{}", kind),
            KindSelector::Not(kind) => write!(f, "!{}", kind),
        }
    }
}

/// The split sequence is empty
pub fn no_splits() -> Predicate {
    Predicate::new(|ctx| ctx.splits.is_empty())
}

/// There are more splits than `max`
pub fn supported_splits_count(max: usize) -> Predicate {
    Predicate::new(move |ctx| ctx.splits.len() > max)
}

pub fn number_of_splits_is_not(expected: usize) -> Predicate {
    Predicate::new(move |ctx| ctx.splits.len() != expected)
}

pub fn number_of_series_is_not(expected: usize) -> Predicate {
    Predicate::new(move |ctx| ctx.series.len() != expected)
}

pub fn no_series() -> Predicate {
    Predicate::new(|ctx| ctx.series.is_empty())
}

/// One selector per split, position by position
pub fn are_exact_split_kinds(selectors: Vec<KindSelector>) -> Predicate {
    Predicate::new(move |ctx| {
        ctx.splits.len() == selectors.len()
            && ctx
                .splits
                .iter()
                .zip(&selectors)
                .all(|(split, selector)| selector.matches(split.kind(ctx.data_cube)))
    })
}

/// Every listed kind appears among the splits
pub fn have_at_least_split_kinds(kinds: Vec<DimensionKind>) -> Predicate {
    Predicate::new(move |ctx| {
        let actual = ctx.splits.kinds(ctx.data_cube);
        kinds.iter().all(|kind| actual.contains(&Some(*kind)))
    })
}

/// Some split is on a dimension of a disallowed kind
pub fn has_disallowed_split_kind(disallowed: Vec<DimensionKind>) -> Predicate {
    Predicate::new(move |ctx| {
        ctx.splits
            .iter()
            .filter_map(|split| split.kind(ctx.data_cube))
            .any(|kind| disallowed.contains(&kind))
    })
}

/// The last split is on a time or number dimension
pub fn last_split_is_continuous() -> Predicate {
    Predicate::new(|ctx| last_split_kind(ctx).map_or(false, |kind| kind.is_continuous()))
}

/// Some split is on a time or number dimension
pub fn has_continuous_split() -> Predicate {
    Predicate::new(|ctx| {
        ctx.splits
            .iter()
            .filter_map(|split| split.kind(ctx.data_cube))
            .any(|kind| kind.is_continuous())
    })
}

/// All predicates hold; true for an empty list
pub fn all(predicates: Vec<Predicate>) -> Predicate {
    Predicate::new(move |ctx| predicates.iter().all(|p| p.test(ctx)))
}

/// At least one predicate holds; false for an empty list
pub fn any(predicates: Vec<Predicate>) -> Predicate {
    Predicate::new(move |ctx| predicates.iter().any(|p| p.test(ctx)))
}

fn last_split_kind(ctx: &RuleContext<'_>) -> Option<DimensionKind> {
    ctx.splits.last().and_then(|split| split.kind(ctx.data_cube))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{state_with_splits, wiki_cube};
    use qv_core::{QueryState, SeriesList};

    fn check(predicate: &Predicate, state: &QueryState) -> bool {
        predicate.test(&RuleContext::new(state, false))
    }

    #[test]
    fn test_no_splits() {
        let cube = wiki_cube();
        assert!(check(&no_splits(), &state_with_splits(cube.clone(), &[])));
        assert!(!check(&no_splits(), &state_with_splits(cube, &["country"])));
    }

    #[test]
    fn test_supported_splits_count() {
        let cube = wiki_cube();
        let predicate = supported_splits_count(2);

        assert!(!check(&predicate, &state_with_splits(cube.clone(), &["country", "channel"])));
        assert!(check(&predicate, &state_with_splits(cube, &["country", "channel", "page"])));
    }

    #[test]
    fn test_series_counts() {
        let state = state_with_splits(wiki_cube(), &[]);
        assert!(check(&number_of_series_is_not(1), &state));
        assert!(!check(&number_of_series_is_not(2), &state));
        assert!(!check(&no_series(), &state));
        assert!(check(&no_series(), &state.change_series(SeriesList::empty())));
    }

    #[test]
    fn test_exact_split_kinds() {
        let cube = wiki_cube();
        let time_last = are_exact_split_kinds(KindSelector::parse_list(&["*", "time"]).unwrap());

        assert!(check(&time_last, &state_with_splits(cube.clone(), &["country", "time"])));
        assert!(!check(&time_last, &state_with_splits(cube.clone(), &["time", "country"])));
        assert!(!check(&time_last, &state_with_splits(cube.clone(), &["time"])));

        let not_time = are_exact_split_kinds(vec![KindSelector::Not(DimensionKind::Time)]);
        assert!(check(&not_time, &state_with_splits(cube.clone(), &["country"])));
        assert!(!check(&not_time, &state_with_splits(cube.clone(), &["time"])));
        // stale reference has no kind
        assert!(!check(&not_time, &state_with_splits(cube.clone(), &["gone"])));
        assert!(check(
            &are_exact_split_kinds(vec![KindSelector::Any]),
            &state_with_splits(cube, &["gone"])
        ));
    }

    #[test]
    fn test_kind_presence() {
        let cube = wiki_cube();
        let state = state_with_splits(cube.clone(), &["time", "country"]);

        assert!(check(&have_at_least_split_kinds(vec![DimensionKind::Time]), &state));
        assert!(!check(&have_at_least_split_kinds(vec![DimensionKind::Time, DimensionKind::Number]), &state));
        assert!(check(&has_disallowed_split_kind(vec![DimensionKind::Time]), &state));
        assert!(!check(&has_disallowed_split_kind(vec![DimensionKind::Boolean]), &state));
        assert!(check(&has_continuous_split(), &state));
        assert!(!check(&last_split_is_continuous(), &state));
        assert!(check(&last_split_is_continuous(), &state_with_splits(cube.clone(), &["country", "delta"])));
        assert!(!check(&last_split_is_continuous(), &state_with_splits(cube, &[])));
    }

    #[test]
    fn test_all_and_any() {
        let cube = wiki_cube();
        let state = state_with_splits(cube, &["country"]);

        assert!(check(&all(vec![]), &state));
        assert!(!check(&any(vec![]), &state));
        assert!(check(&any(vec![no_splits(), supported_splits_count(0)]), &state));
        assert!(!check(&all(vec![no_splits(), supported_splits_count(0)]), &state));
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!("*".parse::<KindSelector>().unwrap(), KindSelector::Any);
        assert_eq!("!number".parse::<KindSelector>().unwrap(), KindSelector::Not(DimensionKind::Number));
        assert_eq!(KindSelector::Not(DimensionKind::Time).to_string(), "!time");
        assert!(matches!(
            "geo".parse::<KindSelector>(),
            Err(ManifestError::UnknownKindSelector(selector)) if selector == "geo"
        ));
    }
}
