//! Visualization manifests for the query view explorer
//!
//! Each visualization is described by a manifest: an ordered chain of
//! predicate/action rules that decides whether a [`qv_core::QueryState`] is
//! ready for it, can be fixed automatically, or needs the user.

pub mod actions;
pub mod catalog;
pub mod manifests;
pub mod predicates;
pub mod resolutions;
pub mod resolve;
pub mod rules;
pub mod session;

#[cfg(test)]
mod test_support;

use thiserror::Error;

// Re-export commonly used types
pub use catalog::{catalog, ManifestCatalog, RankedVerdict};
pub use manifests::{Manifest, Visualization};
pub use predicates::KindSelector;
pub use resolutions::Resolutions;
pub use resolve::{Adjustment, Resolution, Resolve, HIGH_PRIORITY_ACTION, NORMAL_PRIORITY_ACTION};
pub use rules::{Action, Predicate, Rule, RuleContext, RulesEvaluator, RulesEvaluatorBuilder};
pub use session::{ExplorerSession, VisStrategy};

/// Errors raised while assembling rule chains and the catalog
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Rule chain has no fallback action")]
    MissingFallback,

    #[error("Rule chain declares more than one fallback action")]
    MultipleFallbacks,

    #[error("Rule '{0}' is declared more than once")]
    DuplicateRule(String),

    #[error("Rule label cannot be empty")]
    EmptyRuleLabel,

    #[error("Unknown split kind selector '{0}'")]
    UnknownKindSelector(String),

    #[error("Visualization '{0}' is registered more than once")]
    DuplicateVisualization(String),

    #[error("Unknown visualization '{0}'")]
    UnknownVisualization(String),
}
