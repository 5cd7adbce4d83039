//! Ordered predicate/action rule chains

use std::fmt;
use std::sync::Arc;

use ahash::AHashSet;
use qv_core::{Colors, DataCube, Dimension, Filter, QueryState, SeriesList, Split, Splits, TimeShift};
use tracing::trace;

use crate::resolve::Resolve;
use crate::ManifestError;

/// Everything a rule may look at
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub data_cube: &'a DataCube,
    pub splits: &'a Splits,
    pub series: &'a SeriesList,
    pub filter: &'a Filter,
    pub colors: Option<&'a Colors>,
    pub time_shift: &'a TimeShift,
    /// Whether the visualization being evaluated is the one on screen
    pub is_selected_visualization: bool,
}

impl<'a> RuleContext<'a> {
    pub fn new(state: &'a QueryState, is_selected_visualization: bool) -> Self {
        Self {
            data_cube: state.data_cube(),
            splits: state.splits(),
            series: state.series(),
            filter: state.filter(),
            colors: state.colors(),
            time_shift: state.time_shift(),
            is_selected_visualization,
        }
    }

    /// Dimension a split is on; `None` for stale references
    pub fn split_dimension(&self, split: &Split) -> Option<&'a Dimension> {
        self.data_cube.dimension(&split.reference)
    }
}

type PredicateFn = dyn Fn(&RuleContext<'_>) -> bool + Send + Sync;
type ActionFn = dyn Fn(&RuleContext<'_>) -> Resolve + Send + Sync;

/// Pure boolean test over a rule context
#[derive(Clone)]
pub struct Predicate {
    test: Arc<PredicateFn>,
}

impl Predicate {
    pub fn new<F>(test: F) -> Self
    where
        F: Fn(&RuleContext<'_>) -> bool + Send + Sync + 'static,
    {
        Self { test: Arc::new(test) }
    }

    pub fn test(&self, ctx: &RuleContext<'_>) -> bool {
        (self.test)(ctx)
    }

    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::new(move |ctx| self.test(ctx) && other.test(ctx))
    }

    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::new(move |ctx| self.test(ctx) || other.test(ctx))
    }

    pub fn negate(self) -> Predicate {
        Predicate::new(move |ctx| !self.test(ctx))
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate")
    }
}

/// Produces a verdict for a rule context
#[derive(Clone)]
pub struct Action {
    resolve: Arc<ActionFn>,
}

impl Action {
    pub fn new<F>(resolve: F) -> Self
    where
        F: Fn(&RuleContext<'_>) -> Resolve + Send + Sync + 'static,
    {
        Self { resolve: Arc::new(resolve) }
    }

    pub fn resolve(&self, ctx: &RuleContext<'_>) -> Resolve {
        (self.resolve)(ctx)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Action")
    }
}

/// A labelled predicate/action pair
#[derive(Debug, Clone)]
pub struct Rule {
    label: String,
    predicate: Predicate,
    action: Action,
}

impl Rule {
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// First-match-wins decision list with a fallback
///
/// Rules are tested in registration order; the first predicate that holds
/// decides the verdict and later rules are never tested. The fallback runs
/// only when every predicate is false.
#[derive(Debug, Clone)]
pub struct RulesEvaluator {
    rules: Vec<Rule>,
    fallback: Action,
}

impl RulesEvaluator {
    pub fn builder() -> RulesEvaluatorBuilder {
        RulesEvaluatorBuilder::default()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn evaluate(&self, ctx: &RuleContext<'_>) -> Resolve {
        for rule in &self.rules {
            if rule.predicate.test(ctx) {
                trace!(rule = %rule.label, "Rule matched");
                return rule.action.resolve(ctx);
            }
        }
        trace!("No rule matched, using fallback");
        self.fallback.resolve(ctx)
    }
}

/// Collects rules in order; `build` checks the chain is well formed
#[derive(Debug, Default)]
pub struct RulesEvaluatorBuilder {
    rules: Vec<Rule>,
    fallbacks: Vec<Action>,
}

impl RulesEvaluatorBuilder {
    pub fn rule(mut self, label: impl Into<String>, predicate: Predicate, action: Action) -> Self {
        self.rules.push(Rule {
            label: label.into(),
            predicate,
            action,
        });
        self
    }

    pub fn otherwise(mut self, action: Action) -> Self {
        self.fallbacks.push(action);
        self
    }

    pub fn build(mut self) -> Result<RulesEvaluator, ManifestError> {
        let mut labels = AHashSet::new();
        for rule in &self.rules {
            if rule.label.trim().is_empty() {
                return Err(ManifestError::EmptyRuleLabel);
            }
            if !labels.insert(rule.label.as_str()) {
                return Err(ManifestError::DuplicateRule(rule.label.clone()));
            }
        }

        if self.fallbacks.len() > 1 {
            return Err(ManifestError::MultipleFallbacks);
        }
        let fallback = self.fallbacks.pop().ok_or(ManifestError::MissingFallback)?;

        Ok(RulesEvaluator {
            rules: self.rules,
            fallback,
        })
    }
}
