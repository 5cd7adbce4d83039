//! Explorer session: the query state, the selected visualization and its verdict
//!
//! Every mutation derives a new query state, picks a visualization according
//! to a [`VisStrategy`], applies the chosen manifest's automatic adjustment
//! once and publishes what changed on the session's [`EventBus`].

use parking_lot::RwLock;
use qv_core::events::events::{AdjustmentApplied, QueryStateChanged, VisualizationChanged};
use qv_core::{Colors, EventBus, Filter, Highlight, QueryState, SeriesList, Splits};
use tracing::debug;

use crate::catalog::{catalog, ManifestCatalog};
use crate::manifests::Visualization;
use crate::resolve::Resolve;

/// How a split change may move the selected visualization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisStrategy {
    /// Re-rank every visualization and switch to the best
    FairGame,
    /// Keep the current visualization unless it can no longer resolve itself
    UnfairGame,
    /// Never switch
    KeepAlways,
}

#[derive(Debug, Clone)]
struct SessionState {
    query: QueryState,
    visualization: Visualization,
    resolve: Resolve,
}

/// Result of settling a derived query state
struct Outcome {
    state: SessionState,
    adjustment: Option<String>,
}

pub struct ExplorerSession {
    catalog: &'static ManifestCatalog,
    state: RwLock<SessionState>,
    event_bus: EventBus,
}

impl ExplorerSession {
    /// Start on the best visualization for `query`
    pub fn new(query: QueryState) -> Self {
        Self::start(query, Visualization::Totals, VisStrategy::FairGame)
    }

    /// Start on `visualization` whatever its verdict
    pub fn with_visualization(query: QueryState, visualization: Visualization) -> Self {
        Self::start(query, visualization, VisStrategy::KeepAlways)
    }

    fn start(query: QueryState, visualization: Visualization, strategy: VisStrategy) -> Self {
        let catalog = catalog();
        let outcome = settle(catalog, query, visualization, strategy);
        Self {
            catalog,
            state: RwLock::new(outcome.state),
            event_bus: EventBus::new(),
        }
    }

    /// Current query state
    pub fn snapshot(&self) -> QueryState {
        self.state.read().query.clone()
    }

    pub fn visualization(&self) -> Visualization {
        self.state.read().visualization
    }

    /// Verdict of the selected visualization on the current state
    pub fn resolve(&self) -> Resolve {
        self.state.read().resolve.clone()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn change_splits(&self, splits: Splits, strategy: VisStrategy) -> Resolve {
        self.transition(|current| {
            // a visualization waiting on the user stays selected
            let strategy = if current.resolve.is_manual() {
                VisStrategy::KeepAlways
            } else {
                strategy
            };
            (current.query.change_splits(splits), current.visualization, strategy)
        })
    }

    pub fn change_filter(&self, filter: Filter) -> Resolve {
        self.transition(|current| (current.query.change_filter(filter), current.visualization, VisStrategy::KeepAlways))
    }

    pub fn change_series(&self, series: SeriesList) -> Resolve {
        self.transition(|current| (current.query.change_series(series), current.visualization, VisStrategy::KeepAlways))
    }

    pub fn change_colors(&self, colors: Option<Colors>) -> Resolve {
        self.transition(|current| (current.query.change_colors(colors), current.visualization, VisStrategy::KeepAlways))
    }

    /// Select a visualization explicitly
    pub fn change_visualization(&self, visualization: Visualization) -> Resolve {
        self.transition(|current| (current.query.clone(), visualization, VisStrategy::KeepAlways))
    }

    pub fn change_highlight(&self, highlight: Option<Highlight>) -> Resolve {
        self.transition(|current| {
            (current.query.change_highlight(highlight), current.visualization, VisStrategy::KeepAlways)
        })
    }

    /// Fold the pending highlight into the filter
    pub fn accept_highlight(&self) -> Resolve {
        self.transition(|current| (current.query.accept_highlight(), current.visualization, VisStrategy::KeepAlways))
    }

    /// Evaluation runs on a snapshot outside the lock; concurrent
    /// transitions resolve last-writer-wins
    fn transition<F>(&self, derive: F) -> Resolve
    where
        F: FnOnce(&SessionState) -> (QueryState, Visualization, VisStrategy),
    {
        let snapshot = self.state.read().clone();
        let (query, visualization, strategy) = derive(&snapshot);
        let previous = snapshot.visualization;
        let outcome = settle(self.catalog, query, visualization, strategy);

        let mut state = self.state.write();
        *state = outcome.state;
        let resolve = state.resolve.clone();
        let current = state.visualization;
        let changed = QueryStateChanged {
            split_count: state.query.splits().len(),
            series_count: state.query.series().len(),
            filter_clause_count: state.query.filter().len(),
        };
        drop(state);

        self.event_bus.publish(changed);
        if previous != current {
            debug!("Visualization changed from {} to {}", previous, current);
            self.event_bus.publish(VisualizationChanged {
                from: previous.id().to_string(),
                to: current.id().to_string(),
            });
        }
        if let Some(description) = outcome.adjustment {
            self.event_bus.publish(AdjustmentApplied {
                visualization: current.id().to_string(),
                description,
            });
        }
        resolve
    }
}

fn settle(
    catalog: &ManifestCatalog,
    query: QueryState,
    current: Visualization,
    strategy: VisStrategy,
) -> Outcome {
    let best = |query: &QueryState| {
        catalog
            .best_visualization(query, current)
            .map_or(current, |verdict| verdict.visualization)
    };
    let visualization = match strategy {
        VisStrategy::KeepAlways => current,
        VisStrategy::UnfairGame => match catalog.manifest(current) {
            Some(manifest) if !manifest.evaluate(&query, true).is_manual() => current,
            _ => best(&query),
        },
        VisStrategy::FairGame => best(&query),
    };

    let Some(manifest) = catalog.manifest(visualization) else {
        return Outcome {
            state: SessionState { query, visualization, resolve: Resolve::never() },
            adjustment: None,
        };
    };

    match manifest.evaluate(&query, true) {
        Resolve::Automatic { resolution, .. } => {
            debug!("Applying adjustment for {}: {}", visualization, resolution.description);
            let query = resolution.adjustment.apply(&query);
            let resolve = manifest.evaluate(&query, true);
            Outcome {
                state: SessionState { query, visualization, resolve },
                adjustment: Some(resolution.description),
            }
        }
        resolve => Outcome {
            state: SessionState { query, visualization, resolve },
            adjustment: None,
        },
    }
}
