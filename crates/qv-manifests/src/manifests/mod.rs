//! Visualization manifests
//!
//! A manifest binds a visualization identity to the rule chain deciding
//! whether a query state suits it.

pub mod bar_chart;
pub mod heatmap;
pub mod line_chart;
pub mod table;
pub mod totals;

use std::fmt;
use std::str::FromStr;

use qv_core::{DataCube, Dimension, QueryState, Sort, SortDirection, SortStrategy};

use crate::actions::{manual_measures_selection, ready};
use crate::predicates::no_series;
use crate::resolve::Resolve;
use crate::rules::{RuleContext, RulesEvaluator};
use crate::ManifestError;

/// Selectable visualization types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Visualization {
    Totals,
    Table,
    LineChart,
    BarChart,
    Heatmap,
}

impl Visualization {
    pub const ALL: [Visualization; 5] = [
        Visualization::Totals,
        Visualization::Table,
        Visualization::LineChart,
        Visualization::BarChart,
        Visualization::Heatmap,
    ];

    /// Stable identifier shared with the UI shell
    pub fn id(&self) -> &'static str {
        match self {
            Visualization::Totals => "totals",
            Visualization::Table => "table",
            Visualization::LineChart => "line-chart",
            Visualization::BarChart => "bar-chart",
            Visualization::Heatmap => "heatmap",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Visualization::Totals => "Totals",
            Visualization::Table => "Table",
            Visualization::LineChart => "Line Chart",
            Visualization::BarChart => "Bar Chart",
            Visualization::Heatmap => "Heatmap",
        }
    }
}

impl FromStr for Visualization {
    type Err = ManifestError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        Visualization::ALL
            .into_iter()
            .find(|v| v.id() == id)
            .ok_or_else(|| ManifestError::UnknownVisualization(id.to_string()))
    }
}

impl fmt::Display for Visualization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A visualization and the rules that resolve it
#[derive(Debug, Clone)]
pub struct Manifest {
    visualization: Visualization,
    independent: RulesEvaluator,
    rules: RulesEvaluator,
}

impl Manifest {
    pub fn new(visualization: Visualization, rules: RulesEvaluator) -> Result<Self, ManifestError> {
        let independent = RulesEvaluator::builder()
            .rule("no series selected", no_series(), manual_measures_selection())
            .otherwise(ready(0))
            .build()?;

        Ok(Self {
            visualization,
            independent,
            rules,
        })
    }

    pub fn visualization(&self) -> Visualization {
        self.visualization
    }

    pub fn name(&self) -> &'static str {
        self.visualization.id()
    }

    pub fn title(&self) -> &'static str {
        self.visualization.title()
    }

    /// The visualization-specific rule chain
    pub fn rules(&self) -> &RulesEvaluator {
        &self.rules
    }

    pub fn evaluate(&self, state: &QueryState, is_selected_visualization: bool) -> Resolve {
        self.evaluate_context(&RuleContext::new(state, is_selected_visualization))
    }

    /// Checks shared by every visualization run first; a manual verdict
    /// there wins over the manifest's own rules
    pub fn evaluate_context(&self, ctx: &RuleContext<'_>) -> Resolve {
        let independent = self.independent.evaluate(ctx);
        if independent.is_manual() {
            return independent;
        }
        self.rules.evaluate(ctx)
    }
}

/// Sort implied by a dimension's sort strategy
///
/// A strategy naming a measure sorts by that series, one naming a
/// dimension sorts by its value. Returns `None` when the dimension has no
/// strategy or its reference no longer resolves.
pub(crate) fn strategy_sort(data_cube: &DataCube, dimension: &Dimension, direction: SortDirection) -> Option<Sort> {
    match dimension.sort_strategy.as_ref()? {
        SortStrategy::SelfValue => Some(Sort::Dimension {
            reference: dimension.name.clone(),
            direction,
        }),
        SortStrategy::Reference(reference) if data_cube.has_measure(reference) => Some(Sort::Series {
            reference: reference.clone(),
            direction,
        }),
        SortStrategy::Reference(reference) if data_cube.has_dimension(reference) => Some(Sort::Dimension {
            reference: reference.clone(),
            direction,
        }),
        SortStrategy::Reference(_) => None,
    }
}
