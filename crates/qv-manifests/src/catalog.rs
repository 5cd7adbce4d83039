//! The set of registered manifests and verdict ranking

use ahash::AHashSet;
use once_cell::sync::Lazy;
use qv_core::QueryState;
use tracing::debug;

use crate::manifests::{bar_chart, heatmap, line_chart, table, totals, Manifest, Visualization};
use crate::resolve::Resolve;
use crate::ManifestError;

static CATALOG: Lazy<ManifestCatalog> = Lazy::new(|| match ManifestCatalog::standard() {
    Ok(catalog) => catalog,
    // a malformed built-in rule chain is a programming error
    Err(e) => panic!("Failed to build the visualization catalog: {}", e),
});

/// Process-wide catalog of the built-in visualizations
pub fn catalog() -> &'static ManifestCatalog {
    &CATALOG
}

/// Verdict for one visualization
#[derive(Debug, Clone, PartialEq)]
pub struct RankedVerdict {
    pub visualization: Visualization,
    pub resolve: Resolve,
}

/// Manifests in registration order
#[derive(Debug, Clone)]
pub struct ManifestCatalog {
    manifests: Vec<Manifest>,
}

impl ManifestCatalog {
    pub fn from_manifests(manifests: Vec<Manifest>) -> Result<Self, ManifestError> {
        let mut seen = AHashSet::new();
        for manifest in &manifests {
            if !seen.insert(manifest.visualization()) {
                return Err(ManifestError::DuplicateVisualization(manifest.name().to_string()));
            }
        }
        Ok(Self { manifests })
    }

    /// Totals, table, line chart, bar chart, heatmap
    pub fn standard() -> Result<Self, ManifestError> {
        Self::from_manifests(vec![
            totals::manifest()?,
            table::manifest()?,
            line_chart::manifest()?,
            bar_chart::manifest()?,
            heatmap::manifest()?,
        ])
    }

    pub fn manifests(&self) -> &[Manifest] {
        &self.manifests
    }

    pub fn manifest(&self, visualization: Visualization) -> Option<&Manifest> {
        self.manifests.iter().find(|m| m.visualization() == visualization)
    }

    /// Evaluate every manifest, best score first; ties keep registration order
    pub fn evaluate_all(&self, state: &QueryState, current: Visualization) -> Vec<RankedVerdict> {
        let mut verdicts: Vec<RankedVerdict> = self
            .manifests
            .iter()
            .map(|manifest| RankedVerdict {
                visualization: manifest.visualization(),
                resolve: manifest.evaluate(state, manifest.visualization() == current),
            })
            .collect();

        // sort_by is stable
        verdicts.sort_by(|a, b| Resolve::compare(&a.resolve, &b.resolve));
        verdicts
    }

    /// Highest-ranked visualization and its verdict
    pub fn best_visualization(&self, state: &QueryState, current: Visualization) -> Option<RankedVerdict> {
        let best = self.evaluate_all(state, current).into_iter().next();
        if let Some(best) = &best {
            debug!(
                "Best visualization is {} ({}, score {})",
                best.visualization,
                best.resolve.kind_name(),
                best.resolve.score()
            );
        }
        best
    }
}
