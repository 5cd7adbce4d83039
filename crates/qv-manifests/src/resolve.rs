//! Resolution verdicts

use qv_core::{QueryState, SeriesList, Splits};
use std::cmp::Ordering;

/// Score of the canned manual and automatic actions
pub const NORMAL_PRIORITY_ACTION: u32 = 3;

/// Score of actions that should win over ordinary suggestions
pub const HIGH_PRIORITY_ACTION: u32 = 4;

/// Changes a resolution proposes to the query state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Adjustment {
    pub splits: Option<Splits>,
    pub series: Option<SeriesList>,
    pub clear_colors: bool,
}

impl Adjustment {
    pub fn splits(splits: Splits) -> Self {
        Self {
            splits: Some(splits),
            ..Default::default()
        }
    }

    pub fn series(series: SeriesList) -> Self {
        Self {
            series: Some(series),
            ..Default::default()
        }
    }

    pub fn clearing_colors(mut self) -> Self {
        self.clear_colors = true;
        self
    }

    /// Derive the adjusted state
    pub fn apply(&self, state: &QueryState) -> QueryState {
        let mut adjusted = state.clone();
        if let Some(splits) = &self.splits {
            adjusted = adjusted.change_splits(splits.clone());
        }
        if let Some(series) = &self.series {
            adjusted = adjusted.change_series(series.clone());
        }
        if self.clear_colors {
            adjusted = adjusted.change_colors(None);
        }
        adjusted
    }
}

/// A described adjustment, offered to the user or applied automatically
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub description: String,
    pub adjustment: Adjustment,
}

impl Resolution {
    pub fn new(description: impl Into<String>, adjustment: Adjustment) -> Self {
        Self {
            description: description.into(),
            adjustment,
        }
    }
}

/// Verdict of evaluating a visualization against a query state
#[derive(Debug, Clone, PartialEq)]
pub enum Resolve {
    /// Valid as is
    Ready { score: u32 },
    /// Invalid, but the attached resolution fixes it
    Automatic { score: u32, resolution: Resolution },
    /// Invalid and needs the user; `resolutions` are suggestions
    Manual {
        score: u32,
        message: String,
        resolutions: Vec<Resolution>,
    },
}

impl Resolve {
    pub fn ready(score: u32) -> Self {
        Resolve::Ready { score }
    }

    pub fn automatic(score: u32, description: impl Into<String>, adjustment: Adjustment) -> Self {
        Resolve::Automatic {
            score,
            resolution: Resolution::new(description, adjustment),
        }
    }

    pub fn manual(score: u32, message: impl Into<String>, resolutions: Vec<Resolution>) -> Self {
        Resolve::Manual {
            score,
            message: message.into(),
            resolutions,
        }
    }

    /// Manual verdict that ranks below everything else
    pub fn never() -> Self {
        Resolve::manual(0, "Visualization is not available", Vec::new())
    }

    pub fn score(&self) -> u32 {
        match self {
            Resolve::Ready { score } | Resolve::Automatic { score, .. } | Resolve::Manual { score, .. } => *score,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Resolve::Ready { .. })
    }

    pub fn is_automatic(&self) -> bool {
        matches!(self, Resolve::Automatic { .. })
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, Resolve::Manual { .. })
    }

    pub fn adjustment(&self) -> Option<&Adjustment> {
        match self {
            Resolve::Automatic { resolution, .. } => Some(&resolution.adjustment),
            _ => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Resolve::Automatic { resolution, .. } => Some(&resolution.description),
            Resolve::Manual { message, .. } => Some(message),
            Resolve::Ready { .. } => None,
        }
    }

    /// Suggestions attached to a manual verdict
    pub fn resolutions(&self) -> &[Resolution] {
        match self {
            Resolve::Manual { resolutions, .. } => resolutions,
            _ => &[],
        }
    }

    /// Ordering that puts the higher score first
    pub fn compare(a: &Resolve, b: &Resolve) -> Ordering {
        b.score().cmp(&a.score())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Resolve::Ready { .. } => "ready",
            Resolve::Automatic { .. } => "automatic",
            Resolve::Manual { .. } => "manual",
        }
    }
}
