//! Action library shared by the manifests

use crate::resolutions::Resolutions;
use crate::resolve::{Adjustment, Resolve, HIGH_PRIORITY_ACTION, NORMAL_PRIORITY_ACTION};
use crate::rules::Action;

/// Ask the user to pick splits, suggesting a couple of string dimensions
pub fn manual_dimension_selection(message: impl Into<String>) -> Action {
    let message = message.into();
    Action::new(move |ctx| {
        Resolve::manual(NORMAL_PRIORITY_ACTION, message.clone(), Resolutions::some_dimensions(ctx.data_cube))
    })
}

/// Ask the user to pick measures, suggesting the defaults or the first one
pub fn manual_measures_selection() -> Action {
    Action::new(|ctx| {
        let mut resolutions = Resolutions::default_selected_measures(ctx.data_cube);
        if resolutions.is_empty() {
            resolutions = Resolutions::first_measure(ctx.data_cube);
        }
        Resolve::manual(
            NORMAL_PRIORITY_ACTION,
            "At least one of the measures should be selected",
            resolutions,
        )
    })
}

/// Keep the first `max` splits and drop the rest
pub fn remove_excessive_splits(visualization_title: impl Into<String>, max: usize) -> Action {
    let title = visualization_title.into();
    Action::new(move |ctx| {
        Resolve::automatic(
            HIGH_PRIORITY_ACTION,
            format!("{} supports only {} splits; removing the rest", title, max),
            Adjustment::splits(ctx.splits.truncate(max)),
        )
    })
}

pub fn ready(score: u32) -> Action {
    Action::new(move |_| Resolve::ready(score))
}
