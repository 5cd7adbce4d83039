//! Core model for the query view explorer
//!
//! This crate provides the data cube catalog and the immutable query state
//! that visualization manifests are evaluated against.

pub mod cube;
pub mod events;
pub mod state;

use thiserror::Error;

// Re-export commonly used types
pub use cube::{make_title, DataCube, DataCubeConfig, Dimension, DimensionKind, Measure, SortStrategy};
pub use events::EventBus;
pub use state::{
    Bucket, Colors, Filter, FilterClause, Highlight, QueryState, QueryStateConfig, Series, SeriesFormat,
    SeriesList, Sort, SortDirection, Split, Splits, TimeShift,
};

/// Errors raised while building a data cube
#[derive(Error, Debug)]
pub enum CubeError {
    #[error("Data cube name cannot be empty")]
    EmptyName,

    #[error("Data cube '{0}' declares no measures")]
    NoMeasures(String),

    #[error("Name '{0}' is declared more than once")]
    DuplicateName(String),

    #[error("Dimension '{dimension}' sorts by unknown reference '{reference}'")]
    UnknownSortReference { dimension: String, reference: String },

    #[error("Unknown measure '{0}'")]
    UnknownMeasure(String),

    #[error("Unknown dimension '{0}'")]
    UnknownDimension(String),

    #[error("Time attribute '{0}' is not a time dimension")]
    InvalidTimeAttribute(String),

    #[error("Invalid cube configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Errors raised while deriving a query state
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Filter already has a clause on '{0}'")]
    DuplicateClause(String),

    #[error("Unknown dimension '{0}'")]
    UnknownDimension(String),

    #[error("Unknown measure '{0}'")]
    UnknownMeasure(String),
}
