//! Error types for gridmask

use thiserror::Error;

/// Main error type for gridmask operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid weight {weight} for layer {layer}: weight must fall between 0 and 1")]
    InvalidWeight { layer: String, weight: f32 },

    #[error(
        "conflicting rules for layer {layer}: only one of an inclusion range, \
         include values, or exclude values may be supplied, got {first} and {second}"
    )]
    ConflictingRules {
        layer: String,
        first: &'static str,
        second: &'static str,
    },

    #[error(
        "no rule supplied for layer {layer}: supply an inclusion range, include \
         values, exclude values, or mark the layer as raw weights"
    )]
    MissingRule { layer: String },

    #[error("unknown kernel {0:?}: kernel must be \"queen\" or \"rook\"")]
    UnknownKernel(String),

    #[error("layer {layer} does not exist in the store catalogue")]
    UnknownLayer { layer: String },

    #[error("layer {layer} has already been added; request replacement to overwrite it")]
    DuplicateLayer { layer: String },

    #[error("window extends to ({end_row}, {end_col}) but the domain is ({rows}, {cols})")]
    WindowOutOfBounds {
        end_row: usize,
        end_col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("layer {layer} has shape ({ar}, {ac}), expected ({er}, {ec})")]
    ShapeMismatch {
        layer: String,
        er: usize,
        ec: usize,
        ar: usize,
        ac: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this is a configuration error, raised eagerly at construction
    /// or `add_layer` time, as opposed to a store access failure.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::InvalidWeight { .. }
                | Error::ConflictingRules { .. }
                | Error::MissingRule { .. }
                | Error::UnknownKernel(_)
                | Error::UnknownLayer { .. }
                | Error::DuplicateLayer { .. }
        )
    }
}

/// Result type alias for gridmask operations
pub type Result<T> = std::result::Result<T, Error>;
