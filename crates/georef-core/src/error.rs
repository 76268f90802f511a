//! Error taxonomy shared by every fitting and stapling entry point.

use crate::TransformationType;
use thiserror::Error;

/// Errors raised while fitting transformations or stapling maps.
///
/// All variants describe deterministic input problems; they are raised at
/// fit or construction time and never deferred.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeorefError {
    #[error("need at least {required} points, got {found}")]
    NotEnoughPoints { required: usize, found: usize },
    #[error("source and destination differ in length ({source_len} vs {destination_len})")]
    DimensionMismatch {
        source_len: usize,
        destination_len: usize,
    },
    #[error("linear system is singular: pivot column {column} is zero")]
    Unsolvable { column: usize },
    #[error("need at least 2 maps to staple, got {0}")]
    NotEnoughMaps(usize),
    #[error("map id {0:?} is given more than once")]
    DuplicateMapId(String),
    #[error("no repeated control point references any of the given maps")]
    NoMatchingRcps,
    #[error("no repeated control point id occurs on two or more maps")]
    NoStaples,
    #[error("transformation type {0} cannot be used for stapling")]
    UnsupportedTransformation(TransformationType),
    #[error("polynomial order must be 1, 2 or 3, got {0}")]
    InvalidPolynomialOrder(u8),
    #[error("unknown transformation type {0:?}")]
    UnknownTransformationType(String),
    #[error("unknown distortion measure {0:?}")]
    UnknownDistortionMeasure(String),
}

/// Result alias used across the georeferencing crates.
pub type Result<T> = std::result::Result<T, GeorefError>;
