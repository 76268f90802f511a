//! Typed configuration for transformers, refinement and stapling.
//!
//! Every struct deserializes from camelCase JSON, fills missing keys with the
//! documented defaults and rejects unknown keys.

use serde::{Deserialize, Serialize};

use crate::{Real, SharedProjection, TransformationType};

/// Options fixed when a `GcpTransformer` is constructed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct TransformerOptions {
    /// Mirror the resource y axis while fitting, so a y-down pixel space can
    /// be related to a y-up geographic space by a similarity.
    pub different_handedness: bool,
    /// Projection the model is fitted in. GCP geo points are projected with
    /// it before fitting.
    #[serde(skip)]
    pub internal_projection: Option<SharedProjection>,
    /// Projection of geo inputs and outputs. Defaults to the internal one.
    #[serde(skip)]
    pub projection: Option<SharedProjection>,
}

/// Controls adaptive subdivision of lines and rings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct RefinementOptions {
    /// Offset threshold as a fraction of the source segment length. Used
    /// when `min_offset_distance` is unset.
    pub min_offset_ratio: Real,
    /// Absolute offset threshold in destination units; takes precedence
    /// over `min_offset_ratio` when set and finite.
    pub min_offset_distance: Option<Real>,
    /// Source segments shorter than this are never subdivided.
    pub min_line_distance: Real,
    /// Maximum recursion depth per segment. `0` disables refinement.
    pub max_depth: usize,
    /// Use great-circle midpoints and haversine lengths on the source side.
    pub source_is_geographic: bool,
    /// Use great-circle midpoints and haversine distances on the
    /// destination side.
    #[serde(alias = "geographic")]
    pub destination_is_geographic: bool,
    /// Transform every vertex independently: no refinement, no closing.
    pub is_multi_geometry: bool,
}

impl Default for RefinementOptions {
    fn default() -> Self {
        Self {
            min_offset_ratio: 0.0,
            min_offset_distance: None,
            min_line_distance: 0.0,
            max_depth: 0,
            source_is_geographic: false,
            destination_is_geographic: false,
            is_multi_geometry: false,
        }
    }
}

impl RefinementOptions {
    /// Offset threshold for a source segment of the given length.
    pub fn offset_threshold(&self, source_length: Real) -> Real {
        match self.min_offset_distance {
            Some(d) if d.is_finite() => d,
            _ => self.min_offset_ratio * source_length,
        }
    }
}

/// Options for stapling several maps into one joint transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct StapleOptions {
    /// Model family fitted for every map. Must be polynomial or thin-plate spline.
    pub transformation_type: TransformationType,
    /// Resolve each staple to the mean of all its occurrences instead of the
    /// first (anchor) occurrence.
    #[serde(alias = "averageOutStaplePoints")]
    pub average_out: bool,
    /// Also evaluate ids that occur on a single map (they add no constraint).
    #[serde(alias = "evaluateSingleScps")]
    pub evaluate_single_staple_points: bool,
    /// Replace the geo value of existing GCPs with the jointly solved one.
    pub evaluate_gcps: bool,
    /// Drop existing GCPs from the output maps.
    pub remove_existing_gcps: bool,
    /// Append resolved staple points as new GCPs.
    #[serde(alias = "evaluateAttachmentScps")]
    pub evaluate_staple_points: bool,
}

impl Default for StapleOptions {
    fn default() -> Self {
        Self {
            transformation_type: TransformationType::default(),
            average_out: true,
            evaluate_single_staple_points: false,
            evaluate_gcps: false,
            remove_existing_gcps: false,
            evaluate_staple_points: true,
        }
    }
}
