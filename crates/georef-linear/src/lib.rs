//! Linear fitting of GCP transformations.
//!
//! Every transformation family is fitted by building a linear system from
//! its term vectors and solving it with one dense solver:
//!
//! - [`basis`]: term vectors (polynomial, thin-plate-spline kernel, Helmert
//!   and projective rows),
//! - [`solver`]: Gauss–Jordan with partial pivoting, normal equations for
//!   overdetermined systems,
//! - [`models`]: per-family fitting and evaluation behind [`SolvedModel`],
//! - [`transformer`]: the single-map [`GcpTransformer`] with line/polygon
//!   refinement and distortion measures,
//! - [`staple`]: [`StapledTransformation`], joint solving of several maps
//!   tied together by repeated control points.
//!
//! # Example
//!
//! ```
//! use georef_core::{Gcp, Pt2, TransformationType};
//! use georef_linear::GcpTransformer;
//!
//! let gcps = vec![
//!     Gcp::new(Pt2::new(0.0, 0.0), Pt2::new(4.0, 52.0)),
//!     Gcp::new(Pt2::new(1000.0, 0.0), Pt2::new(5.0, 52.0)),
//!     Gcp::new(Pt2::new(0.0, 1000.0), Pt2::new(4.0, 51.0)),
//! ];
//! let t = GcpTransformer::new(&gcps, TransformationType::default())?;
//! let geo = t.transform_to_geo(&Pt2::new(500.0, 500.0));
//! assert!((geo.x - 4.5).abs() < 1e-9 && (geo.y - 51.5).abs() < 1e-9);
//! # Ok::<(), georef_core::GeorefError>(())
//! ```

pub mod basis;
pub mod math;
pub mod models;
pub mod solver;
pub mod staple;
pub mod transformer;

pub use math::Normalization;
pub use models::{HelmertParameters, SolvedModel, TransformationFamily};
pub use solver::{solve_least_squares, LinearSystem};
pub use staple::{
    AttachedTransformation, Block, BlockLayout, ResolvedStaple, Staple, StapleOccurrence,
    StapledTransformation,
};
pub use transformer::{DistortionMeasure, GcpTransformer, TissotIndicatrix};
