//! Core types and geometry primitives for `georef-rs`.
//!
//! This crate provides the foundational building blocks used by the other
//! crates in the workspace:
//!
//! - linear algebra type aliases (`Real`, `Pt2`, `Mat3`, and friends),
//! - the control-point data model (`Gcp`, `Rcp`, `GeoreferencedMap`),
//! - the [`TransformationType`] family and typed options,
//! - the [`GeorefError`] taxonomy,
//! - planar and geographic midpoint/distance helpers.
//!
//! # Modules
//!
//! - \[`math`\]: type aliases and homogeneous helpers.
//! - \[`geometry`\]: planar/geographic midpoints and distances.
//! - \[`synthetic`\]: deterministic fixtures (tests, examples, benchmarks).
//!
//! # Example
//!
//! ```
//! use georef_core::{Gcp, GeoreferencedMap, Pt2, TransformationType};
//!
//! let map = GeoreferencedMap::new(
//!     "sheet-1",
//!     vec![Gcp::new(Pt2::new(0.0, 0.0), Pt2::new(4.89, 52.37))],
//! );
//! assert_eq!(map.gcps.len(), 1);
//! assert_eq!(TransformationType::ThinPlateSpline.min_points(), 3);
//! ```

mod error;
/// Planar and geographic geometry helpers.
pub mod geometry;
/// Linear algebra type aliases and helpers.
mod math;
/// Deterministic synthetic control-point fixtures.
pub mod synthetic;
/// Test utilities for cross-crate testing.
///
/// Public to allow usage in integration tests across the workspace, but not
/// intended for production use.
pub mod test_utils;
/// Data model, options and projection hook.
mod types;

pub use error::*;
pub use geometry::Metric;
pub use math::*;
pub use types::*;
