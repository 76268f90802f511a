//! High-level entry crate for `georef-rs`.
//!
//! Georeferencing relates the pixel space of a scanned map (`resource`) to
//! real-world coordinates (`geo`) through ground control points (GCPs).
//! This crate re-exports the two building blocks:
//!
//! - **[`core`]**: point aliases, the control-point data model and errors,
//! - **[`linear`]**: model fitting, the single-map transformer and the staple
//!   engine.
//!
//! ## Single map
//!
//! ```
//! use georef::prelude::*;
//!
//! # fn main() -> Result<(), GeorefError> {
//! let gcps = vec![
//!     Gcp::new(Pt2::new(0.0, 0.0), Pt2::new(4.80, 52.40)),
//!     Gcp::new(Pt2::new(4000.0, 0.0), Pt2::new(5.00, 52.40)),
//!     Gcp::new(Pt2::new(4000.0, 3000.0), Pt2::new(5.00, 52.30)),
//!     Gcp::new(Pt2::new(0.0, 3000.0), Pt2::new(4.80, 52.30)),
//! ];
//! let transformer = GcpTransformer::new(&gcps, TransformationType::ThinPlateSpline)?;
//! let geo = transformer.transform_to_geo(&Pt2::new(2000.0, 1500.0));
//! let back = transformer.transform_to_resource(&geo);
//! assert!((back - Pt2::new(2000.0, 1500.0)).norm() < 1e-6);
//! # Ok(())
//! # }
//! ```
//!
//! ## Several maps
//!
//! Maps that show the same places can be solved jointly: repeated control
//! points ([`core::Rcp`]) with the same id on different maps become staples,
//! and each map gets new GCPs at the resolved staple locations.
//!
//! ```
//! use georef::prelude::*;
//! use georef::core::synthetic::overlapping_sheets;
//!
//! # fn main() -> Result<(), GeorefError> {
//! let (maps, rcps) = overlapping_sheets();
//! let stapled = StapledTransformation::from_georeferenced_maps(&maps, &rcps, StapleOptions::default())?;
//! for map in stapled.to_georeferenced_maps() {
//!     println!("{}: {} GCPs", map.id, map.gcps.len());
//! }
//! # Ok(())
//! # }
//! ```

/// Point aliases, data model and errors.
pub mod core {
    pub use georef_core::*;
}

/// Model fitting, single-map transformer and staple engine.
pub mod linear {
    pub use georef_linear::*;
}

/// Convenient re-exports for common use cases.
///
/// Import with `use georef::prelude::*;`.
pub mod prelude {
    pub use crate::core::{
        Gcp, Geometry, GeorefError, GeoreferencedMap, Pt2, Rcp, RefinementOptions, StapleOptions,
        TransformationType, TransformerOptions,
    };
    pub use crate::linear::{
        AttachedTransformation, DistortionMeasure, GcpTransformer, SolvedModel,
        StapledTransformation, TransformationFamily,
    };
}
