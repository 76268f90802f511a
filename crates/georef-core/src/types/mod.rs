//! Data model shared across the workspace.
//!
//! Control points and maps, GeoJSON-shaped geometries, transformation
//! families, typed options and the projection hook.

mod control_points;
mod geojson;
mod options;
mod projection;
mod residuals;
mod transformation;

pub use control_points::*;
pub use geojson::*;
pub use options::*;
pub use projection::*;
pub use residuals::*;
pub use transformation::*;
