//! Pluggable point remapping applied around the fitted transformation.

use std::fmt;
use std::sync::Arc;

use crate::Pt2;

/// Point remapping between a public coordinate system and the one a
/// transformation is fitted in (for example lon/lat and Web Mercator).
///
/// Implementations live outside this workspace; the core only calls them.
pub trait PointProjection: Send + Sync + fmt::Debug {
    /// Map a point from the public coordinate system into this projection.
    fn project(&self, p: &Pt2) -> Pt2;
    /// Inverse of [`PointProjection::project`].
    fn unproject(&self, p: &Pt2) -> Pt2;
}

/// Shared handle to a projection.
pub type SharedProjection = Arc<dyn PointProjection>;

/// Projection that leaves points untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityProjection;

impl PointProjection for IdentityProjection {
    fn project(&self, p: &Pt2) -> Pt2 {
        *p
    }

    fn unproject(&self, p: &Pt2) -> Pt2 {
        *p
    }
}

/// Projection built from a pair of plain functions.
pub struct FnProjection {
    name: String,
    forward: fn(&Pt2) -> Pt2,
    inverse: fn(&Pt2) -> Pt2,
}

impl FnProjection {
    pub fn new(
        name: impl Into<String>,
        forward: fn(&Pt2) -> Pt2,
        inverse: fn(&Pt2) -> Pt2,
    ) -> Self {
        Self {
            name: name.into(),
            forward,
            inverse,
        }
    }
}

impl fmt::Debug for FnProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProjection").field("name", &self.name).finish()
    }
}

impl PointProjection for FnProjection {
    fn project(&self, p: &Pt2) -> Pt2 {
        (self.forward)(p)
    }

    fn unproject(&self, p: &Pt2) -> Pt2 {
        (self.inverse)(p)
    }
}
