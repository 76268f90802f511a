//! Point conditioning for the linear fits.
//!
//! Normalizing points before building a design matrix improves numerical
//! stability by centering the data and scaling it to unit spread. Every model
//! in this crate is fitted in normalized coordinates and de-normalized on
//! evaluation.
//!
//! # References
//!
//! Hartley & Zisserman, "Multiple View Geometry in Computer Vision", 2nd ed.,
//! Algorithm 4.2 (Normalized DLT)

use georef_core::{centroid, Mat3, Pt2, Real};

/// Similarity `p -> scale · (p - center)` mapping a point set to a
/// well-conditioned range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub center: Pt2,
    pub scale: Real,
}

impl Default for Normalization {
    fn default() -> Self {
        Self::identity()
    }
}

impl Normalization {
    pub fn identity() -> Self {
        Self {
            center: Pt2::origin(),
            scale: 1.0,
        }
    }

    /// Hartley normalization for 2D points.
    ///
    /// Centers points at the origin and scales so that the mean distance from
    /// the origin is `√2`.
    ///
    /// Unlike a strict Hartley normalization this never fails: an empty set
    /// yields the identity and a set of coincident points is only translated.
    pub fn from_points(points: &[Pt2]) -> Self {
        let Some(center) = centroid(points) else {
            return Self::identity();
        };

        let mean_dist = points.iter().map(|p| (p - center).norm()).sum::<Real>()
            / points.len() as Real;

        let scale = if mean_dist > Real::EPSILON * (1.0 + center.coords.norm()) {
            std::f64::consts::SQRT_2 / mean_dist
        } else {
            1.0
        };

        Self { center, scale }
    }

    #[inline]
    pub fn apply(&self, p: &Pt2) -> Pt2 {
        Pt2::from((p - self.center) * self.scale)
    }

    #[inline]
    pub fn invert(&self, p: &Pt2) -> Pt2 {
        self.center + p.coords / self.scale
    }

    pub fn apply_all(&self, points: &[Pt2]) -> Vec<Pt2> {
        points.iter().map(|p| self.apply(p)).collect()
    }

    /// Homogeneous 3×3 matrix `T` such that `p_norm = T * p_homogeneous`.
    pub fn matrix(&self) -> Mat3 {
        let s = self.scale;
        Mat3::new(
            s,
            0.0,
            -s * self.center.x,
            0.0,
            s,
            -s * self.center.y,
            0.0,
            0.0,
            1.0,
        )
    }

    /// Inverse of [`Normalization::matrix`].
    pub fn inverse_matrix(&self) -> Mat3 {
        let inv = 1.0 / self.scale;
        Mat3::new(
            inv,
            0.0,
            self.center.x,
            0.0,
            inv,
            self.center.y,
            0.0,
            0.0,
            1.0,
        )
    }
}
