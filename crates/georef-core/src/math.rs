//! Linear algebra type aliases and homogeneous helpers.

use nalgebra::{DMatrix, DVector, Matrix3, Point2, Vector2, Vector3};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 2D vector with [`Real`] components.
pub type Vec2 = Vector2<Real>;
/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 2D point with [`Real`] coordinates.
///
/// Whether a point lives in resource (pixel) space or geo space is
/// contextual; a slice of points never mixes the two.
pub type Pt2 = Point2<Real>;
/// 3×3 matrix with [`Real`] entries.
pub type Mat3 = Matrix3<Real>;
/// Dynamically sized matrix, used for design matrices and normal equations.
pub type MatX = DMatrix<Real>;
/// Dynamically sized column vector.
pub type VecX = DVector<Real>;

/// Convert a 2D point in Euclidean coordinates into homogeneous coordinates.
///
/// Given a point `p = (x, y)`, returns the homogeneous vector `(x, y, 1)`.
pub fn to_homogeneous(p: &Pt2) -> Vec3 {
    Vec3::new(p.x, p.y, 1.0)
}

/// Convert a 3D homogeneous vector back to a 2D point.
///
/// The input is interpreted as `(x, y, w)` and the result is `(x / w, y / w)`.
/// The caller is responsible for ensuring that `w != 0`.
pub fn from_homogeneous(v: &Vec3) -> Pt2 {
    Pt2::new(v.x / v.z, v.y / v.z)
}

/// Mirror a point across the x axis (`y -> -y`).
///
/// Used to reconcile a y-down pixel space with a y-up geographic space.
#[inline]
pub fn flip_y(p: &Pt2) -> Pt2 {
    Pt2::new(p.x, -p.y)
}

/// Component-wise mean of a set of points, or `None` for an empty slice.
pub fn centroid(points: &[Pt2]) -> Option<Pt2> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as Real;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Pt2::new(sx / n, sy / n))
}
