//! Helpers for comparing point sets in tests.
//!
//! Public so integration tests across the workspace can use them; not
//! intended for production use.

use crate::{Pt2, Real};

/// Largest Euclidean distance between corresponding points.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn max_point_error(actual: &[Pt2], expected: &[Pt2]) -> Real {
    assert_eq!(actual.len(), expected.len(), "point count mismatch");
    actual
        .iter()
        .zip(expected)
        .map(|(a, e)| (a - e).norm())
        .fold(0.0, Real::max)
}

/// Assert that two points agree within `tol`, with a readable message.
#[track_caller]
pub fn assert_pt_near(actual: &Pt2, expected: &Pt2, tol: Real) {
    let err = (actual - expected).norm();
    assert!(
        err <= tol,
        "expected {:?}, got {:?} (error {:.3e} > {:.1e})",
        expected,
        actual,
        err,
        tol
    );
}
