//! Thin-plate spline: affine part plus one radial kernel per control point.
//!
//! The system is `[K P; Pᵀ 0] · [w; a] = [v; 0]` where `K` holds the kernel
//! between control points, `P` their affine terms `[1, x, y]`, and the last
//! three rows keep the kernel weights free of any affine component. It is
//! square, so the spline interpolates its control points exactly.

use georef_core::{MatX, Pt2, Result};

use crate::basis::{tps_side_constraints, tps_terms};
use crate::solver::LinearSystem;

#[derive(Debug, Clone, PartialEq)]
pub struct ThinPlateSpline {
    centers: Vec<Pt2>,
    /// `(n + 3) × 2`: kernel weights followed by the affine `[1, x, y]` part.
    coeffs: MatX,
}

impl ThinPlateSpline {
    /// Fit the interpolating spline. Coincident control points make the
    /// kernel matrix singular and fail with `Unsolvable`.
    pub fn fit(source: &[Pt2], destination: &[Pt2]) -> Result<Self> {
        let n = source.len();
        let mut system = LinearSystem::zeros(n + 3, n + 3, 2);
        for (i, (s, d)) in source.iter().zip(destination).enumerate() {
            system.put_terms(i, 0, &tps_terms(s, source), 1.0);
            system.rhs[(i, 0)] = d.x;
            system.rhs[(i, 1)] = d.y;
        }
        for (k, row) in tps_side_constraints(source).iter().enumerate() {
            system.put_terms(n + k, 0, row, 1.0);
        }
        Ok(Self {
            centers: source.to_vec(),
            coeffs: system.solve()?,
        })
    }

    pub(crate) fn from_coefficients(centers: Vec<Pt2>, coeffs: MatX) -> Self {
        debug_assert_eq!(coeffs.shape(), (centers.len() + 3, 2));
        Self { centers, coeffs }
    }

    /// Kernel centers, in the coordinates the spline was fitted in.
    pub fn centers(&self) -> &[Pt2] {
        &self.centers
    }

    pub fn coefficients(&self) -> &MatX {
        &self.coeffs
    }

    /// O(n) in the number of control points.
    pub fn evaluate(&self, p: &Pt2) -> Pt2 {
        let terms = tps_terms(p, &self.centers);
        Pt2::new(
            terms.dot(&self.coeffs.column(0)),
            terms.dot(&self.coeffs.column(1)),
        )
    }
}
