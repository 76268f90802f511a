//! Projective transformation (homography) with eight unknowns.
//!
//! Unlike the SVD-based DLT the bottom-right entry is fixed to 1 and the
//! remaining eight unknowns are solved with the shared linear solver.

use georef_core::{from_homogeneous, to_homogeneous, Mat3, MatX, Pt2, Result};

use crate::basis::projective_rows;
use crate::solver::LinearSystem;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projective {
    h: Mat3,
}

impl Projective {
    /// Estimate `H` such that `destination ~ H · source`.
    pub fn fit(source: &[Pt2], destination: &[Pt2]) -> Result<Self> {
        let mut system = LinearSystem::zeros(2 * source.len(), 8, 1);
        for (i, (s, d)) in source.iter().zip(destination).enumerate() {
            let [rx, ry] = projective_rows(s, d);
            for k in 0..8 {
                system.matrix[(2 * i, k)] = rx[k];
                system.matrix[(2 * i + 1, k)] = ry[k];
            }
            system.rhs[(2 * i, 0)] = d.x;
            system.rhs[(2 * i + 1, 0)] = d.y;
        }
        let c = system.solve()?;

        let mut h = Mat3::identity();
        for r in 0..3 {
            for col in 0..3 {
                if r * 3 + col < 8 {
                    h[(r, col)] = c[(r * 3 + col, 0)];
                }
            }
        }
        Ok(Self { h })
    }

    pub fn matrix(&self) -> &Mat3 {
        &self.h
    }

    pub fn coefficients(&self) -> MatX {
        MatX::from_row_slice(8, 1, &self.h.transpose().as_slice()[..8])
    }

    /// Points on the horizon line (`w == 0`) map to infinity.
    pub fn evaluate(&self, p: &Pt2) -> Pt2 {
        from_homogeneous(&(self.h * to_homogeneous(p)))
    }
}
