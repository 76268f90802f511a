//! Helmert (similarity) transformation: uniform scale, rotation, translation.

use georef_core::{MatX, Pt2, Real, Result};

use crate::basis::helmert_rows;
use crate::solver::LinearSystem;

/// `x' = tx + a·x − b·y`, `y' = ty + b·x + a·y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Helmert {
    pub tx: Real,
    pub ty: Real,
    pub a: Real,
    pub b: Real,
}

impl Helmert {
    /// Least-squares fit; both axes share the four unknowns, so the rows are
    /// stacked into a single right-hand side.
    pub fn fit(source: &[Pt2], destination: &[Pt2]) -> Result<Self> {
        let mut system = LinearSystem::zeros(2 * source.len(), 4, 1);
        for (i, (s, d)) in source.iter().zip(destination).enumerate() {
            let [rx, ry] = helmert_rows(s);
            for k in 0..4 {
                system.matrix[(2 * i, k)] = rx[k];
                system.matrix[(2 * i + 1, k)] = ry[k];
            }
            system.rhs[(2 * i, 0)] = d.x;
            system.rhs[(2 * i + 1, 0)] = d.y;
        }
        let c = system.solve()?;
        Ok(Self {
            tx: c[(0, 0)],
            ty: c[(1, 0)],
            a: c[(2, 0)],
            b: c[(3, 0)],
        })
    }

    pub fn scale(&self) -> Real {
        self.a.hypot(self.b)
    }

    /// Counter-clockwise rotation in radians.
    pub fn rotation(&self) -> Real {
        self.b.atan2(self.a)
    }

    pub fn coefficients(&self) -> MatX {
        MatX::from_column_slice(4, 1, &[self.tx, self.ty, self.a, self.b])
    }

    pub fn evaluate(&self, p: &Pt2) -> Pt2 {
        Pt2::new(
            self.tx + self.a * p.x - self.b * p.y,
            self.ty + self.b * p.x + self.a * p.y,
        )
    }
}
