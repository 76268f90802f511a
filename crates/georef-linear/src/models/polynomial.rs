//! Bivariate polynomial transformation of order 1, 2 or 3.

use georef_core::{MatX, PolynomialOrder, Pt2, Result};

use crate::basis::polynomial_terms;
use crate::solver::LinearSystem;

/// Polynomial coefficients, one column per output axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    order: PolynomialOrder,
    coeffs: MatX,
}

impl Polynomial {
    /// Fit `destination ≈ P(source)`; exact when the point count equals the
    /// term count, least squares otherwise.
    pub fn fit(order: PolynomialOrder, source: &[Pt2], destination: &[Pt2]) -> Result<Self> {
        let mut system = LinearSystem::zeros(source.len(), order.term_count(), 2);
        for (i, (s, d)) in source.iter().zip(destination).enumerate() {
            system.put_terms(i, 0, &polynomial_terms(order, s), 1.0);
            system.rhs[(i, 0)] = d.x;
            system.rhs[(i, 1)] = d.y;
        }
        Ok(Self {
            order,
            coeffs: system.solve()?,
        })
    }

    pub(crate) fn from_coefficients(order: PolynomialOrder, coeffs: MatX) -> Self {
        debug_assert_eq!(coeffs.shape(), (order.term_count(), 2));
        Self { order, coeffs }
    }

    pub fn order(&self) -> PolynomialOrder {
        self.order
    }

    pub fn coefficients(&self) -> &MatX {
        &self.coeffs
    }

    pub fn evaluate(&self, p: &Pt2) -> Pt2 {
        let terms = polynomial_terms(self.order, p);
        Pt2::new(
            terms.dot(&self.coeffs.column(0)),
            terms.dot(&self.coeffs.column(1)),
        )
    }
}
