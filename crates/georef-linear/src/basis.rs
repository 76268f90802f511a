//! Term vectors of the transformation families.
//!
//! Every model evaluates as a linear combination of the terms computed here,
//! which is what lets a single solver fit all of them. Polynomial and
//! thin-plate-spline terms are shared by both output axes; Helmert and
//! projective rows couple the axes and are stacked into one column.

use georef_core::{PolynomialOrder, Pt2, Real, TransformationType, VecX};

/// Polynomial terms at `p`.
///
/// Order 1: `[1, x, y]`; order 2 adds `[x², xy, y²]`; order 3 adds
/// `[x³, x²y, xy², y³]`.
pub fn polynomial_terms(order: PolynomialOrder, p: &Pt2) -> VecX {
    let (x, y) = (p.x, p.y);
    match order {
        PolynomialOrder::First => VecX::from_vec(vec![1.0, x, y]),
        PolynomialOrder::Second => VecX::from_vec(vec![1.0, x, y, x * x, x * y, y * y]),
        PolynomialOrder::Third => VecX::from_vec(vec![
            1.0,
            x,
            y,
            x * x,
            x * y,
            y * y,
            x * x * x,
            x * x * y,
            x * y * y,
            y * y * y,
        ]),
    }
}

/// Thin-plate-spline radial kernel `U(r) = r² ln r`, with `U(0) = 0`.
#[inline]
pub fn tps_kernel(r: Real) -> Real {
    if r == 0.0 {
        0.0
    } else {
        r * r * r.ln()
    }
}

/// Kernel between two points.
#[inline]
pub fn tps_kernel_between(a: &Pt2, b: &Pt2) -> Real {
    tps_kernel((a - b).norm())
}

/// Thin-plate-spline terms at `p`: `[U(p,c₁) … U(p,cₙ), 1, x, y]`.
pub fn tps_terms(p: &Pt2, centers: &[Pt2]) -> VecX {
    let n = centers.len();
    let mut terms = VecX::zeros(n + 3);
    for (j, c) in centers.iter().enumerate() {
        terms[j] = tps_kernel_between(p, c);
    }
    terms[n] = 1.0;
    terms[n + 1] = p.x;
    terms[n + 2] = p.y;
    terms
}

/// The three zero-right-hand-side rows forcing the kernel weights to carry
/// no affine component: `Σw = 0`, `Σw·x = 0`, `Σw·y = 0`.
pub fn tps_side_constraints(centers: &[Pt2]) -> [VecX; 3] {
    let n = centers.len();
    let mut ones = VecX::zeros(n + 3);
    let mut xs = VecX::zeros(n + 3);
    let mut ys = VecX::zeros(n + 3);
    for (j, c) in centers.iter().enumerate() {
        ones[j] = 1.0;
        xs[j] = c.x;
        ys[j] = c.y;
    }
    [ones, xs, ys]
}

/// Helmert rows at `p` over the unknowns `[tx, ty, a, b]`:
/// `x' = tx + a·x − b·y` and `y' = ty + b·x + a·y`.
pub fn helmert_rows(p: &Pt2) -> [[Real; 4]; 2] {
    [[1.0, 0.0, p.x, -p.y], [0.0, 1.0, p.y, p.x]]
}

/// Projective rows for the correspondence `p -> q` over the unknowns
/// `[a, b, c, d, e, f, g, h]` of `x' = (a·x + b·y + c) / (g·x + h·y + 1)`
/// and `y' = (d·x + e·y + f) / (g·x + h·y + 1)`, linearized around `q`.
pub fn projective_rows(p: &Pt2, q: &Pt2) -> [[Real; 8]; 2] {
    let (x, y) = (p.x, p.y);
    [
        [x, y, 1.0, 0.0, 0.0, 0.0, -x * q.x, -y * q.x],
        [0.0, 0.0, 0.0, x, y, 1.0, -x * q.y, -y * q.y],
    ]
}

/// Per-axis terms of a separable family at `p`.
///
/// `centers` are the kernel centers of a thin-plate spline and are ignored by
/// polynomials. Returns `None` for families whose axes are coupled.
pub fn separable_terms(kind: TransformationType, p: &Pt2, centers: &[Pt2]) -> Option<VecX> {
    match kind {
        TransformationType::Polynomial(order) => Some(polynomial_terms(order, p)),
        TransformationType::ThinPlateSpline => Some(tps_terms(p, centers)),
        TransformationType::Helmert | TransformationType::Projective => None,
    }
}

/// Number of per-axis unknowns of a separable family with `centers` kernel
/// centers.
pub fn separable_term_count(kind: TransformationType, centers: usize) -> Option<usize> {
    match kind {
        TransformationType::Polynomial(order) => Some(order.term_count()),
        TransformationType::ThinPlateSpline => Some(centers + 3),
        TransformationType::Helmert | TransformationType::Projective => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polynomial_term_layout() {
        let p = Pt2::new(2.0, 3.0);
        let t1 = polynomial_terms(PolynomialOrder::First, &p);
        assert_eq!(t1.as_slice(), &[1.0, 2.0, 3.0]);
        let t2 = polynomial_terms(PolynomialOrder::Second, &p);
        assert_eq!(t2.as_slice(), &[1.0, 2.0, 3.0, 4.0, 6.0, 9.0]);
        let t3 = polynomial_terms(PolynomialOrder::Third, &p);
        assert_eq!(&t3.as_slice()[6..], &[8.0, 12.0, 18.0, 27.0]);
        for order in [PolynomialOrder::First, PolynomialOrder::Second, PolynomialOrder::Third] {
            assert_eq!(polynomial_terms(order, &p).len(), order.term_count());
        }
    }

    #[test]
    fn kernel_values() {
        assert_eq!(tps_kernel(0.0), 0.0);
        assert_eq!(tps_kernel(1.0), 0.0);
        let e = std::f64::consts::E;
        assert!((tps_kernel(e) - e * e).abs() < 1e-12);
        // Symmetric in its arguments.
        let a = Pt2::new(1.0, 2.0);
        let b = Pt2::new(-3.0, 0.5);
        assert_eq!(tps_kernel_between(&a, &b), tps_kernel_between(&b, &a));
    }

    #[test]
    fn tps_terms_layout() {
        let centers = [Pt2::new(0.0, 0.0), Pt2::new(1.0, 0.0)];
        let t = tps_terms(&Pt2::new(1.0, 0.0), &centers);
        assert_eq!(t.len(), 5);
        assert_eq!(t[1], 0.0);
        assert_eq!(&t.as_slice()[2..], &[1.0, 1.0, 0.0]);

        let [ones, xs, ys] = tps_side_constraints(&centers);
        assert_eq!(ones.as_slice(), &[1.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(xs.as_slice(), &[0.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(ys.as_slice(), &[0.0; 5]);
    }

    #[test]
    fn coupled_families_have_no_separable_terms() {
        let p = Pt2::new(1.0, 1.0);
        assert!(separable_terms(TransformationType::Helmert, &p, &[]).is_none());
        assert!(separable_term_count(TransformationType::Projective, 0).is_none());
        assert_eq!(
            separable_term_count(TransformationType::ThinPlateSpline, 4),
            Some(7)
        );
    }
}
