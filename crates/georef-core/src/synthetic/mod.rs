//! Deterministic synthetic control-point fixtures.
//!
//! Small, reusable building blocks for constructing georeferencing problems
//! with a known answer: pixel grids, GCPs generated from a closed-form
//! mapping, and pairs of overlapping map sheets joined by one staple.
//! Used by workspace tests and the CLI smoke test.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Gcp, GeoreferencedMap, Pt2, Rcp, Real, Vec2};

/// Regular grid of `nx * ny` pixel points with the given spacing.
///
/// Points are ordered deterministically in row-major order (y major).
pub fn grid_points_2d(nx: usize, ny: usize, spacing: Real) -> Vec<Pt2> {
    let mut points = Vec::with_capacity(nx.saturating_mul(ny));
    for j in 0..ny {
        for i in 0..nx {
            points.push(Pt2::new(i as Real * spacing, j as Real * spacing));
        }
    }
    points
}

/// Build GCPs by mapping every resource point through `f`.
pub fn gcps_from_fn(resource: &[Pt2], f: impl Fn(&Pt2) -> Pt2) -> Vec<Gcp> {
    resource.iter().map(|r| Gcp::new(*r, f(r))).collect()
}

/// Seeded geo-side noise, sized relative to the extent of a map's GCPs.
///
/// Offsets are uniform in `[-a, a]` per axis with
/// `a = fraction * max(width, height)` of the clean geo bounding box, so the
/// same fraction perturbs a pixel-scaled and a degree-scaled map alike.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoNoise {
    pub seed: u64,
    pub fraction: Real,
}

impl GeoNoise {
    pub fn new(seed: u64, fraction: Real) -> Self {
        Self { seed, fraction }
    }

    /// Half-width of the per-axis offset for the given clean geo points.
    pub fn amplitude(&self, geo: &[Pt2]) -> Real {
        let Some(first) = geo.first() else {
            return 0.0;
        };
        let (lo, hi) = geo.iter().fold((*first, *first), |(lo, hi), p| {
            (lo.inf(p), hi.sup(p))
        });
        let extent = (hi - lo).amax();
        self.fraction.abs() * extent
    }
}

/// Like [`gcps_from_fn`], with [`GeoNoise`] added to the geo side.
pub fn noisy_gcps_from_fn(
    resource: &[Pt2],
    f: impl Fn(&Pt2) -> Pt2,
    noise: &GeoNoise,
) -> Vec<Gcp> {
    let clean = gcps_from_fn(resource, f);
    let geo: Vec<Pt2> = clean.iter().map(|g| g.geo).collect();
    let a = noise.amplitude(&geo);
    if !(a > 0.0 && a.is_finite()) {
        return clean;
    }
    let mut rng = StdRng::seed_from_u64(noise.seed);
    clean
        .into_iter()
        .map(|g| {
            let offset = Vec2::new(rng.random_range(-a..=a), rng.random_range(-a..=a));
            Gcp::new(g.resource, g.geo + offset)
        })
        .collect()
}

/// Similarity `p -> s·R(θ)·p + t` as a closure.
pub fn similarity(scale: Real, theta: Real, tx: Real, ty: Real) -> impl Fn(&Pt2) -> Pt2 {
    let (s, c) = theta.sin_cos();
    move |p: &Pt2| {
        Pt2::new(
            scale * (c * p.x - s * p.y) + tx,
            scale * (s * p.x + c * p.y) + ty,
        )
    }
}

/// Two 200×200 pixel sheets covering overlapping geo strips.
///
/// Sheet `a` maps pixel `(x, y)` to `(x/2, 190 - y/2)` and sheet `b` to
/// `(x/2, 110 - y/2)`, so the bottom of `a` and the top of `b` show the same
/// ground. Each has four corner GCPs. The single staple `s1` sits at pixel
/// `[100, 180]` on `a` and `[100, 20]` on `b`, both at geo `[50, 100]`.
pub fn overlapping_sheets() -> (Vec<GeoreferencedMap>, Vec<Rcp>) {
    let corners = [
        Pt2::new(0.0, 0.0),
        Pt2::new(200.0, 0.0),
        Pt2::new(200.0, 200.0),
        Pt2::new(0.0, 200.0),
    ];
    let sheet_a = GeoreferencedMap::new(
        "a",
        gcps_from_fn(&corners, |p| Pt2::new(p.x * 0.5, 190.0 - p.y * 0.5)),
    );
    let sheet_b = GeoreferencedMap::new(
        "b",
        gcps_from_fn(&corners, |p| Pt2::new(p.x * 0.5, 110.0 - p.y * 0.5)),
    );
    let rcps = vec![
        Rcp::new("s1", "a", Pt2::new(100.0, 180.0)),
        Rcp::new("s1", "b", Pt2::new(100.0, 20.0)),
    ];
    (vec![sheet_a, sheet_b], rcps)
}

/// Like [`overlapping_sheets`], but the sheets disagree about the ground
/// they share.
///
/// Sheet `a` maps pixel `(x, y)` to `(x/2, 200 - y/2)` and sheet `b` to
/// `(x/2, 100 - y/2)`: two stacked geo quadrants. Fitted on their own, the
/// staple `s1` lands at `[50, 110]` on `a` and `[50, 90]` on `b`.
pub fn disagreeing_sheets() -> (Vec<GeoreferencedMap>, Vec<Rcp>) {
    let (mut maps, rcps) = overlapping_sheets();
    for (map, top) in maps.iter_mut().zip([200.0, 100.0]) {
        for gcp in &mut map.gcps {
            gcp.geo = Pt2::new(gcp.resource.x * 0.5, top - gcp.resource.y * 0.5);
        }
    }
    (maps, rcps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_row_major() {
        let g = grid_points_2d(3, 2, 10.0);
        assert_eq!(g.len(), 6);
        assert_eq!(g[1], Pt2::new(10.0, 0.0));
        assert_eq!(g[3], Pt2::new(0.0, 10.0));
    }

    #[test]
    fn similarity_rotates_quarter_turn() {
        let f = similarity(2.0, std::f64::consts::FRAC_PI_2, 1.0, 0.0);
        let p = f(&Pt2::new(1.0, 0.0));
        assert!((p - Pt2::new(1.0, 2.0)).norm() < 1e-12, "{p:?}");
    }

    #[test]
    fn sheets_share_staple_location() {
        let (maps, rcps) = overlapping_sheets();
        assert_eq!(maps.len(), 2);
        assert_eq!(rcps.len(), 2);
        assert_eq!(maps[0].gcps[2].geo, Pt2::new(100.0, 90.0));
        assert_eq!(maps[1].gcps[0].geo, Pt2::new(0.0, 110.0));
    }

    #[test]
    fn disagreeing_sheets_are_quadrants() {
        let (maps, _) = disagreeing_sheets();
        assert_eq!(maps[0].gcps[0].geo, Pt2::new(0.0, 200.0));
        assert_eq!(maps[0].gcps[2].geo, Pt2::new(100.0, 100.0));
        assert_eq!(maps[1].gcps[2].geo, Pt2::new(100.0, 0.0));
    }

    #[test]
    fn noise_scales_with_geo_extent() {
        let resource = grid_points_2d(4, 4, 10.0);
        let noise = GeoNoise::new(11, 0.01);
        let small = noisy_gcps_from_fn(&resource, |p| *p, &noise);
        let large = noisy_gcps_from_fn(&resource, |p| Pt2::from(p.coords * 1000.0), &noise);

        assert_eq!(small, noisy_gcps_from_fn(&resource, |p| *p, &noise));
        assert!((noise.amplitude(&resource) - 0.3).abs() < 1e-12);
        let mut moved = false;
        for ((s, l), r) in small.iter().zip(&large).zip(&resource) {
            assert_eq!(s.resource, *r);
            let ds = s.geo - *r;
            let dl = l.geo - Pt2::from(r.coords * 1000.0);
            assert!(ds.amax() <= 0.3 + 1e-12, "{ds:?}");
            assert!(dl.amax() <= 300.0 + 1e-9, "{dl:?}");
            moved |= ds.amax() > 0.0;
        }
        assert!(moved);

        let quiet = noisy_gcps_from_fn(&resource, |p| *p, &GeoNoise::default());
        assert_eq!(quiet, gcps_from_fn(&resource, |p| *p));
    }
}
