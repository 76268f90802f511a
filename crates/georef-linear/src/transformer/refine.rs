//! Adaptive subdivision of lines and rings under a nonlinear mapping.
//!
//! A straight source segment generally maps to a curve. Each segment is
//! split at its source midpoint while the mapped midpoint deviates from the
//! midpoint of the mapped endpoints by more than the offset threshold, up to
//! `max_depth` levels.

use georef_core::{Metric, Pt2, RefinementOptions};

struct Refiner<'a, F> {
    f: F,
    options: &'a RefinementOptions,
    source: Metric,
    destination: Metric,
}

impl<F: Fn(&Pt2) -> Pt2> Refiner<'_, F> {
    /// Push the refined interior points of segment `a -> b` (endpoints excluded).
    fn segment(&self, a: &Pt2, b: &Pt2, fa: &Pt2, fb: &Pt2, depth: usize, out: &mut Vec<Pt2>) {
        if depth >= self.options.max_depth {
            return;
        }
        let source_length = self.source.distance(a, b);
        if source_length < self.options.min_line_distance {
            return;
        }

        let mid = self.source.midpoint(a, b);
        let projected_mid = (self.f)(&mid);
        let linear_mid = self.destination.midpoint(fa, fb);
        let offset = self.destination.distance(&projected_mid, &linear_mid);

        if offset > self.options.offset_threshold(source_length) {
            self.segment(a, &mid, fa, &projected_mid, depth + 1, out);
            out.push(projected_mid);
            self.segment(&mid, b, &projected_mid, fb, depth + 1, out);
        }
    }
}

fn refiner<F: Fn(&Pt2) -> Pt2>(f: F, options: &RefinementOptions) -> Refiner<'_, F> {
    Refiner {
        f,
        options,
        source: Metric::from_flag(options.source_is_geographic),
        destination: Metric::from_flag(options.destination_is_geographic),
    }
}

/// Map an open polyline through `f`, inserting points where it bends.
pub fn refine_line_string<F>(points: &[Pt2], f: F, options: &RefinementOptions) -> Vec<Pt2>
where
    F: Fn(&Pt2) -> Pt2,
{
    if options.is_multi_geometry || points.len() < 2 {
        return points.iter().map(f).collect();
    }
    let refiner = refiner(f, options);
    let mapped: Vec<Pt2> = points.iter().map(&refiner.f).collect();

    let mut out = Vec::with_capacity(points.len());
    out.push(mapped[0]);
    for i in 1..points.len() {
        refiner.segment(&points[i - 1], &points[i], &mapped[i - 1], &mapped[i], 0, &mut out);
        out.push(mapped[i]);
    }
    out
}

/// Map an open ring (no repeated closing vertex) through `f`. The closing
/// segment from the last vertex back to the first is refined too; the
/// result is open as well.
pub fn refine_ring<F>(ring: &[Pt2], f: F, options: &RefinementOptions) -> Vec<Pt2>
where
    F: Fn(&Pt2) -> Pt2,
{
    if options.is_multi_geometry || ring.len() < 2 {
        return ring.iter().map(f).collect();
    }
    let refiner = refiner(f, options);
    let mapped: Vec<Pt2> = ring.iter().map(&refiner.f).collect();

    let n = ring.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let j = (i + 1) % n;
        out.push(mapped[i]);
        refiner.segment(&ring[i], &ring[j], &mapped[i], &mapped[j], 0, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bend(p: &Pt2) -> Pt2 {
        Pt2::new(p.x, p.y + 0.01 * p.x * p.x)
    }

    fn depth(max_depth: usize) -> RefinementOptions {
        RefinementOptions {
            max_depth,
            ..RefinementOptions::default()
        }
    }

    #[test]
    fn no_refinement_by_default() {
        let line = [Pt2::new(0.0, 0.0), Pt2::new(100.0, 0.0)];
        let out = refine_line_string(&line, bend, &RefinementOptions::default());
        assert_eq!(out, vec![bend(&line[0]), bend(&line[1])]);
    }

    #[test]
    fn full_binary_subdivision_keeps_order() {
        let line = [Pt2::new(0.0, 0.0), Pt2::new(100.0, 0.0)];
        let out = refine_line_string(&line, bend, &depth(3));
        assert_eq!(out.len(), 2 + 7);
        for (i, p) in out.iter().enumerate() {
            let x = 12.5 * i as f64;
            assert!((p.x - x).abs() < 1e-12 && (p.y - 0.01 * x * x).abs() < 1e-9, "{i}: {p:?}");
        }
    }

    #[test]
    fn linear_maps_are_never_refined() {
        let line = [Pt2::new(0.0, 0.0), Pt2::new(100.0, 50.0), Pt2::new(-20.0, 5.0)];
        let affine = |p: &Pt2| Pt2::new(2.0 * p.x + 1.0, p.y - p.x);
        assert_eq!(refine_line_string(&line, affine, &depth(8)).len(), 3);
    }

    #[test]
    fn thresholds_and_short_segments() {
        let line = [Pt2::new(0.0, 0.0), Pt2::new(100.0, 0.0)];
        // Midpoint offset is 0.01 * 50² - 0.5 * 0.01 * 100² = -25.
        let mut opts = depth(1);
        opts.min_offset_distance = Some(30.0);
        assert_eq!(refine_line_string(&line, bend, &opts).len(), 2);
        opts.min_offset_distance = Some(20.0);
        assert_eq!(refine_line_string(&line, bend, &opts).len(), 3);

        opts.min_offset_distance = None;
        opts.min_offset_ratio = 0.3;
        assert_eq!(refine_line_string(&line, bend, &opts).len(), 2);
        opts.min_offset_ratio = 0.2;
        assert_eq!(refine_line_string(&line, bend, &opts).len(), 3);

        opts.min_line_distance = 101.0;
        assert_eq!(refine_line_string(&line, bend, &opts).len(), 2);
    }

    #[test]
    fn monotone_in_depth() {
        let line = [Pt2::new(0.0, 0.0), Pt2::new(60.0, 10.0), Pt2::new(100.0, -30.0)];
        let mut prev = 0;
        for d in 0..6 {
            let n = refine_line_string(&line, bend, &depth(d)).len();
            assert!(n >= prev, "depth {d}: {n} < {prev}");
            prev = n;
        }
    }

    #[test]
    fn ring_refines_closing_segment() {
        let ring = [Pt2::new(0.0, 0.0), Pt2::new(100.0, 0.0), Pt2::new(100.0, 100.0)];
        let out = refine_ring(&ring, bend, &depth(1));
        // Both segments with a horizontal component bend; the vertical one does not.
        assert_eq!(out.len(), 5);
        assert_eq!(out[0], bend(&ring[0]));
        assert_eq!(out[1], bend(&Pt2::new(50.0, 0.0)));
        assert_eq!(out[3], bend(&ring[2]));
        assert_eq!(out[4], bend(&Pt2::new(50.0, 50.0)));
        assert_ne!(out.last(), out.first());
    }

    #[test]
    fn multi_geometry_maps_points_independently() {
        let ring = [Pt2::new(0.0, 0.0), Pt2::new(100.0, 0.0), Pt2::new(100.0, 100.0)];
        let mut opts = depth(4);
        opts.is_multi_geometry = true;
        let out = refine_ring(&ring, bend, &opts);
        assert_eq!(out, ring.iter().map(bend).collect::<Vec<_>>());
    }

    #[test]
    fn geographic_source_uses_great_circle_midpoints() {
        let line = [Pt2::new(-40.0, 60.0), Pt2::new(40.0, 60.0)];
        let identity = |p: &Pt2| *p;
        let mut opts = depth(1);
        opts.source_is_geographic = true;
        let out = refine_line_string(&line, identity, &opts);
        assert_eq!(out.len(), 3);
        assert!(out[1].y > 60.0, "{:?}", out[1]);

        opts.destination_is_geographic = true;
        assert_eq!(refine_line_string(&line, identity, &opts).len(), 2);
    }
}
