//! Planar and geographic midpoint/distance helpers used by line refinement.
//!
//! Geographic points are `(longitude, latitude)` in degrees; geographic
//! distances are in metres on a spherical Earth.

use crate::{Pt2, Real};

/// Mean Earth radius in metres (IUGG).
pub const EARTH_RADIUS_M: Real = 6_371_008.8;

/// How midpoints and distances are measured on one side of a transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    /// Euclidean plane.
    #[default]
    Planar,
    /// Sphere, lon/lat degrees.
    Geographic,
}

impl Metric {
    pub fn from_flag(geographic: bool) -> Self {
        if geographic {
            Self::Geographic
        } else {
            Self::Planar
        }
    }

    pub fn midpoint(self, a: &Pt2, b: &Pt2) -> Pt2 {
        match self {
            Self::Planar => planar_midpoint(a, b),
            Self::Geographic => geographic_midpoint(a, b),
        }
    }

    pub fn distance(self, a: &Pt2, b: &Pt2) -> Real {
        match self {
            Self::Planar => planar_distance(a, b),
            Self::Geographic => haversine_distance(a, b),
        }
    }
}

pub fn planar_midpoint(a: &Pt2, b: &Pt2) -> Pt2 {
    Pt2::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5)
}

pub fn planar_distance(a: &Pt2, b: &Pt2) -> Real {
    (b - a).norm()
}

/// Midpoint of the great-circle arc between two lon/lat points.
pub fn geographic_midpoint(a: &Pt2, b: &Pt2) -> Pt2 {
    let lon1 = a.x.to_radians();
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let dlon = (b.x - a.x).to_radians();

    let bx = lat2.cos() * dlon.cos();
    let by = lat2.cos() * dlon.sin();
    let lat = (lat1.sin() + lat2.sin()).atan2(((lat1.cos() + bx).powi(2) + by * by).sqrt());
    let lon = lon1 + by.atan2(lat1.cos() + bx);

    Pt2::new(lon.to_degrees(), lat.to_degrees())
}

/// Great-circle distance in metres between two lon/lat points.
pub fn haversine_distance(a: &Pt2, b: &Pt2) -> Real {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.x - a.x).to_radians();

    let h = (dlat * 0.5).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon * 0.5).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_helpers() {
        let a = Pt2::new(0.0, 0.0);
        let b = Pt2::new(3.0, 4.0);
        assert_eq!(planar_midpoint(&a, &b), Pt2::new(1.5, 2.0));
        assert!((planar_distance(&a, &b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn equator_midpoint_and_distance() {
        let a = Pt2::new(0.0, 0.0);
        let b = Pt2::new(10.0, 0.0);
        let m = geographic_midpoint(&a, &b);
        assert!((m.x - 5.0).abs() < 1e-9 && m.y.abs() < 1e-9, "{m:?}");

        let one_degree = haversine_distance(&Pt2::new(0.0, 0.0), &Pt2::new(1.0, 0.0));
        assert!((one_degree - 111_195.08).abs() < 1.0, "{one_degree}");
    }

    #[test]
    fn great_circle_midpoint_bulges_poleward() {
        // Along a parallel the great circle runs closer to the pole.
        let a = Pt2::new(-40.0, 60.0);
        let b = Pt2::new(40.0, 60.0);
        let m = Metric::Geographic.midpoint(&a, &b);
        assert!(m.x.abs() < 1e-9);
        assert!(m.y > 60.0, "{m:?}");
        assert_eq!(Metric::Planar.midpoint(&a, &b), Pt2::new(0.0, 60.0));
    }
}
