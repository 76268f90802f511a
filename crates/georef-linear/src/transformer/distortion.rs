//! Local distortion of a transformation, from its Jacobian.
//!
//! The forward model is differentiated numerically and its Jacobian is
//! turned into the Tissot indicatrix (the ellipse a unit circle in the
//! resource image becomes in geo space). All measures are informational.

use std::fmt;
use std::str::FromStr;

use georef_core::{GeorefError, Pt2, Real};
use nalgebra::Matrix2;
use serde::{Deserialize, Serialize};

/// Relative finite-difference step, as a fraction of the resource extent.
pub const JACOBIAN_STEP_RATIO: Real = 1e-4;
/// Smallest finite-difference step.
pub const MIN_JACOBIAN_STEP: Real = 1e-6;

/// Scalar distortion measures derived from the Tissot indicatrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistortionMeasure {
    /// Log2 of the areal scale factor relative to the reference scale.
    #[serde(rename = "log2sigma")]
    Log2Sigma,
    /// Maximum angular distortion `2ω` in radians.
    #[serde(rename = "twoOmega")]
    TwoOmega,
    /// Airy–Kavrayskiy measure combining scale and angular distortion.
    #[serde(rename = "airyKavr")]
    AiryKavrayskiy,
    /// Sign of the Jacobian determinant: `-1` where the map is mirrored.
    #[serde(rename = "signDetJ")]
    SignDetJ,
    /// Direction of the major semi-axis in radians.
    #[serde(rename = "thetaa")]
    ThetaA,
}

impl DistortionMeasure {
    pub const ALL: [Self; 5] = [
        Self::Log2Sigma,
        Self::TwoOmega,
        Self::AiryKavrayskiy,
        Self::SignDetJ,
        Self::ThetaA,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Log2Sigma => "log2sigma",
            Self::TwoOmega => "twoOmega",
            Self::AiryKavrayskiy => "airyKavr",
            Self::SignDetJ => "signDetJ",
            Self::ThetaA => "thetaa",
        }
    }
}

impl fmt::Display for DistortionMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistortionMeasure {
    type Err = GeorefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| GeorefError::UnknownDistortionMeasure(s.to_string()))
    }
}

/// Jacobian `∂(X, Y) / ∂(x, y)` of `f` at `p` by central differences.
pub fn numerical_jacobian(f: impl Fn(&Pt2) -> Pt2, p: &Pt2, step: Real) -> Matrix2<Real> {
    let dx = (f(&Pt2::new(p.x + step, p.y)) - f(&Pt2::new(p.x - step, p.y))) / (2.0 * step);
    let dy = (f(&Pt2::new(p.x, p.y + step)) - f(&Pt2::new(p.x, p.y - step))) / (2.0 * step);
    Matrix2::new(dx.x, dy.x, dx.y, dy.y)
}

/// Finite-difference step for a set of resource points: a fraction of the
/// bounding-box diagonal, never below [`MIN_JACOBIAN_STEP`].
pub fn jacobian_step(resource: &[Pt2]) -> Real {
    let Some(first) = resource.first() else {
        return MIN_JACOBIAN_STEP;
    };
    let (min, max) = resource.iter().fold((*first, *first), |(lo, hi), p| {
        (
            Pt2::new(lo.x.min(p.x), lo.y.min(p.y)),
            Pt2::new(hi.x.max(p.x), hi.y.max(p.y)),
        )
    });
    (JACOBIAN_STEP_RATIO * (max - min).norm()).max(MIN_JACOBIAN_STEP)
}

/// Tissot indicatrix of a Jacobian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TissotIndicatrix {
    /// Major semi-axis.
    pub a: Real,
    /// Minor semi-axis.
    pub b: Real,
    /// Direction of the major semi-axis in radians.
    pub theta_a: Real,
    /// Determinant of the Jacobian.
    pub det: Real,
}

impl TissotIndicatrix {
    /// From the first fundamental form `E, F, G` of the Jacobian.
    pub fn from_jacobian(j: &Matrix2<Real>) -> Self {
        let e = j[(0, 0)].powi(2) + j[(1, 0)].powi(2);
        let f = j[(0, 0)] * j[(0, 1)] + j[(1, 0)] * j[(1, 1)];
        let g = j[(0, 1)].powi(2) + j[(1, 1)].powi(2);

        let root = ((e - g).powi(2) + 4.0 * f * f).sqrt();
        Self {
            a: ((e + g + root) * 0.5).max(0.0).sqrt(),
            b: ((e + g - root) * 0.5).max(0.0).sqrt(),
            theta_a: 0.5 * (2.0 * f).atan2(e - g),
            det: j.determinant(),
        }
    }

    /// Value of one measure. `reference_scale` is the uniform scale that
    /// counts as undistorted.
    pub fn measure(&self, measure: DistortionMeasure, reference_scale: Real) -> Real {
        match measure {
            DistortionMeasure::Log2Sigma => ((self.a * self.b).sqrt() / reference_scale).log2(),
            DistortionMeasure::TwoOmega => {
                let sum = self.a + self.b;
                if sum > 0.0 {
                    2.0 * ((self.a - self.b) / sum).asin()
                } else {
                    0.0
                }
            }
            DistortionMeasure::AiryKavrayskiy => {
                let la = (self.a / reference_scale).ln();
                let lb = (self.b / reference_scale).ln();
                (0.5 * (la * la + lb * lb)).sqrt()
            }
            DistortionMeasure::SignDetJ => {
                if self.det < 0.0 {
                    -1.0
                } else {
                    1.0
                }
            }
            DistortionMeasure::ThetaA => self.theta_a,
        }
    }
}
