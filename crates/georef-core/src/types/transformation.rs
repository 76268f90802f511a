//! Transformation model families.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::GeorefError;

/// Degree of a bivariate polynomial transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PolynomialOrder {
    /// Affine: `[1, x, y]`.
    First,
    /// Quadratic: adds `[x², xy, y²]`.
    Second,
    /// Cubic: adds `[x³, x²y, xy², y³]`.
    Third,
}

impl PolynomialOrder {
    /// Numeric degree (1, 2 or 3).
    pub fn degree(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
        }
    }

    /// Number of basis terms per axis: `(k+1)(k+2)/2`.
    pub fn term_count(self) -> usize {
        let k = self.degree() as usize;
        (k + 1) * (k + 2) / 2
    }
}

impl TryFrom<u8> for PolynomialOrder {
    type Error = GeorefError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            3 => Ok(Self::Third),
            other => Err(GeorefError::InvalidPolynomialOrder(other)),
        }
    }
}

/// Family of point-to-point transformation used to fit control points.
///
/// Serialized as one of `helmert`, `polynomial` (first order), `polynomial1`,
/// `polynomial2`, `polynomial3`, `projective` or `thinPlateSpline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TransformationType {
    /// Similarity: uniform scale, rotation and translation.
    Helmert,
    /// Bivariate polynomial of the given order, one per output axis.
    Polynomial(PolynomialOrder),
    /// Plane projective transformation (homography).
    Projective,
    /// Affine part plus one `r² ln r` kernel per control point.
    ThinPlateSpline,
}

impl Default for TransformationType {
    fn default() -> Self {
        Self::Polynomial(PolynomialOrder::First)
    }
}

impl TransformationType {
    /// Polynomial transformation of the given order.
    pub fn polynomial(order: u8) -> Result<Self, GeorefError> {
        Ok(Self::Polynomial(PolynomialOrder::try_from(order)?))
    }

    /// Minimum number of control points needed to fit this family.
    pub fn min_points(&self) -> usize {
        match self {
            Self::Helmert => 2,
            Self::Polynomial(order) => order.term_count(),
            Self::Projective => 4,
            Self::ThinPlateSpline => 3,
        }
    }

    /// Whether the model is a linear combination of per-point terms that is
    /// shared by both output axes. Only such models can be stapled.
    pub fn is_separable(&self) -> bool {
        matches!(self, Self::Polynomial(_) | Self::ThinPlateSpline)
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Helmert => "helmert",
            Self::Polynomial(PolynomialOrder::First) => "polynomial",
            Self::Polynomial(PolynomialOrder::Second) => "polynomial2",
            Self::Polynomial(PolynomialOrder::Third) => "polynomial3",
            Self::Projective => "projective",
            Self::ThinPlateSpline => "thinPlateSpline",
        }
    }
}

impl fmt::Display for TransformationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformationType {
    type Err = GeorefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "helmert" => Ok(Self::Helmert),
            "polynomial" | "polynomial1" => Ok(Self::Polynomial(PolynomialOrder::First)),
            "polynomial2" => Ok(Self::Polynomial(PolynomialOrder::Second)),
            "polynomial3" => Ok(Self::Polynomial(PolynomialOrder::Third)),
            "projective" => Ok(Self::Projective),
            "thinPlateSpline" => Ok(Self::ThinPlateSpline),
            other => Err(GeorefError::UnknownTransformationType(other.to_string())),
        }
    }
}

impl TryFrom<String> for TransformationType {
    type Error = GeorefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TransformationType> for String {
    fn from(value: TransformationType) -> Self {
        value.as_str().to_string()
    }
}
