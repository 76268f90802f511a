//! Model fitting for every transformation family.
//!
//! [`SolvedModel::fit`] conditions the points, builds the per-family system,
//! solves it and keeps what is needed to evaluate the model at any point.
//! The backward direction is a separate fit with source and destination
//! swapped, so it is only approximately the inverse of the forward model for
//! polynomials above first order and thin-plate splines.

mod helmert;
mod polynomial;
mod projective;
mod thin_plate_spline;

pub use helmert::Helmert;
pub use polynomial::Polynomial;
pub use projective::Projective;
pub use thin_plate_spline::ThinPlateSpline;

use georef_core::{Gcp, GeorefError, Mat3, MatX, Pt2, Real, Result, TransformationType, Vec2, VecX};
use log::debug;

use crate::basis::separable_terms;
use crate::math::Normalization;

/// Family-specific coefficients of a fitted model, in normalized coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Model {
    Helmert(Helmert),
    Polynomial(Polynomial),
    Projective(Projective),
    ThinPlateSpline(ThinPlateSpline),
}

impl Model {
    fn evaluate(&self, p: &Pt2) -> Pt2 {
        match self {
            Self::Helmert(m) => m.evaluate(p),
            Self::Polynomial(m) => m.evaluate(p),
            Self::Projective(m) => m.evaluate(p),
            Self::ThinPlateSpline(m) => m.evaluate(p),
        }
    }
}

/// Similarity parameters of a Helmert model, in the caller's units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelmertParameters {
    /// Uniform scale (destination units per source unit).
    pub scale: Real,
    /// Counter-clockwise rotation in radians.
    pub rotation: Real,
    /// Image of the source origin.
    pub translation: Vec2,
}

/// A fitted transformation in one direction.
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedModel {
    kind: TransformationType,
    source_norm: Normalization,
    destination_norm: Normalization,
    model: Model,
}

impl SolvedModel {
    /// Fit a model of family `kind` mapping `source[i]` to `destination[i]`.
    ///
    /// # Errors
    ///
    /// - [`GeorefError::DimensionMismatch`] if the slices differ in length,
    /// - [`GeorefError::NotEnoughPoints`] below [`TransformationType::min_points`],
    /// - [`GeorefError::Unsolvable`] for degenerate configurations
    ///   (collinear points, coincident thin-plate-spline centers).
    pub fn fit(kind: TransformationType, source: &[Pt2], destination: &[Pt2]) -> Result<Self> {
        if source.len() != destination.len() {
            return Err(GeorefError::DimensionMismatch {
                source_len: source.len(),
                destination_len: destination.len(),
            });
        }
        let required = kind.min_points();
        if source.len() < required {
            return Err(GeorefError::NotEnoughPoints {
                required,
                found: source.len(),
            });
        }

        let source_norm = Normalization::from_points(source);
        let destination_norm = Normalization::from_points(destination);
        let src = source_norm.apply_all(source);
        let dst = destination_norm.apply_all(destination);

        let model = match kind {
            TransformationType::Helmert => Model::Helmert(Helmert::fit(&src, &dst)?),
            TransformationType::Polynomial(order) => {
                Model::Polynomial(Polynomial::fit(order, &src, &dst)?)
            }
            TransformationType::Projective => Model::Projective(Projective::fit(&src, &dst)?),
            TransformationType::ThinPlateSpline => {
                Model::ThinPlateSpline(ThinPlateSpline::fit(&src, &dst)?)
            }
        };
        debug!("fitted {} model on {} points", kind, source.len());

        Ok(Self {
            kind,
            source_norm,
            destination_norm,
            model,
        })
    }

    /// Assemble a separable model from one block of a jointly solved system.
    ///
    /// `centers` are the normalized kernel centers (thin-plate spline only)
    /// and `coeffs` the block's `terms × 2` coefficients.
    pub(crate) fn from_separable_block(
        kind: TransformationType,
        source_norm: Normalization,
        destination_norm: Normalization,
        centers: Vec<Pt2>,
        coeffs: MatX,
    ) -> Option<Self> {
        let model = match kind {
            TransformationType::Polynomial(order) => {
                Model::Polynomial(Polynomial::from_coefficients(order, coeffs))
            }
            TransformationType::ThinPlateSpline => {
                Model::ThinPlateSpline(ThinPlateSpline::from_coefficients(centers, coeffs))
            }
            TransformationType::Helmert | TransformationType::Projective => return None,
        };
        Some(Self {
            kind,
            source_norm,
            destination_norm,
            model,
        })
    }

    pub fn transformation_type(&self) -> TransformationType {
        self.kind
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn source_normalization(&self) -> &Normalization {
        &self.source_norm
    }

    pub fn destination_normalization(&self) -> &Normalization {
        &self.destination_norm
    }

    /// Raw coefficients in normalized coordinates.
    ///
    /// Separable families return `terms × 2`; Helmert `[tx, ty, a, b]` and
    /// projective `[a, b, c, d, e, f, g, h]` as a single column.
    pub fn coefficients(&self) -> MatX {
        match &self.model {
            Model::Helmert(m) => m.coefficients(),
            Model::Polynomial(m) => m.coefficients().clone(),
            Model::Projective(m) => m.coefficients(),
            Model::ThinPlateSpline(m) => m.coefficients().clone(),
        }
    }

    /// Per-axis terms of this model at a source point, in normalized
    /// coordinates. `None` for Helmert and projective models.
    pub fn basis_at(&self, p: &Pt2) -> Option<VecX> {
        let centers = match &self.model {
            Model::ThinPlateSpline(m) => m.centers(),
            _ => &[],
        };
        separable_terms(self.kind, &self.source_norm.apply(p), centers)
    }

    /// Evaluate the model at a source point.
    pub fn evaluate(&self, p: &Pt2) -> Pt2 {
        let q = self.model.evaluate(&self.source_norm.apply(p));
        self.destination_norm.invert(&q)
    }

    /// Scale, rotation and translation of a Helmert model.
    pub fn helmert_parameters(&self) -> Option<HelmertParameters> {
        if !matches!(self.model, Model::Helmert(_)) {
            return None;
        }
        let origin = self.evaluate(&Pt2::origin());
        let unit_x = self.evaluate(&Pt2::new(1.0, 0.0)) - origin;
        Some(HelmertParameters {
            scale: unit_x.norm(),
            rotation: unit_x.y.atan2(unit_x.x),
            translation: origin.coords,
        })
    }

    /// De-normalized homography of a projective model, scaled so that
    /// `H[2,2] == 1` when possible.
    pub fn homography(&self) -> Option<Mat3> {
        let Model::Projective(m) = &self.model else {
            return None;
        };
        let mut h = self.destination_norm.inverse_matrix() * m.matrix() * self.source_norm.matrix();
        let scale = h[(2, 2)];
        if scale.abs() > f64::EPSILON {
            h /= scale;
        }
        Some(h)
    }
}

/// Fitting entry points of a transformation family.
pub trait TransformationFamily {
    /// Fit `source -> destination`.
    fn fit(&self, source: &[Pt2], destination: &[Pt2]) -> Result<SolvedModel>;

    /// Fit resource -> geo from GCPs.
    fn fit_forward(&self, gcps: &[Gcp]) -> Result<SolvedModel> {
        let (resource, geo) = split_gcps(gcps);
        self.fit(&resource, &geo)
    }

    /// Fit geo -> resource from GCPs, independently of the forward model.
    fn fit_backward(&self, gcps: &[Gcp]) -> Result<SolvedModel> {
        let (resource, geo) = split_gcps(gcps);
        self.fit(&geo, &resource)
    }

    /// Per-axis terms at `p` for separable families (`centers` are the
    /// thin-plate-spline kernel centers).
    fn basis_at(&self, p: &Pt2, centers: &[Pt2]) -> Option<VecX>;
}

impl TransformationFamily for TransformationType {
    fn fit(&self, source: &[Pt2], destination: &[Pt2]) -> Result<SolvedModel> {
        SolvedModel::fit(*self, source, destination)
    }

    fn basis_at(&self, p: &Pt2, centers: &[Pt2]) -> Option<VecX> {
        separable_terms(*self, p, centers)
    }
}

fn split_gcps(gcps: &[Gcp]) -> (Vec<Pt2>, Vec<Pt2>) {
    gcps.iter().map(|g| (g.resource, g.geo)).unzip()
}
