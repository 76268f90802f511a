//! Single-map GCP transformer.
//!
//! [`GcpTransformer`] fits a forward (resource → geo) and a backward
//! (geo → resource) model once, at construction. Every later query, from a
//! single point to a refined polygon, only evaluates those two models.

mod distortion;
mod refine;

pub use distortion::*;
pub use refine::{refine_line_string, refine_ring};

use georef_core::{
    close_ring, flip_y, open_ring, Gcp, Geometry, Pt2, Real, RefinementOptions, ResidualStats,
    Result, TransformationType, TransformerOptions,
};
use log::debug;

use crate::models::{SolvedModel, TransformationFamily};

/// Forward and backward transformation fitted from one map's GCPs.
///
/// Immutable after construction and safe to share between threads.
#[derive(Debug, Clone)]
pub struct GcpTransformer {
    gcps: Vec<Gcp>,
    kind: TransformationType,
    options: TransformerOptions,
    forward: SolvedModel,
    backward: SolvedModel,
    reference_scale: Option<Real>,
    jacobian_step: Real,
}

impl GcpTransformer {
    /// Fit both directions with default options.
    pub fn new(gcps: &[Gcp], kind: TransformationType) -> Result<Self> {
        Self::with_options(gcps, kind, TransformerOptions::default())
    }

    /// Fit both directions.
    ///
    /// # Errors
    ///
    /// Any fitting error of either direction
    /// ([`georef_core::GeorefError::NotEnoughPoints`],
    /// [`georef_core::GeorefError::Unsolvable`]).
    pub fn with_options(
        gcps: &[Gcp],
        kind: TransformationType,
        options: TransformerOptions,
    ) -> Result<Self> {
        let model_gcps: Vec<Gcp> = gcps
            .iter()
            .map(|g| {
                Gcp::new(
                    model_resource(&options, &g.resource),
                    internal_geo(&options, &g.geo),
                )
            })
            .collect();

        let forward = kind.fit_forward(&model_gcps)?;
        let backward = kind.fit_backward(&model_gcps)?;

        let reference_scale = match kind {
            TransformationType::Helmert => forward.helmert_parameters().map(|h| h.scale),
            _ => TransformationType::Helmert
                .fit_forward(&model_gcps)
                .ok()
                .and_then(|m| m.helmert_parameters())
                .map(|h| h.scale),
        };
        let resource: Vec<Pt2> = model_gcps.iter().map(|g| g.resource).collect();
        let jacobian_step = jacobian_step(&resource);

        debug!(
            "GCP transformer: {} on {} points (reference scale {:?})",
            kind,
            gcps.len(),
            reference_scale
        );

        Ok(Self {
            gcps: gcps.to_vec(),
            kind,
            options,
            forward,
            backward,
            reference_scale,
            jacobian_step,
        })
    }

    pub fn gcps(&self) -> &[Gcp] {
        &self.gcps
    }

    pub fn transformation_type(&self) -> TransformationType {
        self.kind
    }

    pub fn options(&self) -> &TransformerOptions {
        &self.options
    }

    /// Resource → geo model, in model space (flipped resource, internal projection).
    pub fn forward_model(&self) -> &SolvedModel {
        &self.forward
    }

    /// Geo → resource model, in model space.
    pub fn backward_model(&self) -> &SolvedModel {
        &self.backward
    }

    /// Uniform scale of a Helmert fit over the same GCPs, if it could be fitted.
    pub fn reference_scale(&self) -> Option<Real> {
        self.reference_scale
    }

    pub fn transform_to_geo(&self, p: &Pt2) -> Pt2 {
        let q = self.forward.evaluate(&model_resource(&self.options, p));
        self.output_geo(&q)
    }

    pub fn transform_to_resource(&self, p: &Pt2) -> Pt2 {
        let q = self.backward.evaluate(&self.input_geo(p));
        model_resource(&self.options, &q)
    }

    pub fn transform_line_string_to_geo(
        &self,
        line: &[Pt2],
        options: &RefinementOptions,
    ) -> Vec<Pt2> {
        refine_line_string(line, |p| self.transform_to_geo(p), options)
    }

    pub fn transform_line_string_to_resource(
        &self,
        line: &[Pt2],
        options: &RefinementOptions,
    ) -> Vec<Pt2> {
        refine_line_string(line, |p| self.transform_to_resource(p), options)
    }

    /// Transform an open ring; the result is open too.
    pub fn transform_ring_to_geo(&self, ring: &[Pt2], options: &RefinementOptions) -> Vec<Pt2> {
        refine_ring(ring, |p| self.transform_to_geo(p), options)
    }

    /// Transform an open ring; the result is open too.
    pub fn transform_ring_to_resource(
        &self,
        ring: &[Pt2],
        options: &RefinementOptions,
    ) -> Vec<Pt2> {
        refine_ring(ring, |p| self.transform_to_resource(p), options)
    }

    /// Transform a polygon given as open rings (outer ring first).
    pub fn transform_polygon_to_geo(
        &self,
        polygon: &[Vec<Pt2>],
        options: &RefinementOptions,
    ) -> Vec<Vec<Pt2>> {
        polygon
            .iter()
            .map(|ring| self.transform_ring_to_geo(ring, options))
            .collect()
    }

    /// Transform a polygon given as open rings (outer ring first).
    pub fn transform_polygon_to_resource(
        &self,
        polygon: &[Vec<Pt2>],
        options: &RefinementOptions,
    ) -> Vec<Vec<Pt2>> {
        polygon
            .iter()
            .map(|ring| self.transform_ring_to_resource(ring, options))
            .collect()
    }

    /// Transform a GeoJSON-shaped geometry from resource to geo space.
    /// Polygon rings are closed on output.
    pub fn transform_geometry_to_geo(
        &self,
        geometry: &Geometry,
        options: &RefinementOptions,
    ) -> Geometry {
        map_geometry(geometry, |p| self.transform_to_geo(p), options)
    }

    /// Transform a GeoJSON-shaped geometry from geo to resource space.
    /// Polygon rings are closed on output.
    pub fn transform_geometry_to_resource(
        &self,
        geometry: &Geometry,
        options: &RefinementOptions,
    ) -> Geometry {
        map_geometry(geometry, |p| self.transform_to_resource(p), options)
    }

    /// Distortion measures of the forward model at a resource point.
    ///
    /// Measured in model space, so a handedness flip alone does not show up
    /// as a mirrored (`signDetJ = -1`) region.
    pub fn distortion_at(&self, p: &Pt2, measures: &[DistortionMeasure]) -> Vec<Real> {
        let at = model_resource(&self.options, p);
        let jacobian = numerical_jacobian(|q| self.forward.evaluate(q), &at, self.jacobian_step);
        let tissot = TissotIndicatrix::from_jacobian(&jacobian);
        let reference = self.reference_scale.unwrap_or(1.0);
        measures.iter().map(|m| tissot.measure(*m, reference)).collect()
    }

    /// Geo point plus one value per requested measure, in order.
    pub fn transform_to_geo_with_distortion(
        &self,
        p: &Pt2,
        measures: &[DistortionMeasure],
    ) -> (Pt2, Vec<Real>) {
        (self.transform_to_geo(p), self.distortion_at(p, measures))
    }

    /// Forward-model errors at the GCPs, in the fitting projection's units.
    pub fn residuals(&self) -> ResidualStats {
        ResidualStats::from_errors(self.gcps.iter().map(|g| {
            let predicted = self.forward.evaluate(&model_resource(&self.options, &g.resource));
            (predicted - internal_geo(&self.options, &g.geo)).norm()
        }))
    }

    /// Public geo point into the space the models were fitted in.
    fn input_geo(&self, p: &Pt2) -> Pt2 {
        match &self.options.projection {
            Some(projection) => internal_geo(&self.options, &projection.unproject(p)),
            None => *p,
        }
    }

    /// Model-space geo point into the public output projection.
    fn output_geo(&self, q: &Pt2) -> Pt2 {
        match &self.options.projection {
            Some(projection) => {
                let base = match &self.options.internal_projection {
                    Some(internal) => internal.unproject(q),
                    None => *q,
                };
                projection.project(&base)
            }
            None => *q,
        }
    }
}

/// Resource point as seen by the models (and back: the flip is an involution).
fn model_resource(options: &TransformerOptions, p: &Pt2) -> Pt2 {
    if options.different_handedness {
        flip_y(p)
    } else {
        *p
    }
}

fn internal_geo(options: &TransformerOptions, p: &Pt2) -> Pt2 {
    match &options.internal_projection {
        Some(internal) => internal.project(p),
        None => *p,
    }
}

fn map_geometry<F>(geometry: &Geometry, f: F, options: &RefinementOptions) -> Geometry
where
    F: Fn(&Pt2) -> Pt2,
{
    let polygon = |rings: &[Vec<Pt2>]| -> Vec<Vec<Pt2>> {
        rings
            .iter()
            .map(|ring| {
                if options.is_multi_geometry {
                    ring.iter().map(&f).collect()
                } else {
                    close_ring(refine_ring(open_ring(ring), &f, options))
                }
            })
            .collect()
    };
    match geometry {
        Geometry::Point(p) => Geometry::Point(f(p)),
        Geometry::MultiPoint(points) => Geometry::MultiPoint(points.iter().map(&f).collect()),
        Geometry::LineString(line) => Geometry::LineString(refine_line_string(line, &f, options)),
        Geometry::MultiLineString(lines) => Geometry::MultiLineString(
            lines
                .iter()
                .map(|line| refine_line_string(line, &f, options))
                .collect(),
        ),
        Geometry::Polygon(rings) => Geometry::Polygon(polygon(rings.as_slice())),
        Geometry::MultiPolygon(polygons) => {
            Geometry::MultiPolygon(polygons.iter().map(|rings| polygon(rings.as_slice())).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use georef_core::synthetic::{gcps_from_fn, grid_points_2d, similarity};
    use georef_core::test_utils::assert_pt_near;
    use georef_core::{FnProjection, GeorefError};
    use std::sync::Arc;

    fn sheet_gcps() -> Vec<Gcp> {
        gcps_from_fn(&grid_points_2d(3, 3, 100.0), |p| {
            Pt2::new(4.0 + p.x * 1e-3, 52.0 - p.y * 1e-3)
        })
    }

    #[test]
    fn forward_and_backward_agree() -> anyhow::Result<()> {
        let gcps = sheet_gcps();
        let t = GcpTransformer::new(&gcps, TransformationType::polynomial(2)?)?;
        for g in &gcps {
            assert_pt_near(&t.transform_to_geo(&g.resource), &g.geo, 1e-9);
            assert_pt_near(&t.transform_to_resource(&g.geo), &g.resource, 1e-6);
        }
        assert!(t.residuals().max < 1e-9);
        assert_eq!(t.residuals().count, 9);
        Ok(())
    }

    #[test]
    fn construction_surfaces_fit_errors() {
        let gcps = sheet_gcps();
        assert_eq!(
            GcpTransformer::new(&gcps[..2], TransformationType::default()).err(),
            Some(GeorefError::NotEnoughPoints {
                required: 3,
                found: 2
            })
        );
    }

    #[test]
    fn handedness_makes_mirror_representable_by_helmert() -> anyhow::Result<()> {
        // y-down pixels onto y-up coordinates: a similarity composed with a mirror.
        let rotate = similarity(2.0, 0.2, 100.0, 300.0);
        let gcps = gcps_from_fn(&grid_points_2d(3, 3, 10.0), |p| rotate(&flip_y(p)));

        let plain = GcpTransformer::new(&gcps, TransformationType::Helmert)?;
        assert!(plain.residuals().max > 1.0);

        let options = TransformerOptions {
            different_handedness: true,
            ..TransformerOptions::default()
        };
        let flipped = GcpTransformer::with_options(&gcps, TransformationType::Helmert, options)?;
        assert!(flipped.residuals().max < 1e-9);
        let p = Pt2::new(7.0, -3.0);
        assert_pt_near(&flipped.transform_to_geo(&p), &rotate(&flip_y(&p)), 1e-9);
        assert_pt_near(&flipped.transform_to_resource(&flipped.transform_to_geo(&p)), &p, 1e-9);

        let values = flipped.distortion_at(&p, &[DistortionMeasure::SignDetJ]);
        assert_eq!(values, vec![1.0]);
        Ok(())
    }

    fn double(p: &Pt2) -> Pt2 {
        Pt2::new(2.0 * p.x, 2.0 * p.y)
    }

    fn halve(p: &Pt2) -> Pt2 {
        Pt2::new(0.5 * p.x, 0.5 * p.y)
    }

    #[test]
    fn projections_wrap_the_models() -> anyhow::Result<()> {
        let f = similarity(0.5, 0.0, 10.0, 20.0);
        let gcps = gcps_from_fn(&grid_points_2d(2, 2, 100.0), &f);
        let options = TransformerOptions {
            internal_projection: Some(Arc::new(FnProjection::new("double", double, halve))),
            ..TransformerOptions::default()
        };
        let t = GcpTransformer::with_options(&gcps, TransformationType::default(), options.clone())?;
        // Without an output projection results stay in the internal projection.
        let p = Pt2::new(30.0, 40.0);
        assert_pt_near(&t.transform_to_geo(&p), &double(&f(&p)), 1e-9);
        assert_pt_near(&t.transform_to_resource(&double(&f(&p))), &p, 1e-9);

        let options = TransformerOptions {
            projection: Some(Arc::new(georef_core::IdentityProjection)),
            ..options
        };
        let t = GcpTransformer::with_options(&gcps, TransformationType::default(), options)?;
        assert_pt_near(&t.transform_to_geo(&p), &f(&p), 1e-9);
        assert_pt_near(&t.transform_to_resource(&f(&p)), &p, 1e-9);
        Ok(())
    }

    #[test]
    fn similarity_has_no_distortion() -> anyhow::Result<()> {
        let gcps = gcps_from_fn(&grid_points_2d(3, 3, 50.0), similarity(3.0, 0.7, 1.0, 2.0));
        let t = GcpTransformer::new(&gcps, TransformationType::default())?;
        assert!((t.reference_scale().unwrap() - 3.0).abs() < 1e-9);
        let (_, values) =
            t.transform_to_geo_with_distortion(&Pt2::new(25.0, 25.0), &DistortionMeasure::ALL);
        assert!(values[0].abs() < 1e-6, "log2sigma {}", values[0]);
        assert!(values[1].abs() < 1e-6, "twoOmega {}", values[1]);
        assert!(values[2].abs() < 1e-6, "airyKavr {}", values[2]);
        assert_eq!(values[3], 1.0);
        Ok(())
    }

    #[test]
    fn geometry_polygons_are_closed() -> anyhow::Result<()> {
        let gcps = sheet_gcps();
        let t = GcpTransformer::new(&gcps, TransformationType::ThinPlateSpline)?;
        let square = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(200.0, 0.0),
            Pt2::new(200.0, 200.0),
            Pt2::new(0.0, 200.0),
            Pt2::new(0.0, 0.0),
        ];
        let options = RefinementOptions::default();
        let out = t.transform_geometry_to_geo(&Geometry::Polygon(vec![square]), &options);
        let Geometry::Polygon(rings) = out else {
            panic!("shape changed");
        };
        assert_eq!(rings[0].len(), 5);
        assert_eq!(rings[0].first(), rings[0].last());
        assert_pt_near(&rings[0][2], &Pt2::new(4.2, 51.8), 1e-9);

        let point = t.transform_geometry_to_geo(&Geometry::Point(Pt2::new(100.0, 100.0)), &options);
        assert_eq!(point.type_name(), "Point");
        Ok(())
    }

    #[test]
    fn multi_geometry_polygons_keep_their_vertices() -> anyhow::Result<()> {
        let gcps = sheet_gcps();
        let t = GcpTransformer::new(&gcps, TransformationType::ThinPlateSpline)?;
        // One ring explicitly closed, one left open.
        let closed = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(200.0, 0.0),
            Pt2::new(200.0, 200.0),
            Pt2::new(0.0, 0.0),
        ];
        let open = vec![
            Pt2::new(50.0, 50.0),
            Pt2::new(100.0, 50.0),
            Pt2::new(100.0, 100.0),
        ];
        let options = RefinementOptions {
            is_multi_geometry: true,
            max_depth: 5,
            ..RefinementOptions::default()
        };
        let out = t.transform_geometry_to_geo(
            &Geometry::Polygon(vec![closed.clone(), open.clone()]),
            &options,
        );
        let Geometry::Polygon(rings) = out else {
            panic!("shape changed");
        };
        assert_eq!(rings[0].len(), closed.len());
        assert_eq!(rings[1].len(), open.len());
        for (ring, input) in rings.iter().zip([&closed, &open]) {
            for (q, p) in ring.iter().zip(input.iter()) {
                assert_eq!(*q, t.transform_to_geo(p));
            }
        }
        Ok(())
    }
}
