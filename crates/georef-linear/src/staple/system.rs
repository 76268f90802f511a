//! Block layout and assembly of the joint staple system.
//!
//! Each map owns a contiguous block of columns holding its per-axis
//! coefficients. GCP rows and thin-plate-spline side rows only touch their
//! own block; a staple row couples two blocks with opposite signs and a zero
//! right-hand side.

use georef_core::{GeorefError, GeoreferencedMap, Pt2, Result, TransformationType, VecX};
use log::debug;

use crate::basis::{separable_term_count, separable_terms, tps_side_constraints};
use crate::math::Normalization;
use crate::solver::LinearSystem;

use super::Staple;

/// Column range of one map in the joint system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub map_id: String,
    pub offset: usize,
    pub width: usize,
}

/// Column layout of the joint system, one block per map in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockLayout {
    blocks: Vec<Block>,
}

impl BlockLayout {
    /// Lay out one block per map. Thin-plate-spline blocks grow with the
    /// map's own GCP count.
    pub fn new(kind: TransformationType, maps: &[GeoreferencedMap]) -> Result<Self> {
        let mut offset = 0;
        let mut blocks = Vec::with_capacity(maps.len());
        for map in maps {
            if blocks.iter().any(|b: &Block| b.map_id == map.id) {
                return Err(GeorefError::DuplicateMapId(map.id.clone()));
            }
            let width = separable_term_count(kind, map.gcps.len())
                .ok_or(GeorefError::UnsupportedTransformation(kind))?;
            blocks.push(Block {
                map_id: map.id.clone(),
                offset,
                width,
            });
            offset += width;
        }
        Ok(Self { blocks })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, map_index: usize) -> Option<&Block> {
        self.blocks.get(map_index)
    }

    /// Index of the block belonging to `map_id`.
    pub fn index_of(&self, map_id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.map_id == map_id)
    }

    /// Total number of unknowns per axis.
    pub fn unknowns(&self) -> usize {
        self.blocks.last().map_or(0, |b| b.offset + b.width)
    }
}

/// Per-map conditioning and kernel centers used while assembling rows.
#[derive(Debug, Clone)]
pub(crate) struct MapFrame {
    pub resource_norm: Normalization,
    /// Normalized GCP resources: the thin-plate-spline kernel centers.
    pub centers: Vec<Pt2>,
}

impl MapFrame {
    pub(crate) fn terms(&self, kind: TransformationType, resource: &Pt2) -> Result<VecX> {
        separable_terms(kind, &self.resource_norm.apply(resource), &self.centers)
            .ok_or(GeorefError::UnsupportedTransformation(kind))
    }
}

/// Build one frame per map. Resource points are normalized per map over its
/// GCPs and staple occurrences.
pub(crate) fn map_frames(maps: &[GeoreferencedMap], staples: &[Staple]) -> Vec<MapFrame> {
    maps.iter()
        .enumerate()
        .map(|(index, map)| {
            let mut points = map.resource_points();
            points.extend(
                staples
                    .iter()
                    .flat_map(|s| s.occurrences.iter())
                    .filter(|o| o.map_index == index)
                    .map(|o| o.resource),
            );
            let resource_norm = Normalization::from_points(&points);
            let centers = resource_norm.apply_all(&map.resource_points());
            MapFrame {
                resource_norm,
                centers,
            }
        })
        .collect()
}

/// Assemble the joint system: GCP rows, thin-plate-spline side rows, then
/// `k - 1` rows per staple with `k` occurrences tying each to the anchor.
pub(crate) fn build_system(
    kind: TransformationType,
    maps: &[GeoreferencedMap],
    staples: &[Staple],
    layout: &BlockLayout,
    frames: &[MapFrame],
    geo_norm: &Normalization,
) -> Result<LinearSystem> {
    let gcp_rows: usize = maps.iter().map(|m| m.gcps.len()).sum();
    let side_rows = match kind {
        TransformationType::ThinPlateSpline => 3 * maps.len(),
        _ => 0,
    };
    let staple_rows: usize = staples
        .iter()
        .filter(|s| s.is_constraint())
        .map(|s| s.occurrences.len() - 1)
        .sum();
    let rows = gcp_rows + side_rows + staple_rows;

    let mut system = LinearSystem::zeros(rows, layout.unknowns(), 2);
    let mut row = 0;

    for ((map, block), frame) in maps.iter().zip(layout.blocks()).zip(frames) {
        for gcp in &map.gcps {
            system.put_terms(row, block.offset, &frame.terms(kind, &gcp.resource)?, 1.0);
            let geo = geo_norm.apply(&gcp.geo);
            system.rhs[(row, 0)] = geo.x;
            system.rhs[(row, 1)] = geo.y;
            row += 1;
        }
        if kind == TransformationType::ThinPlateSpline {
            for side in tps_side_constraints(&frame.centers) {
                system.put_terms(row, block.offset, &side, 1.0);
                row += 1;
            }
        }
    }

    for staple in staples.iter().filter(|s| s.is_constraint()) {
        let Some((anchor, others)) = staple.occurrences.split_first() else {
            continue;
        };
        let anchor_terms = frames[anchor.map_index].terms(kind, &anchor.resource)?;
        let anchor_offset = layout.blocks()[anchor.map_index].offset;
        for other in others {
            let terms = frames[other.map_index].terms(kind, &other.resource)?;
            system.put_terms(row, anchor_offset, &anchor_terms, 1.0);
            system.put_terms(row, layout.blocks()[other.map_index].offset, &terms, -1.0);
            row += 1;
        }
    }

    debug!(
        "staple system: {} rows ({} GCP, {} side, {} staple) x {} unknowns",
        rows,
        gcp_rows,
        side_rows,
        staple_rows,
        layout.unknowns()
    );
    Ok(system)
}
