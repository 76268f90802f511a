//! Joint transformation of several maps tied together by staples.
//!
//! A staple is a set of repeated control points (RCPs) with the same id on
//! two or more maps: the same real-world location seen on different sheets,
//! whose geo position is unknown. Every map gets its own separable model;
//! all of them are solved in one block least-squares system in which each
//! staple contributes equality rows between the models' evaluations at its
//! occurrences.
//!
//! # Example
//!
//! ```
//! use georef_core::synthetic::overlapping_sheets;
//! use georef_core::{StapleOptions, TransformationType};
//! use georef_linear::StapledTransformation;
//!
//! let (maps, rcps) = overlapping_sheets();
//! let options = StapleOptions {
//!     transformation_type: TransformationType::ThinPlateSpline,
//!     ..StapleOptions::default()
//! };
//! let stapled = StapledTransformation::from_georeferenced_maps(&maps, &rcps, options)?;
//! let out = stapled.to_georeferenced_maps();
//! assert_eq!(out[0].gcps.len(), 5);
//! # Ok::<(), georef_core::GeorefError>(())
//! ```

mod system;

pub use system::{Block, BlockLayout};

use std::collections::HashMap;

use georef_core::{
    centroid, Gcp, GeorefError, GeoreferencedMap, Pt2, Rcp, ResidualStats, Result, StapleOptions,
};
use log::{debug, warn};

use crate::math::Normalization;
use crate::models::SolvedModel;
use crate::solver::LinearSystem;
use system::{build_system, map_frames};

/// One RCP of a staple, resolved to the index of its map.
#[derive(Debug, Clone, PartialEq)]
pub struct StapleOccurrence {
    pub map_index: usize,
    pub map_id: String,
    pub resource: Pt2,
}

/// RCPs sharing an id, in input order. The first occurrence is the anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct Staple {
    pub id: String,
    pub occurrences: Vec<StapleOccurrence>,
}

impl Staple {
    /// Number of distinct maps the occurrences lie on.
    pub fn map_count(&self) -> usize {
        let mut maps: Vec<usize> = self.occurrences.iter().map(|o| o.map_index).collect();
        maps.sort_unstable();
        maps.dedup();
        maps.len()
    }

    /// Whether this staple constrains the joint solve (spans two or more maps).
    pub fn is_constraint(&self) -> bool {
        self.map_count() >= 2
    }
}

/// A staple with its solved geo location.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStaple {
    pub id: String,
    /// Resolved location: mean of `evaluations`, or the anchor's evaluation.
    pub geo: Pt2,
    pub occurrences: Vec<StapleOccurrence>,
    /// Each occurrence evaluated with its own map's model.
    pub evaluations: Vec<Pt2>,
}

/// Several maps' transformations solved jointly.
#[derive(Debug, Clone)]
pub struct StapledTransformation {
    maps: Vec<GeoreferencedMap>,
    options: StapleOptions,
    staples: Vec<Staple>,
    layout: BlockLayout,
    system: LinearSystem,
    models: Vec<SolvedModel>,
    resolved: Vec<ResolvedStaple>,
}

/// Name kept for callers that speak of attached maps.
pub type AttachedTransformation = StapledTransformation;

impl StapledTransformation {
    /// Build and solve the joint system.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// - [`GeorefError::NotEnoughMaps`] with fewer than two maps,
    /// - [`GeorefError::UnsupportedTransformation`] for Helmert or projective,
    /// - [`GeorefError::NoMatchingRcps`] if no RCP references a given map,
    /// - [`GeorefError::NoStaples`] if no id occurs on two distinct maps,
    /// - solver errors ([`GeorefError::NotEnoughPoints`],
    ///   [`GeorefError::Unsolvable`]) for underdetermined or singular systems.
    pub fn from_georeferenced_maps(
        maps: &[GeoreferencedMap],
        rcps: &[Rcp],
        options: StapleOptions,
    ) -> Result<Self> {
        if maps.len() < 2 {
            return Err(GeorefError::NotEnoughMaps(maps.len()));
        }
        let kind = options.transformation_type;
        if !kind.is_separable() {
            return Err(GeorefError::UnsupportedTransformation(kind));
        }
        let layout = BlockLayout::new(kind, maps)?;

        let staples = group_staples(rcps, &layout, options.evaluate_single_staple_points)?;

        let frames = map_frames(maps, &staples);
        let geo: Vec<Pt2> = maps.iter().flat_map(|m| m.geo_points()).collect();
        let geo_norm = Normalization::from_points(&geo);

        let system = build_system(kind, maps, &staples, &layout, &frames, &geo_norm)?;
        let solution = system.solve()?;

        let models = layout
            .blocks()
            .iter()
            .zip(frames)
            .map(|(block, frame)| {
                let coeffs = solution.rows(block.offset, block.width).into_owned();
                SolvedModel::from_separable_block(
                    kind,
                    frame.resource_norm,
                    geo_norm,
                    frame.centers,
                    coeffs,
                )
                .ok_or(GeorefError::UnsupportedTransformation(kind))
            })
            .collect::<Result<Vec<_>>>()?;

        let resolved = staples
            .iter()
            .map(|staple| resolve(staple, &models, options.average_out))
            .collect();

        Ok(Self {
            maps: maps.to_vec(),
            options,
            staples,
            layout,
            system,
            models,
            resolved,
        })
    }

    /// New map values with the jointly solved GCPs, in input order.
    ///
    /// Existing GCPs are kept as given, re-evaluated (`evaluate_gcps`) or
    /// dropped (`remove_existing_gcps`); resolved staple points are appended
    /// on every map they occur on unless `evaluate_staple_points` is off.
    pub fn to_georeferenced_maps(&self) -> Vec<GeoreferencedMap> {
        self.maps
            .iter()
            .zip(&self.models)
            .enumerate()
            .map(|(index, (map, model))| {
                let mut gcps: Vec<Gcp> = if self.options.remove_existing_gcps {
                    Vec::new()
                } else if self.options.evaluate_gcps {
                    map.gcps
                        .iter()
                        .map(|g| Gcp::new(g.resource, model.evaluate(&g.resource)))
                        .collect()
                } else {
                    map.gcps.clone()
                };

                if self.options.evaluate_staple_points {
                    for staple in &self.resolved {
                        gcps.extend(
                            staple
                                .occurrences
                                .iter()
                                .filter(|o| o.map_index == index)
                                .map(|o| Gcp::new(o.resource, staple.geo)),
                        );
                    }
                }
                map.with_gcps(gcps)
            })
            .collect()
    }

    pub fn options(&self) -> &StapleOptions {
        &self.options
    }

    /// Input maps, in order.
    pub fn maps(&self) -> &[GeoreferencedMap] {
        &self.maps
    }

    /// Grouped staples, including evaluated singletons.
    pub fn staples(&self) -> &[Staple] {
        &self.staples
    }

    /// Resolved staple locations, in first-appearance order of their ids.
    pub fn staple_points(&self) -> &[ResolvedStaple] {
        &self.resolved
    }

    /// One solved model per map, in input order.
    pub fn models(&self) -> &[SolvedModel] {
        &self.models
    }

    pub fn model(&self, map_id: &str) -> Option<&SolvedModel> {
        self.layout.index_of(map_id).map(|i| &self.models[i])
    }

    pub fn system(&self) -> &LinearSystem {
        &self.system
    }

    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    /// Distances between each staple occurrence's evaluation and the
    /// resolved location, over staples that span several maps.
    pub fn staple_residuals(&self) -> ResidualStats {
        ResidualStats::from_errors(
            self.staples
                .iter()
                .zip(&self.resolved)
                .filter(|(staple, _)| staple.is_constraint())
                .flat_map(|(_, r)| r.evaluations.iter().map(move |e| (e - r.geo).norm())),
        )
    }
}

/// Group RCPs by id in first-appearance order, dropping those on unknown maps.
fn group_staples(rcps: &[Rcp], layout: &BlockLayout, keep_singletons: bool) -> Result<Vec<Staple>> {
    let mut staples: Vec<Staple> = Vec::new();
    let mut by_id: HashMap<&str, usize> = HashMap::new();
    let mut matched = 0usize;

    for rcp in rcps {
        let Some(map_index) = layout.index_of(&rcp.map_id) else {
            warn!(
                "ignoring repeated control point {:?}: unknown map {:?}",
                rcp.id, rcp.map_id
            );
            continue;
        };
        matched += 1;
        let occurrence = StapleOccurrence {
            map_index,
            map_id: rcp.map_id.clone(),
            resource: rcp.resource,
        };
        match by_id.get(rcp.id.as_str()) {
            Some(&i) => staples[i].occurrences.push(occurrence),
            None => {
                by_id.insert(rcp.id.as_str(), staples.len());
                staples.push(Staple {
                    id: rcp.id.clone(),
                    occurrences: vec![occurrence],
                });
            }
        }
    }

    if matched == 0 {
        return Err(GeorefError::NoMatchingRcps);
    }
    let constraints = staples.iter().filter(|s| s.is_constraint()).count();
    if constraints == 0 {
        return Err(GeorefError::NoStaples);
    }

    let groups = staples.len();
    if !keep_singletons {
        staples.retain(Staple::is_constraint);
    }
    debug!(
        "{} of {} RCPs matched: {} groups, {} staples, {} kept",
        matched,
        rcps.len(),
        groups,
        constraints,
        staples.len()
    );
    Ok(staples)
}

fn resolve(staple: &Staple, models: &[SolvedModel], average_out: bool) -> ResolvedStaple {
    let evaluations: Vec<Pt2> = staple
        .occurrences
        .iter()
        .map(|o| models[o.map_index].evaluate(&o.resource))
        .collect();
    let anchor = evaluations.first().copied().unwrap_or_else(Pt2::origin);
    let geo = if average_out {
        centroid(&evaluations).unwrap_or(anchor)
    } else {
        anchor
    };
    ResolvedStaple {
        id: staple.id.clone(),
        geo,
        occurrences: staple.occurrences.clone(),
        evaluations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use georef_core::TransformationType;

    fn occurrence(map_index: usize) -> StapleOccurrence {
        StapleOccurrence {
            map_index,
            map_id: format!("m{map_index}"),
            resource: Pt2::origin(),
        }
    }

    #[test]
    fn constraint_needs_two_distinct_maps() {
        let mut staple = Staple {
            id: "s".into(),
            occurrences: vec![occurrence(0), occurrence(0)],
        };
        assert_eq!(staple.map_count(), 1);
        assert!(!staple.is_constraint());
        staple.occurrences.push(occurrence(2));
        assert!(staple.is_constraint());
    }

    #[test]
    fn grouping_keeps_first_appearance_order() -> anyhow::Result<()> {
        let maps = vec![
            GeoreferencedMap::new("a", Vec::new()),
            GeoreferencedMap::new("b", Vec::new()),
        ];
        let layout = BlockLayout::new(TransformationType::default(), &maps)?;
        let rcps = vec![
            Rcp::new("y", "a", Pt2::new(1.0, 1.0)),
            Rcp::new("x", "a", Pt2::new(2.0, 2.0)),
            Rcp::new("lost", "zzz", Pt2::new(0.0, 0.0)),
            Rcp::new("x", "b", Pt2::new(3.0, 3.0)),
            Rcp::new("y", "b", Pt2::new(4.0, 4.0)),
            Rcp::new("solo", "b", Pt2::new(5.0, 5.0)),
        ];
        let staples = group_staples(&rcps, &layout, false)?;
        let ids: Vec<&str> = staples.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["y", "x"]);
        assert_eq!(staples[1].occurrences[1].map_index, 1);

        let with_singletons = group_staples(&rcps, &layout, true)?;
        assert_eq!(with_singletons.len(), 3);
        assert_eq!(with_singletons[2].id, "solo");

        assert_eq!(
            group_staples(&rcps[2..3], &layout, false),
            Err(GeorefError::NoMatchingRcps)
        );
        assert_eq!(
            group_staples(&rcps[..2], &layout, false),
            Err(GeorefError::NoStaples)
        );
        Ok(())
    }
}
