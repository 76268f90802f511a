use std::{fs, path::Path};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use georef::prelude::*;
use log::info;

/// Georeferencing CLI: fit GCP transformations and staple maps together.
#[derive(Debug, Parser)]
#[command(author, version, about = "GCP transformations and multi-map stapling")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve several maps jointly and print them with the stapled GCPs.
    Attach {
        /// JSON array of maps (`{"id", "gcps"}`).
        #[arg(long)]
        maps: String,
        /// JSON array of repeated control points (`{"id", "mapId", "resource"}`).
        #[arg(long)]
        rcps: String,
        /// Optional JSON StapleOptions. Defaults are used if omitted.
        #[arg(long)]
        options: Option<String>,
    },
    /// Transform points with a transformation fitted on GCPs.
    Transform {
        /// JSON array of GCPs (`{"resource": [x, y], "geo": [x, y]}`).
        #[arg(long)]
        gcps: String,
        /// JSON array of `[x, y]` points.
        #[arg(long)]
        points: String,
        /// Transformation type, e.g. `polynomial2` or `thinPlateSpline`.
        #[arg(long = "type", default_value = "polynomial")]
        kind: TransformationType,
        /// Map geo points to resource points instead.
        #[arg(long)]
        inverse: bool,
        /// Mirror the resource y axis while fitting.
        #[arg(long)]
        different_handedness: bool,
    },
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

fn attach_from_files(maps_path: &str, rcps_path: &str, options_path: Option<&str>) -> Result<String> {
    let maps: Vec<GeoreferencedMap> = load_json_file(Path::new(maps_path))?;
    let rcps: Vec<Rcp> = load_json_file(Path::new(rcps_path))?;
    let options = match options_path {
        Some(path) => load_json_file::<StapleOptions>(Path::new(path))?,
        None => StapleOptions::default(),
    };

    let stapled = StapledTransformation::from_georeferenced_maps(&maps, &rcps, options)
        .context("stapling maps")?;
    let residuals = stapled.staple_residuals();
    info!(
        "stapled {} maps with {} staple points (max spread {:.3e})",
        maps.len(),
        stapled.staple_points().len(),
        residuals.max
    );
    Ok(serde_json::to_string_pretty(&stapled.to_georeferenced_maps())?)
}

fn transform_from_files(
    gcps_path: &str,
    points_path: &str,
    kind: TransformationType,
    inverse: bool,
    different_handedness: bool,
) -> Result<String> {
    let gcps: Vec<Gcp> = load_json_file(Path::new(gcps_path))?;
    let points: Vec<Pt2> = load_json_file(Path::new(points_path))?;

    let options = TransformerOptions {
        different_handedness,
        ..TransformerOptions::default()
    };
    let transformer = GcpTransformer::with_options(&gcps, kind, options)
        .with_context(|| format!("fitting {kind} transformation"))?;
    info!(
        "fitted {} on {} GCPs (rms residual {:.3e})",
        kind,
        gcps.len(),
        transformer.residuals().rms
    );

    let out: Vec<Pt2> = points
        .iter()
        .map(|p| {
            if inverse {
                transformer.transform_to_resource(p)
            } else {
                transformer.transform_to_geo(p)
            }
        })
        .collect();
    Ok(serde_json::to_string_pretty(&out)?)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    let json = match args.command {
        Command::Attach {
            maps,
            rcps,
            options,
        } => attach_from_files(&maps, &rcps, options.as_deref())?,
        Command::Transform {
            gcps,
            points,
            kind,
            inverse,
            different_handedness,
        } => transform_from_files(&gcps, &points, kind, inverse, different_handedness)?,
    };
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use georef::core::synthetic::{gcps_from_fn, grid_points_2d, overlapping_sheets};
    use std::fs;
    use tempfile::NamedTempFile;

    fn write_json<T: serde::Serialize>(value: &T, path: &Path) {
        serde_json::to_writer_pretty(fs::File::create(path).unwrap(), value).unwrap();
    }

    #[test]
    fn attach_smoke_test() {
        let (maps, rcps) = overlapping_sheets();
        let maps_file = NamedTempFile::new().unwrap();
        let rcps_file = NamedTempFile::new().unwrap();
        let options_file = NamedTempFile::new().unwrap();
        write_json(&maps, maps_file.path());
        write_json(&rcps, rcps_file.path());
        fs::write(options_file.path(), r#"{"transformationType":"thinPlateSpline"}"#).unwrap();

        let json = attach_from_files(
            maps_file.path().to_str().unwrap(),
            rcps_file.path().to_str().unwrap(),
            Some(options_file.path().to_str().unwrap()),
        )
        .expect("cli helper should succeed");

        let out: Vec<GeoreferencedMap> = serde_json::from_str(&json).unwrap();
        assert_eq!(out.len(), 2);
        for map in &out {
            assert_eq!(map.gcps.len(), 5);
            let geo = map.gcps[4].geo;
            assert!((geo - Pt2::new(50.0, 100.0)).norm() < 1e-5, "{}: {geo:?}", map.id);
        }
    }

    #[test]
    fn transform_smoke_test() {
        let gcps = gcps_from_fn(&grid_points_2d(3, 3, 100.0), |p| Pt2::new(p.x * 2.0, -p.y));
        let gcps_file = NamedTempFile::new().unwrap();
        let points_file = NamedTempFile::new().unwrap();
        write_json(&gcps, gcps_file.path());
        write_json(&vec![Pt2::new(50.0, 50.0)], points_file.path());

        let json = transform_from_files(
            gcps_file.path().to_str().unwrap(),
            points_file.path().to_str().unwrap(),
            TransformationType::Projective,
            false,
            false,
        )
        .expect("cli helper should succeed");
        let out: Vec<Pt2> = serde_json::from_str(&json).unwrap();
        assert!((out[0] - Pt2::new(100.0, -50.0)).norm() < 1e-9, "{out:?}");

        let json = transform_from_files(
            gcps_file.path().to_str().unwrap(),
            points_file.path().to_str().unwrap(),
            TransformationType::Helmert,
            true,
            true,
        )
        .expect("cli helper should succeed");
        let out: Vec<Pt2> = serde_json::from_str(&json).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn bad_options_are_reported() {
        let (maps, rcps) = overlapping_sheets();
        let maps_file = NamedTempFile::new().unwrap();
        let rcps_file = NamedTempFile::new().unwrap();
        let options_file = NamedTempFile::new().unwrap();
        write_json(&maps, maps_file.path());
        write_json(&rcps, rcps_file.path());
        fs::write(options_file.path(), r#"{"averageOutt":false}"#).unwrap();

        let err = attach_from_files(
            maps_file.path().to_str().unwrap(),
            rcps_file.path().to_str().unwrap(),
            Some(options_file.path().to_str().unwrap()),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("parsing"), "{err:#}");
    }
}
