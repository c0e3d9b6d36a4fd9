use std::path::Path;

use anyhow::{Context, Result};

use construction::{sources, Horizon};
use mapgeom::Layer;
use maprender::{MapRenderer, RenderRequest, RenderedMap};
use roadio::RunPaths;
use roadutil::{prettyprint_usize, Timer};

/// The whole run: directories, both downloads, cleaning, and one map per horizon.
pub fn run(
    root: &Path,
    date: &str,
    config: Option<&Path>,
    quiet: bool,
    timer: &mut Timer,
) -> Result<Vec<RenderedMap>> {
    let config =
        maprender::load_configuration(config).context("loading the render configuration")?;
    let paths = RunPaths::new(root, date);
    paths
        .prepare()
        .with_context(|| format!("creating directories under {}", root.display()))?;

    timer.start("load city boundaries");
    let raw = roadio::fetch_if_missing(paths.reference_file(), sources::OTTAWA_BOUNDARIES, quiet)?;
    let boundaries = Layer::from_geojson_str(&raw).context("parsing the city boundaries")?;
    timer.stop("load city boundaries");

    timer.start("download road construction");
    let snapshot = paths.construction_snapshot();
    roadio::download_to_file(sources::ROAD_CONSTRUCTION, &snapshot, quiet)?;
    let raw = roadio::slurp_string(&snapshot)?;
    timer.stop("download road construction");

    let roads = prepare_roads(&raw, timer)?;
    let renderer = MapRenderer::new(config)?;
    render_horizons(&renderer, &boundaries, &roads, &paths, timer)
}

/// Parse a construction snapshot and keep the complete road work records.
pub fn prepare_roads(raw: &str, timer: &mut Timer) -> Result<Layer> {
    timer.start("clean road construction");
    let layer = Layer::from_geojson_str(raw).context("parsing road construction")?;
    let total = layer.len();
    let cleaned = construction::clean(layer)?;
    let roads = construction::roads(&cleaned)?;
    timer.note(format!(
        "{} of {} construction records are complete road work",
        prettyprint_usize(roads.len()),
        prettyprint_usize(total)
    ));
    timer.stop("clean road construction");
    Ok(roads)
}

pub fn render_horizons(
    renderer: &MapRenderer,
    boundaries: &Layer,
    roads: &Layer,
    paths: &RunPaths,
    timer: &mut Timer,
) -> Result<Vec<RenderedMap>> {
    let output_dir = paths.maps_day_dir();
    let mut maps = Vec::new();
    for horizon in Horizon::ALL {
        let features = horizon.select(roads)?;
        timer.note(format!(
            "{}: {} road segments",
            horizon,
            prettyprint_usize(features.len())
        ));
        let map = renderer
            .render(&RenderRequest {
                reference: boundaries,
                features: &features,
                title: horizon.title(),
                date_label: paths.date(),
                output_dir: &output_dir,
            })
            .with_context(|| format!("rendering the {} map", horizon))?;
        maps.push(map);
    }
    Ok(maps)
}
