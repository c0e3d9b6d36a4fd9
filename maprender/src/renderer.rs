use std::io;
use std::path::Path;

use mapgeom::Layer;
use roadutil::{Error, Result, Timer};

use crate::basemap::{self, Basemap, HttpTileSource, TileSource};
use crate::canvas::{Canvas, Style};
use crate::color::category_color;
use crate::legend::draw_legend;
use crate::request::annotation_text;
use crate::text::{text_height, text_width};
use crate::{Color, RenderConfig, RenderRequest, RenderedMap, Viewport};

/// Features are colored and listed in the legend by this attribute.
pub const CATEGORY_COLUMN: &str = "FEATURE_TYPE";

const TITLE_POINTS: f64 = 40.0;
const TITLE_PAD_POINTS: f64 = 10.0;
const ANNOTATION_POINTS: f64 = 10.0;
const REFERENCE_LINE_POINTS: f64 = 0.2;
const FEATURE_LINE_POINTS: f64 = 1.2;

/// Draws one map per call: the reference layer as a backdrop over basemap tiles, the features
/// colored by category, a title, a legend, and the total feature length.
pub struct MapRenderer {
    config: RenderConfig,
    tiles: Box<dyn TileSource>,
}

impl MapRenderer {
    /// Basemap tiles come from the configured XYZ server.
    pub fn new(config: RenderConfig) -> Result<MapRenderer> {
        let tiles = HttpTileSource::new(&config)?;
        Ok(MapRenderer::with_tiles(config, Box::new(tiles)))
    }

    pub fn with_tiles(config: RenderConfig, tiles: Box<dyn TileSource>) -> MapRenderer {
        MapRenderer { config, tiles }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render and save one map. Nothing is written unless every step before saving succeeds:
    /// the output directory must exist, the features need a CRS and a category on every record,
    /// and every basemap tile must arrive.
    pub fn render(&self, req: &RenderRequest) -> Result<RenderedMap> {
        let path = req.output_path(&self.config.image_extension);
        let title = req.display_title();
        check_output_dir(req.output_dir)?;

        let crs = req.features.require_crs()?.clone();
        let reference = req.reference.to_crs(&crs)?;
        let categories: Vec<String> = req
            .features
            .categories(CATEGORY_COLUMN)?
            .into_iter()
            .collect();

        let mut timer = Timer::new(format!("render {}", path.display()));

        timer.start("measure features");
        let total_length_meters = measure(req.features, &self.config)?;
        timer.stop("measure features");
        let annotation = annotation_text(total_length_meters);
        timer.note(format!("{}: {}", title, annotation));

        let mut bounds = reference
            .bounds()
            .ok_or_else(|| Error::schema("the reference layer has no geometry to draw"))?;
        if let Some(b) = req.features.bounds() {
            bounds.union(&b);
        }
        let viewport = Viewport::fit(
            &bounds,
            &crs,
            self.config.width_px(),
            self.config.height_px(),
        );

        timer.start("fetch basemap");
        let lonlat = basemap::lonlat_extent(viewport.data_bounds(), &crs)?;
        let basemap = Basemap::fetch(
            self.tiles.as_ref(),
            &lonlat,
            self.config.max_tiles,
            &mut timer,
        )?;
        timer.stop("fetch basemap");

        timer.start("compose");
        let mut canvas = Canvas::new(
            self.config.width_px(),
            self.config.height_px(),
            self.config.dpi,
            viewport,
        )?;
        basemap.draw(&mut canvas, &crs);

        let reference_style = Style {
            fill: Some(Color::WHITE.alpha(0.5)),
            stroke: Some((
                Color::BLACK,
                canvas.points_to_pixels(REFERENCE_LINE_POINTS),
            )),
        };
        for geom in reference.geometries() {
            canvas.draw_geometry(geom, &reference_style);
        }

        let feature_width = canvas.points_to_pixels(FEATURE_LINE_POINTS);
        for f in &req.features.features {
            let geom = match f.geometry {
                Some(ref geom) => geom,
                None => continue,
            };
            let category = f.require_str(CATEGORY_COLUMN)?;
            let idx = categories.iter().position(|c| c == category).unwrap_or(0);
            let style = Style {
                fill: None,
                stroke: Some((category_color(idx, categories.len()), feature_width)),
            };
            canvas.draw_geometry(geom, &style);
        }

        self.draw_annotation(&mut canvas, &annotation, &mut timer);
        draw_title(&mut canvas, &title);
        let entries: Vec<(String, Color)> = categories
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.clone(), category_color(idx, categories.len())))
            .collect();
        for (label, color) in &entries {
            debug!("{} drawn in {}", label, color);
        }
        draw_legend(&mut canvas, &entries, feature_width);
        basemap::draw_attribution(&mut canvas, self.tiles.attribution());
        timer.stop("compose");

        timer.start(format!("save {}", path.display()));
        canvas.save(&path)?;
        timer.stop(format!("save {}", path.display()));

        Ok(RenderedMap {
            path,
            title,
            annotation,
            total_length_meters,
        })
    }

    fn draw_annotation(&self, canvas: &mut Canvas, annotation: &str, timer: &mut Timer) {
        let (x, y) = canvas
            .viewport()
            .to_screen(self.config.annotation_x, self.config.annotation_y);
        let inside = x >= 0.0
            && y >= 0.0
            && x < f64::from(canvas.width())
            && y <= f64::from(canvas.height());
        if !inside {
            timer.warn(format!(
                "The annotation anchor ({}, {}) is off the map, so \"{}\" isn't drawn",
                self.config.annotation_x, self.config.annotation_y, annotation
            ));
            return;
        }
        let scale = canvas.text_scale(ANNOTATION_POINTS);
        // The anchor is the baseline-left corner
        let top = y as f32 - text_height(scale) as f32;
        canvas.text(x as f32, top, annotation, Color::BLACK, scale);
    }
}

/// Total length of every feature, in the units of the measurement CRS.
fn measure(features: &Layer, config: &RenderConfig) -> Result<f64> {
    if config.measurement_crs.is_geographic() {
        return Err(Error::crs(format!(
            "lengths can't be measured in {}, which is in degrees",
            config.measurement_crs
        )));
    }
    features.to_crs(&config.measurement_crs)?.total_length()
}

/// Centered over the plot box, its bottom a fixed pad above the box.
fn draw_title(canvas: &mut Canvas, title: &str) {
    let scale = canvas.text_scale(TITLE_POINTS);
    let (left, top, right, _) = canvas.viewport().plot_box();
    let w = text_width(title, scale) as f32;
    let h = text_height(scale) as f32;
    let x = ((left + right) / 2.0) as f32 - w / 2.0;
    let y = top as f32 - canvas.points_to_pixels(TITLE_PAD_POINTS) - h;
    canvas.text(x, y, title, Color::BLACK, scale);
}

fn check_output_dir(dir: &Path) -> Result<()> {
    let metadata = fs_err::metadata(dir)?;
    if !metadata.is_dir() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::Other,
            format!("{} isn't a directory", dir.display()),
        )));
    }
    if metadata.permissions().readonly() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("{} isn't writable", dir.display()),
        )));
    }
    Ok(())
}
