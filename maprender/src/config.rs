use std::path::Path;

use serde::Deserialize;

use mapgeom::mercator::MAX_ZOOM;
use mapgeom::Crs;
use roadutil::{Error, Result};

/// Everything about a map that isn't the data itself. Loaded once per run and shared by every
/// render.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    pub width_inches: f64,
    pub height_inches: f64,
    pub dpi: f64,
    /// Where "Road Work (m): ..." goes, in the coordinates of the feature layer's CRS. The
    /// baseline-left corner of the text lands here.
    pub annotation_x: f64,
    pub annotation_y: f64,
    /// Lengths are measured after reprojecting into this. Must be projected.
    pub measurement_crs: Crs,
    /// An XYZ template with `{z}`, `{x}` and `{y}`.
    pub tile_url: String,
    pub tile_max_zoom: u8,
    /// The zoom level is lowered until the map needs at most this many tiles.
    pub max_tiles: usize,
    pub attribution: String,
    pub user_agent: String,
    pub image_extension: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawRenderConfig {
    width_inches: Option<f64>,
    height_inches: Option<f64>,
    dpi: Option<f64>,
    annotation_x: Option<f64>,
    annotation_y: Option<f64>,
    measurement_crs: Option<String>,
    tile_url: Option<String>,
    tile_max_zoom: Option<u8>,
    max_tiles: Option<usize>,
    attribution: Option<String>,
    user_agent: Option<String>,
    image_extension: Option<String>,
}

impl RenderConfig {
    pub fn from_toml_str(raw: &str) -> Result<RenderConfig> {
        let config: RawRenderConfig = toml::from_str(raw)
            .map_err(|err| Error::schema(format!("bad render configuration: {}", err)))?;
        fill_in_defaults(config)
    }

    pub fn width_px(&self) -> u32 {
        (self.width_inches * self.dpi).round() as u32
    }

    pub fn height_px(&self) -> u32 {
        (self.height_inches * self.dpi).round() as u32
    }

    /// Typographic points to pixels at this DPI.
    pub fn points_to_pixels(&self, points: f64) -> f64 {
        points * self.dpi / 72.0
    }
}

impl Default for RenderConfig {
    fn default() -> RenderConfig {
        default_configuration()
    }
}

/// Read a TOML file if one is given. Every field is optional and missing ones keep their
/// defaults. A file that can't be read or parsed is an error rather than a silent fallback.
pub fn load_configuration(path: Option<&Path>) -> Result<RenderConfig> {
    match path {
        Some(path) => {
            let text = fs_err::read_to_string(path)?;
            let config = RenderConfig::from_toml_str(&text)?;
            info!("Loaded render configuration from {}", path.display());
            Ok(config)
        }
        None => Ok(default_configuration()),
    }
}

fn default_configuration() -> RenderConfig {
    RenderConfig {
        width_inches: 15.0,
        height_inches: 15.0,
        dpi: 100.0,
        annotation_x: -75.4,
        annotation_y: 44.95,
        measurement_crs: Crs::canada_lambert(),
        tile_url: String::from("https://tile.openstreetmap.org/{z}/{x}/{y}.png"),
        tile_max_zoom: 19,
        max_tiles: 64,
        attribution: String::from("(C) OpenStreetMap contributors"),
        user_agent: format!("roadwork/{}", env!("CARGO_PKG_VERSION")),
        image_extension: String::from("png"),
    }
}

fn fill_in_defaults(config: RawRenderConfig) -> Result<RenderConfig> {
    let mut result = default_configuration();

    result.width_inches = value_or_default(config.width_inches, result.width_inches);
    result.height_inches = value_or_default(config.height_inches, result.height_inches);
    result.dpi = value_or_default(config.dpi, result.dpi);
    result.annotation_x = value_or_default(config.annotation_x, result.annotation_x);
    result.annotation_y = value_or_default(config.annotation_y, result.annotation_y);
    if let Some(name) = config.measurement_crs {
        result.measurement_crs = Crs::parse(&name)?;
    }
    result.tile_url = value_or_default(config.tile_url, result.tile_url);
    result.tile_max_zoom = value_or_default(config.tile_max_zoom, result.tile_max_zoom);
    result.max_tiles = value_or_default(config.max_tiles, result.max_tiles);
    result.attribution = value_or_default(config.attribution, result.attribution);
    result.user_agent = value_or_default(config.user_agent, result.user_agent);
    result.image_extension = value_or_default(config.image_extension, result.image_extension)
        .trim_start_matches('.')
        .to_string();

    if !(result.width_inches > 0.0 && result.height_inches > 0.0 && result.dpi > 0.0) {
        return Err(Error::schema(format!(
            "canvas must have a positive size, not {}x{} inches at {} DPI",
            result.width_inches, result.height_inches, result.dpi
        )));
    }
    if result.tile_max_zoom > MAX_ZOOM {
        return Err(Error::schema(format!(
            "tile_max_zoom can be at most {}, not {}",
            MAX_ZOOM, result.tile_max_zoom
        )));
    }
    if result.max_tiles == 0 {
        return Err(Error::schema("max_tiles must be at least 1"));
    }
    Ok(result)
}

fn value_or_default<T>(maybe_value: Option<T>, default: T) -> T {
    maybe_value.unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_means_defaults() {
        let config = RenderConfig::from_toml_str("").unwrap();
        assert_eq!(config.width_px(), 1500);
        assert_eq!(config.height_px(), 1500);
        assert_eq!(config.measurement_crs, Crs::canada_lambert());
        assert_eq!((config.annotation_x, config.annotation_y), (-75.4, 44.95));
        assert_eq!(config.image_extension, "png");
        assert_eq!(config.tile_max_zoom, 19);
    }

    #[test]
    fn partial_overrides() {
        let config = RenderConfig::from_toml_str(
            r#"
dpi = 50.0
annotation_x = 1.5
measurement_crs = "EPSG:3857"
image_extension = ".jpg"
"#,
        )
        .unwrap();
        assert_eq!(config.width_px(), 750);
        assert_eq!(config.annotation_x, 1.5);
        assert_eq!(config.annotation_y, 44.95);
        assert_eq!(config.measurement_crs, Crs::WebMercator);
        assert_eq!(config.image_extension, "jpg");
        assert_eq!(config.points_to_pixels(72.0), 50.0);
    }

    #[test]
    fn bad_values() {
        assert!(matches!(
            RenderConfig::from_toml_str("dpi = \"lots\""),
            Err(Error::DataSchema(_))
        ));
        assert!(matches!(
            RenderConfig::from_toml_str("measurement_crs = \"EPSG:32618\""),
            Err(Error::CoordinateSystem(_))
        ));
        assert!(matches!(
            RenderConfig::from_toml_str("width_inches = 0.0"),
            Err(Error::DataSchema(_))
        ));
    }

    #[test]
    fn tile_zoom_is_capped() {
        assert_eq!(
            RenderConfig::from_toml_str("tile_max_zoom = 30").unwrap().tile_max_zoom,
            30
        );
        assert!(matches!(
            RenderConfig::from_toml_str("tile_max_zoom = 64"),
            Err(Error::DataSchema(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.toml");
        fs_err::write(&path, "max_tiles = 4\n").unwrap();
        assert_eq!(load_configuration(Some(&path)).unwrap().max_tiles, 4);
        assert_eq!(load_configuration(None).unwrap().max_tiles, 64);
        assert!(matches!(
            load_configuration(Some(&dir.path().join("missing.toml"))),
            Err(Error::Io(_))
        ));
    }
}
