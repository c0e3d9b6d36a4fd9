//! Web map tiles underneath the vector layers. Tiles come in web mercator; the map can be in any
//! CRS, so the mosaic is resampled pixel by pixel through longitude/latitude.

use image::imageops::{self, FilterType};
use image::RgbaImage;

use mapgeom::mercator::{self, TileId, MAX_LATITUDE, TILE_SIZE};
use mapgeom::{Bounds, Coordinate, Crs, LonLat};
use roadutil::{Error, Result, Timer};

use crate::text::{text_height, text_width};
use crate::{Canvas, Color, RenderConfig};

// Points sampled along each edge of the map to find its lon/lat extent
const EDGE_SAMPLES: usize = 32;

/// Somewhere to get basemap tiles from.
pub trait TileSource {
    fn max_zoom(&self) -> u8;
    /// Credit drawn on every map.
    fn attribution(&self) -> &str;
    fn fetch(&self, tile: TileId) -> Result<RgbaImage>;
}

/// Fetches tiles over HTTP from an XYZ server, one blocking request at a time.
pub struct HttpTileSource {
    client: reqwest::blocking::Client,
    url_template: String,
    max_zoom: u8,
    attribution: String,
}

impl HttpTileSource {
    pub fn new(config: &RenderConfig) -> Result<HttpTileSource> {
        let client = roadio::http_client(&config.user_agent)
            .map_err(|err| Error::network(&config.tile_url, err))?;
        Ok(HttpTileSource {
            client,
            url_template: config.tile_url.clone(),
            max_zoom: config.tile_max_zoom,
            attribution: config.attribution.clone(),
        })
    }
}

impl TileSource for HttpTileSource {
    fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    fn attribution(&self) -> &str {
        &self.attribution
    }

    fn fetch(&self, tile: TileId) -> Result<RgbaImage> {
        let url = tile.url(&self.url_template);
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|err| Error::network(&url, err))?;
        if let Err(err) = resp.error_for_status_ref() {
            return Err(Error::network(&url, err));
        }
        let bytes = resp.bytes().map_err(|err| Error::network(&url, err))?;
        let img = image::load_from_memory(&bytes)
            .map_err(|err| Error::network(&url, format!("undecodable tile: {}", err)))?;
        Ok(img.to_rgba8())
    }
}

/// Tiles stitched together at one zoom level. Pixel (0, 0) is the top-left of tile
/// `(min_x, min_y)`.
pub struct Basemap {
    zoom: u8,
    min_x: u32,
    min_y: u32,
    image: RgbaImage,
}

impl Basemap {
    /// Fetch every tile covering a lon/lat box. Any failed tile fails the whole basemap.
    pub fn fetch(
        source: &dyn TileSource,
        lonlat: &Bounds,
        max_tiles: usize,
        timer: &mut Timer,
    ) -> Result<Basemap> {
        let zoom = mercator::choose_zoom_with_limit(lonlat, source.max_zoom(), max_tiles);
        let tiles = mercator::tiles_covering(lonlat, zoom);
        let min_x = tiles.iter().map(|t| t.x).min().unwrap_or(0);
        let min_y = tiles.iter().map(|t| t.y).min().unwrap_or(0);
        let max_x = tiles.iter().map(|t| t.x).max().unwrap_or(0);
        let max_y = tiles.iter().map(|t| t.y).max().unwrap_or(0);
        let mut image = RgbaImage::new(
            (max_x - min_x + 1) * TILE_SIZE,
            (max_y - min_y + 1) * TILE_SIZE,
        );

        timer.note(format!("Basemap needs {} tiles at zoom {}", tiles.len(), zoom));
        timer.start_iter("fetch basemap tiles", tiles.len());
        for tile in tiles {
            timer.next();
            let mut img = source.fetch(tile)?;
            if img.dimensions() != (TILE_SIZE, TILE_SIZE) {
                img = imageops::resize(&img, TILE_SIZE, TILE_SIZE, FilterType::Triangle);
            }
            imageops::replace(
                &mut image,
                &img,
                i64::from((tile.x - min_x) * TILE_SIZE),
                i64::from((tile.y - min_y) * TILE_SIZE),
            );
        }

        Ok(Basemap {
            zoom,
            min_x,
            min_y,
            image,
        })
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// The nearest mosaic pixel to a point, if the mosaic covers it.
    pub fn sample(&self, pt: LonLat) -> Option<[u8; 4]> {
        let (gx, gy) = mercator::global_pixel(pt, self.zoom);
        let x = gx - f64::from(self.min_x * TILE_SIZE);
        let y = gy - f64::from(self.min_y * TILE_SIZE);
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.image.width() || y >= self.image.height() {
            return None;
        }
        Some(self.image.get_pixel(x, y).0)
    }

    /// Paint the mosaic into the plot box of a canvas whose coordinates are in `crs`. Pixels that
    /// don't correspond to a valid lon/lat are left alone.
    pub fn draw(&self, canvas: &mut Canvas, crs: &Crs) {
        let width = canvas.width() as usize;
        let height = canvas.height() as usize;
        let viewport = canvas.viewport().clone();
        let (left, top, right, bottom) = viewport.plot_box();
        let x1 = left.floor().max(0.0) as usize;
        let y1 = top.floor().max(0.0) as usize;
        let x2 = (right.ceil() as usize).min(width);
        let y2 = (bottom.ceil() as usize).min(height);

        let pixels = canvas.pixels_mut();
        for py in y1..y2 {
            for px in x1..x2 {
                let (x, y) = viewport.to_data(px as f64 + 0.5, py as f64 + 0.5);
                let pt = match crs.to_lonlat(Coordinate { x, y }) {
                    Ok(pt) => pt,
                    Err(_) => continue,
                };
                let [r, g, b, a] = match self.sample(pt) {
                    Some(rgba) => rgba,
                    None => continue,
                };
                let idx = (py * width + px) * 4;
                // The canvas underneath is opaque, so plain "over" compositing stays opaque
                let alpha = u32::from(a);
                for (channel, src) in [r, g, b].into_iter().enumerate() {
                    let dst = u32::from(pixels[idx + channel]);
                    pixels[idx + channel] =
                        ((u32::from(src) * alpha + dst * (255 - alpha) + 127) / 255) as u8;
                }
                pixels[idx + 3] = 255;
            }
        }
    }
}

/// The lon/lat box covering a map extent in some CRS, clamped to what web mercator can show.
/// Edges are sampled, since straight lines in a conic projection curve in lon/lat.
pub fn lonlat_extent(extent: &Bounds, crs: &Crs) -> Result<Bounds> {
    let mut result = Bounds::new();
    for i in 0..=EDGE_SAMPLES {
        let t = (i as f64) / (EDGE_SAMPLES as f64);
        let x = extent.min_x + t * extent.width();
        let y = extent.min_y + t * extent.height();
        for (cx, cy) in [
            (x, extent.min_y),
            (x, extent.max_y),
            (extent.min_x, y),
            (extent.max_x, y),
        ] {
            if let Ok(pt) = crs.to_lonlat(Coordinate { x: cx, y: cy }) {
                result.update(pt.longitude, pt.latitude);
            }
        }
    }
    if result.is_empty() {
        return Err(Error::crs(format!(
            "no part of the map extent in {} has a longitude/latitude",
            crs
        )));
    }
    Ok(Bounds::from_corners(
        result.min_x.max(-180.0),
        result.min_y.max(-MAX_LATITUDE),
        result.max_x.min(180.0),
        result.max_y.min(MAX_LATITUDE),
    ))
}

/// Credit in the bottom-left corner of the plot box, on a translucent white backing.
pub fn draw_attribution(canvas: &mut Canvas, attribution: &str) {
    if attribution.is_empty() {
        return;
    }
    let scale = canvas.text_scale(8.0);
    let pad = scale as f32 * 2.0;
    let w = text_width(attribution, scale) as f32;
    let h = text_height(scale) as f32;
    let (left, _, _, bottom) = canvas.viewport().plot_box();
    let x = left as f32;
    let y = bottom as f32 - h - 2.0 * pad;
    canvas.fill_rect(x, y, w + 2.0 * pad, h + 2.0 * pad, Color::WHITE.alpha(0.7));
    canvas.text(x + pad, y + pad, attribution, Color::BLACK, scale);
}

#[cfg(test)]
pub mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::Viewport;

    /// Solid tiles of one color, remembering what was asked for.
    pub struct SolidTiles {
        pub color: [u8; 4],
        pub fail: bool,
        pub fetched: RefCell<Vec<TileId>>,
    }

    impl SolidTiles {
        pub fn new(color: [u8; 4]) -> SolidTiles {
            SolidTiles {
                color,
                fail: false,
                fetched: RefCell::new(Vec::new()),
            }
        }

        pub fn failing() -> SolidTiles {
            SolidTiles {
                fail: true,
                ..SolidTiles::new([0, 0, 0, 255])
            }
        }
    }

    impl TileSource for SolidTiles {
        fn max_zoom(&self) -> u8 {
            19
        }

        fn attribution(&self) -> &str {
            "test tiles"
        }

        fn fetch(&self, tile: TileId) -> Result<RgbaImage> {
            self.fetched.borrow_mut().push(tile);
            if self.fail {
                return Err(Error::network(
                    tile.url("http://127.0.0.1:9/{z}/{x}/{y}.png"),
                    "connection refused",
                ));
            }
            Ok(RgbaImage::from_pixel(
                TILE_SIZE,
                TILE_SIZE,
                image::Rgba(self.color),
            ))
        }
    }

    #[test]
    fn mosaic_covers_the_box() {
        let source = SolidTiles::new([10, 200, 30, 255]);
        let ottawa = Bounds::from_corners(-76.36, 44.96, -75.25, 45.54);
        let basemap = Basemap::fetch(&source, &ottawa, 16, &mut Timer::throwaway()).unwrap();
        let n = source.fetched.borrow().len();
        assert!(n <= 16 && n > 0);
        assert!(basemap.zoom() < 11);
        assert_eq!(
            basemap.sample(LonLat::new(-75.7, 45.4)),
            Some([10, 200, 30, 255])
        );
        assert_eq!(basemap.sample(LonLat::new(100.0, -40.0)), None);
    }

    #[test]
    fn one_bad_tile_fails_everything() {
        let source = SolidTiles::failing();
        let ottawa = Bounds::from_corners(-76.36, 44.96, -75.25, 45.54);
        match Basemap::fetch(&source, &ottawa, 64, &mut Timer::throwaway()) {
            Err(Error::Network { url, .. }) => assert!(url.starts_with("http://127.0.0.1:9/")),
            Err(err) => panic!("unexpected {}", err),
            Ok(_) => panic!("a failing source made a basemap"),
        }
        assert_eq!(source.fetched.borrow().len(), 1);
    }

    #[test]
    fn warped_into_lambert() {
        let crs = Crs::canada_lambert();
        let center = crs
            .from_lonlat(LonLat::new(-75.7, 45.4))
            .unwrap();
        let extent = Bounds::from_corners(
            center.x - 20_000.0,
            center.y - 20_000.0,
            center.x + 20_000.0,
            center.y + 20_000.0,
        );
        let lonlat = lonlat_extent(&extent, &crs).unwrap();
        assert!(lonlat.contains(-75.7, 45.4));
        assert!(lonlat.width() < 1.0 && lonlat.height() < 1.0);

        let source = SolidTiles::new([200, 100, 50, 255]);
        let basemap = Basemap::fetch(&source, &lonlat, 16, &mut Timer::throwaway()).unwrap();
        let viewport = Viewport::new(extent, 1.0, 100, 100);
        let mut canvas = Canvas::new(100, 100, 100.0, viewport).unwrap();
        basemap.draw(&mut canvas, &crs);

        let img = canvas.to_rgb_image();
        // Inside the plot box is all basemap, outside is untouched
        assert_eq!(img.get_pixel(50, 50).0, [200, 100, 50]);
        assert_eq!(img.get_pixel(2, 2).0, [255, 255, 255]);
    }

    #[test]
    fn extent_outside_the_world() {
        let far = Bounds::from_corners(500.0, 500.0, 600.0, 600.0);
        assert!(matches!(
            lonlat_extent(&far, &Crs::Wgs84),
            Err(Error::CoordinateSystem(_))
        ));
    }
}
