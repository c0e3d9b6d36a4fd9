//! Spherical Web Mercator (EPSG:3857) and the XYZ tile grid that web basemaps are served in.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use roadutil::{Error, Result};

use crate::{Bounds, LonLat};

pub const EARTH_RADIUS: f64 = 6_378_137.0;
/// Web maps cut off the poles so the world is a square.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;
pub const TILE_SIZE: u32 = 256;
/// Deeper zoom levels have more tiles per row than a `u32` tile index can count.
pub const MAX_ZOOM: u8 = 30;

pub fn forward(pt: LonLat) -> Result<geo::Coordinate<f64>> {
    if !pt.is_valid() || pt.latitude.abs() >= 90.0 {
        return Err(Error::crs(format!(
            "{} is outside the domain of web mercator",
            pt
        )));
    }
    let lat = pt.latitude.to_radians();
    Ok(geo::Coordinate {
        x: EARTH_RADIUS * pt.longitude.to_radians(),
        y: EARTH_RADIUS * (FRAC_PI_4 + lat / 2.0).tan().ln(),
    })
}

pub fn inverse(c: geo::Coordinate<f64>) -> Result<LonLat> {
    if !c.x.is_finite() || !c.y.is_finite() {
        return Err(Error::crs(format!("({}, {}) can't be unprojected", c.x, c.y)));
    }
    Ok(LonLat::new(
        (c.x / EARTH_RADIUS).to_degrees(),
        (2.0 * (c.y / EARTH_RADIUS).exp().atan() - FRAC_PI_2).to_degrees(),
    ))
}

/// One tile of the XYZ grid. `x` grows east and `y` grows south.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileId {
    /// Fill in a `{z}/{x}/{y}` URL template.
    pub fn url(&self, template: &str) -> String {
        template
            .replace("{z}", &self.z.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
    }
}

/// The position of a point in the global pixel space of one zoom level, where the whole world is
/// `TILE_SIZE * 2^zoom` pixels wide. Latitudes are clamped to the web map's square.
pub fn global_pixel(pt: LonLat, zoom: u8) -> (f64, f64) {
    let world = f64::from(TILE_SIZE) * 2_f64.powi(i32::from(zoom));
    let lat = pt.latitude.max(-MAX_LATITUDE).min(MAX_LATITUDE).to_radians();
    let x = (pt.longitude + 180.0) / 360.0 * world;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * world;
    (x, y)
}

/// Pick a zoom level so that the lon/lat box spans a handful of tiles: the finer of the two
/// per-axis estimates `ceil(log2(720 / span))`, clamped to `[0, max_zoom]` and to `MAX_ZOOM`.
pub fn choose_zoom(lonlat: &Bounds, max_zoom: u8) -> u8 {
    let estimate = |span: f64| -> f64 {
        if span > 0.0 {
            (360.0 * 2.0 / span).log2().ceil()
        } else {
            f64::from(max_zoom)
        }
    };
    let zoom = estimate(lonlat.width()).max(estimate(lonlat.height()));
    zoom.max(0.0).min(f64::from(max_zoom.min(MAX_ZOOM))) as u8
}

/// Every tile at a zoom level touching a lon/lat box, row by row.
pub fn tiles_covering(lonlat: &Bounds, zoom: u8) -> Vec<TileId> {
    let max_index = (1_u64 << zoom) - 1;
    let to_index = |px: f64| -> u32 {
        let idx = (px / f64::from(TILE_SIZE)).floor().max(0.0) as u64;
        idx.min(max_index) as u32
    };
    let (x1, y1) = global_pixel(LonLat::new(lonlat.min_x, lonlat.max_y), zoom);
    let (x2, y2) = global_pixel(LonLat::new(lonlat.max_x, lonlat.min_y), zoom);

    let mut tiles = Vec::new();
    for y in to_index(y1)..=to_index(y2) {
        for x in to_index(x1)..=to_index(x2) {
            tiles.push(TileId { z: zoom, x, y });
        }
    }
    tiles
}

/// Like `choose_zoom`, but back off until the box needs at most `max_tiles` tiles.
pub fn choose_zoom_with_limit(lonlat: &Bounds, max_zoom: u8, max_tiles: usize) -> u8 {
    let mut zoom = choose_zoom(lonlat, max_zoom);
    while zoom > 0 && tiles_covering(lonlat, zoom).len() > max_tiles {
        zoom -= 1;
    }
    zoom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        for pt in [
            LonLat::new(-75.6972, 45.4215),
            LonLat::new(0.0, 0.0),
            LonLat::new(179.0, -60.0),
        ] {
            let back = inverse(forward(pt).unwrap()).unwrap();
            assert!((back.longitude - pt.longitude).abs() < 1e-9);
            assert!((back.latitude - pt.latitude).abs() < 1e-9);
        }
        assert!(forward(LonLat::new(0.0, 90.0)).is_err());
    }

    #[test]
    fn edge_of_the_world() {
        let c = forward(LonLat::new(180.0, 0.0)).unwrap();
        assert!((c.x - EARTH_RADIUS * PI).abs() < 1e-6);
        let (x, y) = global_pixel(LonLat::new(-180.0, MAX_LATITUDE), 0);
        assert!(x.abs() < 1e-9);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn ottawa_tile() {
        // Parliament Hill is in tile 10/296/366
        let (x, y) = global_pixel(LonLat::new(-75.6972, 45.4215), 10);
        assert_eq!((x as u32) / TILE_SIZE, 296);
        assert_eq!((y as u32) / TILE_SIZE, 366);
    }

    #[test]
    fn zoom_for_a_city() {
        // Roughly the extent of Ottawa
        let ottawa = Bounds::from_corners(-76.36, 44.96, -75.25, 45.54);
        assert_eq!(choose_zoom(&ottawa, 19), 11);
        assert_eq!(choose_zoom(&ottawa, 8), 8);

        let limited = choose_zoom_with_limit(&ottawa, 19, 12);
        assert!(tiles_covering(&ottawa, limited).len() <= 12);
        assert!(limited < 11);
    }

    #[test]
    fn zoom_never_passes_the_grid_limit() {
        let point = Bounds::from_corners(-75.7, 45.4, -75.7, 45.4);
        assert_eq!(choose_zoom(&point, u8::MAX), MAX_ZOOM);
        assert_eq!(tiles_covering(&point, MAX_ZOOM).len(), 1);
    }

    #[test]
    fn covering_is_clamped_to_the_grid() {
        let world = Bounds::from_corners(-180.0, -89.0, 180.0, 89.0);
        assert_eq!(tiles_covering(&world, 0), vec![TileId { z: 0, x: 0, y: 0 }]);
        assert_eq!(tiles_covering(&world, 1).len(), 4);
    }

    #[test]
    fn url_template() {
        let tile = TileId { z: 3, x: 2, y: 5 };
        assert_eq!(
            tile.url("https://tile.openstreetmap.org/{z}/{x}/{y}.png"),
            "https://tile.openstreetmap.org/3/2/5.png"
        );
    }
}
