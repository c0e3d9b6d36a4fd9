//! Geometry for the roadwork maps: coordinate reference systems and the projections between
//! them, bounding boxes, and layers of GeoJSON features.

#[macro_use]
extern crate log;

mod bounds;
mod crs;
mod gps;
mod layer;
mod lcc;
mod length;
pub mod mercator;

pub use crate::bounds::Bounds;
pub use crate::crs::Crs;
pub use crate::gps::LonLat;
pub use crate::layer::{Feature, Layer};
pub use crate::lcc::{Ellipsoid, LambertConformalConic};
pub use crate::length::{is_empty, planar_length};

pub use geo::{Coordinate, Geometry};

/// Reproject every coordinate of a geometry from one CRS to another.
pub fn reproject(geom: &Geometry<f64>, from: &Crs, to: &Crs) -> roadutil::Result<Geometry<f64>> {
    use geo::MapCoords;

    if from == to {
        return Ok(geom.clone());
    }
    geom.try_map_coords(|c| from.transform(c, to))
}
