use geo::{EuclideanLength, Geometry};

/// The planar length of a geometry in the units of its coordinates. Lines measure their length,
/// polygons their perimeter (every ring), and points nothing.
pub fn planar_length(geom: &Geometry<f64>) -> f64 {
    match geom {
        Geometry::Point(_) | Geometry::MultiPoint(_) => 0.0,
        Geometry::Line(line) => line.euclidean_length(),
        Geometry::LineString(ls) => ls.euclidean_length(),
        Geometry::MultiLineString(mls) => mls.euclidean_length(),
        Geometry::Polygon(poly) => polygon_perimeter(poly),
        Geometry::MultiPolygon(mp) => mp
            .0
            .iter()
            .map(polygon_perimeter)
            .fold(0.0, |acc, l| acc + l),
        Geometry::Rect(rect) => polygon_perimeter(&rect.to_polygon()),
        Geometry::Triangle(tri) => polygon_perimeter(&tri.to_polygon()),
        Geometry::GeometryCollection(gc) => gc
            .0
            .iter()
            .map(planar_length)
            .fold(0.0, |acc, l| acc + l),
    }
}

fn polygon_perimeter(poly: &geo::Polygon<f64>) -> f64 {
    poly.exterior().euclidean_length()
        + poly
            .interiors()
            .iter()
            .map(|ring| ring.euclidean_length())
            .fold(0.0, |acc, l| acc + l)
}

/// True for geometries without any coordinates: a line with no points, a collection with no
/// members, and so on.
pub fn is_empty(geom: &Geometry<f64>) -> bool {
    match geom {
        Geometry::Point(_) | Geometry::Line(_) | Geometry::Rect(_) | Geometry::Triangle(_) => false,
        Geometry::MultiPoint(mp) => mp.0.is_empty(),
        Geometry::LineString(ls) => ls.0.is_empty(),
        Geometry::MultiLineString(mls) => mls.0.iter().all(|ls| ls.0.is_empty()),
        Geometry::Polygon(poly) => poly.exterior().0.is_empty(),
        Geometry::MultiPolygon(mp) => mp.0.iter().all(|p| p.exterior().0.is_empty()),
        Geometry::GeometryCollection(gc) => gc.0.iter().all(is_empty),
    }
}
