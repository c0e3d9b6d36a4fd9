use std::fmt;

// longitude is x, latitude is y
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct LonLat {
    pub longitude: f64,
    pub latitude: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> LonLat {
        LonLat {
            longitude: lon,
            latitude: lat,
        }
    }

    /// Latitudes beyond the poles and non-finite values can't be projected anywhere.
    pub fn is_valid(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite() && self.latitude.abs() <= 90.0
    }
}

impl fmt::Display for LonLat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LonLat({0}, {1})", self.longitude, self.latitude)
    }
}

impl From<LonLat> for geo::Coordinate<f64> {
    fn from(pt: LonLat) -> Self {
        geo::Coordinate {
            x: pt.longitude,
            y: pt.latitude,
        }
    }
}

impl From<geo::Coordinate<f64>> for LonLat {
    fn from(c: geo::Coordinate<f64>) -> Self {
        LonLat::new(c.x, c.y)
    }
}
