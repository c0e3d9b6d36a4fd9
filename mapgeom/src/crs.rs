use std::fmt;
use std::str::FromStr;

use roadutil::{Error, Result};

use crate::{mercator, LambertConformalConic, LonLat};

/// The coordinate reference systems the pipeline understands. The construction data and the
/// boundaries arrive in longitude/latitude, basemap tiles are in web mercator, and lengths are
/// measured in a Lambert conformal conic.
///
/// NAD83 and WGS84 differ by about a meter in Ontario, far below what a 1500px map can show, so
/// both geographic datums are treated as `Wgs84`.
#[derive(Clone, Debug, PartialEq)]
pub enum Crs {
    /// Longitude/latitude in degrees. EPSG:4326, OGC:CRS84.
    Wgs84,
    /// Spherical web mercator in meters. EPSG:3857.
    WebMercator,
    /// Lambert conformal conic in meters.
    LambertConformalConic(LambertConformalConic),
}

impl Crs {
    /// Canada Lambert Conformal Conic, ESRI:102002.
    pub fn canada_lambert() -> Crs {
        Crs::LambertConformalConic(LambertConformalConic::canada())
    }

    /// Parse an authority name like `EPSG:4326`, `ESRI:102002`, or an OGC URN like
    /// `urn:ogc:def:crs:OGC:1.3:CRS84`.
    pub fn parse(name: &str) -> Result<Crs> {
        let upper = name.trim().to_uppercase();
        let (authority, code) = if let Some(rest) = upper.strip_prefix("URN:OGC:DEF:CRS:") {
            // AUTHORITY:[VERSION]:CODE
            let parts: Vec<&str> = rest.split(':').collect();
            match (parts.first(), parts.last()) {
                (Some(authority), Some(code)) if parts.len() >= 2 => {
                    (authority.to_string(), code.to_string())
                }
                _ => return Err(Error::crs(format!("malformed CRS URN {}", name))),
            }
        } else if let Some((authority, code)) = upper.split_once(':') {
            (authority.to_string(), code.to_string())
        } else if upper == "CRS84" || upper == "WGS84" {
            ("OGC".to_string(), "CRS84".to_string())
        } else {
            return Err(Error::crs(format!("unknown CRS {}", name)));
        };

        match (authority.as_str(), code.as_str()) {
            ("EPSG", "4326") | ("EPSG", "4269") | ("EPSG", "4617") | ("OGC", "CRS84")
            | ("OGC", "CRS83") => Ok(Crs::Wgs84),
            ("EPSG", "3857") | ("EPSG", "900913") | ("EPSG", "3785") | ("ESRI", "102100")
            | ("ESRI", "102113") => Ok(Crs::WebMercator),
            ("ESRI", "102002") => Ok(Crs::canada_lambert()),
            _ => Err(Error::crs(format!("unsupported CRS {}", name))),
        }
    }

    /// True when coordinates are angles rather than distances. Lengths measured in a geographic
    /// CRS are meaningless.
    pub fn is_geographic(&self) -> bool {
        matches!(self, Crs::Wgs84)
    }

    pub fn to_lonlat(&self, c: geo::Coordinate<f64>) -> Result<LonLat> {
        match self {
            Crs::Wgs84 => {
                let pt = LonLat::from(c);
                if pt.is_valid() {
                    Ok(pt)
                } else {
                    Err(Error::crs(format!("{} isn't a valid longitude/latitude", pt)))
                }
            }
            Crs::WebMercator => mercator::inverse(c),
            Crs::LambertConformalConic(lcc) => lcc.inverse(c),
        }
    }

    pub fn from_lonlat(&self, pt: LonLat) -> Result<geo::Coordinate<f64>> {
        match self {
            Crs::Wgs84 => {
                if pt.is_valid() {
                    Ok(pt.into())
                } else {
                    Err(Error::crs(format!("{} isn't a valid longitude/latitude", pt)))
                }
            }
            Crs::WebMercator => mercator::forward(pt),
            Crs::LambertConformalConic(lcc) => lcc.forward(pt),
        }
    }

    /// Transform one coordinate from this CRS into another, going through longitude/latitude.
    pub fn transform(&self, c: geo::Coordinate<f64>, to: &Crs) -> Result<geo::Coordinate<f64>> {
        if self == to {
            return Ok(c);
        }
        to.from_lonlat(self.to_lonlat(c)?)
    }
}

impl FromStr for Crs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Crs> {
        Crs::parse(s)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Crs::Wgs84 => write!(f, "EPSG:4326"),
            Crs::WebMercator => write!(f, "EPSG:3857"),
            Crs::LambertConformalConic(lcc) => {
                if *lcc == LambertConformalConic::canada() {
                    write!(f, "ESRI:102002")
                } else {
                    write!(f, "{}", lcc.describe())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names() {
        for name in [
            "EPSG:4326",
            "epsg:4326",
            "urn:ogc:def:crs:OGC:1.3:CRS84",
            "urn:ogc:def:crs:EPSG::4326",
            "urn:ogc:def:crs:EPSG:6.6:4326",
            "EPSG:4269",
        ] {
            assert_eq!(Crs::parse(name).unwrap(), Crs::Wgs84, "{}", name);
        }
        assert_eq!(Crs::parse("EPSG:3857").unwrap(), Crs::WebMercator);
        assert_eq!(
            "ESRI:102002".parse::<Crs>().unwrap(),
            Crs::canada_lambert()
        );
    }

    #[test]
    fn unknown_names() {
        for name in ["EPSG:32618", "nonsense", "urn:ogc:def:crs:", ""] {
            match Crs::parse(name) {
                Err(Error::CoordinateSystem(_)) => {}
                x => panic!("{} parsed as {:?}", name, x),
            }
        }
    }

    #[test]
    fn display_round_trips() {
        for crs in [Crs::Wgs84, Crs::WebMercator, Crs::canada_lambert()] {
            assert_eq!(Crs::parse(&crs.to_string()).unwrap(), crs);
        }
    }

    #[test]
    fn transform_between_projections() {
        let ottawa = geo::Coordinate {
            x: -75.6972,
            y: 45.4215,
        };
        let lambert = Crs::Wgs84
            .transform(ottawa, &Crs::canada_lambert())
            .unwrap();
        let mercator = Crs::canada_lambert()
            .transform(lambert, &Crs::WebMercator)
            .unwrap();
        let back = Crs::WebMercator.transform(mercator, &Crs::Wgs84).unwrap();
        assert!((back.x - ottawa.x).abs() < 1e-9);
        assert!((back.y - ottawa.y).abs() < 1e-9);
    }

    #[test]
    fn invalid_degrees() {
        let bad = geo::Coordinate { x: 10.0, y: 120.0 };
        assert!(Crs::Wgs84.transform(bad, &Crs::canada_lambert()).is_err());
    }

    #[test]
    fn geographic() {
        assert!(Crs::Wgs84.is_geographic());
        assert!(!Crs::WebMercator.is_geographic());
        assert!(!Crs::canada_lambert().is_geographic());
    }
}
