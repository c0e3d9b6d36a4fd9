use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use roadutil::{Error, Result};

use crate::LonLat;

const MAX_INVERSE_ITERATIONS: usize = 15;
const INVERSE_TOLERANCE: f64 = 1e-12;

/// A reference ellipsoid, given by its semi-major axis in meters and its inverse flattening.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipsoid {
    pub semi_major_axis: f64,
    pub inverse_flattening: f64,
}

impl Ellipsoid {
    pub const GRS80: Ellipsoid = Ellipsoid {
        semi_major_axis: 6_378_137.0,
        inverse_flattening: 298.257_222_101,
    };

    pub fn eccentricity(&self) -> f64 {
        let f = 1.0 / self.inverse_flattening;
        (2.0 * f - f * f).sqrt()
    }

    /// Radius of curvature in the prime vertical at a latitude, in meters.
    pub fn prime_vertical_radius(&self, lat_degrees: f64) -> f64 {
        let e = self.eccentricity();
        let sin = lat_degrees.to_radians().sin();
        self.semi_major_axis / (1.0 - e * e * sin * sin).sqrt()
    }
}

/// Ellipsoidal Lambert Conformal Conic with two standard parallels. Distances along the standard
/// parallels are true, and distortion stays small in the band between them, which makes it the
/// usual choice for measuring lengths across a mid-latitude region.
///
/// All angles are stored in degrees; the cone constants are derived once in `new`.
#[derive(Clone, Debug, PartialEq)]
pub struct LambertConformalConic {
    pub ellipsoid: Ellipsoid,
    pub standard_parallel_1: f64,
    pub standard_parallel_2: f64,
    pub latitude_of_origin: f64,
    pub central_meridian: f64,
    pub false_easting: f64,
    pub false_northing: f64,

    e: f64,
    n: f64,
    f: f64,
    rho0: f64,
}

impl LambertConformalConic {
    pub fn new(
        ellipsoid: Ellipsoid,
        standard_parallel_1: f64,
        standard_parallel_2: f64,
        latitude_of_origin: f64,
        central_meridian: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Result<LambertConformalConic> {
        let e = ellipsoid.eccentricity();
        let phi1 = standard_parallel_1.to_radians();
        let phi2 = standard_parallel_2.to_radians();

        if (phi1 + phi2).abs() < 1e-10 {
            return Err(Error::crs(format!(
                "Lambert conformal conic needs standard parallels off the equator's mirror, got \
                 {} and {}",
                standard_parallel_1, standard_parallel_2
            )));
        }

        let m1 = m(phi1, e);
        let m2 = m(phi2, e);
        let t1 = t(phi1, e);
        let t2 = t(phi2, e);
        let n = if (phi1 - phi2).abs() < 1e-10 {
            phi1.sin()
        } else {
            (m1.ln() - m2.ln()) / (t1.ln() - t2.ln())
        };
        let f = m1 / (n * t1.powf(n));
        let rho0 = ellipsoid.semi_major_axis * f * t(latitude_of_origin.to_radians(), e).powf(n);
        if !n.is_finite() || !f.is_finite() || !rho0.is_finite() {
            return Err(Error::crs(format!(
                "Lambert conformal conic with parallels {}/{} and origin {} is degenerate",
                standard_parallel_1, standard_parallel_2, latitude_of_origin
            )));
        }

        Ok(LambertConformalConic {
            ellipsoid,
            standard_parallel_1,
            standard_parallel_2,
            latitude_of_origin,
            central_meridian,
            false_easting,
            false_northing,
            e,
            n,
            f,
            rho0,
        })
    }

    /// Canada Lambert Conformal Conic, ESRI:102002. NAD83 uses the GRS80 ellipsoid.
    pub fn canada() -> LambertConformalConic {
        LambertConformalConic::new(Ellipsoid::GRS80, 50.0, 70.0, 40.0, -96.0, 0.0, 0.0)
            .expect("Canada Lambert parameters are valid")
    }

    pub fn forward(&self, pt: LonLat) -> Result<geo::Coordinate<f64>> {
        if !pt.is_valid() {
            return Err(Error::crs(format!("{} can't be projected", pt)));
        }
        // The pole opposite the cone's apex maps to infinity
        if (pt.latitude + 90.0 * self.n.signum()).abs() < 1e-10 {
            return Err(Error::crs(format!(
                "{} is outside the domain of the Lambert conformal conic projection",
                pt
            )));
        }
        let phi = pt.latitude.to_radians();
        let tt = t(phi, self.e);
        let rho = self.ellipsoid.semi_major_axis * self.f * tt.powf(self.n);
        let theta = self.n * normalize_longitude(pt.longitude - self.central_meridian).to_radians();
        let x = self.false_easting + rho * theta.sin();
        let y = self.false_northing + self.rho0 - rho * theta.cos();
        if !x.is_finite() || !y.is_finite() {
            return Err(Error::crs(format!(
                "{} is outside the domain of the Lambert conformal conic projection",
                pt
            )));
        }
        Ok(geo::Coordinate { x, y })
    }

    pub fn inverse(&self, c: geo::Coordinate<f64>) -> Result<LonLat> {
        if !c.x.is_finite() || !c.y.is_finite() {
            return Err(Error::crs(format!("({}, {}) can't be unprojected", c.x, c.y)));
        }
        let dx = c.x - self.false_easting;
        let dy = self.rho0 - (c.y - self.false_northing);
        let sign = self.n.signum();
        let rho = sign * (dx * dx + dy * dy).sqrt();
        let theta = (sign * dx).atan2(sign * dy);

        let latitude = if rho == 0.0 {
            sign * FRAC_PI_2
        } else {
            let tt = (rho / (self.ellipsoid.semi_major_axis * self.f)).powf(1.0 / self.n);
            let mut phi = FRAC_PI_2 - 2.0 * tt.atan();
            let mut converged = false;
            for _ in 0..MAX_INVERSE_ITERATIONS {
                let es = self.e * phi.sin();
                let next =
                    FRAC_PI_2 - 2.0 * (tt * ((1.0 - es) / (1.0 + es)).powf(self.e / 2.0)).atan();
                let delta = (next - phi).abs();
                phi = next;
                if delta < INVERSE_TOLERANCE {
                    converged = true;
                    break;
                }
            }
            if !converged {
                return Err(Error::crs(format!(
                    "inverse Lambert conformal conic didn't converge for ({}, {})",
                    c.x, c.y
                )));
            }
            phi
        };
        let longitude = theta / self.n + self.central_meridian.to_radians();

        let pt = LonLat::new(
            normalize_longitude(longitude.to_degrees()),
            latitude.to_degrees(),
        );
        if !pt.is_valid() {
            return Err(Error::crs(format!(
                "({}, {}) is outside the domain of the Lambert conformal conic projection",
                c.x, c.y
            )));
        }
        Ok(pt)
    }

    /// A PROJ-style description, for logs and `Display`.
    pub fn describe(&self) -> String {
        format!(
            "+proj=lcc +lat_1={} +lat_2={} +lat_0={} +lon_0={} +x_0={} +y_0={} +a={} +rf={}",
            self.standard_parallel_1,
            self.standard_parallel_2,
            self.latitude_of_origin,
            self.central_meridian,
            self.false_easting,
            self.false_northing,
            self.ellipsoid.semi_major_axis,
            self.ellipsoid.inverse_flattening
        )
    }
}

fn m(phi: f64, e: f64) -> f64 {
    let es = e * phi.sin();
    phi.cos() / (1.0 - es * es).sqrt()
}

fn t(phi: f64, e: f64) -> f64 {
    let es = e * phi.sin();
    (FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - es) / (1.0 + es)).powf(e / 2.0)
}

/// Wrap into [-180, 180).
fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to exactly 360
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}
