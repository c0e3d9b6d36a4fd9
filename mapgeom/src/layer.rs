use std::collections::BTreeSet;
use std::convert::TryFrom;

use geo::Geometry;
use geojson::GeoJson;
use serde_json::{Map, Value};

use roadutil::{Error, Result};

use crate::{is_empty, planar_length, reproject, Bounds, Crs};

/// One record of a layer: an optional geometry plus its attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    pub geometry: Option<Geometry<f64>>,
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new<G: Into<Geometry<f64>>>(geometry: G) -> Feature {
        Feature {
            geometry: Some(geometry.into()),
            properties: Map::new(),
        }
    }

    /// Builder-style helper to attach a string attribute.
    pub fn with<I: Into<String>>(mut self, key: &str, value: I) -> Feature {
        self.properties
            .insert(key.to_string(), Value::String(value.into()));
        self
    }

    /// True when the attribute is missing or explicitly null.
    pub fn is_null(&self, key: &str) -> bool {
        matches!(self.properties.get(key), None | Some(Value::Null))
    }

    /// The string value of an attribute. Missing and null attributes are `None`; any other
    /// non-string value is a schema error.
    pub fn get_str(&self, key: &str) -> Result<Option<&str>> {
        match self.properties.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(x) => Err(Error::schema(format!(
                "{} should be a string, but it's {}",
                key, x
            ))),
        }
    }

    /// Like `get_str`, but the attribute must be present.
    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.get_str(key)?
            .ok_or_else(|| Error::schema(format!("a feature is missing {}", key)))
    }

    /// A feature with no geometry, or a geometry with no coordinates.
    pub fn is_empty(&self) -> bool {
        match self.geometry {
            Some(ref geom) => is_empty(geom),
            None => true,
        }
    }
}

/// A collection of features sharing one coordinate reference system. `crs` is `None` when the
/// source didn't say and nobody assigned one.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub crs: Option<Crs>,
    pub features: Vec<Feature>,
}

impl Layer {
    pub fn new(crs: Option<Crs>, features: Vec<Feature>) -> Layer {
        Layer { crs, features }
    }

    /// Parse a GeoJSON FeatureCollection, Feature, or bare Geometry. The CRS comes from a legacy
    /// `crs` member if present; otherwise it's longitude/latitude, as RFC 7946 requires.
    pub fn from_geojson_str(raw: &str) -> Result<Layer> {
        let geojson = raw
            .parse::<GeoJson>()
            .map_err(|err| Error::schema(format!("invalid GeoJSON: {}", err)))?;
        let (members, raw_features) = match geojson {
            GeoJson::FeatureCollection(collection) => {
                (collection.foreign_members, collection.features)
            }
            GeoJson::Feature(feature) => (feature.foreign_members.clone(), vec![feature]),
            GeoJson::Geometry(geometry) => (
                geometry.foreign_members.clone(),
                vec![geojson::Feature {
                    bbox: None,
                    geometry: Some(geometry),
                    id: None,
                    properties: None,
                    foreign_members: None,
                }],
            ),
        };

        let crs = match members.as_ref().and_then(|m| m.get("crs")) {
            Some(value) => parse_crs_member(value)?,
            None => Crs::Wgs84,
        };

        let mut features = Vec::with_capacity(raw_features.len());
        for feature in raw_features {
            let geometry = match feature.geometry {
                Some(geometry) => Some(Geometry::<f64>::try_from(geometry.value).map_err(
                    |err| Error::schema(format!("unsupported GeoJSON geometry: {}", err)),
                )?),
                None => None,
            };
            features.push(Feature {
                geometry,
                properties: feature.properties.unwrap_or_default(),
            });
        }
        debug!("Parsed {} features in {}", features.len(), crs);

        Ok(Layer {
            crs: Some(crs),
            features,
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Every attribute name used by any feature. A feature lacking one of these has a null value
    /// for it.
    pub fn columns(&self) -> BTreeSet<String> {
        self.features
            .iter()
            .flat_map(|f| f.properties.keys().cloned())
            .collect()
    }

    /// Remove an attribute from every feature.
    pub fn drop_column(&mut self, column: &str) {
        for f in &mut self.features {
            f.properties.remove(column);
        }
    }

    /// Keep only the features matching a predicate.
    pub fn filter<F: FnMut(&Feature) -> bool>(&self, mut keep: F) -> Layer {
        Layer {
            crs: self.crs.clone(),
            features: self
                .features
                .iter()
                .filter(|f| keep(f))
                .cloned()
                .collect(),
        }
    }

    /// Like `filter`, but the predicate can fail, and the first failure wins.
    pub fn try_filter<F: FnMut(&Feature) -> Result<bool>>(&self, mut keep: F) -> Result<Layer> {
        let mut features = Vec::new();
        for f in &self.features {
            if keep(f)? {
                features.push(f.clone());
            }
        }
        Ok(Layer {
            crs: self.crs.clone(),
            features,
        })
    }

    pub fn require_crs(&self) -> Result<&Crs> {
        self.crs
            .as_ref()
            .ok_or_else(|| Error::crs("the layer has no coordinate reference system"))
    }

    /// Transform every geometry into another CRS. Fails if this layer has no CRS.
    pub fn to_crs(&self, to: &Crs) -> Result<Layer> {
        let from = self.require_crs()?;
        let mut features = Vec::with_capacity(self.features.len());
        for f in &self.features {
            features.push(Feature {
                geometry: match f.geometry {
                    Some(ref geom) => Some(reproject(geom, from, to)?),
                    None => None,
                },
                properties: f.properties.clone(),
            });
        }
        Ok(Layer {
            crs: Some(to.clone()),
            features,
        })
    }

    /// The box around every geometry, or None if there aren't any coordinates.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut bounds = Bounds::new();
        for geom in self.geometries() {
            if let Some(b) = Bounds::from_geometry(geom) {
                bounds.union(&b);
            }
        }
        if bounds.is_empty() {
            None
        } else {
            Some(bounds)
        }
    }

    pub fn geometries(&self) -> impl Iterator<Item = &Geometry<f64>> {
        self.features.iter().filter_map(|f| f.geometry.as_ref())
    }

    /// Sum of the planar length of every geometry, in the units of the layer's CRS. Refuses to
    /// measure degrees.
    pub fn total_length(&self) -> Result<f64> {
        let crs = self.require_crs()?;
        if crs.is_geographic() {
            return Err(Error::crs(format!(
                "can't measure lengths in {}; reproject to a projected CRS first",
                crs
            )));
        }
        Ok(self
            .geometries()
            .map(planar_length)
            .fold(0.0, |acc, l| acc + l))
    }

    /// The distinct string values of an attribute, sorted. Every feature must have one.
    pub fn categories(&self, column: &str) -> Result<BTreeSet<String>> {
        let mut result = BTreeSet::new();
        for f in &self.features {
            result.insert(f.require_str(column)?.to_string());
        }
        Ok(result)
    }
}

/// Legacy GeoJSON (2008) names the CRS in a foreign member, usually
/// `{"type": "name", "properties": {"name": "urn:ogc:def:crs:OGC:1.3:CRS84"}}`.
fn parse_crs_member(value: &Value) -> Result<Crs> {
    let props = value.get("properties");
    match value.get("type").and_then(Value::as_str) {
        Some("name") => match props.and_then(|p| p.get("name")).and_then(Value::as_str) {
            Some(name) => Crs::parse(name),
            None => Err(Error::crs(format!("crs member without a name: {}", value))),
        },
        Some("EPSG") => match props.and_then(|p| p.get("code")).and_then(Value::as_u64) {
            Some(code) => Crs::parse(&format!("EPSG:{}", code)),
            None => Err(Error::crs(format!("crs member without a code: {}", value))),
        },
        _ => Err(Error::crs(format!("unsupported crs member: {}", value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;

    const SAMPLE: &str = r#"{
      "type": "FeatureCollection",
      "crs": { "type": "name", "properties": { "name": "urn:ogc:def:crs:OGC:1.3:CRS84" } },
      "features": [
        {
          "type": "Feature",
          "properties": { "FEATURE_TYPE": "RD_RESURF", "STATUS": "PLANNED" },
          "geometry": { "type": "LineString", "coordinates": [[-75.70, 45.42], [-75.69, 45.42]] }
        },
        {
          "type": "Feature",
          "properties": { "FEATURE_TYPE": "SW_WATERMAIN", "PROJECT_MANAGER": null },
          "geometry": null
        }
      ]
    }"#;

    #[test]
    fn parse_collection() {
        let layer = Layer::from_geojson_str(SAMPLE).unwrap();
        assert_eq!(layer.crs, Some(Crs::Wgs84));
        assert_eq!(layer.len(), 2);
        assert!(layer.features[1].geometry.is_none());
        assert!(layer.features[1].is_empty());
        assert!(layer.features[1].is_null("PROJECT_MANAGER"));
        assert!(layer.features[1].is_null("STATUS"));
        assert_eq!(
            layer.columns().into_iter().collect::<Vec<_>>(),
            vec!["FEATURE_TYPE", "PROJECT_MANAGER", "STATUS"]
        );
    }

    #[test]
    fn missing_crs_member_means_lon_lat() {
        let layer = Layer::from_geojson_str(
            r#"{"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [1, 2]}}"#,
        )
        .unwrap();
        assert_eq!(layer.crs, Some(Crs::Wgs84));
    }

    #[test]
    fn unknown_crs_member() {
        let err = Layer::from_geojson_str(
            r#"{"type": "FeatureCollection", "crs": {"type": "name", "properties": {"name": "EPSG:2154"}}, "features": []}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::CoordinateSystem(_)));
    }

    #[test]
    fn garbage_is_a_schema_error() {
        assert!(matches!(
            Layer::from_geojson_str("<html>503</html>"),
            Err(Error::DataSchema(_))
        ));
    }

    #[test]
    fn measuring_needs_a_projected_crs() {
        let line = Feature::new(line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 0.01)]);
        let degrees = Layer::new(Some(Crs::Wgs84), vec![line.clone()]);
        assert!(matches!(
            degrees.total_length(),
            Err(Error::CoordinateSystem(_))
        ));
        let unknown = Layer::new(None, vec![line]);
        assert!(matches!(
            unknown.to_crs(&Crs::canada_lambert()),
            Err(Error::CoordinateSystem(_))
        ));
    }

    #[test]
    fn projected_length_survives_identity_reprojection() {
        let lambert = Crs::canada_lambert();
        let layer = Layer::new(
            Some(lambert.clone()),
            vec![
                Feature::new(line_string![(x: 1_500_000.0, y: 850_000.0), (x: 1_500_300.0, y: 850_400.0)]),
                Feature::new(line_string![(x: 1_600_000.0, y: 860_000.0), (x: 1_601_234.5, y: 860_000.0)]),
            ],
        );
        let total = layer.to_crs(&lambert).unwrap().total_length().unwrap();
        assert!((total - 1734.5).abs() < 1e-9, "{}", total);
    }

    #[test]
    fn empty_layer_measures_positive_zero() {
        let total = Layer::new(Some(Crs::canada_lambert()), Vec::new())
            .total_length()
            .unwrap();
        assert!(total.is_sign_positive());
        assert_eq!(format!("{:.0}", total), "0");
    }

    #[test]
    fn projected_length_survives_a_round_trip_through_degrees() {
        let lambert = Crs::canada_lambert();
        let layer = Layer::new(
            Some(lambert.clone()),
            vec![Feature::new(line_string![(x: 1_500_000.0, y: 850_000.0), (x: 1_500_600.0, y: 850_800.0)])],
        );
        let degrees = layer.to_crs(&Crs::Wgs84).unwrap();
        let total = degrees.to_crs(&lambert).unwrap().total_length().unwrap();
        assert!((total - 1000.0).abs() < 1e-4, "{}", total);
    }

    #[test]
    fn categories_are_sorted_and_required() {
        let layer = Layer::new(
            Some(Crs::Wgs84),
            vec![
                Feature::new(geo::Point::new(0.0, 0.0)).with("FEATURE_TYPE", "RD_B"),
                Feature::new(geo::Point::new(0.0, 0.0)).with("FEATURE_TYPE", "RD_A"),
                Feature::new(geo::Point::new(0.0, 0.0)).with("FEATURE_TYPE", "RD_B"),
            ],
        );
        assert_eq!(
            layer.categories("FEATURE_TYPE").unwrap().into_iter().collect::<Vec<_>>(),
            vec!["RD_A", "RD_B"]
        );
        let mut missing = layer.clone();
        missing.features.push(Feature::new(geo::Point::new(1.0, 1.0)));
        assert!(matches!(
            missing.categories("FEATURE_TYPE"),
            Err(Error::DataSchema(_))
        ));
    }

    #[test]
    fn bounds_skip_missing_geometries() {
        let mut layer = Layer::new(
            Some(Crs::Wgs84),
            vec![Feature::new(line_string![(x: -1.0, y: 2.0), (x: 3.0, y: 4.0)])],
        );
        layer.features.push(Feature {
            geometry: None,
            properties: Map::new(),
        });
        assert_eq!(layer.bounds(), Some(Bounds::from_corners(-1.0, 2.0, 3.0, 4.0)));
        assert_eq!(Layer::new(None, Vec::new()).bounds(), None);
    }
}
