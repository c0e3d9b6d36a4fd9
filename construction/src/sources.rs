//! Where the raw data comes from.

/// City of Ottawa ward boundaries, used as the backdrop of every map.
pub const OTTAWA_BOUNDARIES: &str =
    "https://opendata.arcgis.com/datasets/845bbfdb73944694b3b81c5636be46b5_0.geojson";

/// Planned road construction, refreshed by the city as plans change.
pub const ROAD_CONSTRUCTION: &str =
    "https://opendata.arcgis.com/datasets/d2fe8f7e3cf24615b62dfc954b5c26b9_0.geojson";
