//! The City of Ottawa publishes planned road construction as GeoJSON. This crate turns a raw
//! snapshot of it into the layers that get mapped: it cleans out incomplete records, keeps just
//! the road work, and splits that by how soon the work is expected to start.

#[macro_use]
extern crate log;

mod clean;
mod horizon;
pub mod sources;

pub use crate::clean::{clean, roads, DROPPED_COLUMNS, REQUIRED_COLUMNS};
pub use crate::horizon::Horizon;

/// The attribute classifying each record: `RD_RESURF`, `SW_WATERMAIN`, etc.
pub const FEATURE_TYPE: &str = "FEATURE_TYPE";
/// Planning status. `NOTAVAIL` marks records the city hasn't published details for.
pub const STATUS: &str = "STATUS";
/// Free text describing when work should start: "This year", "1 - 2 years", ...
pub const TARGETED_START: &str = "TARGETED_START";
