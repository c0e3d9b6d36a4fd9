//! Draws the road construction maps: a reference layer and colored features over web map tiles,
//! titled, with a legend and the total length of the features, saved as one image per call.

#[macro_use]
extern crate log;

mod basemap;
mod canvas;
mod color;
mod config;
mod legend;
mod renderer;
mod request;
mod text;
mod viewport;

pub use crate::basemap::{lonlat_extent, Basemap, HttpTileSource, TileSource};
pub use crate::canvas::{Canvas, Style};
pub use crate::color::{category_color, Color, TAB10};
pub use crate::config::{load_configuration, RenderConfig};
pub use crate::renderer::{MapRenderer, CATEGORY_COLUMN};
pub use crate::request::{annotation_text, display_title, RenderRequest, RenderedMap, TITLE_SUFFIX};
pub use crate::viewport::Viewport;
