use mapgeom::{Bounds, Crs};

// Where an axes box sits in a figure by default, as fractions of the figure measured from the
// bottom-left.
const SUBPLOT_LEFT: f64 = 0.125;
const SUBPLOT_RIGHT: f64 = 0.9;
const SUBPLOT_BOTTOM: f64 = 0.11;
const SUBPLOT_TOP: f64 = 0.88;

/// Data is padded by this fraction of its extent on every side.
pub const DATA_MARGIN: f64 = 0.05;

/// Maps coordinates in the map's CRS to canvas pixels. The plot box starts as the default subplot
/// area and shrinks around its center so that one unit of x and one unit of y (scaled by
/// `aspect`) cover the same number of pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    data: Bounds,
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
    // Pixels per data unit along x. y uses `scale * aspect`.
    scale: f64,
    aspect: f64,
}

impl Viewport {
    /// `data` is the exact extent to show, margins included.
    pub fn new(data: Bounds, aspect: f64, width_px: u32, height_px: u32) -> Viewport {
        let fig_w = f64::from(width_px);
        let fig_h = f64::from(height_px);
        let box_left = SUBPLOT_LEFT * fig_w;
        let box_right = SUBPLOT_RIGHT * fig_w;
        let box_top = (1.0 - SUBPLOT_TOP) * fig_h;
        let box_bottom = (1.0 - SUBPLOT_BOTTOM) * fig_h;
        let box_w = box_right - box_left;
        let box_h = box_bottom - box_top;

        let scale = (box_w / data.width()).min(box_h / (data.height() * aspect));
        let w = data.width() * scale;
        let h = data.height() * aspect * scale;
        let left = box_left + (box_w - w) / 2.0;
        let top = box_top + (box_h - h) / 2.0;

        Viewport {
            data,
            left,
            top,
            right: left + w,
            bottom: top + h,
            scale,
            aspect,
        }
    }

    /// Pad the data's bounds and pick the aspect for a CRS. Geographic CRSs stretch latitude by
    /// `1 / cos(mid-latitude)` so shapes look roughly right.
    pub fn fit(bounds: &Bounds, crs: &Crs, width_px: u32, height_px: u32) -> Viewport {
        let fallback = if crs.is_geographic() { 0.01 } else { 1.0 };
        let data = bounds.padded(DATA_MARGIN, fallback);
        let aspect = if crs.is_geographic() {
            let cos = data.center().1.to_radians().cos();
            if cos > 1e-6 {
                1.0 / cos
            } else {
                1.0
            }
        } else {
            1.0
        };
        Viewport::new(data, aspect, width_px, height_px)
    }

    pub fn data_bounds(&self) -> &Bounds {
        &self.data
    }

    pub fn to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.left + (x - self.data.min_x) * self.scale,
            self.bottom - (y - self.data.min_y) * self.scale * self.aspect,
        )
    }

    pub fn to_data(&self, px: f64, py: f64) -> (f64, f64) {
        (
            self.data.min_x + (px - self.left) / self.scale,
            self.data.min_y + (self.bottom - py) / (self.scale * self.aspect),
        )
    }

    /// The plot box in pixels: left, top, right, bottom.
    pub fn plot_box(&self) -> (f64, f64, f64, f64) {
        (self.left, self.top, self.right, self.bottom)
    }
}
