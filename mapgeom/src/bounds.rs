use std::f64;

use geo::BoundingRect;

/// An axis-aligned box in whatever units a layer's CRS uses.
#[derive(Clone, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// An empty box. Updating it with any point makes it non-empty.
    pub fn new() -> Bounds {
        Bounds {
            min_x: f64::MAX,
            min_y: f64::MAX,
            max_x: f64::MIN,
            max_y: f64::MIN,
        }
    }

    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Bounds {
        let mut b = Bounds::new();
        b.update(x1, y1);
        b.update(x2, y2);
        b
    }

    /// None for geometries without any coordinates.
    pub fn from_geometry(geom: &geo::Geometry<f64>) -> Option<Bounds> {
        let rect = geom.bounding_rect()?;
        Some(Bounds::from_corners(
            rect.min().x,
            rect.min().y,
            rect.max().x,
            rect.max().y,
        ))
    }

    pub fn update(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    pub fn union(&mut self, other: &Bounds) {
        if other.is_empty() {
            return;
        }
        self.update(other.min_x, other.min_y);
        self.update(other.max_x, other.max_y);
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Grow each side by a fraction of the box's size. Degenerate (zero-width or zero-height)
    /// sides grow by `fallback` instead, so a single point or a horizontal line still gets a box
    /// with area.
    pub fn padded(&self, fraction: f64, fallback: f64) -> Bounds {
        let dx = if self.width() > 0.0 {
            self.width() * fraction
        } else {
            fallback
        };
        let dy = if self.height() > 0.0 {
            self.height() * fraction
        } else {
            fallback
        };
        Bounds {
            min_x: self.min_x - dx,
            min_y: self.min_y - dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds::new()
    }
}
