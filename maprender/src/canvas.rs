use std::path::Path;

use geo::{Coordinate, Geometry, LineString, Polygon};
use image::{ImageFormat, RgbImage};
use tiny_skia::{FillRule, Paint, Path as SkiaPath, PathBuilder, Pixmap, Rect, Stroke, Transform};

use roadutil::{Error, Result};

use crate::{text, Color, Viewport};

/// How to draw one layer. Polygons use both; lines use only the stroke; points are dots in the
/// stroke color.
#[derive(Clone, Copy, Debug)]
pub struct Style {
    pub fill: Option<Color>,
    pub stroke: Option<(Color, f32)>,
}

/// An owned raster, plus the transform from map coordinates onto it.
pub struct Canvas {
    pixmap: Pixmap,
    viewport: Viewport,
    dpi: f64,
}

impl Canvas {
    /// A blank white canvas.
    pub fn new(width_px: u32, height_px: u32, dpi: f64, viewport: Viewport) -> Result<Canvas> {
        let mut pixmap = Pixmap::new(width_px, height_px).ok_or_else(|| {
            Error::render(format!("can't allocate a {}x{} canvas", width_px, height_px))
        })?;
        pixmap.fill(Color::WHITE.to_skia());
        Ok(Canvas {
            pixmap,
            viewport,
            dpi,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn points_to_pixels(&self, points: f64) -> f32 {
        (points * self.dpi / 72.0) as f32
    }

    pub fn text_scale(&self, points: f64) -> u32 {
        text::text_scale(points, self.dpi)
    }

    /// Premultiplied RGBA bytes, row by row.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_mut()
    }

    pub fn draw_geometry(&mut self, geom: &Geometry<f64>, style: &Style) {
        match geom {
            Geometry::Point(pt) => self.draw_dot(pt.0, style),
            Geometry::MultiPoint(mp) => {
                for pt in &mp.0 {
                    self.draw_dot(pt.0, style);
                }
            }
            Geometry::Line(line) => {
                self.draw_line_string(&LineString(vec![line.start, line.end]), style)
            }
            Geometry::LineString(ls) => self.draw_line_string(ls, style),
            Geometry::MultiLineString(mls) => {
                for ls in &mls.0 {
                    self.draw_line_string(ls, style);
                }
            }
            Geometry::Polygon(poly) => self.draw_polygon(poly, style),
            Geometry::MultiPolygon(mp) => {
                for poly in &mp.0 {
                    self.draw_polygon(poly, style);
                }
            }
            Geometry::Rect(rect) => self.draw_polygon(&rect.to_polygon(), style),
            Geometry::Triangle(tri) => self.draw_polygon(&tri.to_polygon(), style),
            Geometry::GeometryCollection(gc) => {
                for g in &gc.0 {
                    self.draw_geometry(g, style);
                }
            }
        }
    }

    fn draw_dot(&mut self, pt: Coordinate<f64>, style: &Style) {
        let (color, width) = match style.stroke {
            Some(stroke) => stroke,
            None => return,
        };
        let (x, y) = self.viewport.to_screen(pt.x, pt.y);
        if let Some(path) = PathBuilder::from_circle(x as f32, y as f32, width.max(1.0)) {
            self.pixmap.fill_path(
                &path,
                &paint(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn draw_line_string(&mut self, ls: &LineString<f64>, style: &Style) {
        let (color, width) = match style.stroke {
            Some(stroke) => stroke,
            None => return,
        };
        let mut pb = PathBuilder::new();
        self.append_ring(&mut pb, ls, false);
        if let Some(path) = pb.finish() {
            self.stroke(&path, color, width);
        }
    }

    fn draw_polygon(&mut self, poly: &Polygon<f64>, style: &Style) {
        let mut pb = PathBuilder::new();
        self.append_ring(&mut pb, poly.exterior(), true);
        for ring in poly.interiors() {
            self.append_ring(&mut pb, ring, true);
        }
        let path = match pb.finish() {
            Some(path) => path,
            None => return,
        };
        if let Some(fill) = style.fill {
            self.pixmap.fill_path(
                &path,
                &paint(fill),
                FillRule::EvenOdd,
                Transform::identity(),
                None,
            );
        }
        if let Some((color, width)) = style.stroke {
            self.stroke(&path, color, width);
        }
    }

    fn append_ring(&self, pb: &mut PathBuilder, ring: &LineString<f64>, close: bool) {
        for (idx, c) in ring.0.iter().enumerate() {
            let (x, y) = self.viewport.to_screen(c.x, c.y);
            if idx == 0 {
                pb.move_to(x as f32, y as f32);
            } else {
                pb.line_to(x as f32, y as f32);
            }
        }
        if close && ring.0.len() > 2 {
            pb.close();
        }
    }

    fn stroke(&mut self, path: &SkiaPath, color: Color, width: f32) {
        let stroke = Stroke {
            width,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(path, &paint(color), &stroke, Transform::identity(), None);
    }

    /// A straight segment in pixel coordinates.
    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, width: f32) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.0, from.1);
        pb.line_to(to.0, to.1);
        if let Some(path) = pb.finish() {
            self.stroke(&path, color, width);
        }
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        if let Some(rect) = Rect::from_xywh(x, y, w, h) {
            self.pixmap
                .fill_rect(rect, &paint(color), Transform::identity(), None);
        }
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color, width: f32) {
        if let Some(rect) = Rect::from_xywh(x, y, w, h) {
            let path = PathBuilder::from_rect(rect);
            self.stroke(&path, color, width);
        }
    }

    /// Text with its top-left corner at a pixel.
    pub fn text(&mut self, x: f32, y: f32, text: &str, color: Color, scale: u32) {
        text::draw_text(&mut self.pixmap, x, y, text, color, scale);
    }

    /// Flatten onto RGB. The canvas starts opaque, so nothing is lost.
    pub fn to_rgb_image(&self) -> RgbImage {
        let width = self.pixmap.width();
        RgbImage::from_fn(width, self.pixmap.height(), |x, y| {
            let idx = ((y * width + x) * 4) as usize;
            let data = self.pixmap.data();
            image::Rgb([data[idx], data[idx + 1], data[idx + 2]])
        })
    }

    /// Encode to a file, picking the format from the extension. Unknown or unsupported
    /// extensions are written as PNG.
    pub fn save(&self, path: &Path) -> Result<()> {
        let format = match ImageFormat::from_path(path) {
            Ok(ImageFormat::Png) => ImageFormat::Png,
            Ok(ImageFormat::Jpeg) => ImageFormat::Jpeg,
            _ => {
                warn!("{} doesn't name a supported format, writing PNG", path.display());
                ImageFormat::Png
            }
        };
        self.to_rgb_image()
            .save_with_format(path, format)
            .map_err(|err| match err {
                image::ImageError::IoError(err) => Error::Io(err),
                err => Error::render(format!("can't encode {}: {}", path.display(), err)),
            })
    }
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = true;
    paint
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, polygon};
    use mapgeom::Bounds;

    fn canvas() -> Canvas {
        let viewport = Viewport::new(Bounds::from_corners(0.0, 0.0, 10.0, 10.0), 1.0, 200, 200);
        Canvas::new(200, 200, 100.0, viewport).unwrap()
    }

    fn pixel(canvas: &Canvas, x: f64, y: f64) -> [u8; 3] {
        let (px, py) = canvas.viewport().to_screen(x, y);
        canvas.to_rgb_image().get_pixel(px as u32, py as u32).0
    }

    #[test]
    fn starts_white() {
        let c = canvas();
        assert_eq!(pixel(&c, 5.0, 5.0), [255, 255, 255]);
    }

    #[test]
    fn filled_polygon_with_a_hole() {
        let mut c = canvas();
        let poly: Geometry<f64> = polygon!(
            exterior: [(x: 1.0, y: 1.0), (x: 9.0, y: 1.0), (x: 9.0, y: 9.0), (x: 1.0, y: 9.0)],
            interiors: [[(x: 4.0, y: 4.0), (x: 6.0, y: 4.0), (x: 6.0, y: 6.0), (x: 4.0, y: 6.0)]],
        )
        .into();
        c.draw_geometry(
            &poly,
            &Style {
                fill: Some(Color::rgb(255, 0, 0)),
                stroke: None,
            },
        );
        assert_eq!(pixel(&c, 2.0, 2.0), [255, 0, 0]);
        assert_eq!(pixel(&c, 5.0, 5.0), [255, 255, 255]);
        assert_eq!(pixel(&c, 0.5, 0.5), [255, 255, 255]);
    }

    #[test]
    fn half_transparent_white_over_black() {
        let mut c = canvas();
        c.fill_rect(0.0, 0.0, 200.0, 200.0, Color::BLACK);
        let poly: Geometry<f64> =
            polygon![(x: 1.0, y: 1.0), (x: 9.0, y: 1.0), (x: 9.0, y: 9.0), (x: 1.0, y: 9.0)].into();
        c.draw_geometry(
            &poly,
            &Style {
                fill: Some(Color::WHITE.alpha(0.5)),
                stroke: None,
            },
        );
        let [r, g, b] = pixel(&c, 5.0, 5.0);
        assert!((126..=129).contains(&r), "{}", r);
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn lines_are_stroked_not_filled() {
        let mut c = canvas();
        let line: Geometry<f64> =
            line_string![(x: 1.0, y: 5.0), (x: 9.0, y: 5.0), (x: 9.0, y: 9.0)].into();
        c.draw_geometry(
            &line,
            &Style {
                fill: None,
                stroke: Some((Color::rgb(0, 0, 255), 3.0)),
            },
        );
        assert_eq!(pixel(&c, 5.0, 5.0), [0, 0, 255]);
        // The triangle the line would enclose stays empty
        assert_eq!(pixel(&c, 8.0, 6.0), [255, 255, 255]);
    }

    #[test]
    fn save_picks_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let c = canvas();
        for name in ["map.png", "map.jpg", "map.weird"] {
            let path = dir.path().join(name);
            c.save(&path).unwrap();
            let bytes = fs_err::read(&path).unwrap();
            let img = image::load_from_memory(&bytes).unwrap();
            assert_eq!((img.width(), img.height()), (200, 200));
        }
        let bytes = fs_err::read(dir.path().join("map.weird")).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        let bytes = fs_err::read(dir.path().join("map.jpg")).unwrap();
        assert_eq!(&bytes[0..2], &[0xff, 0xd8]);
    }

    #[test]
    fn save_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("map.png");
        assert!(matches!(canvas().save(&path), Err(Error::Io(_))));
    }
}
