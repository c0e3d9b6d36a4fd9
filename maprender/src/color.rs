use std::fmt;

/// An sRGB color with straight (not premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())?;
        if self.a < 1.0 {
            write!(f, " (alpha {})", self.a)?;
        }
        Ok(())
    }
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const LEGEND_EDGE: Color = Color::rgb(0xcc, 0xcc, 0xcc);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color::rgba(r, g, b, 1.0)
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Color {
        Color { r, g, b, a }
    }

    pub fn alpha(&self, a: f32) -> Color {
        Color::rgba(self.r, self.g, self.b, a)
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn to_skia(&self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(
            self.r,
            self.g,
            self.b,
            (self.a.max(0.0).min(1.0) * 255.0).round() as u8,
        )
    }
}

/// The 10-color qualitative palette categorical maps use by default.
pub const TAB10: [Color; 10] = [
    Color::rgb(0x1f, 0x77, 0xb4),
    Color::rgb(0xff, 0x7f, 0x0e),
    Color::rgb(0x2c, 0xa0, 0x2c),
    Color::rgb(0xd6, 0x27, 0x28),
    Color::rgb(0x94, 0x67, 0xbd),
    Color::rgb(0x8c, 0x56, 0x4b),
    Color::rgb(0xe3, 0x77, 0xc2),
    Color::rgb(0x7f, 0x7f, 0x7f),
    Color::rgb(0xbc, 0xbd, 0x22),
    Color::rgb(0x17, 0xbe, 0xcf),
];

/// The color of the `idx`th of `count` sorted categories. The category codes are normalized onto
/// [0, 1] and looked up in the palette, so two categories get the first and last colors rather
/// than the first two.
pub fn category_color(idx: usize, count: usize) -> Color {
    if count <= 1 {
        return TAB10[0];
    }
    let x = (idx as f64) / ((count - 1) as f64);
    let lut = ((x * TAB10.len() as f64) as usize).min(TAB10.len() - 1);
    TAB10[lut]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spread_over_the_palette() {
        assert_eq!(category_color(0, 1), TAB10[0]);
        assert_eq!(category_color(0, 2), TAB10[0]);
        assert_eq!(category_color(1, 2), TAB10[9]);
        assert_eq!(category_color(1, 3), TAB10[5]);
        let ten: Vec<Color> = (0..10).map(|i| category_color(i, 10)).collect();
        assert_eq!(ten[1], TAB10[1]);
        assert_eq!(ten[8], TAB10[8]);
        assert_eq!(ten[9], TAB10[9]);
    }

    #[test]
    fn hex_and_alpha() {
        assert_eq!(TAB10[0].to_hex(), "#1F77B4");
        assert_eq!(Color::WHITE.alpha(0.5).to_string(), "#FFFFFF (alpha 0.5)");
        assert_eq!(Color::BLACK.to_skia().alpha(), 1.0);
    }
}
