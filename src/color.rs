//! BGR color values used by the drawing and compositing wrappers.

use opencv::core::Scalar;

/// A color in OpenCV's native BGR channel order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Color {
    pub b: u8,
    pub g: u8,
    pub r: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLUE: Color = Color::new(255, 0, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const RED: Color = Color::new(0, 0, 255);
    pub const YELLOW: Color = Color::new(0, 255, 255);

    /// Creates a color from BGR components.
    pub const fn new(b: u8, g: u8, r: u8) -> Self {
        Color { b, g, r }
    }

    /// Converts into the scalar form OpenCV drawing calls expect.
    pub fn to_scalar(self) -> Scalar {
        Scalar::new(f64::from(self.b), f64::from(self.g), f64::from(self.r), 0.0)
    }

    /// Hex representation in RGB reading order, e.g. `#ff0080`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Color {
    /// Interprets the tuple as `(b, g, r)`, matching OpenCV conventions.
    fn from((b, g, r): (u8, u8, u8)) -> Self {
        Color::new(b, g, r)
    }
}
