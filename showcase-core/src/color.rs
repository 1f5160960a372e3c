/// sRGB swatch colors and their linear-space conversion
use serde::{Deserialize, Serialize};

/// A 24-bit sRGB color as written in hex (`0xRRGGBB`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SrgbColor(pub u32);

impl SrgbColor {
    pub fn channels(self) -> [f32; 3] {
        let r = (self.0 >> 16) & 0xff;
        let g = (self.0 >> 8) & 0xff;
        let b = self.0 & 0xff;
        [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]
    }

    pub fn to_linear(self) -> LinearColor {
        let [r, g, b] = self.channels();
        LinearColor {
            r: srgb_to_linear(r),
            g: srgb_to_linear(g),
            b: srgb_to_linear(b),
        }
    }
}

/// Linear-light RGB, what materials are shaded with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl LinearColor {
    pub const WHITE: LinearColor = LinearColor {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Relative luminance (Rec. 709 weights)
    pub fn luminance(&self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

/// The swatch buttons offered in customize mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Swatch {
    Black,
    Red,
    Yellow,
}

impl Swatch {
    pub const ALL: [Swatch; 3] = [Swatch::Black, Swatch::Red, Swatch::Yellow];

    pub fn selector(self) -> &'static str {
        match self {
            Swatch::Black => ".button--colors.black",
            Swatch::Red => ".button--colors.red",
            Swatch::Yellow => ".button--colors.yellow",
        }
    }

    pub fn default_color(self) -> SrgbColor {
        match self {
            Swatch::Black => SrgbColor(0x383830),
            Swatch::Red => SrgbColor(0x1e2d2d),
            Swatch::Yellow => SrgbColor(0xffffff),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_and_black_are_fixed_points() {
        let white = SrgbColor(0xffffff).to_linear();
        assert!((white.luminance() - LinearColor::WHITE.luminance()).abs() < 1e-5);
        let black = SrgbColor(0x000000).to_linear();
        assert_eq!(black.r, 0.0);
        assert_eq!(black.luminance(), 0.0);
    }

    #[test]
    fn test_mid_grey_conversion() {
        // sRGB 0x80 is ~21.6% linear
        let grey = SrgbColor(0x808080).to_linear();
        assert!((grey.r - 0.2159).abs() < 1e-3);
        assert_eq!(grey.r, grey.g);
        assert_eq!(grey.g, grey.b);
    }

    #[test]
    fn test_low_values_use_linear_segment() {
        let dark = SrgbColor(0x010000).to_linear();
        assert!((dark.r - (1.0 / 255.0) / 12.92).abs() < 1e-7);
    }

    #[test]
    fn test_swatch_channels() {
        let [r, g, b] = Swatch::Black.default_color().channels();
        assert!((r - 0x38 as f32 / 255.0).abs() < 1e-6);
        assert!((g - 0x38 as f32 / 255.0).abs() < 1e-6);
        assert!((b - 0x30 as f32 / 255.0).abs() < 1e-6);
    }
}
