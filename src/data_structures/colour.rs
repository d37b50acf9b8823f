//! RGBA colours and the named palette used by the demo scene.
//!
//! The named constants mirror the classic libGDX colour table so the house
//! model keeps the look it was authored with.

use serde::{Deserialize, Serialize};

/// An RGBA colour with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Colour {
    pub const WHITE: Colour = Colour::rgba8888(0xffffffff);
    pub const BROWN: Colour = Colour::rgba8888(0x8b4513ff);
    pub const TAN: Colour = Colour::rgba8888(0xd2b48cff);
    pub const FIREBRICK: Colour = Colour::rgba8888(0xb22222ff);
    pub const FOREST: Colour = Colour::rgba8888(0x228b22ff);
    pub const YELLOW: Colour = Colour::rgba8888(0xffff00ff);
    pub const DARK_GRAY: Colour = Colour::rgba8888(0x3f3f3fff);
    pub const GREEN: Colour = Colour::rgba8888(0x00ff00ff);
    pub const SKY: Colour = Colour::rgba8888(0x87ceebff);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Unpack a `0xRRGGBBAA` value.
    pub const fn rgba8888(value: u32) -> Self {
        Self {
            r: ((value >> 24) & 0xff) as f32 / 255.0,
            g: ((value >> 16) & 0xff) as f32 / 255.0,
            b: ((value >> 8) & 0xff) as f32 / 255.0,
            a: (value & 0xff) as f32 / 255.0,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

impl Default for Colour {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[f32; 3]> for Colour {
    fn from([r, g, b]: [f32; 3]) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpacks_rgba8888() {
        let c = Colour::rgba8888(0xff000080);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert_eq!(c.b, 0.0);
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn sky_matches_named_table() {
        let sky = Colour::SKY;
        assert!((sky.r - 0x87 as f32 / 255.0).abs() < 1e-6);
        assert!((sky.g - 0xce as f32 / 255.0).abs() < 1e-6);
        assert!((sky.b - 0xeb as f32 / 255.0).abs() < 1e-6);
        assert_eq!(sky.a, 1.0);
    }

    #[test]
    fn wgpu_conversion_keeps_components() {
        let c = Colour::new(0.25, 0.5, 0.75, 1.0).to_wgpu();
        assert_eq!(c.r, 0.25);
        assert_eq!(c.g, 0.5);
        assert_eq!(c.b, 0.75);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn rgb_array_is_opaque() {
        let c: Colour = [0.1, 0.2, 0.3].into();
        assert_eq!(c.to_array(), [0.1, 0.2, 0.3, 1.0]);
    }
}
