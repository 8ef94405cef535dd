//! 24-bit RGB colours addressed by hex value (`0xRRGGBB`).

use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color(u32);

impl Color {
    pub const WHITE: Color = Color::from_hex(0xff_ffff);
    pub const BLACK: Color = Color::from_hex(0x00_0000);

    #[inline]
    pub const fn from_hex(hex: u32) -> Self {
        Self(hex & 0x00ff_ffff)
    }

    #[inline]
    pub const fn hex(self) -> u32 {
        self.0
    }

    /// Channels in `[0, 1]`, gamma-encoded (as authored).
    pub fn to_srgb(self) -> [f32; 3] {
        let r = ((self.0 >> 16) & 0xff) as f32 / 255.0;
        let g = ((self.0 >> 8) & 0xff) as f32 / 255.0;
        let b = (self.0 & 0xff) as f32 / 255.0;
        [r, g, b]
    }

    /// Channels converted to linear light for shading.
    pub fn to_linear(self) -> [f32; 3] {
        self.to_srgb().map(srgb_to_linear)
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_masked_to_24_bits() {
        assert_eq!(Color::from_hex(0xab_ff0000).hex(), 0xff0000);
    }

    #[test]
    fn srgb_channels() {
        let [r, g, b] = Color::from_hex(0xff8000).to_srgb();
        assert_eq!(r, 1.0);
        assert!((g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(b, 0.0);
    }

    #[test]
    fn linear_keeps_endpoints() {
        assert_eq!(Color::WHITE.to_linear(), [1.0, 1.0, 1.0]);
        assert_eq!(Color::BLACK.to_linear(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn displays_as_css_hex() {
        assert_eq!(Color::from_hex(0x404040).to_string(), "#404040");
    }
}
