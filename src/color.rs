/// Packed RGB565, the native format of the LED panel driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color(pub u16);

// Keeps three bits per channel (red 14-12, green 9-7, blue 4-2), dimming the color.
const SHADE_MASK: u16 = 0b0111_0011_1001_1100;

impl Color {
    pub const BLACK: Color = Color(0);

    /// Two-tone shading for walls hit on a horizontal grid boundary.
    #[inline]
    pub fn shaded(self) -> Color {
        Color(self.0 & SHADE_MASK)
    }

    /// Expand to 0RGB `u32` for a window surface. Low bits are replicated
    /// so full intensity stays at 255.
    #[inline]
    pub fn to_xrgb(self) -> u32 {
        let r5 = ((self.0 >> 11) & 0x1F) as u32;
        let g6 = ((self.0 >> 5) & 0x3F) as u32;
        let b5 = (self.0 & 0x1F) as u32;
        let r = (r5 << 3) | (r5 >> 2);
        let g = (g6 << 2) | (g6 >> 4);
        let b = (b5 << 3) | (b5 >> 2);
        (r << 16) | (g << 8) | b
    }
}

#[inline]
pub fn rgb_to_color(r: u8, g: u8, b: u8) -> Color {
    Color((((r as u16) & 0xF8) << 8) | (((g as u16) & 0xFC) << 3) | ((b as u16) >> 3))
}
