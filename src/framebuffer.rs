//! Packed monochrome frame for the 84×48 panel.
//!
//! Pixels are stored eight to a byte along the vertical axis: byte
//! `bank * LCD_X + x` holds rows `bank*8 ..= bank*8+7` of column `x`, with the
//! least significant bit at the top. This is the order the panel controller
//! consumes, so a finished frame can be streamed out byte by byte.

use crate::font::{self, CHAR_HEIGHT, CHAR_WIDTH};

pub const LCD_X: i32 = 84;
pub const LCD_Y: i32 = 48;
pub const BUFFER_SIZE: usize = (LCD_X * (LCD_Y / 8)) as usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Colour {
    Background,
    Foreground,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    bytes: [u8; BUFFER_SIZE],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for y in 0..LCD_Y {
            let row: String = (0..LCD_X)
                .map(|x| if self.pixel(x, y) { '#' } else { '.' })
                .collect();
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

impl Framebuffer {
    pub const fn new() -> Self {
        Self {
            bytes: [0; BUFFER_SIZE],
        }
    }

    /// Every pixel back to background.
    pub fn clear(&mut self) {
        self.bytes = [0; BUFFER_SIZE];
    }

    /// Raw packed bytes in panel order.
    pub fn as_bytes(&self) -> &[u8; BUFFER_SIZE] {
        &self.bytes
    }

    /// Set or clear one pixel. Out-of-bounds coordinates are ignored, and every
    /// drawing routine relies on that instead of clipping.
    pub fn set_pixel(&mut self, x: i32, y: i32, colour: Colour) {
        let Some(index) = Self::index(x, y) else {
            return;
        };
        let mask = 1u8 << (y & 7);
        match colour {
            Colour::Foreground => self.bytes[index] |= mask,
            Colour::Background => self.bytes[index] &= !mask,
        }
    }

    /// Whether the pixel is lit. Out-of-bounds reads as unlit.
    pub fn pixel(&self, x: i32, y: i32) -> bool {
        Self::index(x, y).is_some_and(|index| self.bytes[index] & (1 << (y & 7)) != 0)
    }

    /// Number of lit pixels.
    pub fn lit_count(&self) -> u32 {
        self.bytes.iter().map(|b| b.count_ones()).sum()
    }

    /// Flip every pixel, like the panel's inverse display mode.
    pub fn invert(&mut self) {
        for byte in self.bytes.iter_mut() {
            *byte = !*byte;
        }
    }

    fn index(x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= LCD_X || y >= LCD_Y {
            return None;
        }
        Some(((y >> 3) * LCD_X + x) as usize)
    }

    /// Draw a line between two points, both ends inclusive.
    ///
    /// Axis-aligned lines plot every pixel on the axis. Other lines always walk
    /// x from left to right; after each column the accumulated slope error is
    /// paid off one row at a time while it is at least one half, plotting the
    /// pixel before each row step. Steep lines therefore come out thick, which
    /// the cannon beam and the borders depend on.
    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, colour: Colour) {
        if x1 == x2 {
            for y in y1.min(y2)..=y1.max(y2) {
                self.set_pixel(x1, y, colour);
            }
            return;
        }
        if y1 == y2 {
            for x in x1.min(x2)..=x1.max(x2) {
                self.set_pixel(x, y1, colour);
            }
            return;
        }

        let (x1, y1, x2, y2) = if x1 > x2 {
            (x2, y2, x1, y1)
        } else {
            (x1, y1, x2, y2)
        };

        let dx = (x2 - x1) as f32;
        let dy = (y2 - y1) as f32;
        let derr = (dy / dx).abs();
        let step = if dy > 0.0 { 1 } else { -1 };

        let mut err = 0.0f32;
        let mut y = y1;
        for x in x1..=x2 {
            self.set_pixel(x, y, colour);
            err += derr;
            while err >= 0.5 && (if dy > 0.0 { y <= y2 } else { y >= y2 }) {
                self.set_pixel(x, y, colour);
                y += step;
                err -= 1.0;
            }
        }
    }

    /// Render one glyph cell with its top-left corner at `(x, y)`.
    ///
    /// The whole 5×8 cell is written. With `Colour::Background` the glyph bits
    /// are inverted first, so text comes out as an inverse-video block.
    pub fn draw_char(&mut self, x: i32, y: i32, c: u8, colour: Colour) {
        for (i, column) in font::glyph(c).iter().enumerate() {
            let bits = match colour {
                Colour::Foreground => *column,
                Colour::Background => !*column,
            };
            for j in 0..CHAR_HEIGHT {
                let lit = if bits & (1 << j) != 0 {
                    Colour::Foreground
                } else {
                    Colour::Background
                };
                self.set_pixel(x + i as i32, y + j, lit);
            }
        }
    }

    /// Render text left to right at a fixed advance, stopping at the end of the
    /// string or at the first NUL byte.
    pub fn draw_string(&mut self, x: i32, y: i32, text: &str, colour: Colour) {
        for (i, c) in text.bytes().take_while(|&c| c != 0).enumerate() {
            self.draw_char(x + i as i32 * CHAR_WIDTH, y, c, colour);
        }
    }

    pub fn draw_int(&mut self, x: i32, y: i32, value: i64, colour: Colour) {
        self.draw_string(x, y, &value.to_string(), colour);
    }
}
