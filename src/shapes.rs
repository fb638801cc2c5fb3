//! Named bitmask stencils shared by drawing and hit detection.

use crate::framebuffer::{Colour, Framebuffer};

/// A rectangular grid of cells, row-major; any non-space cell is filled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stencil {
    pub width: i32,
    pub height: i32,
    cells: &'static [u8],
}

impl Stencil {
    /// `cells` must hold exactly `width * height` bytes.
    pub const fn new(width: i32, height: i32, cells: &'static str) -> Self {
        assert!(cells.len() == (width * height) as usize);
        Self {
            width,
            height,
            cells: cells.as_bytes(),
        }
    }

    /// Whether the cell at column `i`, row `j` is filled. Outside the grid is empty.
    pub fn filled(&self, i: i32, j: i32) -> bool {
        if i < 0 || j < 0 || i >= self.width || j >= self.height {
            return false;
        }
        self.cells[(i + j * self.width) as usize] != b' '
    }

    /// Plot every filled cell with the top-left corner at `(left, top)`.
    pub fn draw(&self, fb: &mut Framebuffer, left: i32, top: i32) {
        for j in 0..self.height {
            for i in 0..self.width {
                if self.filled(i, j) {
                    fb.set_pixel(left + i, top + j, Colour::Foreground);
                }
            }
        }
    }
}

pub const SHIP: Stencil = Stencil::new(6, 2, concat!(
    "......",
    "......",
));

pub const ASTEROID: Stencil = Stencil::new(7, 7, concat!(
    "  ...  ",
    " ..... ",
    ".......",
    ".......",
    " ..... ",
    "  ...  ",
    "   .   ",
));

pub const BOULDER: Stencil = Stencil::new(5, 5, concat!(
    "  .  ",
    " ... ",
    ".....",
    " ... ",
    "  .  ",
));

pub const FRAGMENT: Stencil = Stencil::new(3, 3, concat!(
    " . ",
    "...",
    " . ",
));

pub const PLASMA: Stencil = Stencil::new(2, 2, concat!(
    "..",
    "..",
));

/// The sliding bar on the intro screen.
pub const MARKER: Stencil = Stencil::new(5, 1, ".....");
