//! Pixel-exact overlap between two positioned stencils.

use crate::shapes::Stencil;

/// A stencil placed with its top-left corner at an integer pixel.
#[derive(Clone, Copy, Debug)]
pub struct Placed {
    pub stencil: Stencil,
    pub x: i32,
    pub y: i32,
}

impl Placed {
    pub fn new(stencil: Stencil, x: i32, y: i32) -> Self {
        Self { stencil, x, y }
    }

    fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.stencil.width && py >= self.y && py < self.y + self.stencil.height
    }

    fn filled_at(&self, px: i32, py: i32) -> bool {
        self.stencil.filled(px - self.x, py - self.y)
    }
}

/// True when some filled cell of `a` lands on a filled cell of `b`.
///
/// Overlapping bounding boxes are not enough: the cells themselves must
/// coincide, so two diamonds can touch corners without colliding.
pub fn overlap(a: Placed, b: Placed) -> bool {
    for py in a.y..a.y + a.stencil.height {
        for px in a.x..a.x + a.stencil.width {
            if b.contains(px, py) && a.filled_at(px, py) && b.filled_at(px, py) {
                return true;
            }
        }
    }
    false
}
