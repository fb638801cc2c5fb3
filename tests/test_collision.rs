use asteroid_apocalypse::collision::*;
use asteroid_apocalypse::framebuffer::{Framebuffer, LCD_X};
use asteroid_apocalypse::shapes::*;

#[test]
fn stencil_cells_outside_the_grid_are_empty() {
    assert!(BOULDER.filled(2, 0));
    assert!(!BOULDER.filled(0, 0));
    assert!(!BOULDER.filled(-1, 2));
    assert!(!BOULDER.filled(5, 2));
}

#[test]
fn stencil_draw_plots_filled_cells_only() {
    let mut fb = Framebuffer::new();
    FRAGMENT.draw(&mut fb, 10, 10);
    assert_eq!(fb.lit_count(), 5);
    assert!(fb.pixel(11, 10));
    assert!(!fb.pixel(10, 10));
}

#[test]
fn stencil_draw_clips_at_the_edge() {
    let mut fb = Framebuffer::new();
    SHIP.draw(&mut fb, LCD_X - 3, 0);
    assert_eq!(fb.lit_count(), 6);
}

#[test]
fn identical_placements_overlap() {
    let a = Placed::new(ASTEROID, 20, 20);
    assert!(overlap(a, a));
}

#[test]
fn plasma_grazing_the_asteroid_top_hits() {
    let rock = Placed::new(ASTEROID, 10, 10);
    assert!(overlap(Placed::new(PLASMA, 12, 9), rock));
    assert!(!overlap(Placed::new(PLASMA, 12, 8), rock));
}

#[test]
fn touching_boxes_with_empty_corners_miss() {
    // Boxes share cells (3..=4, 3..=4) but the diamond's corner is empty
    // there and so is the plus sign's.
    let boulder = Placed::new(BOULDER, 0, 0);
    let fragment = Placed::new(FRAGMENT, 3, 3);
    assert!(!overlap(boulder, fragment));
    assert!(overlap(boulder, Placed::new(FRAGMENT, 2, 2)));
}

#[test]
fn overlap_is_symmetric() {
    let shapes = [SHIP, ASTEROID, BOULDER, FRAGMENT, PLASMA];
    for a in shapes {
        for b in shapes {
            for dx in -8..=8 {
                for dy in -8..=8 {
                    let pa = Placed::new(a, 20, 20);
                    let pb = Placed::new(b, 20 + dx, 20 + dy);
                    assert_eq!(overlap(pa, pb), overlap(pb, pa), "{a:?} vs {b:?} at ({dx},{dy})");
                }
            }
        }
    }
}
