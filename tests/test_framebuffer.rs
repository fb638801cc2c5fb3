use asteroid_apocalypse::framebuffer::*;

fn lit(fb: &Framebuffer) -> Vec<(i32, i32)> {
    let mut out = Vec::new();
    for y in 0..LCD_Y {
        for x in 0..LCD_X {
            if fb.pixel(x, y) {
                out.push((x, y));
            }
        }
    }
    out
}

// ── set_pixel / clear ─────────────────────────────────────────────────────────

#[test]
fn pixels_pack_eight_rows_per_byte() {
    let mut fb = Framebuffer::new();
    fb.set_pixel(5, 9, Colour::Foreground);
    assert_eq!(fb.as_bytes()[LCD_X as usize + 5], 1 << 1);
    assert_eq!(fb.lit_count(), 1);

    fb.set_pixel(5, 9, Colour::Background);
    assert_eq!(fb.lit_count(), 0);
}

#[test]
fn out_of_bounds_pixels_are_ignored() {
    let mut fb = Framebuffer::new();
    for (x, y) in [(-1, 0), (0, -1), (LCD_X, 0), (0, LCD_Y), (1000, 1000)] {
        fb.set_pixel(x, y, Colour::Foreground);
        assert!(!fb.pixel(x, y));
    }
    assert_eq!(fb.lit_count(), 0);
}

#[test]
fn clear_resets_every_byte() {
    let mut fb = Framebuffer::new();
    fb.draw_line(0, 0, LCD_X, LCD_Y, Colour::Foreground);
    assert!(fb.lit_count() > 0);
    fb.clear();
    assert_eq!(fb, Framebuffer::new());
}

#[test]
fn invert_flips_every_pixel() {
    let mut fb = Framebuffer::new();
    fb.set_pixel(0, 0, Colour::Foreground);
    fb.invert();
    assert!(!fb.pixel(0, 0));
    assert_eq!(fb.lit_count(), (LCD_X * LCD_Y) as u32 - 1);
}

// ── draw_line ─────────────────────────────────────────────────────────────────

#[test]
fn horizontal_line_sets_exactly_its_pixels() {
    let mut fb = Framebuffer::new();
    fb.draw_line(0, 0, 10, 0, Colour::Foreground);
    let expected: Vec<(i32, i32)> = (0..=10).map(|x| (x, 0)).collect();
    assert_eq!(lit(&fb), expected);
}

#[test]
fn vertical_line_accepts_either_order() {
    let mut down = Framebuffer::new();
    down.draw_line(3, 2, 3, 7, Colour::Foreground);
    let mut up = Framebuffer::new();
    up.draw_line(3, 7, 3, 2, Colour::Foreground);
    assert_eq!(down, up);
    assert_eq!(down.lit_count(), 6);
}

#[test]
fn steep_line_pays_off_error_before_stepping_x() {
    let mut fb = Framebuffer::new();
    fb.draw_line(0, 0, 1, 4, Colour::Foreground);
    let mut got = lit(&fb);
    got.sort();
    assert_eq!(got, vec![(0, 0), (0, 1), (0, 2), (0, 3), (1, 4)]);
}

#[test]
fn endpoints_are_reordered_left_to_right() {
    let mut a = Framebuffer::new();
    a.draw_line(0, 0, 10, 5, Colour::Foreground);
    let mut b = Framebuffer::new();
    b.draw_line(10, 5, 0, 0, Colour::Foreground);
    assert_eq!(a, b);
    assert!(a.pixel(0, 0));
    assert!(a.pixel(10, 5));
}

#[test]
fn line_runs_off_screen_without_panicking() {
    let mut fb = Framebuffer::new();
    fb.draw_line(-20, -3, 100, 60, Colour::Foreground);
    assert!(fb.lit_count() > 0);
}

// ── text ──────────────────────────────────────────────────────────────────────

#[test]
fn background_glyph_is_an_inverse_block() {
    let mut fg = Framebuffer::new();
    fg.draw_char(0, 0, b' ', Colour::Foreground);
    assert_eq!(fg.lit_count(), 0);

    let mut bg = Framebuffer::new();
    bg.draw_char(0, 0, b' ', Colour::Background);
    assert_eq!(bg.lit_count(), 5 * 8);
}

#[test]
fn background_glyph_complements_foreground_glyph() {
    let mut fg = Framebuffer::new();
    fg.draw_char(10, 10, b'A', Colour::Foreground);
    let mut bg = Framebuffer::new();
    bg.draw_char(10, 10, b'A', Colour::Background);
    assert!(fg.lit_count() > 0);
    assert_eq!(fg.lit_count() + bg.lit_count(), 5 * 8);
}

#[test]
fn text_advances_one_cell_per_char() {
    let mut text = Framebuffer::new();
    text.draw_string(4, 8, "AB", Colour::Foreground);

    let mut chars = Framebuffer::new();
    chars.draw_char(4, 8, b'A', Colour::Foreground);
    chars.draw_char(9, 8, b'B', Colour::Foreground);
    assert_eq!(text, chars);
}

#[test]
fn text_stops_at_nul() {
    let mut cut = Framebuffer::new();
    cut.draw_string(0, 0, "A\0B", Colour::Foreground);
    let mut short = Framebuffer::new();
    short.draw_string(0, 0, "A", Colour::Foreground);
    assert_eq!(cut, short);
}

#[test]
fn draw_int_matches_its_digits() {
    let mut number = Framebuffer::new();
    number.draw_int(0, 0, -42, Colour::Foreground);
    let mut text = Framebuffer::new();
    text.draw_string(0, 0, "-42", Colour::Foreground);
    assert_eq!(number, text);
}
