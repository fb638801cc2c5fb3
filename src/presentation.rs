//! Screens drawn into the framebuffer: playfield, overlays, intro, game over
//! and the farewell screen. Nothing here changes game state.

use crate::compute::{turret_tip, ASTEROID_GRACE, SHIELD_Y};
use crate::console::minutes_seconds;
use crate::entities::{EntityKind, GameState, Ship};
use crate::framebuffer::{Colour, Framebuffer, LCD_X, LCD_Y};
use crate::pool::Pool;
use crate::shapes;

/// Backlight change per tick while fading.
pub const FADE_STEP: u16 = 15;

const BAR_Y: i32 = 12;

fn draw_pool<const N: usize>(fb: &mut Framebuffer, pool: &Pool<N>, kind: EntityKind) {
    let stencil = kind.stencil();
    for e in pool.alive() {
        stencil.draw(fb, e.x as i32, e.y as i32);
    }
}

/// The turret as two adjacent lines from its tip down to the ship.
pub fn draw_turret(fb: &mut Framebuffer, ship: &Ship, angle: f64) {
    let (tip_x, tip_y) = turret_tip(ship, angle);
    let (tip_x, tip_y) = (tip_x as i32, tip_y as i32);
    fb.draw_line(tip_x, tip_y, ship.x + 2, ship.y, Colour::Foreground);
    fb.draw_line(tip_x + 1, tip_y, ship.x + 3, ship.y, Colour::Foreground);
}

/// Everything on screen during play.
pub fn draw_playfield(fb: &mut Framebuffer, state: &GameState) {
    draw_pool(fb, &state.plasmas, EntityKind::Plasma);
    if state.elapsed >= ASTEROID_GRACE {
        draw_pool(fb, &state.asteroids, EntityKind::Asteroid);
    }
    draw_pool(fb, &state.boulders, EntityKind::Boulder);
    draw_pool(fb, &state.fragments, EntityKind::Fragment);
    fb.draw_line(0, SHIELD_Y, LCD_X, SHIELD_Y, Colour::Foreground);
    shapes::SHIP.draw(fb, state.ship.x, state.ship.y);
    draw_turret(fb, &state.ship, state.turret_angle);
}

/// Lives and score in inverse video across the top, and a pause banner.
pub fn draw_paused_hud(fb: &mut Framebuffer, state: &GameState) {
    let counters = format!("L{} S{}", state.lives, state.score);
    fb.draw_string(0, 0, &counters, Colour::Background);
    fb.draw_string(27, 20, "PAUSED", Colour::Background);
}

/// Full-screen time, shield life and score.
pub fn draw_status_screen(fb: &mut Framebuffer, state: &GameState) {
    fb.draw_string(3, 7, "Time: ", Colour::Foreground);
    fb.draw_string(5, 17, "Life: ", Colour::Foreground);
    fb.draw_int(32, 17, i64::from(state.lives), Colour::Foreground);
    fb.draw_string(5, 27, "Score: ", Colour::Foreground);
    fb.draw_int(40, 27, i64::from(state.score), Colour::Foreground);

    let (minutes, seconds) = minutes_seconds(state.elapsed);
    if minutes < 10 {
        fb.draw_int(29, 7, 0, Colour::Foreground);
        fb.draw_int(35, 7, minutes, Colour::Foreground);
    } else {
        fb.draw_int(29, 7, minutes, Colour::Foreground);
    }
    fb.draw_char(41, 7, b':', Colour::Foreground);
    if seconds < 10 {
        fb.draw_int(46, 7, 0, Colour::Foreground);
        fb.draw_int(52, 7, seconds, Colour::Foreground);
    } else {
        fb.draw_int(46, 7, seconds, Colour::Foreground);
    }
}

pub fn draw_border(fb: &mut Framebuffer) {
    fb.draw_line(0, 0, LCD_X, 0, Colour::Foreground);
    fb.draw_line(0, 0, 0, LCD_Y, Colour::Foreground);
    fb.draw_line(LCD_X - 1, 0, LCD_X - 1, LCD_Y, Colour::Foreground);
    fb.draw_line(0, LCD_Y - 1, LCD_X, LCD_Y - 1, Colour::Foreground);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Bar {
    x: i32,
    step: i32,
}

impl Bar {
    fn advance(&mut self) {
        self.x += self.step;
        if self.x > LCD_X || self.x < 0 {
            self.step = -self.step;
        }
    }
}

/// Two bars sliding back and forth across the title screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntroAnimation {
    bars: [Bar; 2],
}

impl Default for IntroAnimation {
    fn default() -> Self {
        Self {
            bars: [Bar { x: -1, step: 1 }, Bar { x: LCD_X, step: -1 }],
        }
    }
}

impl IntroAnimation {
    pub fn advance(&mut self) {
        for bar in &mut self.bars {
            bar.advance();
        }
    }

    /// Current x of each bar.
    pub fn positions(&self) -> [i32; 2] {
        [self.bars[0].x, self.bars[1].x]
    }
}

pub fn draw_intro(fb: &mut Framebuffer, animation: &IntroAnimation) {
    fb.draw_string(22, 20, "Asteroid", Colour::Foreground);
    fb.draw_string(18, 27, "Apocalypse", Colour::Foreground);
    fb.draw_string(17, 37, "LB/r Start", Colour::Foreground);
    for x in animation.positions() {
        shapes::MARKER.draw(fb, x, BAR_Y);
    }
    draw_border(fb);
}

pub fn draw_game_over(fb: &mut Framebuffer) {
    fb.draw_string(15, 19, "Game Over", Colour::Foreground);
}

pub fn draw_restart_prompt(fb: &mut Framebuffer) {
    fb.draw_string(5, 13, "LB: Restart", Colour::Foreground);
    fb.draw_string(5, 28, "RB: Quit", Colour::Foreground);
}

/// The last screen before the game stops for good, shown in inverse video.
pub fn draw_farewell(fb: &mut Framebuffer) {
    fb.draw_string(19, 19, "Goodbye!", Colour::Foreground);
    fb.invert();
}
