//! Asteroid Apocalypse: a fixed-rate arcade game for an 84×48 monochrome
//! display, written against narrow hardware traits so the same core runs on
//! a microcontroller board or a desktop terminal.
//!
//! Layering, leaf first:
//! `framebuffer` → `shapes` / `collision` → `pool` / `entities` →
//! `compute` (pure simulation) → `console` (remote commands) →
//! `presentation` (screens) → `game` (the per-tick state machine).

pub mod clock;
pub mod collision;
pub mod compute;
pub mod console;
pub mod entities;
pub mod error;
pub mod font;
pub mod framebuffer;
pub mod game;
pub mod hal;
pub mod pool;
pub mod presentation;
pub mod shapes;

pub use error::Error;
pub use framebuffer::{Colour, Framebuffer, LCD_X, LCD_Y};
pub use game::Game;
