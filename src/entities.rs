//! All game entity types. Pure data, no logic.

use crate::pool::Pool;
use crate::shapes::{self, Stencil};

pub const MAX_PLASMA: usize = 50;
pub const MAX_ASTEROID: usize = 3;
pub const MAX_BOULDER: usize = 6;
pub const MAX_FRAGMENT: usize = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Plasma,
    Asteroid,
    Boulder,
    Fragment,
}

impl EntityKind {
    pub fn stencil(self) -> Stencil {
        match self {
            EntityKind::Plasma => shapes::PLASMA,
            EntityKind::Asteroid => shapes::ASTEROID,
            EntityKind::Boulder => shapes::BOULDER,
            EntityKind::Fragment => shapes::FRAGMENT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    /// Title screen, waiting for the start input.
    Intro,
    Playing,
    GameOver,
    /// Quit was requested; nothing but the farewell screen from here on.
    Halted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Direction the ship keeps sliding in until blocked or countermanded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Drift {
    Stopped,
    Left,
    Right,
}

// ── Actors ────────────────────────────────────────────────────────────────────

/// A plasma bolt, asteroid, boulder or fragment.
///
/// Positions are sub-pixel; drawing and hit tests truncate toward zero.
/// `angle` is in degrees from straight down for falling rocks and from
/// straight up for plasma.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entity {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub alive: bool,
}

impl Entity {
    pub fn new(x: f64, y: f64, angle: f64) -> Self {
        Self {
            x,
            y,
            angle,
            alive: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ship {
    pub x: i32,
    pub y: i32,
    pub drift: Drift,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// Everything the simulation reads and writes, owned by the game loop.
#[derive(Clone, Debug)]
pub struct GameState {
    pub ship: Ship,
    pub plasmas: Pool<MAX_PLASMA>,
    pub asteroids: Pool<MAX_ASTEROID>,
    pub boulders: Pool<MAX_BOULDER>,
    pub fragments: Pool<MAX_FRAGMENT>,
    pub score: i32,
    /// Remaining shield life. At or below zero the game is over.
    pub lives: i32,
    /// Seconds of unpaused play since the last (re)start.
    pub elapsed: f64,
    pub paused: bool,
    /// Rock fall rate, 0..=1.
    pub speed_scale: f64,
    /// Turret aim in degrees, -60..=60, positive to the right.
    pub turret_angle: f64,
    /// `elapsed` at the last plasma launch.
    pub last_shot: f64,
    pub status: GameStatus,
    /// Asteroid waves spawned so far.
    pub waves: u32,
    /// Side of the screen most of the latest wave landed on.
    pub wave_side: Option<Side>,
}
