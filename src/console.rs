//! The remote console: single-letter commands over the serial link.
//!
//! Action letters (`a d w s r p q ?`) are pulses fed to the game on the next
//! tick. Setting letters (`t`/`o m l g h`) take one decimal argument closed by
//! a carriage return; placing letters (`j k i`) take two, X then Y.

use std::fmt::Write as _;

use heapless::Vec;
use tracing::debug;

use crate::compute::SHIP_MAX_X;
use crate::entities::{EntityKind, GameState};
use crate::hal::{Buttons, ANALOG_MAX};

/// Digits kept per argument. Further digits are dropped.
pub const MAX_DIGITS: usize = 4;
/// Ceiling for lives and score set from the console.
pub const COUNTER_LIMIT: i32 = 9999;

pub const CARRIAGE_RETURN: u8 = 0x0D;

pub const HELP: &str = "'a' move spaceship left\r\n\
'd' move spaceship right\r\n\
'w' fire plasma bolts\r\n\
's' send and display game status\r\n\
'r' start/reset game\r\n\
'p' pause game\r\n\
'q' quit\r\n\
't' set aim of the turret\r\n\
'm' set the speed of the game\r\n\
'l' set the remaining useful life of the deflector shield\r\n\
'g' set the score\r\n\
'?' print controls to computer screen (Putty)\r\n\
'h' move spaceship to coordinate\r\n\
'j' place asteroid at coordinate\r\n\
'k' place boulder at coordinate\r\n\
'i' place fragment at coordinate\r\n \r\n";

/// An immediate in-game action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Left,
    Right,
    Fire,
    Status,
    Restart,
    Pause,
    Quit,
    Help,
}

impl Action {
    fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            b'a' => Action::Left,
            b'd' => Action::Right,
            b'w' => Action::Fire,
            b's' => Action::Status,
            b'r' => Action::Restart,
            b'p' => Action::Pause,
            b'q' => Action::Quit,
            b'?' => Action::Help,
            _ => return None,
        })
    }

    /// The button this action stands in for. Help has none.
    pub fn buttons(self) -> Buttons {
        match self {
            Action::Left => Buttons::SHIP_LEFT,
            Action::Right => Buttons::SHIP_RIGHT,
            Action::Fire => Buttons::FIRE,
            Action::Status => Buttons::STATUS,
            Action::Restart => Buttons::RESTART,
            Action::Pause => Buttons::PAUSE,
            Action::Quit => Buttons::QUIT,
            Action::Help => Buttons::empty(),
        }
    }
}

/// Which value a pending argument will set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Setting {
    Turret,
    Speed,
    Lives,
    Score,
    ShipX,
    Place(EntityKind),
}

impl Setting {
    fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            b't' | b'o' => Setting::Turret,
            b'm' => Setting::Speed,
            b'l' => Setting::Lives,
            b'g' => Setting::Score,
            b'h' => Setting::ShipX,
            b'j' => Setting::Place(EntityKind::Asteroid),
            b'k' => Setting::Place(EntityKind::Boulder),
            b'i' => Setting::Place(EntityKind::Fragment),
            _ => return None,
        })
    }
}

/// A completed override, already clamped to its legal range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    AimTurret(f64),
    SetSpeed(f64),
    SetLives(i32),
    SetScore(i32),
    MoveShip(i32),
    Place { kind: EntityKind, x: i32, y: i32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    Action(Action),
    Command(Command),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ConsoleState {
    #[default]
    Idle,
    AwaitingDigits {
        setting: Setting,
        digits: Vec<u8, MAX_DIGITS>,
        negative: bool,
    },
    /// X is in; collecting Y for a placement.
    AwaitingSecondCoordinate {
        kind: EntityKind,
        x: i32,
        digits: Vec<u8, MAX_DIGITS>,
    },
}

/// Parse an argument. No digits reads as zero.
fn value_of(digits: &[u8]) -> i32 {
    digits
        .iter()
        .fold(0, |acc, &d| acc * 10 + i32::from(d - b'0'))
}

#[derive(Clone, Debug, Default)]
pub struct Console {
    state: ConsoleState,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ConsoleState {
        &self.state
    }

    /// Drop any half-typed command.
    pub fn reset(&mut self) {
        self.state = ConsoleState::Idle;
    }

    /// Feed one inbound byte. Anything that does not fit the current state is
    /// ignored.
    pub fn feed(&mut self, byte: u8) -> Option<Event> {
        match &mut self.state {
            ConsoleState::Idle => {
                if let Some(setting) = Setting::from_byte(byte) {
                    self.state = ConsoleState::AwaitingDigits {
                        setting,
                        digits: Vec::new(),
                        negative: false,
                    };
                    return None;
                }
            }
            ConsoleState::AwaitingDigits {
                setting,
                digits,
                negative,
            } => match byte {
                b'0'..=b'9' => {
                    // A full buffer keeps its first digits.
                    let _ = digits.push(byte);
                    return None;
                }
                b'-' if *setting == Setting::Turret => {
                    *negative = true;
                    return None;
                }
                CARRIAGE_RETURN => return self.dispatch(),
                _ => {}
            },
            ConsoleState::AwaitingSecondCoordinate { digits, .. } => match byte {
                b'0'..=b'9' => {
                    let _ = digits.push(byte);
                    return None;
                }
                CARRIAGE_RETURN => return self.dispatch(),
                _ => {}
            },
        }
        Action::from_byte(byte).map(Event::Action)
    }

    fn dispatch(&mut self) -> Option<Event> {
        let command = match std::mem::take(&mut self.state) {
            ConsoleState::Idle => return None,
            ConsoleState::AwaitingDigits {
                setting,
                digits,
                negative,
            } => {
                let value = value_of(&digits);
                match setting {
                    Setting::Turret => {
                        let angle = f64::from(value.min(60));
                        Command::AimTurret(if negative { -angle } else { angle })
                    }
                    Setting::Speed => {
                        let raw = value.min(i32::from(ANALOG_MAX));
                        Command::SetSpeed(f64::from(raw) / f64::from(ANALOG_MAX))
                    }
                    Setting::Lives => Command::SetLives(value.min(COUNTER_LIMIT)),
                    Setting::Score => Command::SetScore(value.min(COUNTER_LIMIT)),
                    Setting::ShipX => Command::MoveShip(value.clamp(0, SHIP_MAX_X)),
                    Setting::Place(kind) => {
                        self.state = ConsoleState::AwaitingSecondCoordinate {
                            kind,
                            x: value,
                            digits: Vec::new(),
                        };
                        return None;
                    }
                }
            }
            ConsoleState::AwaitingSecondCoordinate { kind, x, digits } => Command::Place {
                kind,
                x,
                y: value_of(&digits),
            },
        };
        debug!(?command, "console command");
        Some(Event::Command(command))
    }
}

/// Whole minutes and leftover seconds, both truncated.
pub fn minutes_seconds(elapsed: f64) -> (i64, i64) {
    let minutes = (elapsed / 60.0).floor();
    let seconds = (elapsed - minutes * 60.0).floor();
    (minutes as i64, seconds as i64)
}

/// The status block sent over the serial link. Unlike `HELP`, which is kept
/// byte for byte, the turret line is labelled `Turret:` (older hosts print
/// `Turrent:`).
pub fn status_report(state: &GameState) -> String {
    let (minutes, seconds) = minutes_seconds(state.elapsed);
    let mut out = String::new();
    let _ = write!(out, "Game Time: {minutes:02}:{seconds:02}\r\n");
    let _ = write!(out, "Lives: {}\r\n", state.lives);
    let _ = write!(out, "Score: {}\r\n", state.score);
    let _ = write!(out, "Asteroids: {}\r\n", state.asteroids.len());
    let _ = write!(out, "Boulders: {}\r\n", state.boulders.len());
    let _ = write!(out, "Fragments: {}\r\n", state.fragments.len());
    let _ = write!(out, "Plasma: {}\r\n", state.plasmas.len());
    let _ = write!(out, "Turret: {}\r\n", state.turret_angle as i32);
    let _ = write!(out, "Speed: {}\r\n", (state.speed_scale * 10.0) as i32);
    out.push_str(" \r\n");
    out
}
