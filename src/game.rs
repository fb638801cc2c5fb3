//! The per-tick state machine: intro, play, game over and halt.
//!
//! `Game::step` is called once per loop iteration by the host. It polls the
//! board, advances whichever screen is active, and hands one finished frame
//! to the presentation sink.

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info};

use crate::clock::TickCounter;
use crate::compute::{self, TickInput};
use crate::console::{self, Action, Command, Console, Event};
use crate::entities::{GameState, GameStatus, Side};
use crate::framebuffer::Framebuffer;
use crate::hal::{AnalogChannel, Board, Buttons, Leds, PresentationSink, BACKLIGHT_MAX};
use crate::presentation::{self, IntroAnimation, FADE_STEP};

/// Minimum seconds between two reads of the same analog channel.
pub const HOLD_WINDOW: f64 = 1.0;
/// How long the game-over screen stays up with both LEDs lit.
pub const GAME_OVER_HOLD: f64 = 4.0;
/// Ticks a wave warning lasts: on, off, on.
const WARNING_TICKS: u8 = 3;

/// Rate-limits one analog channel. Between reads the last applied value
/// stands, whatever the pot does.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SampleHold {
    last: Option<f64>,
}

impl SampleHold {
    /// Read the channel if the window since the last read has passed.
    pub fn poll(&mut self, now: f64, read: impl FnOnce() -> u16) -> Option<u16> {
        match self.last {
            Some(last) if now - last <= HOLD_WINDOW => None,
            _ => {
                self.last = Some(now);
                Some(read())
            }
        }
    }

    /// Start a new window at `now`, as if the channel had just been read.
    pub fn restart(&mut self, now: f64) {
        self.last = Some(now);
    }

    /// Forget the window; the next poll reads.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameOverStage {
    FadeIn,
    Hold { since: f64 },
    Prompt,
}

pub struct Game<R> {
    state: GameState,
    clock: Arc<TickCounter>,
    console: Console,
    /// Remote action read last tick, applied this tick.
    pending: Option<Action>,
    aim_hold: SampleHold,
    speed_hold: SampleHold,
    intro: IntroAnimation,
    game_over: GameOverStage,
    showing_status: bool,
    first_start: bool,
    /// Side being warned about and how many warning ticks have passed.
    warning: Option<(Side, u8)>,
    backlight: u16,
    frame: Framebuffer,
    rng: R,
}

impl<R: Rng> Game<R> {
    /// A game on its intro screen. `clock` must be driven by the host's
    /// periodic source.
    pub fn new(clock: Arc<TickCounter>, rng: R) -> Self {
        clock.set_running(false);
        clock.reset();
        Self {
            state: compute::init_state(),
            clock,
            console: Console::new(),
            pending: None,
            aim_hold: SampleHold::default(),
            speed_hold: SampleHold::default(),
            intro: IntroAnimation::default(),
            game_over: GameOverStage::FadeIn,
            showing_status: false,
            first_start: true,
            warning: None,
            backlight: BACKLIGHT_MAX,
            frame: Framebuffer::new(),
            rng,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for hosts that want to script a scenario.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn frame(&self) -> &Framebuffer {
        &self.frame
    }

    pub fn backlight(&self) -> u16 {
        self.backlight.min(BACKLIGHT_MAX)
    }

    pub fn is_showing_status(&self) -> bool {
        self.showing_status
    }

    pub fn game_over_stage(&self) -> GameOverStage {
        self.game_over
    }

    pub fn leds(&self) -> Leds {
        if let (GameStatus::GameOver, GameOverStage::Hold { .. }) = (self.state.status, self.game_over) {
            return Leds::LEFT | Leds::RIGHT;
        }
        match self.warning {
            Some((side, tick)) if tick != 1 => match side {
                Side::Left => Leds::LEFT,
                Side::Right => Leds::RIGHT,
            },
            _ => Leds::empty(),
        }
    }

    /// Run one loop iteration and present the result.
    pub fn step<B, P>(&mut self, board: &mut B, sink: &mut P) -> Result<(), P::Error>
    where
        B: Board,
        P: PresentationSink,
    {
        self.frame.clear();
        match self.state.status {
            GameStatus::Intro => self.step_intro(board),
            GameStatus::Playing => self.step_playing(board),
            GameStatus::GameOver => self.step_game_over(board),
            GameStatus::Halted => presentation::draw_farewell(&mut self.frame),
        }
        let leds = self.leds();
        self.warning = match self.warning {
            Some((side, tick)) if tick + 1 < WARNING_TICKS => Some((side, tick + 1)),
            _ => None,
        };
        sink.present(&self.frame, self.backlight(), leds)
    }

    fn step_intro(&mut self, board: &mut impl Board) {
        let start = board.buttons().contains(Buttons::RESTART) || board.read_byte() == Some(b'r');
        if start {
            self.state = compute::start_game(&self.state, &mut self.rng);
            self.backlight = 0;
            self.begin_warning();
            info!("left intro screen");
            self.draw_playing();
            return;
        }
        if self.backlight > FADE_STEP {
            self.backlight -= FADE_STEP;
        }
        self.intro.advance();
        presentation::draw_intro(&mut self.frame, &self.intro);
    }

    fn step_playing(&mut self, board: &mut impl Board) {
        self.state.elapsed = self.clock.elapsed_seconds();

        if self.showing_status {
            let dismissed = board.buttons().contains(Buttons::PAUSE) || board.read_byte() == Some(b'p');
            if dismissed {
                self.showing_status = false;
                debug!("status screen dismissed");
                self.draw_playing();
            } else {
                presentation::draw_status_screen(&mut self.frame, &self.state);
            }
            return;
        }

        let pending = self.pending.take();
        let mut buttons = board.buttons();
        if let Some(action) = pending {
            buttons |= action.buttons();
        }

        if buttons.contains(Buttons::PAUSE) {
            self.state = compute::toggle_pause(&self.state);
            self.clock.set_running(!self.state.paused);
            info!(paused = self.state.paused, "pause toggled");
            if self.first_start {
                self.first_start = false;
                board.write(console::status_report(&self.state).as_bytes());
                board.write(b"Game Started\r\n");
            }
        }

        if buttons.contains(Buttons::QUIT) {
            self.halt();
            presentation::draw_farewell(&mut self.frame);
            return;
        }

        if buttons.contains(Buttons::STATUS) {
            board.write(console::status_report(&self.state).as_bytes());
            if self.state.paused {
                self.showing_status = true;
                presentation::draw_status_screen(&mut self.frame, &self.state);
                return;
            }
        }

        let now = self.state.elapsed;
        let aim = self
            .aim_hold
            .poll(now, || board.read(AnalogChannel::Turret))
            .map(compute::turret_angle_from_raw);
        let speed = self
            .speed_hold
            .poll(now, || board.read(AnalogChannel::Speed))
            .map(compute::speed_from_raw);

        let waves = self.state.waves;
        let input = TickInput { buttons, aim, speed };
        self.state = compute::tick(&self.state, &input, &mut self.rng);
        if self.state.waves != waves {
            self.begin_warning();
        }

        if self.state.status == GameStatus::GameOver {
            self.enter_game_over(board);
            presentation::draw_game_over(&mut self.frame);
            return;
        }

        self.draw_playing();

        if pending == Some(Action::Help) {
            board.write(console::HELP.as_bytes());
        }

        if let Some(byte) = board.read_byte() {
            match self.console.feed(byte) {
                Some(Event::Action(action)) => self.pending = Some(action),
                Some(Event::Command(command)) => self.apply(command),
                None => {}
            }
        }

        if buttons.contains(Buttons::RESTART) {
            self.restart();
        }
    }

    fn step_game_over(&mut self, board: &mut impl Board) {
        match self.game_over {
            GameOverStage::FadeIn => {
                presentation::draw_game_over(&mut self.frame);
                self.backlight += FADE_STEP;
                if self.backlight > BACKLIGHT_MAX {
                    self.game_over = GameOverStage::Hold {
                        since: self.clock.elapsed_seconds(),
                    };
                }
            }
            GameOverStage::Hold { since } => {
                presentation::draw_game_over(&mut self.frame);
                if self.clock.elapsed_seconds() - since >= GAME_OVER_HOLD {
                    self.game_over = GameOverStage::Prompt;
                }
            }
            GameOverStage::Prompt => {
                presentation::draw_restart_prompt(&mut self.frame);
                if self.backlight >= FADE_STEP {
                    self.backlight -= FADE_STEP;
                }
                let buttons = board.buttons();
                let byte = board.read_byte();
                if buttons.contains(Buttons::RESTART) || byte == Some(b'r') {
                    self.restart();
                } else if buttons.contains(Buttons::QUIT) || byte == Some(b'q') {
                    self.halt();
                }
            }
        }
    }

    fn draw_playing(&mut self) {
        presentation::draw_playfield(&mut self.frame, &self.state);
        if self.state.paused {
            presentation::draw_paused_hud(&mut self.frame, &self.state);
        }
    }

    fn begin_warning(&mut self) {
        if let Some(side) = self.state.wave_side {
            self.warning = Some((side, 0));
        }
    }

    fn apply(&mut self, command: Command) {
        let now = self.state.elapsed;
        match command {
            Command::AimTurret(angle) => {
                self.state.turret_angle = angle;
                self.aim_hold.restart(now);
            }
            Command::SetSpeed(speed) => {
                self.state.speed_scale = speed;
                self.speed_hold.restart(now);
            }
            Command::SetLives(lives) => self.state.lives = lives,
            Command::SetScore(score) => self.state.score = score,
            Command::MoveShip(x) => self.state.ship.x = x,
            Command::Place { kind, x, y } => match compute::place(&self.state, kind, x, y) {
                Some(next) => self.state = next,
                None => debug!(?kind, x, y, "pool full, placement cancelled"),
            },
        }
    }

    fn enter_game_over(&mut self, board: &mut impl Board) {
        board.write(console::status_report(&self.state).as_bytes());
        board.write(b"Game Over\r\n");
        // The hold is timed on the game clock, which may have been paused.
        self.clock.set_running(true);
        self.game_over = GameOverStage::FadeIn;
        self.backlight = 0;
        self.warning = None;
    }

    /// Back to a fresh, paused game.
    pub fn restart(&mut self) {
        self.state = compute::restart(&self.state);
        self.clock.set_running(false);
        self.clock.reset();
        self.aim_hold.reset();
        self.speed_hold.reset();
        self.console.reset();
        self.pending = None;
        self.showing_status = false;
        self.first_start = true;
        self.warning = None;
        self.game_over = GameOverStage::FadeIn;
        self.backlight = 0;
        info!("game restarted");
    }

    fn halt(&mut self) {
        self.state.status = GameStatus::Halted;
        self.clock.set_running(false);
        info!(score = self.state.score, "halted");
    }
}
