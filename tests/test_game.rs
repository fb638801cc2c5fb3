use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::Arc;

use asteroid_apocalypse::clock::TickCounter;
use asteroid_apocalypse::console::{ConsoleState, HELP};
use asteroid_apocalypse::entities::{Entity, GameStatus, Side};
use asteroid_apocalypse::framebuffer::Framebuffer;
use asteroid_apocalypse::game::{Game, GameOverStage};
use asteroid_apocalypse::hal::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Fakes ─────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeBoard {
    buttons: Buttons,
    analog: [u16; 2],
    inbound: VecDeque<u8>,
    outbound: Vec<u8>,
}

impl FakeBoard {
    fn send(&mut self, text: &[u8]) {
        self.inbound.extend(text.iter().copied());
    }

    fn transcript(&self) -> String {
        String::from_utf8_lossy(&self.outbound).into_owned()
    }
}

impl AnalogInput for FakeBoard {
    fn read(&mut self, channel: AnalogChannel) -> u16 {
        match channel {
            AnalogChannel::Turret => self.analog[0],
            AnalogChannel::Speed => self.analog[1],
        }
    }
}

impl ButtonInput for FakeBoard {
    fn buttons(&mut self) -> Buttons {
        self.buttons
    }
}

impl ByteStream for FakeBoard {
    fn read_byte(&mut self) -> Option<u8> {
        self.inbound.pop_front()
    }

    fn write(&mut self, bytes: &[u8]) {
        self.outbound.extend_from_slice(bytes);
    }
}

#[derive(Default)]
struct FakeSink {
    leds: Vec<Leds>,
    backlight: Vec<u16>,
}

impl PresentationSink for FakeSink {
    type Error = Infallible;

    fn present(&mut self, _frame: &Framebuffer, backlight: u16, leds: Leds) -> Result<(), Infallible> {
        self.leds.push(leds);
        self.backlight.push(backlight);
        Ok(())
    }
}

struct Rig {
    game: Game<StdRng>,
    clock: Arc<TickCounter>,
    board: FakeBoard,
    sink: FakeSink,
}

impl Rig {
    fn new() -> Self {
        let clock = Arc::new(TickCounter::new());
        Self {
            game: Game::new(Arc::clone(&clock), StdRng::seed_from_u64(42)),
            clock,
            board: FakeBoard {
                analog: [510, 1023],
                ..FakeBoard::default()
            },
            sink: FakeSink::default(),
        }
    }

    /// Past the intro, with the first wave paused on screen.
    fn started() -> Self {
        let mut rig = Self::new();
        rig.board.send(b"r");
        rig.step();
        rig
    }

    /// Started and unpaused.
    fn running() -> Self {
        let mut rig = Self::started();
        rig.press(Buttons::PAUSE);
        rig
    }

    fn step(&mut self) {
        self.game.step(&mut self.board, &mut self.sink).unwrap();
    }

    fn steps(&mut self, n: usize) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Hold `buttons` for exactly one step.
    fn press(&mut self, buttons: Buttons) {
        self.board.buttons = buttons;
        self.step();
        self.board.buttons = Buttons::empty();
    }

    fn advance_clock(&self, overflows: usize) {
        for _ in 0..overflows {
            self.clock.on_overflow();
        }
    }
}

// ── Intro ─────────────────────────────────────────────────────────────────────

#[test]
fn intro_fades_the_backlight_and_waits() {
    let mut rig = Rig::new();
    rig.step();
    assert_eq!(rig.game.backlight(), 1008);
    rig.steps(10);
    assert_eq!(rig.game.state().status, GameStatus::Intro);
    assert!(rig.game.frame().lit_count() > 0);
}

#[test]
fn intro_backlight_bottoms_out() {
    let mut rig = Rig::new();
    rig.steps(200);
    assert!(rig.game.backlight() <= 15);
}

#[test]
fn start_from_the_console_shows_a_paused_wave() {
    let rig = Rig::started();
    let state = rig.game.state();
    assert_eq!(state.status, GameStatus::Playing);
    assert!(state.paused);
    assert_eq!(state.asteroids.len(), 3);
    assert_eq!(rig.game.backlight(), 0);
    assert!(!rig.clock.is_running());
}

#[test]
fn start_button_leaves_the_intro() {
    let mut rig = Rig::new();
    rig.press(Buttons::RESTART);
    assert_eq!(rig.game.state().status, GameStatus::Playing);
}

#[test]
fn wave_warning_blinks_on_off_on() {
    let mut rig = Rig::started();
    rig.steps(3);
    let side = match rig.game.state().wave_side {
        Some(Side::Left) => Leds::LEFT,
        Some(Side::Right) => Leds::RIGHT,
        None => panic!("wave without a side"),
    };
    assert_eq!(rig.sink.leds, vec![side, Leds::empty(), side, Leds::empty()]);
}

// ── Pause & actions ───────────────────────────────────────────────────────────

#[test]
fn first_unpause_reports_once() {
    let mut rig = Rig::running();
    assert!(!rig.game.state().paused);
    assert!(rig.clock.is_running());
    assert!(rig.board.transcript().ends_with("Game Started\r\n"));
    assert!(rig.board.transcript().starts_with("Game Time: 00:00\r\n"));

    rig.press(Buttons::PAUSE);
    rig.press(Buttons::PAUSE);
    assert_eq!(rig.board.transcript().matches("Game Started").count(), 1);
    assert!(!rig.game.state().paused);
    assert!(rig.clock.is_running());
}

#[test]
fn console_action_applies_on_the_next_tick() {
    let mut rig = Rig::started();
    rig.board.send(b"p");
    rig.step();
    assert!(rig.game.state().paused);
    rig.step();
    assert!(!rig.game.state().paused);
}

#[test]
fn help_is_printed_on_request() {
    let mut rig = Rig::started();
    rig.board.send(b"?");
    rig.steps(2);
    assert!(rig.board.transcript().ends_with(HELP));
}

#[test]
fn status_request_while_paused_holds_the_status_screen() {
    let mut rig = Rig::started();
    rig.press(Buttons::STATUS);
    assert!(rig.game.is_showing_status());
    assert!(rig.board.transcript().starts_with("Game Time: "));

    rig.steps(3);
    assert!(rig.game.is_showing_status());

    rig.press(Buttons::PAUSE);
    assert!(!rig.game.is_showing_status());
    assert!(rig.game.state().paused);
}

#[test]
fn status_request_while_running_only_reports() {
    let mut rig = Rig::running();
    rig.press(Buttons::STATUS);
    assert!(!rig.game.is_showing_status());
    assert_eq!(rig.board.transcript().matches("Lives: 5").count(), 2);
}

#[test]
fn quit_halts_with_the_farewell_screen() {
    let mut rig = Rig::running();
    rig.press(Buttons::QUIT);
    assert_eq!(rig.game.state().status, GameStatus::Halted);
    assert!(!rig.clock.is_running());
    assert!(rig.game.frame().lit_count() > 3000);

    rig.steps(2);
    assert_eq!(rig.game.state().status, GameStatus::Halted);
}

// ── Console commands ──────────────────────────────────────────────────────────

#[test]
fn console_places_an_asteroid() {
    let mut rig = Rig::started();
    {
        let state = rig.game.state_mut();
        state.asteroids.clear();
        state.boulders.spawn(Entity::new(40.0, 10.0, 0.0));
    }
    rig.board.send(b"j10\r5\r");
    rig.steps(6);

    let state = rig.game.state();
    assert_eq!(state.asteroids.len(), 1);
    let rock = state.asteroids.get(0).copied().expect("placed");
    assert_eq!((rock.x, rock.y), (10.0, 5.0));
}

#[test]
fn placing_into_a_full_pool_does_nothing() {
    let mut rig = Rig::started();
    let before: Vec<Entity> = rig.game.state().asteroids.iter().copied().collect();
    rig.board.send(b"j10\r5\r");
    rig.steps(6);

    let after: Vec<Entity> = rig.game.state().asteroids.iter().copied().collect();
    assert_eq!(before, after);
    assert_eq!(rig.game.console().state(), &ConsoleState::Idle);
}

#[test]
fn zero_lives_from_the_console_ends_the_game() {
    let mut rig = Rig::started();
    rig.board.send(b"l0\r");
    rig.steps(4);
    assert_eq!(rig.game.state().status, GameStatus::GameOver);
    assert!(rig.board.transcript().ends_with("Game Over\r\n"));
}

#[test]
fn console_moves_the_ship_and_sets_the_score() {
    let mut rig = Rig::started();
    rig.board.send(b"h99\rg250\r");
    rig.steps(9);
    assert_eq!(rig.game.state().ship.x, 78);
    assert_eq!(rig.game.state().score, 250);
}

// ── Analog sample-and-hold ────────────────────────────────────────────────────

#[test]
fn turret_pot_is_sampled_at_most_once_a_second() {
    let mut rig = Rig::started();
    rig.board.analog[0] = 0;
    rig.press(Buttons::PAUSE);
    assert_eq!(rig.game.state().turret_angle, -60.0);

    rig.board.analog[0] = 1023;
    rig.step();
    assert_eq!(rig.game.state().turret_angle, -60.0);

    rig.advance_clock(31);
    rig.step();
    assert_eq!(rig.game.state().turret_angle, 60.0);
}

#[test]
fn console_override_restarts_the_hold_window() {
    let mut rig = Rig::running();
    assert_eq!(rig.game.state().turret_angle, 0.0);

    rig.advance_clock(28);
    rig.board.send(b"t30\r");
    rig.steps(4);
    assert_eq!(rig.game.state().turret_angle, 30.0);

    // More than a second since the pot was read, but not since the override.
    rig.board.analog[0] = 1023;
    rig.advance_clock(5);
    rig.step();
    assert_eq!(rig.game.state().turret_angle, 30.0);

    rig.advance_clock(31);
    rig.step();
    assert_eq!(rig.game.state().turret_angle, 60.0);
}

#[test]
fn speed_pot_sets_the_game_speed() {
    let mut rig = Rig::started();
    rig.board.analog[1] = 0;
    rig.step();
    assert_eq!(rig.game.state().speed_scale, 0.0);
}

// ── Game over ─────────────────────────────────────────────────────────────────

fn lose_last_life(rig: &mut Rig) {
    let state = rig.game.state_mut();
    state.lives = 1;
    state.boulders.spawn(Entity::new(20.0, 36.0, 0.0));
    rig.step();
}

#[test]
fn game_over_fades_in_holds_and_prompts() {
    let mut rig = Rig::running();
    lose_last_life(&mut rig);
    assert_eq!(rig.game.state().status, GameStatus::GameOver);
    assert_eq!(rig.game.game_over_stage(), GameOverStage::FadeIn);
    assert!(rig.board.transcript().ends_with("Lives: 0\r\nScore: 0\r\nAsteroids: 3\r\nBoulders: 0\r\nFragments: 0\r\nPlasma: 0\r\nTurret: 0\r\nSpeed: 10\r\n \r\nGame Over\r\n"));
    assert_eq!(rig.game.backlight(), 0);

    rig.steps(68);
    assert_eq!(rig.game.game_over_stage(), GameOverStage::FadeIn);
    rig.step();
    assert!(matches!(rig.game.game_over_stage(), GameOverStage::Hold { .. }));
    assert_eq!(rig.game.backlight(), 1023);
    assert_eq!(rig.game.leds(), Leds::LEFT | Leds::RIGHT);
    assert_eq!(rig.sink.leds.last(), Some(&(Leds::LEFT | Leds::RIGHT)));

    rig.steps(5);
    assert!(matches!(rig.game.game_over_stage(), GameOverStage::Hold { .. }));

    rig.advance_clock(123);
    rig.step();
    assert_eq!(rig.game.game_over_stage(), GameOverStage::Prompt);
    assert_eq!(rig.game.leds(), Leds::empty());

    rig.press(Buttons::RESTART);
    let state = rig.game.state();
    assert_eq!(state.status, GameStatus::Playing);
    assert_eq!(state.lives, 5);
    assert!(state.paused);
    assert_eq!(rig.clock.count(), 0);
}

#[test]
fn quit_from_the_game_over_prompt() {
    let mut rig = Rig::running();
    lose_last_life(&mut rig);
    rig.steps(69);
    rig.advance_clock(123);
    rig.step();
    assert_eq!(rig.game.game_over_stage(), GameOverStage::Prompt);

    rig.board.send(b"q");
    rig.step();
    assert_eq!(rig.game.state().status, GameStatus::Halted);
}

#[test]
fn game_over_ignores_input_until_the_prompt() {
    let mut rig = Rig::running();
    lose_last_life(&mut rig);
    rig.press(Buttons::RESTART);
    assert_eq!(rig.game.state().status, GameStatus::GameOver);
}
