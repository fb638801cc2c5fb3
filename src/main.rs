mod display;

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::io::{stdout, BufWriter};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::{self, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::filter::EnvFilter;

use asteroid_apocalypse::clock::{TickCounter, TICK_PERIOD};
use asteroid_apocalypse::hal::{AnalogChannel, AnalogInput, ButtonInput, Buttons, ByteStream, ANALOG_MAX};
use asteroid_apocalypse::{Error, Game};

use display::{TerminalSink, Transcript};

/// A key counts as held if it was last seen within this many loop iterations.
/// Covers terminals that never report key releases: OS key repeat refreshes
/// the entry well before it expires.
const HOLD_FRAMES: u64 = 4;

#[derive(Debug, Parser)]
#[command(name = "asteroid_apocalypse", about = "Asteroid Apocalypse on an emulated 84x48 handheld")]
struct Args {
    /// Delay after each game loop iteration, in milliseconds.
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,

    /// Seed for asteroid placement and debris angles. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Where trace output goes; the terminal itself is taken by the game.
    #[arg(long, default_value = "asteroid_apocalypse.log")]
    log_file: PathBuf,

    /// How far one key press turns a potentiometer, in raw ADC counts.
    #[arg(long, default_value_t = 34)]
    pot_step: u16,
}

// ── Board emulation ───────────────────────────────────────────────────────────

/// The handheld's inputs driven from the keyboard, plus the serial link.
///
/// Arrow keys are level inputs tracked in `key_frame`, like the joystick.
/// Buttons that act once per press are latched as pulses until the game reads
/// them.
struct TerminalBoard {
    events: mpsc::Receiver<Event>,
    key_frame: HashMap<KeyCode, u64>,
    frame: u64,
    pulses: Buttons,
    turret_pot: u16,
    speed_pot: u16,
    pot_step: u16,
    inbound: VecDeque<u8>,
    transcript: Rc<RefCell<Transcript>>,
    exit: bool,
}

impl TerminalBoard {
    fn new(events: mpsc::Receiver<Event>, pot_step: u16, transcript: Rc<RefCell<Transcript>>) -> Self {
        Self {
            events,
            key_frame: HashMap::new(),
            frame: 0,
            pulses: Buttons::empty(),
            // Centred aim, full speed.
            turret_pot: 510,
            speed_pot: ANALOG_MAX,
            pot_step,
            inbound: VecDeque::new(),
            transcript,
            exit: false,
        }
    }

    fn is_held(&self, key: KeyCode) -> bool {
        self.key_frame
            .get(&key)
            .is_some_and(|&last| self.frame.saturating_sub(last) <= HOLD_FRAMES)
    }

    fn turn(pot: u16, delta: i32) -> u16 {
        (i32::from(pot) + delta).clamp(0, i32::from(ANALOG_MAX)) as u16
    }

    /// Drain pending terminal events without blocking.
    fn pump(&mut self) -> Result<(), Error> {
        self.frame += 1;
        loop {
            let ev = match self.events.try_recv() {
                Ok(ev) => ev,
                Err(TryRecvError::Empty) => return Ok(()),
                Err(TryRecvError::Disconnected) => return Err(Error::InputClosed),
            };
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    self.key_frame.insert(code, self.frame);
                    self.press(code, modifiers);
                }
                KeyEventKind::Repeat => {
                    self.key_frame.insert(code, self.frame);
                }
                KeyEventKind::Release => {
                    self.key_frame.remove(&code);
                }
            }
        }
    }

    fn press(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let step = i32::from(self.pot_step);
        match code {
            KeyCode::Esc => self.exit = true,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => self.exit = true,
            KeyCode::Tab => self.pulses |= Buttons::PAUSE,
            KeyCode::Down => self.pulses |= Buttons::STATUS,
            KeyCode::F(1) => self.pulses |= Buttons::RESTART,
            KeyCode::F(2) => self.pulses |= Buttons::QUIT,
            KeyCode::PageUp => self.turret_pot = Self::turn(self.turret_pot, step),
            KeyCode::PageDown => self.turret_pot = Self::turn(self.turret_pot, -step),
            KeyCode::Home => self.speed_pot = Self::turn(self.speed_pot, step),
            KeyCode::End => self.speed_pot = Self::turn(self.speed_pot, -step),
            KeyCode::Enter => self.inbound.push_back(0x0D),
            KeyCode::Char(c) if c.is_ascii() => self.inbound.push_back(c as u8),
            _ => {}
        }
    }
}

impl AnalogInput for TerminalBoard {
    fn read(&mut self, channel: AnalogChannel) -> u16 {
        match channel {
            AnalogChannel::Turret => self.turret_pot,
            AnalogChannel::Speed => self.speed_pot,
        }
    }
}

impl ButtonInput for TerminalBoard {
    fn buttons(&mut self) -> Buttons {
        let mut held = std::mem::take(&mut self.pulses);
        if self.is_held(KeyCode::Left) {
            held |= Buttons::SHIP_LEFT;
        }
        if self.is_held(KeyCode::Right) {
            held |= Buttons::SHIP_RIGHT;
        }
        if self.is_held(KeyCode::Up) {
            held |= Buttons::FIRE;
        }
        held
    }
}

impl ByteStream for TerminalBoard {
    fn read_byte(&mut self) -> Option<u8> {
        self.inbound.pop_front()
    }

    fn write(&mut self, bytes: &[u8]) {
        self.transcript.borrow_mut().push_bytes(bytes);
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_tracing(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create log file: {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_file)?;

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode().context("failed to enable raw mode")?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release events; terminals without the protocol fall back to
    // the hold window.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))
        .is_ok();

    // Dedicate a thread to blocking event reads so the game loop never waits
    // on the terminal.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let result = run(out, rx, &args);

    let mut out = stdout();
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run(out: BufWriter<std::io::Stdout>, rx: mpsc::Receiver<Event>, args: &Args) -> Result<()> {
    // The overflow source: one count per timer period, forever.
    let clock = Arc::new(TickCounter::new());
    let source = Arc::clone(&clock);
    thread::spawn(move || loop {
        thread::sleep(Duration::from_secs_f64(TICK_PERIOD));
        source.on_overflow();
    });

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(seed = ?args.seed, tick_ms = args.tick_ms, "starting");

    let transcript = Rc::new(RefCell::new(Transcript::default()));
    let mut board = TerminalBoard::new(rx, args.pot_step, Rc::clone(&transcript));
    let mut sink = TerminalSink::new(out, transcript);
    let mut game = Game::new(clock, rng);
    let delay = Duration::from_millis(args.tick_ms);

    loop {
        board.pump()?;
        if board.exit {
            info!(score = game.state().score, "host exit requested");
            return Ok(());
        }
        game.step(&mut board, &mut sink)?;
        thread::sleep(delay);
    }
}
