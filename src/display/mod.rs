//! Rendering layer. All terminal output lives here.
//!
//! The 84×48 frame is drawn with half-block characters, two pixel rows per
//! terminal row, tinted by the backlight level. The LEDs and the tail of the
//! serial transcript are shown underneath.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::Write;
use std::rc::Rc;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};

use asteroid_apocalypse::hal::{Leds, PresentationSink, BACKLIGHT_MAX};
use asteroid_apocalypse::{Error, Framebuffer, LCD_X, LCD_Y};

// ── Layout & palette ──────────────────────────────────────────────────────────

const ORIGIN_COL: u16 = 2;
const ORIGIN_ROW: u16 = 1;
const SCREEN_ROWS: u16 = (LCD_Y / 2) as u16;
const LED_ROW: u16 = ORIGIN_ROW + SCREEN_ROWS + 1;
const TRANSCRIPT_ROW: u16 = LED_ROW + 2;
const TRANSCRIPT_LINES: usize = 8;
const HINT_ROW: u16 = TRANSCRIPT_ROW + TRANSCRIPT_LINES as u16 + 1;

const C_PIXEL: Color = Color::Rgb { r: 16, g: 24, b: 16 };
const C_LED_ON: Color = Color::Red;
const C_LED_OFF: Color = Color::DarkGrey;
const C_SERIAL: Color = Color::Green;
const C_HINT: Color = Color::DarkGrey;

/// Panel background for a backlight level: a dim grey-green at zero up to a
/// bright one at full duty.
fn backlight_colour(level: u16) -> Color {
    let t = f32::from(level.min(BACKLIGHT_MAX)) / f32::from(BACKLIGHT_MAX);
    let mix = |dark: f32, bright: f32| (dark + (bright - dark) * t) as u8;
    Color::Rgb {
        r: mix(70.0, 170.0),
        g: mix(84.0, 204.0),
        b: mix(64.0, 140.0),
    }
}

// ── Serial transcript ─────────────────────────────────────────────────────────

/// Everything the game wrote to the serial link, split into CR-LF lines.
#[derive(Debug, Default)]
pub struct Transcript {
    lines: VecDeque<String>,
    partial: String,
}

impl Transcript {
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            match b {
                b'\r' => {}
                b'\n' => {
                    let line = std::mem::take(&mut self.partial);
                    self.lines.push_back(line);
                    if self.lines.len() > TRANSCRIPT_LINES {
                        self.lines.pop_front();
                    }
                }
                _ => self.partial.push(char::from(b)),
            }
        }
    }

    fn tail(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}

// ── Sink ──────────────────────────────────────────────────────────────────────

pub struct TerminalSink<W: Write> {
    out: W,
    transcript: Rc<RefCell<Transcript>>,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, transcript: Rc<RefCell<Transcript>>) -> Self {
        Self { out, transcript }
    }

    fn render(&mut self, frame: &Framebuffer, backlight: u16, leds: Leds) -> std::io::Result<()> {
        let out = &mut self.out;
        out.queue(terminal::Clear(terminal::ClearType::All))?;

        draw_screen(out, frame, backlight)?;
        draw_leds(out, leds)?;
        draw_transcript(out, &self.transcript.borrow())?;
        draw_controls_hint(out)?;

        out.queue(style::ResetColor)?;
        out.queue(cursor::MoveTo(0, HINT_ROW + 1))?;
        out.flush()
    }
}

impl<W: Write> PresentationSink for TerminalSink<W> {
    type Error = Error;

    fn present(&mut self, frame: &Framebuffer, backlight: u16, leds: Leds) -> Result<(), Error> {
        self.render(frame, backlight, leds)?;
        Ok(())
    }
}

// ── Panel ─────────────────────────────────────────────────────────────────────

fn draw_screen<W: Write>(out: &mut W, frame: &Framebuffer, backlight: u16) -> std::io::Result<()> {
    out.queue(style::SetBackgroundColor(backlight_colour(backlight)))?;
    out.queue(style::SetForegroundColor(C_PIXEL))?;
    for row in 0..SCREEN_ROWS {
        let y = i32::from(row) * 2;
        let line: String = (0..LCD_X)
            .map(|x| match (frame.pixel(x, y), frame.pixel(x, y + 1)) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            })
            .collect();
        out.queue(cursor::MoveTo(ORIGIN_COL, ORIGIN_ROW + row))?;
        out.queue(Print(line))?;
    }
    out.queue(style::ResetColor)?;
    Ok(())
}

fn draw_leds<W: Write>(out: &mut W, leds: Leds) -> std::io::Result<()> {
    let lamp = |lit: bool| if lit { C_LED_ON } else { C_LED_OFF };

    out.queue(cursor::MoveTo(ORIGIN_COL, LED_ROW))?;
    out.queue(style::SetForegroundColor(lamp(leds.contains(Leds::LEFT))))?;
    out.queue(Print("● LED0"))?;

    out.queue(cursor::MoveTo(ORIGIN_COL + LCD_X as u16 - 6, LED_ROW))?;
    out.queue(style::SetForegroundColor(lamp(leds.contains(Leds::RIGHT))))?;
    out.queue(Print("LED1 ●"))?;
    Ok(())
}

fn draw_transcript<W: Write>(out: &mut W, transcript: &Transcript) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_SERIAL))?;
    for (i, line) in transcript.tail().enumerate() {
        out.queue(cursor::MoveTo(ORIGIN_COL, TRANSCRIPT_ROW + i as u16))?;
        out.queue(Print(line))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(ORIGIN_COL, HINT_ROW))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "←→ Move  ↑ Fire  ↓ Status  Tab Pause  F1 Restart  F2 Quit  PgUp/PgDn Aim  Home/End Speed  Esc Exit",
    ))?;
    Ok(())
}
