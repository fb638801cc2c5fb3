//! Narrow interfaces to the board. The core never touches hardware directly;
//! a host implements these for real pins or a desktop terminal.

use bitflags::bitflags;

use crate::framebuffer::Framebuffer;

pub const ANALOG_MAX: u16 = 1023;
pub const BACKLIGHT_MAX: u16 = 1023;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnalogChannel {
    Turret,
    Speed,
}

bitflags! {
    /// Discrete inputs, read as levels every tick.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Buttons: u8 {
        const SHIP_LEFT = 1 << 0;
        const SHIP_RIGHT = 1 << 1;
        const FIRE = 1 << 2;
        const PAUSE = 1 << 3;
        const STATUS = 1 << 4;
        const RESTART = 1 << 5;
        const QUIT = 1 << 6;
    }
}

bitflags! {
    /// The two warning LEDs under the display.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Leds: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
    }
}

pub trait AnalogInput {
    /// A 10-bit sample, `0..=ANALOG_MAX`.
    fn read(&mut self, channel: AnalogChannel) -> u16;
}

pub trait ButtonInput {
    fn buttons(&mut self) -> Buttons;
}

/// The remote console link.
pub trait ByteStream {
    /// Next inbound byte, if one has arrived. Never blocks.
    fn read_byte(&mut self) -> Option<u8>;
    fn write(&mut self, bytes: &[u8]);
}

/// Everything the game loop polls each tick.
pub trait Board: AnalogInput + ButtonInput + ByteStream {}

impl<T: AnalogInput + ButtonInput + ByteStream> Board for T {}

/// Where finished frames go.
pub trait PresentationSink {
    type Error;

    /// Show a complete frame at the given backlight level (`0..=BACKLIGHT_MAX`)
    /// with the given warning LEDs lit.
    fn present(&mut self, frame: &Framebuffer, backlight: u16, leds: Leds) -> Result<(), Self::Error>;
}
