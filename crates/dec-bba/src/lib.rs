//! DEC VAXstation 100 bitmap blitter accelerator (BBA).
//!
//! The host fills the scratchpad with an operation's parameters and writes
//! 1 to the control register. After a fixed latency the operation runs to
//! completion in one go and the BBA raises its interrupt. Writing 0 to the
//! control register lowers the interrupt; it never aborts an operation.
//!
//! The BBA reaches memory through [`BbaMemory`], filtered by its own
//! address decoder (see [`memory::reachable`]).

mod cache;
mod copy;
pub mod function;
mod line;
pub mod memory;
pub mod scratchpad;

use emu_core::{Observable, Ticks, Value};

use crate::cache::Caches;
pub use crate::memory::BbaMemory;
use crate::memory::Decoded;
use crate::scratchpad::{FUNCTION, HEIGHT, Scratchpad, WIDTH, command};

/// Interrupt level raised when an operation completes.
pub const IRQ_LEVEL: u8 = 4;

/// Delay between the go command and the operation.
pub const DEFAULT_LATENCY: Ticks = Ticks::new(1000);

/// What the machine must do after a control register write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Lower [`IRQ_LEVEL`].
    ClearInterrupt,
    /// Schedule [`Bba::run`] after the latency.
    Start { latency: Ticks },
    Ignored,
}

/// The operation a command word selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Line,
    Cursor,
    Tile,
    Bitmap,
}

impl Operation {
    /// Decode a command word. Line wins over cursor, cursor over tile.
    #[must_use]
    pub const fn from_command(word: u16) -> Self {
        if word & command::LINE != 0 {
            Self::Line
        } else if word & command::CURSOR != 0 {
            Self::Cursor
        } else if word & command::TILE != 0 {
            Self::Tile
        } else {
            Self::Bitmap
        }
    }
}

pub struct Bba {
    scratchpad: Scratchpad,
    caches: Caches,
    latency: Ticks,
    busy: bool,
    irq: bool,
    operations: u64,
}

impl Default for Bba {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY)
    }
}

impl Bba {
    #[must_use]
    pub fn new(latency: Ticks) -> Self {
        Self {
            scratchpad: Scratchpad::new(),
            caches: Caches::default(),
            latency,
            busy: false,
            irq: false,
            operations: 0,
        }
    }

    #[must_use]
    pub fn scratchpad(&self) -> &Scratchpad {
        &self.scratchpad
    }

    pub fn scratchpad_mut(&mut self) -> &mut Scratchpad {
        &mut self.scratchpad
    }

    /// The control register reads as zero.
    #[must_use]
    pub fn read_control(&self) -> u8 {
        0
    }

    pub fn write_control(&mut self, value: u8) -> Control {
        log::debug!("BBA control {value:02X}");
        match value {
            0 => {
                self.irq = false;
                Control::ClearInterrupt
            }
            1 => {
                log::debug!("BBA command {:04X}", self.scratchpad.word(0));
                self.busy = true;
                Control::Start {
                    latency: self.latency,
                }
            }
            _ => Control::Ignored,
        }
    }

    /// Scratchpad byte at `offset` from the start of its window.
    #[must_use]
    pub fn read_byte(&self, offset: u32) -> u8 {
        let value = self.scratchpad.byte(offset as u16);
        log::trace!("BBA scratchpad read byte {offset:03X} {value:02X}");
        value
    }

    pub fn write_byte(&mut self, offset: u32, value: u8) {
        log::trace!("BBA scratchpad write byte {offset:03X} {value:02X}");
        self.scratchpad.set_byte(offset as u16, value);
    }

    #[must_use]
    pub fn read_word(&self, offset: u32) -> u16 {
        let value = self.scratchpad.word(offset as u16);
        log::trace!("BBA scratchpad read word {offset:03X} {value:04X}");
        value
    }

    pub fn write_word(&mut self, offset: u32, value: u16) {
        log::trace!("BBA scratchpad write word {offset:03X} {value:04X}");
        self.scratchpad.set_word(offset as u16, value);
    }

    /// Run the programmed operation to completion and raise the interrupt.
    pub fn run<M: BbaMemory + ?Sized>(&mut self, mem: &mut M) {
        let mut mem = Decoded(mem);
        let word = self.scratchpad.word(0);
        let operation = Operation::from_command(word);
        log::debug!(
            "BBA {operation:?} command {word:04X} {}x{} function {:X}",
            self.scratchpad.word(WIDTH),
            self.scratchpad.word(HEIGHT),
            self.scratchpad.word(FUNCTION) & 0xF
        );

        let pad = &mut self.scratchpad;
        let caches = &mut self.caches;
        match operation {
            Operation::Line => line::draw(pad, caches, &mut mem),
            Operation::Cursor => copy::cursor(pad, caches, &mut mem),
            Operation::Tile => copy::tile(pad, caches, &mut mem),
            Operation::Bitmap => copy::bitmap(pad, caches, &mut mem),
        }
        caches.finish(&mut mem);

        self.operations += 1;
        self.busy = false;
        self.irq = true;
    }

    /// Completion interrupt is asserted.
    #[must_use]
    pub fn interrupt(&self) -> bool {
        self.irq
    }

    /// An operation has been started and has not run yet.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    #[must_use]
    pub fn latency(&self) -> Ticks {
        self.latency
    }
}

impl Observable for Bba {
    fn query(&self, path: &str) -> Option<Value> {
        let pad = &self.scratchpad;
        match path {
            "command" => Some(pad.word(0).into()),
            "width" => Some(pad.word(WIDTH).into()),
            "height" => Some(pad.word(HEIGHT).into()),
            "function" => Some(pad.word(FUNCTION).into()),
            "busy" => Some(self.busy.into()),
            "irq" => Some(self.irq.into()),
            "operations" => Some(self.operations.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["command", "width", "height", "function", "busy", "irq", "operations"]
    }
}
