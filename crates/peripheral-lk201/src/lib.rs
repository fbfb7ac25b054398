//! DEC LK201 keyboard.
//!
//! The keyboard talks to the workstation over the keyboard 2661 at 4800
//! baud. Only the parts the boot ROM and the host software rely on are
//! modelled: the power-up self-test reply to a reset command, and the
//! down/up byte stream for keys. Bytes leave the keyboard one at a time,
//! [`BYTE_PERIOD`] apart; the machine pulls them with [`Lk201::next_byte`]
//! from its event queue.

use std::collections::VecDeque;

use emu_core::{MasterClock, Ticks};

/// Host command requesting a power-up reset.
pub const RESET: u8 = 0xFD;

/// Sent when the last held key is released.
pub const ALL_UP: u8 = 0xB3;

/// Keyboard ID and self-test result.
pub const POWER_UP_RESPONSE: [u8; 4] = [0x00, 0x00, 0x00, 0x00];

/// Time between transmitted bytes.
pub const BYTE_PERIOD: Ticks = MasterClock::VS100.period(480);

#[derive(Debug, Default)]
pub struct Lk201 {
    queue: VecDeque<u8>,
    held: u32,
}

impl Lk201 {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A byte from the host.
    ///
    /// Returns true when it started a new transmission, meaning the caller
    /// should schedule delivery.
    pub fn receive(&mut self, byte: u8) -> bool {
        log::debug!("LK201 receive {byte:02X}");
        if byte == RESET {
            self.queue.clear();
            self.held = 0;
            self.queue.extend(POWER_UP_RESPONSE);
            return true;
        }
        false
    }

    /// A key was pressed. Returns true when delivery must be scheduled.
    pub fn key_down(&mut self, code: u8) -> bool {
        self.held += 1;
        self.send(code)
    }

    /// A key was released. The last release reports [`ALL_UP`].
    pub fn key_up(&mut self, code: u8) -> bool {
        self.held = self.held.saturating_sub(1);
        self.send(if self.held > 0 { code } else { ALL_UP })
    }

    fn send(&mut self, byte: u8) -> bool {
        let idle = self.queue.is_empty();
        self.queue.push_back(byte);
        idle
    }

    /// Next byte on the line, if any is waiting.
    pub fn next_byte(&mut self) -> Option<u8> {
        self.queue.pop_front()
    }

    /// Bytes still waiting to be sent.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}
