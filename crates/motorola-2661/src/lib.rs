//! 2661 enhanced programmable communications interface.
//!
//! The VAXstation 100 has two of these, one for the LK201 keyboard and one
//! for the tablet. Registers sit on odd addresses:
//!
//! | Reg | Read                 | Write                         |
//! |-----|----------------------|-------------------------------|
//! | 1   | receive holding      | transmit holding              |
//! | 3   | status               | SYN1, then SYN2, then DLE     |
//! | 5   | mode (MR1, then MR2) | mode (MR1, then MR2)          |
//! | 7   | command              | command                       |
//!
//! Reading the command register rewinds the mode and sync pointers.
//! The interrupt output follows `status & (RXRDY | TXRDY)`.

use emu_core::{Observable, Value};

/// Status register bits.
pub mod status {
    pub const TXRDY: u8 = 0x01;
    pub const RXRDY: u8 = 0x02;
    pub const PERR: u8 = 0x08;
    pub const OERR: u8 = 0x10;
    pub const FERR: u8 = 0x20;
}

/// Command register bits.
pub mod command {
    pub const TXEN: u8 = 0x01;
    pub const DTR: u8 = 0x02;
    pub const RXEN: u8 = 0x04;
    pub const BRK: u8 = 0x08;
    /// Reset error flags.
    pub const RESET: u8 = 0x10;
    /// Operating mode field.
    pub const MODE: u8 = 0xC0;
    /// Local loopback.
    pub const LOOPBACK: u8 = 0x80;
}

pub struct Mc2661 {
    rx: u8,
    tx: u8,
    sr: u8,
    mr: [u8; 2],
    mr_index: usize,
    /// SYN1, SYN2, DLE.
    sync: [u8; 3],
    sync_index: usize,
    cr: u8,
}

impl Default for Mc2661 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mc2661 {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rx: 0,
            tx: 0,
            sr: 0,
            mr: [0; 2],
            mr_index: 0,
            sync: [0; 3],
            sync_index: 0,
            cr: 0,
        }
    }

    /// Read register `reg` (only the low three bits decode).
    pub fn read(&mut self, reg: u8) -> u8 {
        match reg & 7 {
            1 => {
                self.sr &= !status::RXRDY;
                self.rx
            }
            3 => self.sr,
            5 => self.mr[self.mr_index],
            7 => {
                self.mr_index = 0;
                self.sync_index = 0;
                self.cr
            }
            _ => 0,
        }
    }

    /// Write register `reg`.
    ///
    /// Returns the transmitted byte when a write to the transmit holding
    /// register goes out on the line. In local loopback the byte is
    /// received back instead and nothing leaves the chip.
    pub fn write(&mut self, reg: u8, value: u8) -> Option<u8> {
        match reg & 7 {
            1 => {
                self.tx = value;
                if self.cr & command::TXEN == 0 {
                    return None;
                }
                self.sr |= status::TXRDY;
                if self.cr & command::MODE == command::LOOPBACK {
                    self.sr |= status::RXRDY;
                    self.rx = value;
                    return None;
                }
                return Some(value);
            }
            3 => {
                self.sync[self.sync_index] = value;
                self.sync_index = (self.sync_index + 1).min(2);
            }
            5 => {
                self.mr[self.mr_index] = value;
                self.mr_index = 1;
            }
            7 => {
                self.cr = value;
                if value & command::RESET != 0 {
                    self.sr &= !(status::OERR | status::PERR | status::FERR);
                }
                if value & command::TXEN != 0 {
                    self.sr |= status::TXRDY;
                } else {
                    self.sr &= !status::TXRDY;
                }
            }
            _ => {}
        }
        None
    }

    /// A byte arrives from the attached peripheral.
    pub fn receive(&mut self, byte: u8) {
        self.rx = byte;
        if self.cr & command::RXEN != 0 {
            self.sr |= status::RXRDY;
        } else {
            log::trace!("2661 receiver disabled, {byte:02X} not flagged");
        }
    }

    /// Interrupt output.
    #[must_use]
    pub fn irq(&self) -> bool {
        self.sr & (status::RXRDY | status::TXRDY) != 0
    }

    #[must_use]
    pub fn status(&self) -> u8 {
        self.sr
    }
}

impl Observable for Mc2661 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "status" => Some(self.sr.into()),
            "command" => Some(self.cr.into()),
            "mode1" => Some(self.mr[0].into()),
            "mode2" => Some(self.mr[1].into()),
            "rx" => Some(self.rx.into()),
            "tx" => Some(self.tx.into()),
            "irq" => Some(self.irq().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["status", "command", "mode1", "mode2", "rx", "tx", "irq"]
    }
}
