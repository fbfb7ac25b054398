//! Interrupt request arbitration.
//!
//! Devices raise and lower their level; the CPU sees the highest level
//! currently requested.

/// Keyboard and tablet UARTs.
pub const UART_LEVEL: u8 = 2;
/// BBA operation complete.
pub const BBA_LEVEL: u8 = dec_bba::IRQ_LEVEL;
/// Link state change.
pub const STATUS_LEVEL: u8 = 5;
/// Vertical sync.
pub const VSYNC_LEVEL: u8 = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterruptLines {
    requested: u8,
}

impl InterruptLines {
    /// Raise or lower `level` (1-7; 0 is ignored).
    pub fn set(&mut self, level: u8, asserted: bool) {
        let bit = 1 << (level & 7);
        if asserted {
            self.requested |= bit;
        } else {
            self.requested &= !bit;
        }
        self.requested &= !1;
    }

    #[must_use]
    pub fn is_asserted(&self, level: u8) -> bool {
        self.requested & (1 << (level & 7)) != 0
    }

    /// Highest requested level, 0 when none.
    #[must_use]
    pub fn level(&self) -> u8 {
        if self.requested == 0 {
            0
        } else {
            7 - self.requested.leading_zeros() as u8
        }
    }
}
