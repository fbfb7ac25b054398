//! Small devices on the I/O page: status register, mouse and LEDs.

use crate::interrupts::{InterruptLines, STATUS_LEVEL};

/// Status register bits.
pub mod status {
    /// Non-existent memory.
    pub const NXM: u8 = 0x04;
    pub const RETRY_OVERFLOW: u8 = 0x08;
    /// Link to the host is up.
    pub const LINK: u8 = 0x10;
    pub const LEFT_BUTTON: u8 = 0x20;
    pub const MIDDLE_BUTTON: u8 = 0x40;
    pub const RIGHT_BUTTON: u8 = 0x80;
}

/// Power-up value.
pub const STATUS_INITIAL: u8 = 0xE3 ^ 0x02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRegister {
    bits: u8,
}

impl Default for StatusRegister {
    fn default() -> Self {
        Self {
            bits: STATUS_INITIAL,
        }
    }
}

impl StatusRegister {
    #[must_use]
    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Set `bits`. When they include the link bit the status interrupt
    /// is driven by whether this call raised it.
    pub fn set(&mut self, bits: u8, irq: &mut InterruptLines) {
        if bits & status::LINK != 0 {
            irq.set(STATUS_LEVEL, self.bits & status::LINK == 0);
        }
        self.bits |= bits;
    }

    /// Clear `bits`. When they include the link bit the status interrupt
    /// is driven by whether this call dropped it.
    pub fn clear(&mut self, bits: u8, irq: &mut InterruptLines) {
        if bits & status::LINK != 0 {
            irq.set(STATUS_LEVEL, self.bits & status::LINK != 0);
        }
        self.bits &= !bits;
    }

    /// Odd addresses return the register and clear NXM. Even addresses
    /// acknowledge the status interrupt and read as zero.
    pub fn read(&mut self, address: u32, irq: &mut InterruptLines) -> u8 {
        if address & 1 != 0 {
            let value = self.bits;
            self.bits &= !status::NXM;
            value
        } else {
            irq.set(STATUS_LEVEL, false);
            0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// Status bit, cleared while the button is held.
    #[must_use]
    pub const fn status_bit(self) -> u8 {
        match self {
            Self::Left => status::LEFT_BUTTON,
            Self::Middle => status::MIDDLE_BUTTON,
            Self::Right => status::RIGHT_BUTTON,
        }
    }
}

/// Free-running 8-bit motion counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mouse {
    pub x: u8,
    pub y: u8,
}

impl Mouse {
    /// Accumulate relative motion; Y counts upwards.
    pub fn motion(&mut self, dx: i32, dy: i32) {
        self.x = self.x.wrapping_add(dx as u8);
        self.y = self.y.wrapping_sub(dy as u8);
    }

    /// Odd address is X, even is Y.
    #[must_use]
    pub fn read(&self, address: u32) -> u8 {
        if address & 1 != 0 { self.x } else { self.y }
    }
}

/// Render the LED register: four red LEDs then the green one. A zero bit
/// means lit.
#[must_use]
pub fn led_pattern(value: u8) -> String {
    let mut out = String::with_capacity(5);
    for bit in 0..4 {
        out.push(if value & (1 << bit) != 0 { '.' } else { 'R' });
    }
    out.push(if value & 0x10 != 0 { '-' } else { 'G' });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_bit_edges_drive_status_interrupt() {
        let mut irq = InterruptLines::default();
        let mut sr = StatusRegister::default();
        assert_eq!(sr.bits(), 0xE1);

        sr.set(status::LINK, &mut irq);
        assert!(irq.is_asserted(STATUS_LEVEL));
        sr.set(status::LINK, &mut irq);
        assert!(!irq.is_asserted(STATUS_LEVEL));

        sr.clear(status::LINK, &mut irq);
        assert!(irq.is_asserted(STATUS_LEVEL));
        assert_eq!(sr.read(0, &mut irq), 0);
        assert!(!irq.is_asserted(STATUS_LEVEL));
    }

    #[test]
    fn other_bits_leave_status_interrupt_alone() {
        let mut irq = InterruptLines::default();
        let mut sr = StatusRegister::default();
        sr.set(status::LINK, &mut irq);
        sr.set(status::NXM, &mut irq);
        sr.clear(status::LEFT_BUTTON, &mut irq);
        assert!(irq.is_asserted(STATUS_LEVEL));
        assert_eq!(sr.bits(), (0xE1 | status::LINK | status::NXM) & !status::LEFT_BUTTON);
    }

    #[test]
    fn odd_read_clears_nxm() {
        let mut irq = InterruptLines::default();
        let mut sr = StatusRegister::default();
        sr.set(status::NXM, &mut irq);
        assert_eq!(sr.read(1, &mut irq) & status::NXM, status::NXM);
        assert_eq!(sr.read(1, &mut irq) & status::NXM, 0);
    }

    #[test]
    fn mouse_counters_wrap() {
        let mut mouse = Mouse::default();
        mouse.motion(-1, 3);
        assert_eq!(mouse.read(1), 0xFF);
        assert_eq!(mouse.read(0), 0xFD);
    }

    #[test]
    fn leds_are_active_low() {
        assert_eq!(led_pattern(0x00), "RRRRG");
        assert_eq!(led_pattern(0x1E), "R...-");
    }
}
