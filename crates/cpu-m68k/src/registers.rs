//! 68000 programmer-visible registers.
//!
//! A7 is two physical registers: USP while the S bit is clear and SSP while
//! it is set. [`Registers::a`] and [`Registers::set_a`] follow the S bit, so
//! changing SR switches stacks without copying anything.

use crate::Size;
use crate::flags::{CCR_MASK, INT_MASK, S, SR_MASK};

/// 68000 CPU register set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    /// Data registers D0-D7.
    pub d: [u32; 8],
    /// Address registers A0-A6.
    pub a: [u32; 7],
    /// User stack pointer.
    pub usp: u32,
    /// Supervisor stack pointer.
    pub ssp: u32,
    /// Fetch address of the next prefetch, not the current instruction.
    pub pc: u32,
    pub sr: u16,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    /// Power-on state: supervisor mode, interrupts masked.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            d: [0; 8],
            a: [0; 7],
            usp: 0,
            ssp: 0,
            pc: 0,
            sr: 0x2700,
        }
    }

    /// Address register `n`, with A7 resolved to the active stack pointer.
    #[must_use]
    pub fn a(&self, n: usize) -> u32 {
        if n < 7 { self.a[n] } else { self.sp() }
    }

    pub fn set_a(&mut self, n: usize, value: u32) {
        if n < 7 {
            self.a[n] = value;
        } else {
            self.set_sp(value);
        }
    }

    #[must_use]
    pub const fn sp(&self) -> u32 {
        if self.is_supervisor() { self.ssp } else { self.usp }
    }

    pub fn set_sp(&mut self, value: u32) {
        if self.is_supervisor() {
            self.ssp = value;
        } else {
            self.usp = value;
        }
    }

    #[must_use]
    pub const fn is_supervisor(&self) -> bool {
        self.sr & S != 0
    }

    #[must_use]
    pub const fn interrupt_mask(&self) -> u8 {
        ((self.sr & INT_MASK) >> 8) as u8
    }

    pub fn set_interrupt_mask(&mut self, level: u8) {
        self.sr = (self.sr & !INT_MASK) | (u16::from(level & 7) << 8);
    }

    /// Load SR, dropping bits the 68000 does not implement.
    pub fn set_sr(&mut self, value: u16) {
        self.sr = value & SR_MASK;
    }

    pub fn set_ccr(&mut self, value: u16) {
        self.sr = (self.sr & !CCR_MASK) | (value & CCR_MASK);
    }

    /// Low `size` bits of data register `n`.
    #[must_use]
    pub const fn d_sized(&self, n: usize, size: Size) -> u32 {
        self.d[n] & size.mask()
    }

    /// Write the low `size` bits of data register `n`, keeping the rest.
    pub fn set_d_sized(&mut self, n: usize, size: Size, value: u32) {
        self.d[n] = size.merge(self.d[n], value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a7_follows_supervisor_bit() {
        let mut regs = Registers::new();
        regs.usp = 0x1000;
        regs.ssp = 0x2000;
        assert_eq!(regs.a(7), 0x2000);

        regs.set_sr(0x0000);
        assert_eq!(regs.a(7), 0x1000);
        regs.set_a(7, 0x0FFC);
        assert_eq!(regs.usp, 0x0FFC);
        assert_eq!(regs.ssp, 0x2000);
    }

    #[test]
    fn set_sr_drops_unimplemented_bits() {
        let mut regs = Registers::new();
        regs.set_sr(0xFFFF);
        assert_eq!(regs.sr, 0xA71F);
    }
}
