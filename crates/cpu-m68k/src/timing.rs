//! Cycle costs beyond the four-cycle bus access.
//!
//! Every bus access (including each prefetch) is charged when it happens.
//! The constants here cover internal processor time so that the elapsed
//! count returned by `step` roughly tracks a real 68000 at 10 MHz.

use crate::Size;

/// Cycles per bus access.
pub(crate) const BUS_CYCLE: u64 = 4;

/// Address calculation for -(An) and indexed source operands.
pub(crate) const EA_CALC: u64 = 2;

pub(crate) const BRANCH_TAKEN: u64 = 2;
pub(crate) const BRANCH_NOT_TAKEN: u64 = 4;
pub(crate) const DBCC: u64 = 2;
pub(crate) const EXG: u64 = 2;
pub(crate) const MOVE_TO_SR: u64 = 4;
pub(crate) const LONG_REGISTER_OP: u64 = 4;
pub(crate) const LONG_ALU: u64 = 2;
pub(crate) const ADDRESS_ARITH: u64 = 4;
pub(crate) const EXCEPTION: u64 = 6;
pub(crate) const INTERRUPT_ACK: u64 = 10;
pub(crate) const RESET: u64 = 124;

/// Internal time of a register shift by `count` bits.
pub(crate) const fn shift(size: Size, count: u32) -> u64 {
    let base = match size {
        Size::Long => 4,
        Size::Byte | Size::Word => 2,
    };
    base + 2 * count as u64
}

/// Register bit operations on bits 16-31 take longer.
pub(crate) const fn bit_register(bit: u32) -> u64 {
    if bit < 16 { 2 } else { 4 }
}

/// MULU: 38 + 2n cycles total, n = number of ones in the source.
pub(crate) const fn mulu(src: u16) -> u64 {
    34 + 2 * src.count_ones() as u64
}

/// MULS: 38 + 2n cycles total, n = number of 01 or 10 pairs in `src << 1`.
pub(crate) const fn muls(src: u16) -> u64 {
    let pattern = (src as u32) << 1;
    let transitions = (pattern ^ (pattern >> 1)) & 0xFFFF;
    34 + 2 * transitions.count_ones() as u64
}

/// DIVU microcycle count (restoring division, one pass per quotient bit).
pub(crate) fn divu(dividend: u32, divisor: u16) -> u64 {
    if (dividend >> 16) >= u32::from(divisor) {
        return 6;
    }

    let mut cycles: u64 = 38;
    let shifted_divisor = u32::from(divisor) << 16;
    let mut rest = dividend;
    for _ in 0..15 {
        let carried = rest & 0x8000_0000 != 0;
        rest <<= 1;
        if carried {
            rest = rest.wrapping_sub(shifted_divisor);
        } else {
            cycles += 2;
            if rest >= shifted_divisor {
                rest = rest.wrapping_sub(shifted_divisor);
                cycles -= 1;
            }
        }
    }
    cycles * 2 - 4
}

/// DIVS microcycle count, driven by the magnitude of the quotient.
pub(crate) fn divs(dividend: i32, divisor: i16) -> u64 {
    let mut cycles: u64 = if dividend < 0 { 7 } else { 6 };
    let magnitude = dividend.unsigned_abs();
    let divisor_magnitude = u32::from(divisor.unsigned_abs());

    if (magnitude >> 16) >= divisor_magnitude {
        return (cycles + 2) * 2 - 4;
    }

    cycles += 55;
    if divisor >= 0 {
        if dividend >= 0 {
            cycles -= 1;
        } else {
            cycles += 1;
        }
    }

    let mut quotient = magnitude / divisor_magnitude;
    for _ in 0..15 {
        if quotient & 0x8000 == 0 {
            cycles += 1;
        }
        quotient <<= 1;
    }
    cycles * 2 - 4
}
