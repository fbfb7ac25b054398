//! Status register layout.
//!
//! ```text
//!  15 14 13 12 11 10  9  8  7  6  5  4  3  2  1  0
//!   T  -  S  -  - I2 I1 I0  -  -  -  X  N  Z  V  C
//! ```

use crate::Size;

/// Carry.
pub const C: u16 = 0x0001;
/// Overflow.
pub const V: u16 = 0x0002;
/// Zero.
pub const Z: u16 = 0x0004;
/// Negative.
pub const N: u16 = 0x0008;
/// Extend.
pub const X: u16 = 0x0010;
/// Supervisor state.
pub const S: u16 = 0x2000;
/// Trace.
pub const T: u16 = 0x8000;

/// Interrupt priority mask, bits 8-10.
pub const INT_MASK: u16 = 0x0700;
/// Bits of the condition code register.
pub const CCR_MASK: u16 = 0x001F;
/// Bits that exist on a 68000; the rest read as zero.
pub const SR_MASK: u16 = 0xA71F;

/// Status register helper functions.
pub struct Status;

impl Status {
    /// N and Z for `value` at width `size`, other bits cleared.
    #[must_use]
    pub const fn nz(size: Size, value: u32) -> u16 {
        let mut flags = 0;
        if value & size.mask() == 0 {
            flags |= Z;
        }
        if size.is_negative(value) {
            flags |= N;
        }
        flags
    }

    /// Replace the bits selected by `mask` in `sr` with those in `flags`.
    #[must_use]
    pub const fn update(sr: u16, mask: u16, flags: u16) -> u16 {
        (sr & !mask) | (flags & mask)
    }

    /// Evaluate one of the sixteen condition codes.
    ///
    /// Odd codes are the inverse of the even code below them.
    #[must_use]
    pub const fn condition(sr: u16, cc: u8) -> bool {
        let c = sr & C != 0;
        let v = sr & V != 0;
        let z = sr & Z != 0;
        let n = sr & N != 0;
        let holds = match cc & 0x0E {
            0x0 => true,
            0x2 => !c && !z,
            0x4 => !c,
            0x6 => !z,
            0x8 => !v,
            0xA => !n,
            0xC => n == v,
            _ => !z && n == v,
        };
        if cc & 1 != 0 { !holds } else { holds }
    }
}
