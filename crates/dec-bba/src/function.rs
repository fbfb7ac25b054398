//! The sixteen two-input boolean functions.
//!
//! A function code is a 4-bit truth table indexed by the inverted inputs:
//!
//! ```text
//! bit  0: src=1 dst=1
//! bit  1: src=1 dst=0
//! bit  2: src=0 dst=1
//! bit  3: src=0 dst=0
//! ```
//!
//! so 0b0011 passes the source, 0b1100 inverts it, 0b0101 keeps the
//! destination and 0b0110 is exclusive-or.

/// Apply function `code` to one source and one destination bit.
#[must_use]
pub const fn apply(code: u16, src: bool, dst: bool) -> bool {
    let index = (if src { 0 } else { 2 }) + (if dst { 0 } else { 1 });
    (code >> index) & 1 != 0
}
