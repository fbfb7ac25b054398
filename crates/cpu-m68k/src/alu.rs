//! Arithmetic, logic and shift primitives.
//!
//! Byte and word operations are computed at their own width. Long
//! operations are two chained word operations: the low word's carry feeds
//! the high word, N, V and C come from the high word, and Z needs both
//! halves to be zero.
//!
//! The functions here are pure. They return the result together with the
//! N, Z, V and C bits; callers decide whether X follows C.

use crate::Size;
use crate::flags::{C, N, V, Z};

/// Two-operand ALU function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    /// `dst + src + X`.
    AddCarry,
    Sub,
    /// `dst - src - X`.
    SubBorrow,
    Or,
    And,
    Eor,
}

/// Result value and N/Z/V/C flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u32,
    pub flags: u16,
}

/// Compute `dst op src` at width `size`.
///
/// `extend` is the incoming X bit and is only read by the carry and borrow
/// forms.
#[must_use]
pub fn alu(op: AluOp, size: Size, src: u32, dst: u32, extend: bool) -> AluResult {
    match size {
        Size::Byte => narrow(op, 0xFF, src, dst, extend),
        Size::Word => narrow(op, 0xFFFF, src, dst, extend),
        Size::Long => {
            let lo = narrow(op, 0xFFFF, src & 0xFFFF, dst & 0xFFFF, extend);
            let chained = match op {
                AluOp::Add | AluOp::AddCarry => AluOp::AddCarry,
                AluOp::Sub | AluOp::SubBorrow => AluOp::SubBorrow,
                logic => logic,
            };
            let hi = narrow(chained, 0xFFFF, src >> 16, dst >> 16, lo.flags & C != 0);
            let value = (hi.value << 16) | lo.value;
            let mut flags = hi.flags & (N | V | C);
            if lo.flags & hi.flags & Z != 0 {
                flags |= Z;
            }
            AluResult { value, flags }
        }
    }
}

fn narrow(op: AluOp, mask: u32, src: u32, dst: u32, extend: bool) -> AluResult {
    let sign = (mask >> 1) + 1;
    let s = src & mask;
    let d = dst & mask;
    let x = u32::from(extend);

    let (raw, carry, overflow) = match op {
        AluOp::Add | AluOp::AddCarry => {
            let x = if op == AluOp::AddCarry { x } else { 0 };
            let r = d + s + x;
            (r, r > mask, !(s ^ d) & (s ^ r) & sign != 0)
        }
        AluOp::Sub | AluOp::SubBorrow => {
            let x = if op == AluOp::SubBorrow { x } else { 0 };
            let r = d.wrapping_sub(s).wrapping_sub(x);
            (r, s + x > d, (s ^ d) & (r ^ d) & sign != 0)
        }
        AluOp::Or => (d | s, false, false),
        AluOp::And => (d & s, false, false),
        AluOp::Eor => (d ^ s, false, false),
    };

    let value = raw & mask;
    let mut flags = 0;
    if value == 0 {
        flags |= Z;
    }
    if value & sign != 0 {
        flags |= N;
    }
    if overflow {
        flags |= V;
    }
    if carry {
        flags |= C;
    }
    AluResult { value, flags }
}

/// Register shift and rotate kinds (rotate-through-extend is not included).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftOp {
    Asl,
    Asr,
    Lsl,
    Lsr,
    Rol,
    Ror,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftResult {
    pub value: u32,
    /// Last bit shifted out; false for a zero count.
    pub carry: bool,
    /// ASL only: the sign bit changed at some step.
    pub overflow: bool,
}

/// Shift `value` by `count` single-bit steps at width `size`.
///
/// Counts above the operand width are legal and keep stepping, so a
/// logical shift by 40 of a long ends with carry clear.
#[must_use]
pub fn shift(op: ShiftOp, size: Size, value: u32, count: u32) -> ShiftResult {
    let mask = size.mask();
    let msb = size.msb();
    let mut v = value & mask;
    let mut carry = false;
    let mut overflow = false;

    for _ in 0..count {
        match op {
            ShiftOp::Asl | ShiftOp::Lsl => {
                carry = v & msb != 0;
                let next = (v << 1) & mask;
                if op == ShiftOp::Asl && (next ^ v) & msb != 0 {
                    overflow = true;
                }
                v = next;
            }
            ShiftOp::Asr => {
                carry = v & 1 != 0;
                v = (v >> 1) | (v & msb);
            }
            ShiftOp::Lsr => {
                carry = v & 1 != 0;
                v >>= 1;
            }
            ShiftOp::Rol => {
                carry = v & msb != 0;
                v = ((v << 1) & mask) | u32::from(carry);
            }
            ShiftOp::Ror => {
                carry = v & 1 != 0;
                v = (v >> 1) | if carry { msb } else { 0 };
            }
        }
    }

    ShiftResult {
        value: v,
        carry,
        overflow,
    }
}
