//! Opcode decode into a 1024-entry dispatch table.
//!
//! The top ten bits of an opcode (line, register/mode fields and size)
//! select the instruction class. Lower bits (the source EA and a few
//! sub-forms such as EXG or the Misc group) are left to the handler.

use crate::Size;

/// Bit manipulation kind, from opcode bits 7-6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BitOp {
    Test,
    Change,
    Clear,
    Set,
}

impl BitOp {
    const fn from_bits(bits: u16) -> Self {
        match bits & 3 {
            0 => Self::Test,
            1 => Self::Change,
            2 => Self::Clear,
            _ => Self::Set,
        }
    }
}

/// Immediate-source forms on line 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImmOp {
    Or,
    And,
    Sub,
    Add,
    Eor,
    Cmp,
}

/// Two-operand arithmetic and logic on lines 8, 9, B, C and D.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DyOp {
    Or,
    Sub,
    And,
    Add,
    Eor,
    Cmp,
}

/// ADDA, SUBA and CMPA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AddrOp {
    Add,
    Sub,
    Cmp,
}

/// Instruction class selected by the top ten opcode bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Immediate(ImmOp, Size),
    /// Bit number in Dn; mode 1 is MOVEP.
    BitDynamic(BitOp),
    BitStatic(BitOp),

    Move(Size),
    MoveA(Size),
    MoveFromSr,
    MoveToCcr,
    MoveToSr,
    Moveq,

    Clr(Size),
    Neg(Size),
    Not(Size),
    Tst(Size),
    /// SWAP for Dn, PEA otherwise.
    SwapPea,
    /// EXT for Dn, MOVEM registers to memory otherwise.
    ExtMovem(Size),
    /// ILLEGAL (0x4AFC) or TAS.
    TasIllegal,
    MovemLoad(Size),
    /// 0x4E40-0x4E7F: TRAP, LINK, UNLK, MOVE USP and the fixed opcodes.
    Misc,
    Jsr,
    Jmp,
    Lea,

    Addq(Size),
    Subq(Size),
    DbccScc,
    Bra,
    Bsr,
    Bcc,

    Dyadic { op: DyOp, size: Size, to_mem: bool },
    AddrArith(AddrOp, Size),
    Mulu,
    Muls,
    Divu,
    Divs,

    Shift(Size),
    ShiftMemory,

    Unimplemented(&'static str),
    Illegal,
}

pub(crate) static DISPATCH: [Op; 1024] = build_table();

const fn build_table() -> [Op; 1024] {
    let mut table = [Op::Illegal; 1024];
    let mut i = 0;
    while i < 1024 {
        table[i] = decode((i as u16) << 6);
        i += 1;
    }
    table
}

/// Classify an opcode. Only bits 15-6 are examined.
pub(crate) const fn decode(opcode: u16) -> Op {
    let line = opcode >> 12;
    let reg_field = (opcode >> 9) & 7;
    let bit8 = opcode & 0x0100 != 0;
    let size_bits = (opcode >> 6) & 3;
    let size = Size::from_bits(size_bits);

    match line {
        0x0 => decode_line0(reg_field, bit8, size_bits, size),
        0x1 => decode_move(opcode, Size::Byte),
        0x2 => decode_move(opcode, Size::Long),
        0x3 => decode_move(opcode, Size::Word),
        0x4 => decode_line4(reg_field, bit8, size_bits, size),
        0x5 => match size {
            None => Op::DbccScc,
            Some(size) if bit8 => Op::Subq(size),
            Some(size) => Op::Addq(size),
        },
        0x6 => match (opcode >> 8) & 0xF {
            0 => Op::Bra,
            1 => Op::Bsr,
            _ => Op::Bcc,
        },
        0x7 => {
            if bit8 {
                Op::Illegal
            } else {
                Op::Moveq
            }
        }
        0x8 => match size {
            None if bit8 => Op::Divs,
            None => Op::Divu,
            Some(size) => Op::Dyadic {
                op: DyOp::Or,
                size,
                to_mem: bit8,
            },
        },
        0x9 => decode_dyadic(DyOp::Sub, AddrOp::Sub, bit8, size),
        0xB => match size {
            None => Op::AddrArith(AddrOp::Cmp, if bit8 { Size::Long } else { Size::Word }),
            Some(size) if bit8 => Op::Dyadic {
                op: DyOp::Eor,
                size,
                to_mem: true,
            },
            Some(size) => Op::Dyadic {
                op: DyOp::Cmp,
                size,
                to_mem: false,
            },
        },
        0xC => match size {
            None if bit8 => Op::Muls,
            None => Op::Mulu,
            Some(size) => Op::Dyadic {
                op: DyOp::And,
                size,
                to_mem: bit8,
            },
        },
        0xD => decode_dyadic(DyOp::Add, AddrOp::Add, bit8, size),
        0xE => match size {
            None => Op::ShiftMemory,
            Some(size) => Op::Shift(size),
        },
        0xA => Op::Unimplemented("LINE-A"),
        _ => Op::Unimplemented("LINE-F"),
    }
}

const fn decode_line0(reg_field: u16, bit8: bool, size_bits: u16, size: Option<Size>) -> Op {
    if bit8 {
        return Op::BitDynamic(BitOp::from_bits(size_bits));
    }
    if reg_field == 4 {
        return Op::BitStatic(BitOp::from_bits(size_bits));
    }
    let Some(size) = size else {
        return Op::Illegal;
    };
    match reg_field {
        0 => Op::Immediate(ImmOp::Or, size),
        1 => Op::Immediate(ImmOp::And, size),
        2 => Op::Immediate(ImmOp::Sub, size),
        3 => Op::Immediate(ImmOp::Add, size),
        5 => Op::Immediate(ImmOp::Eor, size),
        6 => Op::Immediate(ImmOp::Cmp, size),
        _ => Op::Illegal,
    }
}

const fn decode_move(opcode: u16, size: Size) -> Op {
    let dest_reg = (opcode >> 9) & 7;
    let dest_mode = (opcode >> 6) & 7;
    match dest_mode {
        1 if matches!(size, Size::Byte) => Op::Illegal,
        1 => Op::MoveA(size),
        7 if dest_reg > 1 => Op::Illegal,
        _ => Op::Move(size),
    }
}

const fn decode_line4(reg_field: u16, bit8: bool, size_bits: u16, size: Option<Size>) -> Op {
    if bit8 {
        return match size_bits {
            2 => Op::Unimplemented("CHK"),
            3 => Op::Lea,
            _ => Op::Illegal,
        };
    }
    match (reg_field, size) {
        (0, Some(_)) => Op::Unimplemented("NEGX"),
        (0, None) => Op::MoveFromSr,
        (1, Some(size)) => Op::Clr(size),
        (1, None) => Op::Illegal,
        (2, Some(size)) => Op::Neg(size),
        (2, None) => Op::MoveToCcr,
        (3, Some(size)) => Op::Not(size),
        (3, None) => Op::MoveToSr,
        (4, _) => match size_bits {
            0 => Op::Unimplemented("NBCD"),
            1 => Op::SwapPea,
            2 => Op::ExtMovem(Size::Word),
            _ => Op::ExtMovem(Size::Long),
        },
        (5, Some(size)) => Op::Tst(size),
        (5, None) => Op::TasIllegal,
        (6, _) => match size_bits {
            2 => Op::MovemLoad(Size::Word),
            3 => Op::MovemLoad(Size::Long),
            _ => Op::Illegal,
        },
        (_, _) => match size_bits {
            1 => Op::Misc,
            2 => Op::Jsr,
            3 => Op::Jmp,
            _ => Op::Illegal,
        },
    }
}

const fn decode_dyadic(op: DyOp, addr_op: AddrOp, bit8: bool, size: Option<Size>) -> Op {
    match size {
        None => Op::AddrArith(addr_op, if bit8 { Size::Long } else { Size::Word }),
        Some(size) => Op::Dyadic {
            op,
            size,
            to_mem: bit8,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(opcode: u16) -> Op {
        DISPATCH[(opcode >> 6) as usize]
    }

    #[test]
    fn move_lines_use_size_order_byte_long_word() {
        assert_eq!(op(0x1200), Op::Move(Size::Byte)); // MOVE.B D0,D1
        assert_eq!(op(0x2200), Op::Move(Size::Long)); // MOVE.L D0,D1
        assert_eq!(op(0x3200), Op::Move(Size::Word)); // MOVE.W D0,D1
        assert_eq!(op(0x2240), Op::MoveA(Size::Long)); // MOVEA.L D0,A1
        assert_eq!(op(0x1240), Op::Illegal); // MOVEA.B
        assert_eq!(op(0x25C0), Op::Illegal); // MOVE to mode 7 reg 2
    }

    #[test]
    fn line4_fixed_opcodes() {
        assert_eq!(op(0x4E75), Op::Misc); // RTS
        assert_eq!(op(0x4E71), Op::Misc); // NOP
        assert_eq!(op(0x4E90), Op::Jsr);
        assert_eq!(op(0x4ED0), Op::Jmp);
        assert_eq!(op(0x41D0), Op::Lea);
        assert_eq!(op(0x4AFC), Op::TasIllegal);
        assert_eq!(op(0x4840), Op::SwapPea);
        assert_eq!(op(0x48E7), Op::ExtMovem(Size::Long));
        assert_eq!(op(0x4CDF), Op::MovemLoad(Size::Long));
        assert_eq!(op(0x46FC), Op::MoveToSr);
    }

    #[test]
    fn register_forms_split_on_size_field() {
        assert_eq!(op(0x80C1), Op::Divu);
        assert_eq!(op(0x81C1), Op::Divs);
        assert_eq!(op(0xC0C1), Op::Mulu);
        assert_eq!(op(0xD0C8), Op::AddrArith(AddrOp::Add, Size::Word));
        assert_eq!(op(0xB1C8), Op::AddrArith(AddrOp::Cmp, Size::Long));
        assert_eq!(
            op(0xB340),
            Op::Dyadic {
                op: DyOp::Eor,
                size: Size::Word,
                to_mem: true
            }
        );
        assert_eq!(op(0x51C8), Op::DbccScc); // DBF
        assert_eq!(op(0xE3C0), Op::ShiftMemory);
    }

    #[test]
    fn line0_rejects_size_11_and_reg_7() {
        assert_eq!(op(0x00C0), Op::Illegal);
        assert_eq!(op(0x0E00), Op::Illegal);
        assert_eq!(op(0x0C40), Op::Immediate(ImmOp::Cmp, Size::Word));
        assert_eq!(op(0x0800), Op::BitStatic(BitOp::Test));
        assert_eq!(op(0x03C0), Op::BitDynamic(BitOp::Set));
    }

    #[test]
    fn unassigned_lines_stop_execution() {
        assert_eq!(op(0xA000), Op::Unimplemented("LINE-A"));
        assert_eq!(op(0xF000), Op::Unimplemented("LINE-F"));
    }
}
