//! Dispatch from the decoded class to its handler.

use emu_core::Bus;

use crate::cpu::Cpu68000;
use crate::decode::{DISPATCH, Op};
use crate::error::Fault;

impl Cpu68000 {
    pub(crate) fn dispatch<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), Fault> {
        match DISPATCH[usize::from(self.ird >> 6)] {
            Op::Immediate(op, size) => self.exec_immediate(bus, op, size),
            Op::BitDynamic(op) => self.exec_bit_dynamic(bus, op),
            Op::BitStatic(op) => self.exec_bit_static(bus, op),

            Op::Move(size) => self.exec_move(bus, size),
            Op::MoveA(size) => self.exec_movea(bus, size),
            Op::MoveFromSr => self.exec_move_from_sr(bus),
            Op::MoveToCcr => self.exec_move_to_ccr(bus),
            Op::MoveToSr => self.exec_move_to_sr(bus),
            Op::Moveq => {
                self.exec_moveq();
                Ok(())
            }

            Op::Clr(size) => self.exec_clr(bus, size),
            Op::Neg(size) => self.exec_neg(bus, size),
            Op::Not(size) => self.exec_not(bus, size),
            Op::Tst(size) => self.exec_tst(bus, size),
            Op::SwapPea => self.exec_swap_pea(bus),
            Op::ExtMovem(size) => self.exec_ext_movem(bus, size),
            Op::TasIllegal => {
                if self.ird == 0x4AFC {
                    Err(self.illegal("ILLEGAL"))
                } else {
                    Err(self.unimplemented("TAS"))
                }
            }
            Op::MovemLoad(size) => self.exec_movem_load(bus, size),
            Op::Misc => self.exec_misc(bus),
            Op::Jsr => self.exec_jsr(bus),
            Op::Jmp => self.exec_jmp(bus),
            Op::Lea => self.exec_lea(bus),

            Op::Addq(size) => self.exec_quick(bus, size, false),
            Op::Subq(size) => self.exec_quick(bus, size, true),
            Op::DbccScc => self.exec_dbcc_scc(bus),
            Op::Bra => self.exec_bra(bus),
            Op::Bsr => self.exec_bsr(bus),
            Op::Bcc => self.exec_bcc(bus),

            Op::Dyadic { op, size, to_mem } => self.exec_dyadic(bus, op, size, to_mem),
            Op::AddrArith(op, size) => self.exec_addr_arith(bus, op, size),
            Op::Mulu => self.exec_mul(bus, false),
            Op::Muls => self.exec_mul(bus, true),
            Op::Divu => self.exec_divu(bus),
            Op::Divs => self.exec_divs(bus),

            Op::Shift(size) => self.exec_shift(size),
            Op::ShiftMemory => Err(self.unimplemented("shift memory")),

            Op::Unimplemented(mnemonic) => Err(self.unimplemented(mnemonic)),
            Op::Illegal => Err(self.illegal("ILLEGAL")),
        }
    }
}
