//! Bcc, BRA, BSR, DBcc and Scc.
//!
//! Branch displacements are relative to the opcode address plus two. An
//! eight-bit displacement of zero means a sixteen-bit one follows.

use emu_core::Bus;

use crate::Size;
use crate::cpu::Cpu68000;
use crate::ea::{DATA_ALTERABLE, fields};
use crate::error::Fault;
use crate::flags::Status;
use crate::timing::{BRANCH_NOT_TAKEN, BRANCH_TAKEN, DBCC};

impl Cpu68000 {
    /// Target of a Bcc, BRA or BSR, consuming the word displacement if present.
    fn branch_target<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<u32, Fault> {
        let base = self.regs.pc.wrapping_sub(2);
        let displacement = match self.ird & 0xFF {
            0 => Size::Word.sign_extend(u32::from(self.next_word(bus)?)),
            short => Size::Byte.sign_extend(u32::from(short)),
        };
        Ok(base.wrapping_add(displacement))
    }

    fn condition(&self) -> bool {
        Status::condition(self.regs.sr, ((self.ird >> 8) & 0xF) as u8)
    }

    pub(crate) fn exec_bra<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), Fault> {
        let target = self.branch_target(bus)?;
        self.cycles += BRANCH_TAKEN;
        self.jump(bus, target)
    }

    pub(crate) fn exec_bsr<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), Fault> {
        let target = self.branch_target(bus)?;
        let return_pc = self.regs.pc.wrapping_sub(2);
        self.cycles += BRANCH_TAKEN;
        self.push_long(bus, return_pc)?;
        self.jump(bus, target)
    }

    pub(crate) fn exec_bcc<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), Fault> {
        let target = self.branch_target(bus)?;
        if self.condition() {
            self.cycles += BRANCH_TAKEN;
            self.jump(bus, target)
        } else {
            self.cycles += BRANCH_NOT_TAKEN;
            Ok(())
        }
    }

    /// DBcc for mode 1, Scc otherwise.
    pub(crate) fn exec_dbcc_scc<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        let holds = self.condition();

        if mode == 1 {
            let base = self.regs.pc.wrapping_sub(2);
            let displacement = Size::Word.sign_extend(u32::from(self.next_word(bus)?));
            self.cycles += DBCC;
            if holds {
                return Ok(());
            }
            let dn = usize::from(reg);
            let count = (self.regs.d[dn] as u16).wrapping_sub(1);
            self.regs.set_d_sized(dn, Size::Word, u32::from(count));
            if count == 0xFFFF {
                return Ok(());
            }
            return self.jump(bus, base.wrapping_add(displacement));
        }

        self.check_ea(mode, reg, Size::Byte, DATA_ALTERABLE, "Scc")?;
        let operand = self.resolve(bus, mode, reg, Size::Byte)?;
        self.write_operand(bus, operand, Size::Byte, if holds { 0xFF } else { 0 })
    }
}
