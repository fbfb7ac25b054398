//! Line 4 control and stack instructions.

use emu_core::Bus;

use crate::Size;
use crate::cpu::Cpu68000;
use crate::ea::fields;
use crate::error::Fault;
use crate::flags::Status;
use crate::timing::RESET;

/// First TRAP vector.
const TRAP_BASE: u8 = 32;

impl Cpu68000 {
    /// SWAP Dn, or PEA for a control EA.
    pub(crate) fn exec_swap_pea<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        if mode == 0 {
            let dn = usize::from(reg);
            let value = self.regs.d[dn].rotate_left(16);
            self.regs.d[dn] = value;
            self.set_logic_flags(Status::nz(Size::Long, value));
            return Ok(());
        }
        let address = self.resolve_address(bus, mode, reg, "PEA")?;
        self.push_long(bus, address)
    }

    pub(crate) fn exec_lea<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        let address = self.resolve_address(bus, mode, reg, "LEA")?;
        self.regs.set_a(usize::from((self.ird >> 9) & 7), address);
        Ok(())
    }

    pub(crate) fn exec_jmp<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        let target = self.resolve_address(bus, mode, reg, "JMP")?;
        self.jump(bus, target)
    }

    /// The return address is pushed after the target has been fetched.
    pub(crate) fn exec_jsr<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        let target = self.resolve_address(bus, mode, reg, "JSR")?;
        let return_pc = self.regs.pc.wrapping_sub(2);
        self.jump(bus, target)?;
        self.push_long(bus, return_pc)
    }

    /// Load PC and refill IRC. The fetch that ends the instruction moves
    /// the target opcode into IR.
    pub(crate) fn jump<B: Bus + ?Sized>(&mut self, bus: &mut B, target: u32) -> Result<(), Fault> {
        self.regs.pc = target;
        self.fetch(bus)
    }

    /// 0x4E40-0x4E7F.
    pub(crate) fn exec_misc<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), Fault> {
        let low = self.ird & 0x3F;
        let reg = usize::from(self.ird & 7);
        match low {
            0x00..=0x0F => Err(Fault::Exception {
                vector: TRAP_BASE + low as u8,
                return_pc: self.regs.pc.wrapping_sub(2),
            }),
            0x10..=0x17 => self.link(bus, reg),
            0x18..=0x1F => {
                let sp = self.regs.a(reg);
                self.regs.set_sp(sp);
                let value = self.pop_long(bus)?;
                self.regs.set_a(reg, value);
                Ok(())
            }
            0x20..=0x2F => {
                self.require_supervisor()?;
                if low & 0x08 != 0 {
                    self.regs.set_a(reg, self.regs.usp);
                } else {
                    self.regs.usp = self.regs.a(reg);
                }
                Ok(())
            }
            0x30 => {
                self.require_supervisor()?;
                log::debug!("RESET instruction at {:06X}", self.instr_pc);
                self.cycles += RESET;
                self.reload_vectors(bus)?;
                self.fetch(bus)
            }
            0x31 => Ok(()),
            0x32 => Err(self.unimplemented("STOP")),
            0x33 => {
                self.require_supervisor()?;
                let sr = self.pop_word(bus)?;
                let pc = self.pop_long(bus)?;
                self.regs.set_sr(sr);
                self.jump(bus, pc)
            }
            0x35 => {
                let pc = self.pop_long(bus)?;
                self.jump(bus, pc)
            }
            0x36 => Err(self.unimplemented("TRAPV")),
            0x37 => Err(self.unimplemented("RTR")),
            _ => Err(self.illegal("ILLEGAL")),
        }
    }

    /// LINK An,#d16. LINK A7 pushes the already decremented stack pointer.
    fn link<B: Bus + ?Sized>(&mut self, bus: &mut B, an: usize) -> Result<(), Fault> {
        let displacement = Size::Word.sign_extend(u32::from(self.next_word(bus)?));
        let value = if an == 7 {
            self.regs.sp().wrapping_sub(4)
        } else {
            self.regs.a(an)
        };
        self.push_long(bus, value)?;
        let sp = self.regs.sp();
        self.regs.set_a(an, sp);
        self.regs.set_sp(sp.wrapping_add(displacement));
        Ok(())
    }
}
