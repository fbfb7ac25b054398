//! Exception entry.
//!
//! Group 1 and 2 frames (traps, interrupts, privilege violation) hold SR and
//! the return PC. Address errors add the faulting access: an information
//! word, the access address and the opcode.

use emu_core::Bus;

use crate::cpu::{Cpu68000, double_fault};
use crate::error::{CpuError, Fault};
use crate::flags::{S, T};
use crate::timing::EXCEPTION;

/// Address error vector.
const ADDRESS_ERROR: u8 = 3;

impl Cpu68000 {
    /// Enter supervisor mode and vector through `vector`.
    ///
    /// `sr` is the status register to save, which interrupt entry captures
    /// before raising the mask.
    pub(crate) fn exception<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        vector: u8,
        sr: u16,
        return_pc: u32,
    ) -> Result<(), CpuError> {
        log::debug!("exception vector {vector} from {return_pc:06X}");
        self.cycles += EXCEPTION;
        self.regs.sr = (self.regs.sr & !T) | S;
        self.short_frame(bus, sr, return_pc)
            .and_then(|()| self.jump_vector(bus, vector))
            .map_err(|fault| double_fault(vector, fault))
    }

    /// Build the fourteen-byte address error frame and take vector 3.
    pub(crate) fn address_error<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        address: u32,
        write: bool,
        program: bool,
    ) -> Result<(), CpuError> {
        log::debug!(
            "address error {} {address:06X} at {:06X}",
            if write { "writing" } else { "reading" },
            self.instr_pc
        );
        let sr = self.regs.sr;
        let mut info = self.ird & 0xFFE0;
        if !write {
            info |= 0x10;
        }
        info |= function_code(sr & S != 0, program);

        self.cycles += EXCEPTION;
        self.regs.sr = (sr & !T) | S;
        let return_pc = self.instr_pc.wrapping_add(2);
        let ird = self.ird;
        self.short_frame(bus, sr, return_pc)
            .and_then(|()| self.push_word(bus, ird))
            .and_then(|()| self.push_word(bus, address as u16))
            .and_then(|()| self.push_word(bus, (address >> 16) as u16))
            .and_then(|()| self.push_word(bus, info))
            .and_then(|()| self.jump_vector(bus, ADDRESS_ERROR))
            .map_err(|fault| double_fault(ADDRESS_ERROR, fault))
    }

    /// PC low word, PC high word, then SR.
    fn short_frame<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        sr: u16,
        return_pc: u32,
    ) -> Result<(), Fault> {
        self.push_word(bus, return_pc as u16)?;
        self.push_word(bus, (return_pc >> 16) as u16)?;
        self.push_word(bus, sr)
    }

    fn jump_vector<B: Bus + ?Sized>(&mut self, bus: &mut B, vector: u8) -> Result<(), Fault> {
        self.regs.pc = self.read_long(bus, u32::from(vector) * 4)?;
        self.fetch(bus)?;
        self.fetch(bus)
    }
}

/// Function code for a data or program access in user or supervisor state.
const fn function_code(supervisor: bool, program: bool) -> u16 {
    let space = if program { 2 } else { 1 };
    if supervisor { 4 | space } else { space }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::SimpleBus;

    #[test]
    fn frame_holds_sr_and_return_pc() {
        let mut bus = SimpleBus::new();
        bus.load(0x80, &[0x00, 0x00, 0x40, 0x00]); // vector 32 -> 0x4000
        let mut cpu = Cpu68000::new();
        cpu.regs.ssp = 0x1000;
        cpu.regs.set_sr(0x0015);
        cpu.regs.usp = 0x8000;

        cpu.exception(&mut bus, 32, 0x0015, 0x0012_3456).expect("frame");

        assert_eq!(cpu.regs.ssp, 0x0FFA);
        assert_eq!(cpu.regs.usp, 0x8000);
        assert_eq!(cpu.regs.sr, 0x2015);
        assert_eq!(bus.peek(0x0FFA), 0x00);
        assert_eq!(bus.peek(0x0FFB), 0x15);
        assert_eq!(
            [bus.peek(0x0FFC), bus.peek(0x0FFD), bus.peek(0x0FFE), bus.peek(0x0FFF)],
            [0x00, 0x12, 0x34, 0x56]
        );
        assert_eq!(cpu.regs.pc, 0x4004);
    }

    #[test]
    fn odd_stack_is_a_double_fault() {
        let mut bus = SimpleBus::new();
        let mut cpu = Cpu68000::new();
        cpu.regs.ssp = 0x1001;
        assert_eq!(
            cpu.exception(&mut bus, 5, 0x2700, 0x400),
            Err(CpuError::DoubleFault {
                vector: 5,
                address: 0x0FFF
            })
        );
    }

    #[test]
    fn function_codes() {
        assert_eq!(function_code(true, true), 6);
        assert_eq!(function_code(true, false), 5);
        assert_eq!(function_code(false, false), 1);
    }
}
