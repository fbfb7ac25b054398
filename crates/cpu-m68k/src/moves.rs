//! Data movement: MOVE, MOVEA, MOVEQ, status register moves, EXT and MOVEM.

use emu_core::Bus;

use crate::Size;
use crate::cpu::Cpu68000;
use crate::ea::{
    ALL, CONTROL, CONTROL_ALTERABLE, DATA, DATA_ALTERABLE, Operand, POSTINCREMENT, PREDECREMENT,
    fields,
};
use crate::error::Fault;
use crate::flags::Status;
use crate::timing::MOVE_TO_SR;

impl Cpu68000 {
    /// MOVE <ea>,<ea>. The destination EA is encoded register-first in
    /// bits 11-6.
    pub(crate) fn exec_move<B: Bus + ?Sized>(&mut self, bus: &mut B, size: Size) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        let (_, value) = self.read_ea(bus, mode, reg, size, ALL, "MOVE")?;

        let dest_mode = (self.ird >> 6) & 7;
        let dest_reg = (self.ird >> 9) & 7;
        self.check_ea(dest_mode, dest_reg, size, DATA_ALTERABLE, "MOVE")?;
        let dest = self.resolve(bus, dest_mode, dest_reg, size)?;
        self.write_operand(bus, dest, size, value)?;
        self.set_logic_flags(Status::nz(size, value));
        Ok(())
    }

    pub(crate) fn exec_movea<B: Bus + ?Sized>(&mut self, bus: &mut B, size: Size) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        let (_, value) = self.read_ea(bus, mode, reg, size, ALL, "MOVEA")?;
        let an = usize::from((self.ird >> 9) & 7);
        self.regs.set_a(an, size.sign_extend(value));
        Ok(())
    }

    pub(crate) fn exec_moveq(&mut self) {
        let value = Size::Byte.sign_extend(u32::from(self.ird));
        self.regs.d[usize::from((self.ird >> 9) & 7)] = value;
        self.set_logic_flags(Status::nz(Size::Long, value));
    }

    pub(crate) fn exec_move_from_sr<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        self.check_ea(mode, reg, Size::Word, DATA_ALTERABLE, "MOVE from SR")?;
        let operand = self.resolve(bus, mode, reg, Size::Word)?;
        let sr = u32::from(self.regs.sr);
        self.write_operand(bus, operand, Size::Word, sr)
    }

    pub(crate) fn exec_move_to_ccr<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        let (_, value) = self.read_ea(bus, mode, reg, Size::Word, DATA, "MOVE to CCR")?;
        self.regs.set_ccr(value as u16);
        self.cycles += MOVE_TO_SR;
        Ok(())
    }

    pub(crate) fn exec_move_to_sr<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), Fault> {
        self.require_supervisor()?;
        let (mode, reg) = fields(self.ird);
        let (_, value) = self.read_ea(bus, mode, reg, Size::Word, DATA, "MOVE to SR")?;
        self.regs.set_sr(value as u16);
        self.cycles += MOVE_TO_SR;
        Ok(())
    }

    /// EXT.W/EXT.L for a data register, MOVEM registers-to-memory otherwise.
    pub(crate) fn exec_ext_movem<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        size: Size,
    ) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        if mode == 0 {
            let dn = usize::from(reg);
            let from = if size == Size::Word { Size::Byte } else { Size::Word };
            let value = from.sign_extend(self.regs.d[dn]);
            self.regs.set_d_sized(dn, size, value);
            self.set_logic_flags(Status::nz(size, value));
            return Ok(());
        }

        let mask = self.next_word(bus)?;
        self.check_ea(mode, reg, size, CONTROL_ALTERABLE | PREDECREMENT, "MOVEM")?;

        if mode == 4 {
            // -(An) takes the mask reversed: bit 0 is A7, bit 15 is D0
            let an = usize::from(reg);
            let mut address = self.regs.a(an);
            let mask = mask.reverse_bits();
            for i in (0..16).rev() {
                if mask & (1 << i) == 0 {
                    continue;
                }
                address = address.wrapping_sub(size.bytes());
                // An itself is stored with its value before the instruction
                let value = self.movem_register(i);
                self.write(bus, size, address, value)?;
            }
            self.regs.set_a(an, address);
            return Ok(());
        }

        let Operand::Memory(mut address) = self.resolve(bus, mode, reg, size)? else {
            return Err(self.illegal("MOVEM"));
        };
        for i in 0..16 {
            if mask & (1 << i) != 0 {
                let value = self.movem_register(i);
                self.write(bus, size, address, value)?;
                address = address.wrapping_add(size.bytes());
            }
        }
        Ok(())
    }

    /// MOVEM memory-to-registers. Word loads are sign-extended to 32 bits.
    pub(crate) fn exec_movem_load<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        size: Size,
    ) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        let mask = self.next_word(bus)?;
        self.check_ea(mode, reg, size, CONTROL | POSTINCREMENT, "MOVEM")?;

        let mut address = if mode == 3 {
            self.regs.a(usize::from(reg))
        } else {
            match self.resolve(bus, mode, reg, size)? {
                Operand::Memory(address) => address,
                _ => return Err(self.illegal("MOVEM")),
            }
        };

        for i in 0..16 {
            if mask & (1 << i) == 0 {
                continue;
            }
            let value = size.sign_extend(self.read(bus, size, address)?);
            if i < 8 {
                self.regs.d[i] = value;
            } else {
                self.regs.set_a(i - 8, value);
            }
            address = address.wrapping_add(size.bytes());
        }

        if mode == 3 {
            self.regs.set_a(usize::from(reg), address);
        }
        Ok(())
    }

    /// D0-D7 then A0-A7.
    fn movem_register(&self, i: usize) -> u32 {
        if i < 8 { self.regs.d[i] } else { self.regs.a(i - 8) }
    }
}
