//! Single-operand logic: CLR, NOT and TST.

use emu_core::Bus;

use crate::Size;
use crate::cpu::Cpu68000;
use crate::ea::{DATA_ALTERABLE, Operand, fields};
use crate::error::Fault;
use crate::flags::{C, N, Status, V, Z};
use crate::timing::LONG_ALU;

impl Cpu68000 {
    pub(crate) fn exec_clr<B: Bus + ?Sized>(&mut self, bus: &mut B, size: Size) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        self.check_ea(mode, reg, size, DATA_ALTERABLE, "CLR")?;
        let operand = self.resolve(bus, mode, reg, size)?;
        self.write_operand(bus, operand, size, 0)?;
        self.apply_flags(N | Z | V | C, Z);
        if size == Size::Long && matches!(operand, Operand::Data(_)) {
            self.cycles += LONG_ALU;
        }
        Ok(())
    }

    pub(crate) fn exec_not<B: Bus + ?Sized>(&mut self, bus: &mut B, size: Size) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        self.check_ea(mode, reg, size, DATA_ALTERABLE, "NOT")?;
        let operand = self.resolve(bus, mode, reg, size)?;
        let value = !self.read_operand(bus, operand, size)? & size.mask();
        self.write_operand(bus, operand, size, value)?;
        self.set_logic_flags(Status::nz(size, value));
        if size == Size::Long && matches!(operand, Operand::Data(_)) {
            self.cycles += LONG_ALU;
        }
        Ok(())
    }

    pub(crate) fn exec_tst<B: Bus + ?Sized>(&mut self, bus: &mut B, size: Size) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        let (_, value) = self.read_ea(bus, mode, reg, size, DATA_ALTERABLE, "TST")?;
        self.set_logic_flags(Status::nz(size, value));
        Ok(())
    }
}
