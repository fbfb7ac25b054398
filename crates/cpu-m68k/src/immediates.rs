//! Line 0: immediate arithmetic and logic, and the bit operations.

use emu_core::Bus;

use crate::Size;
use crate::alu::{AluOp, alu};
use crate::cpu::Cpu68000;
use crate::decode::{BitOp, ImmOp};
use crate::ea::{DATA, DATA_ALTERABLE, Operand, fields};
use crate::error::Fault;
use crate::flags::{CCR_MASK, X, Z};
use crate::timing::{LONG_REGISTER_OP, bit_register};

impl ImmOp {
    const fn mnemonic(self) -> &'static str {
        match self {
            Self::Or => "ORI",
            Self::And => "ANDI",
            Self::Sub => "SUBI",
            Self::Add => "ADDI",
            Self::Eor => "EORI",
            Self::Cmp => "CMPI",
        }
    }
}

impl BitOp {
    const fn mnemonic(self) -> &'static str {
        match self {
            Self::Test => "BTST",
            Self::Change => "BCHG",
            Self::Clear => "BCLR",
            Self::Set => "BSET",
        }
    }

    /// The operand with `mask` applied, or `None` for BTST.
    const fn apply(self, value: u32, mask: u32) -> Option<u32> {
        match self {
            Self::Test => None,
            Self::Change => Some(value ^ mask),
            Self::Clear => Some(value & !mask),
            Self::Set => Some(value | mask),
        }
    }
}

impl Cpu68000 {
    pub(crate) fn exec_immediate<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        op: ImmOp,
        size: Size,
    ) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        if mode == 7 && reg == 4 {
            return self.immediate_to_status(bus, op, size);
        }

        self.check_ea(mode, reg, size, DATA_ALTERABLE, op.mnemonic())?;
        let src = self.read_immediate(bus, size)?;
        let operand = self.resolve(bus, mode, reg, size)?;
        let dst = self.read_operand(bus, operand, size)?;
        let extend = self.regs.sr & X != 0;

        match op {
            ImmOp::Cmp => {
                let result = alu(AluOp::Sub, size, src, dst, extend);
                self.set_compare_flags(result.flags);
            }
            ImmOp::Add | ImmOp::Sub => {
                let alu_op = if op == ImmOp::Add { AluOp::Add } else { AluOp::Sub };
                let result = alu(alu_op, size, src, dst, extend);
                self.write_operand(bus, operand, size, result.value)?;
                self.set_arith_flags(result.flags);
            }
            ImmOp::Or | ImmOp::And | ImmOp::Eor => {
                let alu_op = match op {
                    ImmOp::Or => AluOp::Or,
                    ImmOp::And => AluOp::And,
                    _ => AluOp::Eor,
                };
                let result = alu(alu_op, size, src, dst, extend);
                self.write_operand(bus, operand, size, result.value)?;
                self.set_logic_flags(result.flags);
            }
        }

        if size == Size::Long && matches!(operand, Operand::Data(_)) {
            self.cycles += LONG_REGISTER_OP;
        }
        Ok(())
    }

    /// ORI/ANDI/EORI to CCR (byte) and to SR (word, privileged).
    fn immediate_to_status<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        op: ImmOp,
        size: Size,
    ) -> Result<(), Fault> {
        let combine: fn(u16, u16) -> u16 = match op {
            ImmOp::Or => |current, imm| current | imm,
            ImmOp::And => |current, imm| current & imm,
            ImmOp::Eor => |current, imm| current ^ imm,
            _ => return Err(self.illegal(op.mnemonic())),
        };

        match size {
            Size::Byte => {
                let imm = self.read_immediate(bus, Size::Byte)? as u16;
                self.regs.set_ccr(combine(self.regs.sr & CCR_MASK, imm));
                Ok(())
            }
            Size::Word => {
                self.require_supervisor()?;
                let imm = self.read_immediate(bus, Size::Word)? as u16;
                self.regs.set_sr(combine(self.regs.sr, imm));
                Ok(())
            }
            Size::Long => Err(self.illegal(op.mnemonic())),
        }
    }

    /// BTST/BCHG/BCLR/BSET with the bit number in a data register.
    pub(crate) fn exec_bit_dynamic<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        op: BitOp,
    ) -> Result<(), Fault> {
        let (mode, _) = fields(self.ird);
        if mode == 1 {
            return Err(self.unimplemented("MOVEP"));
        }
        let bit = self.regs.d[usize::from((self.ird >> 9) & 7)];
        let allowed = if op == BitOp::Test { DATA } else { DATA_ALTERABLE };
        self.bit_operation(bus, op, bit, allowed)
    }

    /// Bit operations with the bit number in an extension word.
    pub(crate) fn exec_bit_static<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        op: BitOp,
    ) -> Result<(), Fault> {
        let bit = u32::from(self.next_word(bus)?) & 0xFF;
        // #imm is not a valid destination for the static form
        let allowed = if op == BitOp::Test {
            DATA & !(1 << 11)
        } else {
            DATA_ALTERABLE
        };
        self.bit_operation(bus, op, bit, allowed)
    }

    /// Data registers are 32 bits wide; memory operands are single bytes.
    fn bit_operation<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        op: BitOp,
        bit: u32,
        allowed: u16,
    ) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        let (size, bit) = if mode == 0 {
            (Size::Long, bit % 32)
        } else {
            (Size::Byte, bit % 8)
        };
        let (operand, value) = self.read_ea(bus, mode, reg, size, allowed, op.mnemonic())?;

        let mask = 1u32 << bit;
        let zero = if value & mask == 0 { Z } else { 0 };
        self.apply_flags(Z, zero);

        if mode == 0 {
            self.cycles += if op == BitOp::Test { 2 } else { bit_register(bit) };
        }
        if let Some(updated) = op.apply(value, mask) {
            self.write_operand(bus, operand, size, updated)?;
        }
        Ok(())
    }
}
