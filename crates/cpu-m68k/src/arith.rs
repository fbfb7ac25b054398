//! Two-operand arithmetic, quick forms, negate, multiply and divide.

use emu_core::Bus;

use crate::Size;
use crate::alu::{AluOp, alu};
use crate::cpu::Cpu68000;
use crate::decode::{AddrOp, DyOp};
use crate::ea::{ALL, ALTERABLE, DATA, DATA_ALTERABLE, MEMORY_ALTERABLE, Operand, fields};
use crate::error::Fault;
use crate::flags::{C, N, Status, V, X, Z};
use crate::timing::{self, ADDRESS_ARITH, EXG, LONG_ALU, LONG_REGISTER_OP};

/// Divide-by-zero vector.
const ZERO_DIVIDE: u8 = 5;

impl DyOp {
    const fn mnemonic(self) -> &'static str {
        match self {
            Self::Or => "OR",
            Self::Sub => "SUB",
            Self::And => "AND",
            Self::Add => "ADD",
            Self::Eor => "EOR",
            Self::Cmp => "CMP",
        }
    }

    const fn alu(self) -> AluOp {
        match self {
            Self::Or => AluOp::Or,
            Self::Sub | Self::Cmp => AluOp::Sub,
            Self::And => AluOp::And,
            Self::Add => AluOp::Add,
            Self::Eor => AluOp::Eor,
        }
    }
}

impl Cpu68000 {
    pub(crate) fn apply_flags(&mut self, mask: u16, flags: u16) {
        self.regs.sr = Status::update(self.regs.sr, mask, flags);
    }

    /// ADD/SUB/NEG: X follows C.
    pub(crate) fn set_arith_flags(&mut self, flags: u16) {
        let extend = if flags & C != 0 { X } else { 0 };
        self.apply_flags(X | N | Z | V | C, flags | extend);
    }

    /// CMP: X unaffected.
    pub(crate) fn set_compare_flags(&mut self, flags: u16) {
        self.apply_flags(N | Z | V | C, flags);
    }

    /// Logic and moves: N and Z from the result, V and C cleared.
    pub(crate) fn set_logic_flags(&mut self, flags: u16) {
        self.apply_flags(N | Z | V | C, flags & (N | Z));
    }

    pub(crate) fn exec_dyadic<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        op: DyOp,
        size: Size,
        to_mem: bool,
    ) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        let dn = usize::from((self.ird >> 9) & 7);
        let extend = self.regs.sr & X != 0;

        // Register-to-register encodings that share the opcode space
        if to_mem && mode < 2 && !(op == DyOp::Eor && mode == 0) {
            return self.dyadic_register_form(op, size, mode, dn, usize::from(reg));
        }

        if to_mem {
            let allowed = if op == DyOp::Eor {
                DATA_ALTERABLE
            } else {
                MEMORY_ALTERABLE
            };
            self.check_ea(mode, reg, size, allowed, op.mnemonic())?;
            let operand = self.resolve(bus, mode, reg, size)?;
            let dst = self.read_operand(bus, operand, size)?;
            let result = alu(op.alu(), size, self.regs.d_sized(dn, size), dst, extend);
            self.write_operand(bus, operand, size, result.value)?;
            self.set_dyadic_flags(op, result.flags);
            if size == Size::Long && matches!(operand, Operand::Data(_)) {
                self.cycles += LONG_REGISTER_OP;
            }
        } else {
            let allowed = if size == Size::Byte || matches!(op, DyOp::And | DyOp::Or) {
                DATA
            } else {
                ALL
            };
            let (_, src) = self.read_ea(bus, mode, reg, size, allowed, op.mnemonic())?;
            let result = alu(op.alu(), size, src, self.regs.d_sized(dn, size), extend);
            if op != DyOp::Cmp {
                self.regs.set_d_sized(dn, size, result.value);
            }
            self.set_dyadic_flags(op, result.flags);
            if size == Size::Long {
                self.cycles += LONG_ALU;
            }
        }
        Ok(())
    }

    fn set_dyadic_flags(&mut self, op: DyOp, flags: u16) {
        match op {
            DyOp::Add | DyOp::Sub => self.set_arith_flags(flags),
            DyOp::Cmp => self.set_compare_flags(flags),
            DyOp::Or | DyOp::And | DyOp::Eor => self.set_logic_flags(flags),
        }
    }

    /// ABCD/SBCD/ADDX/SUBX/CMPM and EXG.
    fn dyadic_register_form(
        &mut self,
        op: DyOp,
        size: Size,
        mode: u16,
        rx: usize,
        ry: usize,
    ) -> Result<(), Fault> {
        match (op, size, mode) {
            (DyOp::Or, Size::Byte, _) => Err(self.unimplemented("SBCD")),
            (DyOp::And, Size::Byte, _) => Err(self.unimplemented("ABCD")),
            (DyOp::Sub, ..) => Err(self.unimplemented("SUBX")),
            (DyOp::Add, ..) => Err(self.unimplemented("ADDX")),
            (DyOp::Eor, ..) => Err(self.unimplemented("CMPM")),
            (DyOp::And, Size::Word, 0) => {
                self.regs.d.swap(rx, ry);
                self.cycles += EXG;
                Ok(())
            }
            (DyOp::And, Size::Word, 1) => {
                let x = self.regs.a(rx);
                let y = self.regs.a(ry);
                self.regs.set_a(rx, y);
                self.regs.set_a(ry, x);
                self.cycles += EXG;
                Ok(())
            }
            (DyOp::And, Size::Long, 1) => {
                let x = self.regs.d[rx];
                self.regs.d[rx] = self.regs.a(ry);
                self.regs.set_a(ry, x);
                self.cycles += EXG;
                Ok(())
            }
            (DyOp::And, ..) => Err(self.illegal("EXG")),
            (DyOp::Or | DyOp::Cmp, ..) => Err(self.illegal(op.mnemonic())),
        }
    }

    /// ADDA, SUBA and CMPA. Word sources are sign-extended and the
    /// operation is always 32 bits wide.
    pub(crate) fn exec_addr_arith<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        op: AddrOp,
        size: Size,
    ) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        let an = usize::from((self.ird >> 9) & 7);
        let mnemonic = match op {
            AddrOp::Add => "ADDA",
            AddrOp::Sub => "SUBA",
            AddrOp::Cmp => "CMPA",
        };
        let (_, src) = self.read_ea(bus, mode, reg, size, ALL, mnemonic)?;
        let src = size.sign_extend(src);
        let dst = self.regs.a(an);

        match op {
            AddrOp::Add => {
                self.regs.set_a(an, dst.wrapping_add(src));
                self.cycles += ADDRESS_ARITH;
            }
            AddrOp::Sub => {
                self.regs.set_a(an, dst.wrapping_sub(src));
                self.cycles += ADDRESS_ARITH;
            }
            AddrOp::Cmp => {
                let result = alu(AluOp::Sub, Size::Long, src, dst, false);
                self.set_compare_flags(result.flags);
                self.cycles += LONG_ALU;
            }
        }
        Ok(())
    }

    /// ADDQ/SUBQ. A count field of 0 means 8. Address register
    /// destinations are updated in full and leave the flags alone.
    pub(crate) fn exec_quick<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        size: Size,
        subtract: bool,
    ) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        let count = match (self.ird >> 9) & 7 {
            0 => 8,
            n => u32::from(n),
        };
        let mnemonic = if subtract { "SUBQ" } else { "ADDQ" };

        if mode == 1 {
            if size == Size::Byte {
                return Err(self.illegal(mnemonic));
            }
            let an = usize::from(reg);
            let value = self.regs.a(an);
            let value = if subtract {
                value.wrapping_sub(count)
            } else {
                value.wrapping_add(count)
            };
            self.regs.set_a(an, value);
            self.cycles += ADDRESS_ARITH;
            return Ok(());
        }

        self.check_ea(mode, reg, size, ALTERABLE, mnemonic)?;
        let operand = self.resolve(bus, mode, reg, size)?;
        let dst = self.read_operand(bus, operand, size)?;
        let op = if subtract { AluOp::Sub } else { AluOp::Add };
        let result = alu(op, size, count, dst, false);
        self.write_operand(bus, operand, size, result.value)?;
        self.set_arith_flags(result.flags);
        if size == Size::Long && matches!(operand, Operand::Data(_)) {
            self.cycles += LONG_REGISTER_OP;
        }
        Ok(())
    }

    pub(crate) fn exec_neg<B: Bus + ?Sized>(&mut self, bus: &mut B, size: Size) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        self.check_ea(mode, reg, size, DATA_ALTERABLE, "NEG")?;
        let operand = self.resolve(bus, mode, reg, size)?;
        let value = self.read_operand(bus, operand, size)?;
        let result = alu(AluOp::Sub, size, value, 0, false);
        self.write_operand(bus, operand, size, result.value)?;
        self.set_arith_flags(result.flags);
        if size == Size::Long && matches!(operand, Operand::Data(_)) {
            self.cycles += LONG_ALU;
        }
        Ok(())
    }

    /// MULU/MULS: 16 x 16 -> 32 into Dn.
    pub(crate) fn exec_mul<B: Bus + ?Sized>(&mut self, bus: &mut B, signed: bool) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        let dn = usize::from((self.ird >> 9) & 7);
        let mnemonic = if signed { "MULS" } else { "MULU" };
        let (_, src) = self.read_ea(bus, mode, reg, Size::Word, DATA, mnemonic)?;
        let src = src as u16;
        let dst = self.regs.d[dn] as u16;

        let product = if signed {
            (i32::from(dst as i16) * i32::from(src as i16)) as u32
        } else {
            u32::from(dst) * u32::from(src)
        };
        self.regs.d[dn] = product;
        self.set_logic_flags(Status::nz(Size::Long, product));
        self.cycles += if signed {
            timing::muls(src)
        } else {
            timing::mulu(src)
        };
        Ok(())
    }

    /// DIVU: 32 / 16 -> 16-bit remainder in the high word, quotient in the low.
    pub(crate) fn exec_divu<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        let dn = usize::from((self.ird >> 9) & 7);
        let (_, src) = self.read_ea(bus, mode, reg, Size::Word, DATA, "DIVU")?;
        let divisor = src as u16;
        if divisor == 0 {
            return Err(self.zero_divide());
        }

        let dividend = self.regs.d[dn];
        self.cycles += timing::divu(dividend, divisor);
        let quotient = dividend / u32::from(divisor);
        if quotient > 0xFFFF {
            self.apply_flags(N | Z | V | C, N | V);
            return Ok(());
        }
        let remainder = dividend % u32::from(divisor);
        self.regs.d[dn] = (remainder << 16) | quotient;
        self.set_logic_flags(Status::nz(Size::Word, quotient));
        Ok(())
    }

    /// DIVS: signed form of DIVU; the remainder takes the dividend's sign.
    pub(crate) fn exec_divs<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), Fault> {
        let (mode, reg) = fields(self.ird);
        let dn = usize::from((self.ird >> 9) & 7);
        let (_, src) = self.read_ea(bus, mode, reg, Size::Word, DATA, "DIVS")?;
        let divisor = src as u16 as i16;
        if divisor == 0 {
            return Err(self.zero_divide());
        }

        let dividend = self.regs.d[dn] as i32;
        self.cycles += timing::divs(dividend, divisor);
        let quotient = i64::from(dividend) / i64::from(divisor);
        if quotient < i64::from(i16::MIN) || quotient > i64::from(i16::MAX) {
            self.apply_flags(N | Z | V | C, N | V);
            return Ok(());
        }
        let remainder = i64::from(dividend) % i64::from(divisor);
        let quotient = quotient as u16 as u32;
        self.regs.d[dn] = ((remainder as u16 as u32) << 16) | quotient;
        self.set_logic_flags(Status::nz(Size::Word, quotient));
        Ok(())
    }

    fn zero_divide(&mut self) -> Fault {
        self.apply_flags(C, 0);
        Fault::Exception {
            vector: ZERO_DIVIDE,
            return_pc: self.regs.pc.wrapping_sub(2),
        }
    }
}
