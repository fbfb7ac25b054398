//! Effective address decoding.
//!
//! The six-bit EA field is split into a mode (bits 5-3) and a register
//! (bits 2-0). Mode 7 selects one of five register-less forms by the
//! register field. Each of the twelve forms is a slot in an allow mask:
//!
//! ```text
//! slot  0   1    2     3      4      5       6          7      8      9        10         11
//!       Dn  An  (An)  (An)+  -(An)  d16(An) d8(An,Xn)  abs.w  abs.l  d16(PC)  d8(PC,Xn)  #imm
//! ```

use emu_core::Bus;

use crate::Size;
use crate::cpu::Cpu68000;
use crate::error::Fault;
use crate::timing::EA_CALC;

pub(crate) const ALL: u16 = 0xFFF;
pub(crate) const DATA: u16 = 0xFFD;
pub(crate) const MEMORY: u16 = 0xFFC;
pub(crate) const CONTROL: u16 = 0x7E4;
pub(crate) const ALTERABLE: u16 = 0x1FF;
pub(crate) const DATA_ALTERABLE: u16 = 0x1FD;
pub(crate) const MEMORY_ALTERABLE: u16 = 0x1FC;
pub(crate) const CONTROL_ALTERABLE: u16 = 0x1E4;

/// Slot bit for `-(An)`.
pub(crate) const PREDECREMENT: u16 = 1 << 4;
/// Slot bit for `(An)+`.
pub(crate) const POSTINCREMENT: u16 = 1 << 3;

/// A resolved operand location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operand {
    Data(usize),
    Address(usize),
    Memory(u32),
    Immediate(u32),
}

/// Slot index of an EA field, or `None` for mode 7 registers 5-7.
const fn slot(mode: u16, reg: u16) -> Option<u16> {
    match mode {
        0..=6 => Some(mode),
        _ if reg <= 4 => Some(7 + reg),
        _ => None,
    }
}

/// Split the low six bits of an opcode into mode and register.
pub(crate) const fn fields(opcode: u16) -> (u16, u16) {
    ((opcode >> 3) & 7, opcode & 7)
}

impl Cpu68000 {
    /// Reject addressing modes outside `allowed`, and byte access to An.
    pub(crate) fn check_ea(
        &self,
        mode: u16,
        reg: u16,
        size: Size,
        allowed: u16,
        mnemonic: &'static str,
    ) -> Result<(), Fault> {
        let permitted = match slot(mode, reg) {
            Some(slot) => allowed & (1 << slot) != 0,
            None => false,
        };
        if !permitted || (mode == 1 && size == Size::Byte) {
            return Err(self.illegal(mnemonic));
        }
        Ok(())
    }

    /// Resolve an EA, consuming extension words and applying (An)+ and -(An).
    pub(crate) fn resolve<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: u16,
        reg: u16,
        size: Size,
    ) -> Result<Operand, Fault> {
        let r = reg as usize;
        let operand = match (mode, reg) {
            (0, _) => Operand::Data(r),
            (1, _) => Operand::Address(r),
            (2, _) => Operand::Memory(self.regs.a(r)),
            (3, _) => {
                let address = self.regs.a(r);
                self.regs.set_a(r, address.wrapping_add(step(r, size)));
                Operand::Memory(address)
            }
            (4, _) => {
                let address = self.regs.a(r).wrapping_sub(step(r, size));
                self.regs.set_a(r, address);
                Operand::Memory(address)
            }
            (5, _) => {
                let displacement = Size::Word.sign_extend(u32::from(self.next_word(bus)?));
                Operand::Memory(self.regs.a(r).wrapping_add(displacement))
            }
            (6, _) => {
                let extension = self.next_word(bus)?;
                Operand::Memory(self.regs.a(r).wrapping_add(self.index(extension)))
            }
            (7, 0) => Operand::Memory(Size::Word.sign_extend(u32::from(self.next_word(bus)?))),
            (7, 1) => Operand::Memory(self.read_immediate(bus, Size::Long)?),
            (7, 2) => {
                let base = self.regs.pc.wrapping_sub(2);
                let displacement = Size::Word.sign_extend(u32::from(self.next_word(bus)?));
                Operand::Memory(base.wrapping_add(displacement))
            }
            (7, 3) => {
                let base = self.regs.pc.wrapping_sub(2);
                let extension = self.next_word(bus)?;
                Operand::Memory(base.wrapping_add(self.index(extension)))
            }
            (7, 4) => Operand::Immediate(self.read_immediate(bus, size)?),
            _ => return Err(self.illegal("EA")),
        };
        Ok(operand)
    }

    /// Resolve a control-mode EA to its address.
    pub(crate) fn resolve_address<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: u16,
        reg: u16,
        mnemonic: &'static str,
    ) -> Result<u32, Fault> {
        self.check_ea(mode, reg, Size::Long, CONTROL, mnemonic)?;
        match self.resolve(bus, mode, reg, Size::Long)? {
            Operand::Memory(address) => Ok(address),
            _ => Err(self.illegal(mnemonic)),
        }
    }

    /// Index term of a brief extension word plus its 8-bit displacement.
    ///
    /// Bit 15 selects An over Dn, bits 14-12 the register, bit 11 a long
    /// index over a sign-extended word.
    fn index(&self, extension: u16) -> u32 {
        let reg = ((extension >> 12) & 7) as usize;
        let value = if extension & 0x8000 != 0 {
            self.regs.a(reg)
        } else {
            self.regs.d[reg]
        };
        let value = if extension & 0x0800 != 0 {
            value
        } else {
            Size::Word.sign_extend(value)
        };
        value.wrapping_add(Size::Byte.sign_extend(u32::from(extension)))
    }

    pub(crate) fn read_operand<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        operand: Operand,
        size: Size,
    ) -> Result<u32, Fault> {
        match operand {
            Operand::Data(n) => Ok(self.regs.d_sized(n, size)),
            Operand::Address(n) => Ok(self.regs.a(n) & size.mask()),
            Operand::Memory(address) => self.read(bus, size, address),
            Operand::Immediate(value) => Ok(value),
        }
    }

    /// Data registers keep their upper bits; address registers take all 32.
    pub(crate) fn write_operand<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        operand: Operand,
        size: Size,
        value: u32,
    ) -> Result<(), Fault> {
        match operand {
            Operand::Data(n) => {
                self.regs.set_d_sized(n, size, value);
                Ok(())
            }
            Operand::Address(n) => {
                self.regs.set_a(n, value);
                Ok(())
            }
            Operand::Memory(address) => self.write(bus, size, address, value),
            Operand::Immediate(_) => Err(self.illegal("write to immediate")),
        }
    }

    /// Validate, resolve and read a source operand.
    pub(crate) fn read_ea<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: u16,
        reg: u16,
        size: Size,
        allowed: u16,
        mnemonic: &'static str,
    ) -> Result<(Operand, u32), Fault> {
        self.check_ea(mode, reg, size, allowed, mnemonic)?;
        let operand = self.resolve(bus, mode, reg, size)?;
        if mode == 4 || mode == 6 || (mode == 7 && reg == 3) {
            self.cycles += EA_CALC;
        }
        let value = self.read_operand(bus, operand, size)?;
        Ok((operand, value))
    }
}

/// Address step for (An)+ and -(An). A7 stays word-aligned for bytes.
const fn step(reg: usize, size: Size) -> u32 {
    if reg == 7 && matches!(size, Size::Byte) {
        2
    } else {
        size.bytes()
    }
}
