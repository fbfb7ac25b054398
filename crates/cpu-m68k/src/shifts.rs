//! Register shifts and rotates (line E, size field 00-10).
//!
//! ```text
//! 1110 ccc d ss i tt rrr
//!      |   |    | |  +-- data register shifted
//!      |   |    | +----- 00 AS, 01 LS, 10 ROX, 11 RO
//!      |   |    +------- 1: count in Dc (mod 64), 0: immediate (0 means 8)
//!      |   +------------ 1: left
//!      +---------------- count or count register
//! ```

use crate::Size;
use crate::alu::{ShiftOp, shift};
use crate::cpu::Cpu68000;
use crate::error::Fault;
use crate::flags::{C, N, Status, V, X, Z};
use crate::timing;

impl Cpu68000 {
    pub(crate) fn exec_shift(&mut self, size: Size) -> Result<(), Fault> {
        let field = (self.ird >> 9) & 7;
        let left = self.ird & 0x0100 != 0;
        let count = if self.ird & 0x0020 != 0 {
            self.regs.d[usize::from(field)] % 64
        } else if field == 0 {
            8
        } else {
            u32::from(field)
        };

        let op = match ((self.ird >> 3) & 3, left) {
            (0, true) => ShiftOp::Asl,
            (0, false) => ShiftOp::Asr,
            (1, true) => ShiftOp::Lsl,
            (1, false) => ShiftOp::Lsr,
            (2, true) => return Err(self.unimplemented("ROXL")),
            (2, false) => return Err(self.unimplemented("ROXR")),
            (_, true) => ShiftOp::Rol,
            (_, false) => ShiftOp::Ror,
        };

        let dn = usize::from(self.ird & 7);
        let result = shift(op, size, self.regs.d[dn], count);
        self.regs.set_d_sized(dn, size, result.value);

        let mut flags = Status::nz(size, result.value);
        if result.overflow {
            flags |= V;
        }
        if result.carry {
            flags |= C;
        }
        let rotate = matches!(op, ShiftOp::Rol | ShiftOp::Ror);
        if !rotate && count != 0 {
            if result.carry {
                flags |= X;
            }
            self.apply_flags(X | N | Z | V | C, flags);
        } else {
            self.apply_flags(N | Z | V | C, flags);
        }

        self.cycles += timing::shift(size, count);
        Ok(())
    }
}
