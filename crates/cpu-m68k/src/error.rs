//! Fatal CPU errors and the internal fault signal.

/// A condition that stops the interpreter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CpuError {
    /// A valid 68000 instruction outside the implemented subset.
    #[error("unimplemented instruction {mnemonic} ({opcode:#06X}) at {pc:#08X}")]
    Unimplemented {
        mnemonic: &'static str,
        opcode: u16,
        pc: u32,
    },

    /// An encoding with no 68000 meaning, or an addressing mode the
    /// instruction does not accept.
    #[error("illegal instruction {mnemonic} ({opcode:#06X}) at {pc:#08X}")]
    Illegal {
        mnemonic: &'static str,
        opcode: u16,
        pc: u32,
    },

    /// An address error while an exception frame was being built.
    #[error("double fault at {address:#08X} during exception vector {vector}")]
    DoubleFault { vector: u8, address: u32 },
}

/// Why an instruction stopped before completing.
///
/// Propagated with `?` from the bus helpers up to [`crate::Cpu68000::execute`],
/// which turns it into an exception or a fatal error. Work done before the
/// fault is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Fault {
    /// Word or long access at an odd address.
    Address {
        address: u32,
        write: bool,
        program: bool,
    },
    /// Instruction-raised trap (TRAP, divide by zero, privilege violation).
    Exception { vector: u8, return_pc: u32 },
    Fatal(CpuError),
}

impl From<CpuError> for Fault {
    fn from(error: CpuError) -> Self {
        Self::Fatal(error)
    }
}
