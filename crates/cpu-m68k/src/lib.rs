//! Motorola 68000 interpreter with an explicit IR/IRC prefetch pipeline.
//!
//! Each call to [`Cpu68000::execute`] runs one whole instruction: the opcode
//! already sitting in IR is latched into IRD, looked up in a 1024-entry
//! dispatch table keyed by its top ten bits, executed, and followed by one
//! prefetch that refills the pipeline. Extension words are consumed through
//! the same prefetch, so at dispatch time PC always points four bytes past
//! the opcode.
//!
//! Opcodes outside the implemented subset stop the interpreter with
//! [`CpuError::Unimplemented`] rather than guessing.

pub mod alu;
mod arith;
mod branches;
mod cpu;
mod decode;
mod ea;
mod error;
mod exceptions;
mod execute;
pub mod flags;
mod immediates;
mod logic;
mod misc;
mod moves;
pub mod registers;
mod shifts;
mod size;
mod timing;

pub use alu::{AluOp, AluResult, ShiftOp, ShiftResult};
pub use cpu::Cpu68000;
pub use error::CpuError;
pub use flags::{C, N, S, Status, T, V, X, Z};
pub use registers::Registers;
pub use size::Size;
