//! CPU core trait.

use crate::{Bus, Ticks};

/// A CPU core.
///
/// The machine owns the bus and lends it to the CPU for one instruction at a
/// time. The CPU reports how many master ticks the instruction took so the
/// caller can advance its event queue.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Fatal condition that stops execution.
    type Error;

    /// Execute one instruction, then take a pending interrupt if one is due.
    fn step<B: Bus>(&mut self, bus: &mut B) -> Result<Ticks, Self::Error>;

    /// Returns the address of the next instruction.
    fn pc(&self) -> u32;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Drive the interrupt priority input (0 = none).
    fn set_ipl(&mut self, level: u8);

    /// Run the reset sequence, loading the stack pointer and program counter
    /// from the vector table.
    fn reset<B: Bus>(&mut self, bus: &mut B) -> Result<(), Self::Error>;
}
