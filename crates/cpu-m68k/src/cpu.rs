//! Motorola 68000 CPU core with an IR/IRC prefetch pipeline.
//!
//! ## Prefetch pipeline
//!
//! - **IR**: the most recently fetched word
//! - **IRC**: the word after it
//! - **IRD**: the opcode being executed, latched from IR at dispatch
//!
//! Between instructions IR holds the next opcode, IRC the word after it, and
//! PC points past both. Extension words are taken with [`Cpu68000::fetch`],
//! which moves IRC into IR and reads a new IRC from PC. An instruction that
//! jumps sets PC and fetches once; the fetch at the end of every instruction
//! completes the refill.

use emu_core::{ADDRESS_MASK, Bus, Cpu, Observable, Ticks, Value};

use crate::Size;
use crate::error::{CpuError, Fault};
use crate::flags::{C, N, V, X, Z};
use crate::registers::Registers;
use crate::timing::{BUS_CYCLE, INTERRUPT_ACK, RESET};

/// First autovector; interrupt level `n` uses vector `AUTOVECTOR_BASE + n`.
const AUTOVECTOR_BASE: u8 = 24;

/// Motorola 68000 CPU.
#[derive(Debug, Clone)]
pub struct Cpu68000 {
    pub regs: Registers,

    /// Opcode latched for the current instruction.
    pub(crate) ird: u16,
    pub(crate) ir: u16,
    pub(crate) irc: u16,
    /// Address of the opcode in IRD.
    pub(crate) instr_pc: u32,

    /// Interrupt priority input.
    ipl: u8,

    pub(crate) cycles: u64,
}

impl Default for Cpu68000 {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu68000 {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            ird: 0,
            ir: 0,
            irc: 0,
            instr_pc: 0,
            ipl: 0,
            cycles: 0,
        }
    }

    /// Cycles consumed since creation.
    #[must_use]
    pub fn total_cycles(&self) -> Ticks {
        Ticks::new(self.cycles)
    }

    /// The prefetched opcode and extension word.
    #[must_use]
    pub fn prefetch(&self) -> (u16, u16) {
        (self.ir, self.irc)
    }

    /// Load the pipeline directly without touching the bus.
    ///
    /// `regs.pc` must already point past both words, i.e. four bytes beyond
    /// the address of `opcode`.
    pub fn setup_prefetch(&mut self, opcode: u16, irc: u16) {
        self.ir = opcode;
        self.irc = irc;
    }

    /// Run the reset sequence: supervisor mode, interrupts masked, SSP and
    /// PC from vectors 0 and 1, pipeline filled.
    pub fn reset<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        self.ipl = 0;
        self.cycles += RESET;
        let result = self
            .reload_vectors(bus)
            .and_then(|()| self.fetch(bus))
            .and_then(|()| self.fetch(bus));
        result.map_err(|fault| double_fault(0, fault))
    }

    /// Reset SR and reload SSP and PC from the vector table.
    pub(crate) fn reload_vectors<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), Fault> {
        self.regs.set_sr(0x2700);
        self.regs.ssp = self.read_long(bus, 0)?;
        self.regs.pc = self.read_long(bus, 4)?;
        Ok(())
    }

    /// Execute the instruction in IR.
    ///
    /// Traps and address errors are taken here; only conditions that stop
    /// the interpreter come back as errors.
    pub fn execute<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        self.ird = self.ir;
        self.instr_pc = self.regs.pc.wrapping_sub(4);
        log::trace!(
            "{:06X}  {:04X}  sr={:04X}",
            self.instr_pc & ADDRESS_MASK,
            self.ird,
            self.regs.sr
        );

        let outcome = match self.dispatch(bus) {
            Ok(()) => self.fetch(bus),
            Err(fault) => Err(fault),
        };

        match outcome {
            Ok(()) => Ok(()),
            Err(Fault::Fatal(error)) => Err(error),
            Err(Fault::Exception { vector, return_pc }) => {
                let sr = self.regs.sr;
                self.exception(bus, vector, sr, return_pc)
            }
            Err(Fault::Address {
                address,
                write,
                program,
            }) => self.address_error(bus, address, write, program),
        }
    }

    /// Take a pending interrupt if the input level allows it.
    ///
    /// Returns whether an interrupt was taken. Level 7 cannot be masked and
    /// is taken again on every poll for as long as it is held.
    pub fn poll_interrupt<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<bool, CpuError> {
        let level = self.ipl;
        let take = level != 0 && (level == 7 || level > self.regs.interrupt_mask());
        if !take {
            return Ok(false);
        }

        log::debug!("interrupt level {level} at {:06X}", self.regs.pc.wrapping_sub(4));
        let sr = self.regs.sr;
        self.regs.set_interrupt_mask(level);
        self.cycles += INTERRUPT_ACK;
        let return_pc = self.regs.pc.wrapping_sub(4);
        self.exception(bus, AUTOVECTOR_BASE + level, sr, return_pc)?;
        Ok(true)
    }

    // === Pipeline ===

    /// Shift IRC into IR and read the next word from PC.
    pub(crate) fn fetch<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<(), Fault> {
        let pc = self.regs.pc;
        let word = self.access_word(bus, pc, false, true)?;
        self.ir = self.irc;
        self.irc = word;
        self.regs.pc = pc.wrapping_add(2);
        Ok(())
    }

    /// Consume one extension word.
    pub(crate) fn next_word<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<u16, Fault> {
        self.fetch(bus)?;
        Ok(self.ir)
    }

    /// Consume an immediate operand. Byte immediates occupy a full word.
    pub(crate) fn read_immediate<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        size: Size,
    ) -> Result<u32, Fault> {
        match size {
            Size::Byte => Ok(u32::from(self.next_word(bus)?) & 0xFF),
            Size::Word => Ok(u32::from(self.next_word(bus)?)),
            Size::Long => {
                let hi = u32::from(self.next_word(bus)?);
                let lo = u32::from(self.next_word(bus)?);
                Ok((hi << 16) | lo)
            }
        }
    }

    // === Bus access ===

    fn access_word<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        address: u32,
        write: bool,
        program: bool,
    ) -> Result<u16, Fault> {
        if address & 1 != 0 {
            return Err(Fault::Address {
                address,
                write,
                program,
            });
        }
        self.cycles += BUS_CYCLE;
        Ok(bus.read_word(address & ADDRESS_MASK))
    }

    fn check_aligned(address: u32, write: bool) -> Result<(), Fault> {
        if address & 1 == 0 {
            Ok(())
        } else {
            Err(Fault::Address {
                address,
                write,
                program: false,
            })
        }
    }

    pub(crate) fn read_byte<B: Bus + ?Sized>(&mut self, bus: &mut B, address: u32) -> u8 {
        self.cycles += BUS_CYCLE;
        bus.read_byte(address & ADDRESS_MASK)
    }

    pub(crate) fn read_word<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        address: u32,
    ) -> Result<u16, Fault> {
        self.access_word(bus, address, false, false)
    }

    pub(crate) fn read_long<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        address: u32,
    ) -> Result<u32, Fault> {
        Self::check_aligned(address, false)?;
        let hi = u32::from(self.read_word(bus, address)?);
        let lo = u32::from(self.read_word(bus, address.wrapping_add(2))?);
        Ok((hi << 16) | lo)
    }

    pub(crate) fn write_byte<B: Bus + ?Sized>(&mut self, bus: &mut B, address: u32, value: u8) {
        self.cycles += BUS_CYCLE;
        bus.write_byte(address & ADDRESS_MASK, value);
    }

    pub(crate) fn write_word<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        address: u32,
        value: u16,
    ) -> Result<(), Fault> {
        Self::check_aligned(address, true)?;
        self.cycles += BUS_CYCLE;
        bus.write_word(address & ADDRESS_MASK, value);
        Ok(())
    }

    /// High word first.
    pub(crate) fn write_long<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        address: u32,
        value: u32,
    ) -> Result<(), Fault> {
        Self::check_aligned(address, true)?;
        self.write_word(bus, address, (value >> 16) as u16)?;
        self.write_word(bus, address.wrapping_add(2), value as u16)
    }

    pub(crate) fn read<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        size: Size,
        address: u32,
    ) -> Result<u32, Fault> {
        match size {
            Size::Byte => Ok(u32::from(self.read_byte(bus, address))),
            Size::Word => Ok(u32::from(self.read_word(bus, address)?)),
            Size::Long => self.read_long(bus, address),
        }
    }

    pub(crate) fn write<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        size: Size,
        address: u32,
        value: u32,
    ) -> Result<(), Fault> {
        match size {
            Size::Byte => {
                self.write_byte(bus, address, value as u8);
                Ok(())
            }
            Size::Word => self.write_word(bus, address, value as u16),
            Size::Long => self.write_long(bus, address, value),
        }
    }

    // === Stack ===

    pub(crate) fn push_word<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u16) -> Result<(), Fault> {
        let sp = self.regs.sp().wrapping_sub(2);
        self.regs.set_sp(sp);
        self.write_word(bus, sp, value)
    }

    pub(crate) fn push_long<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u32) -> Result<(), Fault> {
        let sp = self.regs.sp().wrapping_sub(4);
        self.regs.set_sp(sp);
        self.write_long(bus, sp, value)
    }

    pub(crate) fn pop_word<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<u16, Fault> {
        let sp = self.regs.sp();
        let value = self.read_word(bus, sp)?;
        self.regs.set_sp(sp.wrapping_add(2));
        Ok(value)
    }

    pub(crate) fn pop_long<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<u32, Fault> {
        let sp = self.regs.sp();
        let value = self.read_long(bus, sp)?;
        self.regs.set_sp(sp.wrapping_add(4));
        Ok(value)
    }

    // === Fatal conditions ===

    pub(crate) fn unimplemented(&self, mnemonic: &'static str) -> Fault {
        Fault::Fatal(CpuError::Unimplemented {
            mnemonic,
            opcode: self.ird,
            pc: self.instr_pc,
        })
    }

    pub(crate) fn illegal(&self, mnemonic: &'static str) -> Fault {
        Fault::Fatal(CpuError::Illegal {
            mnemonic,
            opcode: self.ird,
            pc: self.instr_pc,
        })
    }

    /// Privileged instructions trap through vector 8 in user mode.
    pub(crate) fn require_supervisor(&self) -> Result<(), Fault> {
        if self.regs.is_supervisor() {
            Ok(())
        } else {
            Err(Fault::Exception {
                vector: 8,
                return_pc: self.instr_pc,
            })
        }
    }
}

/// Convert a fault raised while building an exception frame.
pub(crate) fn double_fault(vector: u8, fault: Fault) -> CpuError {
    match fault {
        Fault::Fatal(error) => error,
        Fault::Address { address, .. } => CpuError::DoubleFault { vector, address },
        Fault::Exception { .. } => CpuError::DoubleFault { vector, address: 0 },
    }
}

impl Cpu for Cpu68000 {
    type Registers = Registers;
    type Error = CpuError;

    fn step<B: Bus>(&mut self, bus: &mut B) -> Result<Ticks, CpuError> {
        let start = self.cycles;
        self.execute(bus)?;
        self.poll_interrupt(bus)?;
        Ok(Ticks::new(self.cycles - start))
    }

    fn pc(&self) -> u32 {
        self.regs.pc.wrapping_sub(4)
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn set_ipl(&mut self, level: u8) {
        self.ipl = level & 7;
    }

    fn reset<B: Bus>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        Cpu68000::reset(self, bus)
    }
}

const QUERY_PATHS: &[&str] = &[
    "d0", "d1", "d2", "d3", "d4", "d5", "d6", "d7", "a0", "a1", "a2", "a3", "a4", "a5", "a6",
    "a7", "usp", "ssp", "pc", "sr", "flags.x", "flags.n", "flags.z", "flags.v", "flags.c",
    "int_mask", "ipl", "cycles", "ird",
];

impl Observable for Cpu68000 {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(n) = path.strip_prefix('d').and_then(|n| n.parse::<usize>().ok()) {
            return self.regs.d.get(n).map(|&v| v.into());
        }
        if let Some(n) = path.strip_prefix('a').and_then(|n| n.parse::<usize>().ok()) {
            return (n < 8).then(|| self.regs.a(n).into());
        }
        match path {
            "usp" => Some(self.regs.usp.into()),
            "ssp" => Some(self.regs.ssp.into()),
            "pc" => Some(self.regs.pc.into()),
            "sr" => Some(self.regs.sr.into()),
            "flags.x" => Some((self.regs.sr & X != 0).into()),
            "flags.n" => Some((self.regs.sr & N != 0).into()),
            "flags.z" => Some((self.regs.sr & Z != 0).into()),
            "flags.v" => Some((self.regs.sr & V != 0).into()),
            "flags.c" => Some((self.regs.sr & C != 0).into()),
            "int_mask" => Some(self.regs.interrupt_mask().into()),
            "ipl" => Some(self.ipl.into()),
            "cycles" => Some(self.cycles.into()),
            "ird" => Some(self.ird.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
