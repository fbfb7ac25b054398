//! Core traits and types shared by the VAXstation 100 emulator crates.
//!
//! The workstation runs from a single 10 MHz master clock. The CPU counts
//! its bus cycles in master ticks and every timed device event is scheduled
//! against the same count.

mod bus;
mod clock;
mod cpu;
mod observable;
mod ticks;

pub use bus::{
    ADDRESS_MASK, Bus, SimpleBus, read_word_as_byte, read_word_as_bytes, write_word_as_byte,
    write_word_as_bytes,
};
pub use clock::MasterClock;
pub use cpu::Cpu;
pub use observable::{Observable, Value};
pub use ticks::Ticks;
