//! Configuration for the VAXstation 100 machine crate.

use emu_core::{MasterClock, Ticks};

/// Vertical refresh rate.
pub const VSYNC_HZ: u64 = 60;

#[derive(Debug, Clone)]
pub struct Vs100Config {
    /// Raw 16 KiB ROM image.
    pub rom: Vec<u8>,
    /// Remote host as `host:port`. Without one the UNIBUS window answers
    /// every read with NXM.
    pub host: Option<String>,
    /// Delay between the BBA go command and the operation.
    pub bba_latency: Ticks,
    pub vsync_period: Ticks,
    /// Log every instruction at info level.
    pub trace: bool,
}

impl Vs100Config {
    #[must_use]
    pub fn new(rom: Vec<u8>) -> Self {
        Self {
            rom,
            host: None,
            bba_latency: dec_bba::DEFAULT_LATENCY,
            vsync_period: MasterClock::VS100.period(VSYNC_HZ),
            trace: false,
        }
    }
}
