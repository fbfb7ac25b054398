//! Master clock configuration.

use crate::Ticks;

/// Master clock configuration for a system.
///
/// Every device timer in the workstation is expressed as a number of master
/// ticks derived from this frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// Crystal frequency in Hz.
    pub frequency_hz: u64,
}

impl MasterClock {
    /// The VAXstation 100's 10 MHz processor clock.
    pub const VS100: Self = Self::new(10_000_000);

    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Ticks between events recurring `rate_hz` times a second (integer
    /// division, so 60 Hz on a 10 MHz clock is 166 666 ticks).
    #[must_use]
    pub const fn period(&self, rate_hz: u64) -> Ticks {
        Ticks::new(self.frequency_hz / rate_hz)
    }
}
