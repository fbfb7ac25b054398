//! Motorola 6845 CRT controller register file.
//!
//! Only the programming interface is modelled: an address register that
//! selects one of 18 data registers. The VAXstation's video timing comes
//! from the machine's vertical sync event, not from these values.

use emu_core::{Observable, Value};

/// Number of data registers (R0-R17).
pub const REGISTERS: usize = 18;

/// Register names in address order.
pub const NAMES: [&str; REGISTERS] = [
    "horizontal_total",
    "horizontal_displayed",
    "hsync_position",
    "sync_width",
    "vertical_total",
    "vertical_adjust",
    "vertical_displayed",
    "vsync_position",
    "interlace",
    "max_scan_line",
    "cursor_start",
    "cursor_end",
    "start_address_high",
    "start_address_low",
    "cursor_high",
    "cursor_low",
    "light_pen_high",
    "light_pen_low",
];

#[derive(Debug, Clone, Default)]
pub struct Mc6845 {
    address: u8,
    registers: [u8; REGISTERS],
}

impl Mc6845 {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            address: 0,
            registers: [0; REGISTERS],
        }
    }

    #[must_use]
    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn select(&mut self, address: u8) {
        self.address = address;
    }

    /// The selected register. Addresses past R17 read as zero.
    #[must_use]
    pub fn read_data(&self) -> u8 {
        self.registers
            .get(usize::from(self.address))
            .copied()
            .unwrap_or(0)
    }

    pub fn write_data(&mut self, value: u8) {
        if let Some(register) = self.registers.get_mut(usize::from(self.address)) {
            *register = value;
        }
    }

    #[must_use]
    pub fn register(&self, index: usize) -> Option<u8> {
        self.registers.get(index).copied()
    }
}

impl Observable for Mc6845 {
    fn query(&self, path: &str) -> Option<Value> {
        if path == "address" {
            return Some(self.address.into());
        }
        let index = NAMES.iter().position(|&name| name == path)?;
        Some(self.registers[index].into())
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "address",
            "horizontal_total",
            "horizontal_displayed",
            "hsync_position",
            "sync_width",
            "vertical_total",
            "vertical_adjust",
            "vertical_displayed",
            "vsync_position",
            "interlace",
            "max_scan_line",
            "cursor_start",
            "cursor_end",
            "start_address_high",
            "start_address_low",
            "cursor_high",
            "cursor_low",
            "light_pen_high",
            "light_pen_low",
        ]
    }
}
