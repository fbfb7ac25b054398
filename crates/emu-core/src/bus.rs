//! Memory and I/O bus interface.
//!
//! The 68000 sees a 24-bit, big-endian address space. Every device attached
//! to it answers the same four calls: byte read, byte write, word read and
//! word write. Devices without native word access pick one of the two stock
//! compositions below.

/// Address lines present on the 68000 package.
pub const ADDRESS_MASK: u32 = 0x00FF_FFFF;

/// Memory and I/O bus interface.
///
/// Addresses are masked to 24 bits by the caller before decoding. Word
/// accesses default to two byte cycles with the high byte at the lower
/// address.
pub trait Bus {
    /// Read a byte from the given address.
    fn read_byte(&mut self, address: u32) -> u8;

    /// Write a byte to the given address.
    fn write_byte(&mut self, address: u32, value: u8);

    /// Read a big-endian word.
    fn read_word(&mut self, address: u32) -> u16 {
        read_word_as_bytes(self, address)
    }

    /// Write a big-endian word.
    fn write_word(&mut self, address: u32, value: u16) {
        write_word_as_bytes(self, address, value);
    }
}

/// Word read built from two byte reads, high byte first.
pub fn read_word_as_bytes<B: Bus + ?Sized>(bus: &mut B, address: u32) -> u16 {
    let hi = bus.read_byte(address);
    let lo = bus.read_byte(address.wrapping_add(1));
    u16::from_be_bytes([hi, lo])
}

/// Word write split into two byte writes, high byte first.
pub fn write_word_as_bytes<B: Bus + ?Sized>(bus: &mut B, address: u32, value: u16) {
    let [hi, lo] = value.to_be_bytes();
    bus.write_byte(address, hi);
    bus.write_byte(address.wrapping_add(1), lo);
}

/// Word read for byte-wide registers: one byte cycle, zero-extended.
pub fn read_word_as_byte<B: Bus + ?Sized>(bus: &mut B, address: u32) -> u16 {
    u16::from(bus.read_byte(address))
}

/// Word write for byte-wide registers: one byte cycle carrying the low byte.
pub fn write_word_as_byte<B: Bus + ?Sized>(bus: &mut B, address: u32, value: u16) {
    bus.write_byte(address, value as u8);
}

/// Flat 16 MiB memory covering the whole 24-bit space.
///
/// Used by CPU tests and the single-instruction fixture harness.
pub struct SimpleBus {
    memory: Vec<u8>,
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory: vec![0; (ADDRESS_MASK as usize) + 1],
        }
    }

    /// Copy `data` into memory starting at `address`.
    pub fn load(&mut self, address: u32, data: &[u8]) {
        for (offset, &byte) in data.iter().enumerate() {
            let a = (address as usize + offset) & ADDRESS_MASK as usize;
            self.memory[a] = byte;
        }
    }

    /// Read a byte without going through the bus interface.
    #[must_use]
    pub fn peek(&self, address: u32) -> u8 {
        self.memory[(address & ADDRESS_MASK) as usize]
    }
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimpleBus {
    fn read_byte(&mut self, address: u32) -> u8 {
        self.memory[(address & ADDRESS_MASK) as usize]
    }

    fn write_byte(&mut self, address: u32, value: u8) {
        self.memory[(address & ADDRESS_MASK) as usize] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Latch {
        value: u8,
        reads: usize,
        writes: usize,
    }

    impl Bus for Latch {
        fn read_byte(&mut self, _address: u32) -> u8 {
            self.reads += 1;
            self.value
        }

        fn write_byte(&mut self, _address: u32, value: u8) {
            self.writes += 1;
            self.value = value;
        }

        fn read_word(&mut self, address: u32) -> u16 {
            read_word_as_byte(self, address)
        }

        fn write_word(&mut self, address: u32, value: u16) {
            write_word_as_byte(self, address, value);
        }
    }

    #[test]
    fn default_word_access_is_big_endian() {
        let mut bus = SimpleBus::new();
        bus.write_word(0x1000, 0xBEEF);
        assert_eq!(bus.peek(0x1000), 0xBE);
        assert_eq!(bus.peek(0x1001), 0xEF);
        assert_eq!(bus.read_word(0x1000), 0xBEEF);
    }

    #[test]
    fn simple_bus_wraps_at_24_bits() {
        let mut bus = SimpleBus::new();
        bus.write_byte(0x0100_0010, 0x5A);
        assert_eq!(bus.peek(0x10), 0x5A);
    }

    #[test]
    fn same_byte_composition_is_one_cycle() {
        let mut latch = Latch {
            value: 0x42,
            reads: 0,
            writes: 0,
        };
        assert_eq!(latch.read_word(0), 0x0042);
        assert_eq!(latch.reads, 1);

        latch.write_word(0, 0x1234);
        assert_eq!(latch.writes, 1);
        assert_eq!(latch.value, 0x34);
    }
}
