//! BBA scratchpad: 256 words of operation parameters.
//!
//! Word 0 is the command word. The other words used by an operation are
//! listed below as byte offsets, the way the host addresses them.

/// Scratchpad size in words.
pub const WORDS: usize = 256;

// Copy parameters (byte offsets)
pub const COMMAND: u16 = 0x000;
pub const SRC_ADDRESS: u16 = 0x002;
pub const SRC_X: u16 = 0x006;
pub const SRC_STRIDE: u16 = 0x008;
pub const MASK_ADDRESS: u16 = 0x00A;
pub const MASK_X: u16 = 0x00E;
pub const MASK_STRIDE: u16 = 0x010;
pub const DST_ADDRESS: u16 = 0x012;
pub const DST_X: u16 = 0x016;
pub const DST_STRIDE: u16 = 0x018;
pub const WIDTH: u16 = 0x01A;
pub const HEIGHT: u16 = 0x01C;
pub const FUNCTION: u16 = 0x01E;
pub const TILE_ADDRESS: u16 = 0x020;

// Line parameters (byte offsets)
pub const LINE_ERROR: u16 = 0x030;
pub const LINE_INCREMENT: u16 = 0x032;
pub const LINE_DECREMENT: u16 = 0x034;
pub const LINE_COUNT: u16 = 0x036;
pub const LINE_X_STEP: u16 = 0x038;
pub const LINE_Y_STEP: u16 = 0x03A;
pub const LINE_MAJOR: u16 = 0x03C;

/// Command word bits.
pub mod command {
    pub const SOURCE: u16 = 0x0001;
    pub const MASK: u16 = 0x0002;
    pub const LEFT: u16 = 0x0004;
    pub const UP: u16 = 0x0008;
    pub const TILE: u16 = 0x0010;
    pub const LINE: u16 = 0x0020;
    pub const CURSOR: u16 = 0x0040;
}

/// The register file, addressable by byte or word.
#[derive(Debug, Clone)]
pub struct Scratchpad {
    words: [u16; WORDS],
}

impl Default for Scratchpad {
    fn default() -> Self {
        Self::new()
    }
}

impl Scratchpad {
    #[must_use]
    pub const fn new() -> Self {
        Self { words: [0; WORDS] }
    }

    /// Word at byte offset `offset` (bit 0 ignored, wraps at 512 bytes).
    #[must_use]
    pub fn word(&self, offset: u16) -> u16 {
        self.words[index(offset)]
    }

    pub fn set_word(&mut self, offset: u16, value: u16) {
        self.words[index(offset)] = value;
    }

    /// Even offsets address the high byte.
    #[must_use]
    pub fn byte(&self, offset: u16) -> u8 {
        let word = self.word(offset);
        if offset & 1 == 0 {
            (word >> 8) as u8
        } else {
            word as u8
        }
    }

    pub fn set_byte(&mut self, offset: u16, value: u8) {
        let word = self.word(offset);
        let word = if offset & 1 == 0 {
            (word & 0x00FF) | (u16::from(value) << 8)
        } else {
            (word & 0xFF00) | u16::from(value)
        };
        self.set_word(offset, word);
    }

    /// 32-bit address held high word first at `offset`.
    #[must_use]
    pub fn address(&self, offset: u16) -> u32 {
        (u32::from(self.word(offset)) << 16) | u32::from(self.word(offset + 2))
    }

    pub fn set_address(&mut self, offset: u16, value: u32) {
        self.set_word(offset, (value >> 16) as u16);
        self.set_word(offset + 2, value as u16);
    }

    /// Add a signed amount to the address at `offset`.
    pub fn advance(&mut self, offset: u16, amount: i32) {
        let value = self.address(offset).wrapping_add(amount as u32);
        self.set_address(offset, value);
    }

    /// Word at `offset` as a signed quantity.
    #[must_use]
    pub fn signed(&self, offset: u16) -> i16 {
        self.word(offset) as i16
    }

    /// Command word has all of `bits` set.
    #[must_use]
    pub fn has(&self, bits: u16) -> bool {
        self.word(COMMAND) & bits == bits
    }
}

fn index(offset: u16) -> usize {
    usize::from(offset >> 1) % WORDS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_writes_compose_a_word() {
        let mut pad = Scratchpad::new();
        pad.set_byte(0x1E, 0xAB);
        pad.set_byte(0x1F, 0xCD);
        assert_eq!(pad.word(0x1E), 0xABCD);
        assert_eq!(pad.byte(0x1E), 0xAB);
        assert_eq!(pad.byte(0x1F), 0xCD);
    }

    #[test]
    fn every_word_round_trips_through_bytes() {
        let mut pad = Scratchpad::new();
        for offset in (0..512u16).step_by(2) {
            let value = offset.wrapping_mul(0x9E37) ^ 0x5A5A;
            pad.set_byte(offset, (value >> 8) as u8);
            pad.set_byte(offset + 1, value as u8);
            assert_eq!(pad.word(offset), value);
        }
    }

    #[test]
    fn addresses_are_split_high_word_first() {
        let mut pad = Scratchpad::new();
        pad.set_address(DST_ADDRESS, 0x0010_1234);
        assert_eq!(pad.word(DST_ADDRESS), 0x0010);
        assert_eq!(pad.word(DST_ADDRESS + 2), 0x1234);
        pad.advance(DST_ADDRESS, -0x1236);
        assert_eq!(pad.address(DST_ADDRESS), 0x000F_FFFE);
    }
}
