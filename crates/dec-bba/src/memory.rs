//! The BBA's view of memory.

/// Word-wide memory the BBA reads and writes.
pub trait BbaMemory {
    fn read_word(&mut self, address: u32) -> u16;
    fn write_word(&mut self, address: u32, value: u16);
}

/// Whether the BBA's address decoder answers `address`.
///
/// Only RAM, the UNIBUS window, the framebuffer and ROM respond, decoded on
/// 64 KiB units. Accesses anywhere else are dropped: reads return 0 and
/// writes have no effect. Tile and cursor arithmetic relies on this near the
/// edges of the framebuffer.
#[must_use]
pub const fn reachable(address: u32) -> bool {
    matches!(address >> 16, 0x00..=0x01 | 0x08..=0x0B | 0x10..=0x17 | 0x18)
}

/// Filters a [`BbaMemory`] through [`reachable`].
pub(crate) struct Decoded<'a, M: BbaMemory + ?Sized>(pub &'a mut M);

impl<M: BbaMemory + ?Sized> BbaMemory for Decoded<'_, M> {
    fn read_word(&mut self, address: u32) -> u16 {
        if reachable(address) {
            self.0.read_word(address & !1)
        } else {
            log::trace!("BBA read of unreachable {address:06X} dropped");
            0
        }
    }

    fn write_word(&mut self, address: u32, value: u16) {
        if reachable(address) {
            self.0.write_word(address & !1, value);
        } else {
            log::trace!("BBA write of unreachable {address:06X} dropped");
        }
    }
}
