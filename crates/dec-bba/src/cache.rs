//! Single-word caches for the source, mask and destination planes.
//!
//! Each role holds at most one word. The destination slot is write-back:
//! it is written out when another destination word is needed, when a
//! source or mask read hits its address, and when the operation ends.
//! Writing a destination word invalidates a source or mask slot holding
//! the same address.

use crate::memory::BbaMemory;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Slot {
    address: Option<u32>,
    value: u16,
    dirty: bool,
}

/// Read-only plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Source,
    Mask,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Caches {
    source: Slot,
    mask: Slot,
    destination: Slot,
}

impl Caches {
    pub(crate) fn read<M: BbaMemory + ?Sized>(&mut self, mem: &mut M, role: Role, address: u32) -> u16 {
        if self.destination.address == Some(address) {
            self.flush(mem);
        }
        let slot = match role {
            Role::Source => &mut self.source,
            Role::Mask => &mut self.mask,
        };
        if slot.address == Some(address) {
            return slot.value;
        }
        let value = mem.read_word(address);
        *slot = Slot {
            address: Some(address),
            value,
            dirty: false,
        };
        value
    }

    pub(crate) fn read_destination<M: BbaMemory + ?Sized>(&mut self, mem: &mut M, address: u32) -> u16 {
        if self.destination.address == Some(address) {
            return self.destination.value;
        }
        self.flush(mem);
        let value = mem.read_word(address);
        self.destination = Slot {
            address: Some(address),
            value,
            dirty: false,
        };
        value
    }

    pub(crate) fn write_destination<M: BbaMemory + ?Sized>(
        &mut self,
        mem: &mut M,
        address: u32,
        value: u16,
    ) {
        if self.destination.address != Some(address) {
            self.flush(mem);
        }
        self.destination = Slot {
            address: Some(address),
            value,
            dirty: true,
        };
        for slot in [&mut self.source, &mut self.mask] {
            if slot.address == Some(address) {
                slot.address = None;
            }
        }
    }

    /// Write back a pending destination word.
    pub(crate) fn flush<M: BbaMemory + ?Sized>(&mut self, mem: &mut M) {
        if let Some(address) = self.destination.address {
            if self.destination.dirty {
                mem.write_word(address, self.destination.value);
                self.destination.dirty = false;
            }
        }
    }

    /// Flush and forget everything; memory may change before the next operation.
    pub(crate) fn finish<M: BbaMemory + ?Sized>(&mut self, mem: &mut M) {
        self.flush(mem);
        *self = Self::default();
    }
}
