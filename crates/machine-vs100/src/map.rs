//! Bus dispatch table.
//!
//! The 24-bit space is split into 1024 pages of 16 KiB, each bound to
//! exactly one [`Region`]. The boot-time table is applied in order, so a
//! later entry overlays earlier ones. A region smaller than a page still
//! claims the whole page.

use emu_core::ADDRESS_MASK;

pub const PAGE_SIZE: u32 = 16 * 1024;
pub const PAGES: usize = (ADDRESS_MASK as usize + 1) / PAGE_SIZE as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Fallback: logs, counts a retry and reads as zero.
    BusError,
    Ram,
    /// Window onto the remote host's UNIBUS.
    Unibus,
    RetryFinite,
    RetryInfinite,
    Framebuffer,
    Rom,
    BbaControl,
    BbaScratchpad,
    HostCsr,
    HostLoopback,
    HostInterrupt,
    Io,
}

/// Boot-time region table: base, size and device.
pub const REGIONS: [(u32, u32, Region); 13] = [
    (0x00_0000, 16 * 1024 * 1024, Region::BusError),
    (0x00_0000, 128 * 1024, Region::Ram),
    (0x08_0000, 256 * 1024, Region::Unibus),
    (0x0C_0000, 2, Region::RetryFinite),
    (0x0E_0000, 2, Region::RetryInfinite),
    (0x10_0000, 512 * 1024, Region::Framebuffer),
    (0x18_0000, 16 * 1024, Region::Rom),
    (0x28_0000, 2, Region::BbaControl),
    (0x30_0000, 512, Region::BbaScratchpad),
    (0x48_0000, 16, Region::HostCsr),
    (0x4A_0000, 16, Region::HostLoopback),
    (0x4C_0000, 2, Region::HostInterrupt),
    (0x80_0000, 0xE2, Region::Io),
];

#[derive(Clone)]
pub struct PageTable {
    pages: [Region; PAGES],
}

impl Default for PageTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PageTable {
    /// The workstation's table.
    #[must_use]
    pub fn new() -> Self {
        let mut table = Self {
            pages: [Region::BusError; PAGES],
        };
        for (base, size, region) in REGIONS {
            table.map(base, size, region);
        }
        table
    }

    /// Bind every page touched by `size` bytes at `base`.
    pub fn map(&mut self, base: u32, size: u32, region: Region) {
        let first = (base / PAGE_SIZE) as usize;
        let last = (base + size).div_ceil(PAGE_SIZE) as usize;
        for page in &mut self.pages[first..last.min(PAGES)] {
            *page = region;
        }
    }

    #[must_use]
    pub fn region(&self, address: u32) -> Region {
        self.pages[((address & ADDRESS_MASK) / PAGE_SIZE) as usize]
    }
}
