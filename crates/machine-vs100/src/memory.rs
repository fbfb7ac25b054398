//! RAM, ROM and framebuffer storage.

use std::path::Path;

use crate::MachineError;

pub const RAM_BASE: u32 = 0x00_0000;
pub const RAM_SIZE: usize = 128 * 1024;
pub const UNIBUS_BASE: u32 = 0x08_0000;
pub const UNIBUS_SIZE: usize = 256 * 1024;
pub const FRAMEBUFFER_BASE: u32 = 0x10_0000;
pub const FRAMEBUFFER_SIZE: usize = 512 * 1024;
pub const ROM_BASE: u32 = 0x18_0000;
pub const ROM_SIZE: usize = 16 * 1024;

/// Visible raster, one bit per pixel.
pub const SCREEN_WIDTH: usize = 1088;
pub const SCREEN_HEIGHT: usize = 864;

/// Read a raw ROM image. It must be exactly [`ROM_SIZE`] bytes.
pub fn load_rom(path: &Path) -> Result<Vec<u8>, MachineError> {
    let image = std::fs::read(path).map_err(|source| MachineError::RomRead {
        path: path.to_path_buf(),
        source,
    })?;
    check_rom(&image)?;
    Ok(image)
}

pub(crate) fn check_rom(image: &[u8]) -> Result<(), MachineError> {
    if image.len() == ROM_SIZE {
        Ok(())
    } else {
        Err(MachineError::RomSize {
            found: image.len(),
            expected: ROM_SIZE,
        })
    }
}

#[derive(Clone)]
pub struct Memory {
    pub ram: Vec<u8>,
    pub rom: Vec<u8>,
    pub framebuffer: Vec<u8>,
}

impl Memory {
    /// The first eight ROM bytes (reset SSP and PC) are mirrored into RAM.
    pub fn new(rom: &[u8]) -> Result<Self, MachineError> {
        check_rom(rom)?;
        let mut ram = vec![0; RAM_SIZE];
        ram[..8].copy_from_slice(&rom[..8]);
        Ok(Self {
            ram,
            rom: rom.to_vec(),
            framebuffer: vec![0; FRAMEBUFFER_SIZE],
        })
    }

    pub fn read_ram(&self, address: u32) -> u8 {
        self.ram[address as usize % RAM_SIZE]
    }

    pub fn write_ram(&mut self, address: u32, value: u8) {
        self.ram[address as usize % RAM_SIZE] = value;
    }

    pub fn read_rom(&self, address: u32) -> u8 {
        self.rom[address as usize % ROM_SIZE]
    }

    pub fn read_framebuffer(&self, address: u32) -> u8 {
        self.framebuffer[(address.wrapping_sub(FRAMEBUFFER_BASE)) as usize % FRAMEBUFFER_SIZE]
    }

    pub fn write_framebuffer(&mut self, address: u32, value: u8) {
        self.framebuffer[(address.wrapping_sub(FRAMEBUFFER_BASE)) as usize % FRAMEBUFFER_SIZE] = value;
    }

    /// Whether pixel (`x`, `y`) of the visible raster is set.
    ///
    /// Pixels run from the least significant bit of each big-endian word.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        let bit = y * SCREEN_WIDTH + x;
        let byte = (bit / 8) ^ 1;
        self.framebuffer[byte] & (1 << (bit % 8)) != 0
    }

    /// The visible raster as a binary PBM (P4) image.
    #[must_use]
    pub fn screen_pbm(&self) -> Vec<u8> {
        let mut out = format!("P4\n{SCREEN_WIDTH} {SCREEN_HEIGHT}\n").into_bytes();
        for y in 0..SCREEN_HEIGHT {
            for chunk in 0..SCREEN_WIDTH / 8 {
                let mut byte = 0u8;
                for i in 0..8 {
                    if self.pixel(chunk * 8 + i, y) {
                        byte |= 0x80 >> i;
                    }
                }
                out.push(byte);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom() -> Vec<u8> {
        let mut rom = vec![0u8; ROM_SIZE];
        rom[..8].copy_from_slice(&[0x00, 0x00, 0x80, 0x00, 0x00, 0x18, 0x00, 0x08]);
        rom
    }

    #[test]
    fn reset_vectors_are_mirrored_into_ram() {
        let mem = Memory::new(&rom()).expect("valid ROM");
        assert_eq!(&mem.ram[..8], &rom()[..8]);
        assert_eq!(mem.read_rom(ROM_BASE + 5), 0x18);
    }

    #[test]
    fn short_rom_is_rejected() {
        assert!(matches!(
            Memory::new(&[0; 100]),
            Err(MachineError::RomSize { found: 100, .. })
        ));
    }

    #[test]
    fn first_pixel_is_low_bit_of_first_word() {
        let mut mem = Memory::new(&rom()).expect("valid ROM");
        mem.write_framebuffer(FRAMEBUFFER_BASE + 1, 0x01);
        assert!(mem.pixel(0, 0));
        mem.write_framebuffer(FRAMEBUFFER_BASE, 0x80);
        assert!(mem.pixel(15, 0));
        let pbm = mem.screen_pbm();
        let header = b"P4\n1088 864\n";
        assert_eq!(&pbm[..header.len()], header);
        assert_eq!(pbm[header.len()], 0x80);
        assert_eq!(pbm[header.len() + 1], 0x01);
        assert_eq!(pbm.len(), header.len() + SCREEN_WIDTH / 8 * SCREEN_HEIGHT);
    }
}
