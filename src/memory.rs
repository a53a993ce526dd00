use log::{debug, warn};

use crate::error::{Result, VmError};

pub type TypeAddr = u16; // in reality u12

pub const MEMORY_SIZE: usize = 4096;
pub const PROGRAM_START: TypeAddr = 0x200;
pub const FONT_START: TypeAddr = 0x050;
pub const FONT_GLYPH_HEIGHT: u8 = 5;

type FontBytes = [u8; FONT_GLYPH_HEIGHT as usize * 16];

const DEFAULT_FONT: FontBytes = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

const FONT_END: usize = FONT_START as usize + DEFAULT_FONT.len();

/// Where FX29 points I: the glyph height times `digit`, measured from address
/// zero rather than from `FONT_START`.
pub fn glyph_offset(digit: u8) -> TypeAddr {
    digit as TypeAddr * FONT_GLYPH_HEIGHT as TypeAddr
}

pub struct Memory {
    // 4k bytes
    // font data stored from 050 -> 09F (000 -> 04F is empty by convention)
    bytes: [u8; MEMORY_SIZE],
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        let mut mem = Self {
            bytes: [0; MEMORY_SIZE],
        };
        mem.load_font();
        mem
    }

    pub const fn program_capacity() -> usize {
        MEMORY_SIZE - PROGRAM_START as usize
    }

    fn load_font(&mut self) {
        self.bytes[FONT_START as usize..FONT_END].copy_from_slice(&DEFAULT_FONT);
    }

    fn check(addr: usize) -> Result<usize> {
        if addr < MEMORY_SIZE {
            Ok(addr)
        } else {
            Err(VmError::OutOfBounds { addr })
        }
    }

    pub fn read8(&self, addr: usize) -> Result<u8> {
        Ok(self.bytes[Self::check(addr)?])
    }

    pub fn write8(&mut self, addr: usize, val: u8) -> Result<()> {
        let addr = Self::check(addr)?;
        if (FONT_START as usize..FONT_END).contains(&addr) {
            warn!("program wrote {val:#04x} into font table at {addr:#05x}");
        }
        self.bytes[addr] = val;
        Ok(())
    }

    /// Big-endian word at `addr`, `addr + 1`.
    pub fn read16(&self, addr: TypeAddr) -> Result<u16> {
        let addr = addr as usize;
        let (l, r) = (self.read8(addr)?, self.read8(addr + 1)?);
        Ok(((l as u16) << 8) | r as u16)
    }

    pub fn slice(&self, addr: usize, len: usize) -> Result<&[u8]> {
        if len > 0 {
            Self::check(addr + len - 1)?;
        }
        Self::check(addr)?;
        Ok(&self.bytes[addr..addr + len])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    // wipes everything, then places program bytes at 0x200
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<()> {
        let capacity = Self::program_capacity();
        if bytes.len() > capacity {
            return Err(VmError::CapacityExceeded {
                len: bytes.len(),
                capacity,
            });
        }

        self.bytes = [0; MEMORY_SIZE];
        self.load_font();

        let start_index = PROGRAM_START as usize;
        self.bytes[start_index..start_index + bytes.len()].copy_from_slice(bytes);
        debug!(
            "loaded {} program bytes at {:#05x}..{:#05x}",
            bytes.len(),
            start_index,
            start_index + bytes.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_is_present_after_new() {
        let mem = Memory::new();
        assert_eq!(mem.read8(0x050).unwrap(), 0xF0);
        assert_eq!(mem.read8(0x09F).unwrap(), 0x80);
        assert_eq!(mem.read8(0x04F).unwrap(), 0);
        assert_eq!(mem.read8(0x0A0).unwrap(), 0);
    }

    #[test]
    fn load_rom_clears_previous_contents() {
        let mut mem = Memory::new();
        mem.write8(0x300, 0xAB).unwrap();
        mem.write8(0x050, 0x00).unwrap();
        mem.load_rom(&[0x12, 0x34]).unwrap();
        assert_eq!(mem.read8(0x300).unwrap(), 0);
        assert_eq!(mem.read8(0x050).unwrap(), 0xF0);
        assert_eq!(mem.read16(0x200).unwrap(), 0x1234);
    }

    #[test]
    fn load_rom_fills_program_region_exactly() {
        let mut mem = Memory::new();
        let rom = vec![0xEE; Memory::program_capacity()];
        assert!(mem.load_rom(&rom).is_ok());
        assert_eq!(mem.read8(MEMORY_SIZE - 1).unwrap(), 0xEE);
    }

    #[test]
    fn oversized_rom_is_rejected_without_touching_memory() {
        let mut mem = Memory::new();
        mem.write8(0x200, 0x42).unwrap();
        let rom = vec![0; Memory::program_capacity() + 1];
        assert_eq!(
            mem.load_rom(&rom),
            Err(VmError::CapacityExceeded {
                len: 3585,
                capacity: 3584
            })
        );
        assert_eq!(mem.read8(0x200).unwrap(), 0x42);
    }

    #[test]
    fn accesses_past_the_end_fail() {
        let mut mem = Memory::new();
        assert_eq!(mem.read8(4096), Err(VmError::OutOfBounds { addr: 4096 }));
        assert_eq!(
            mem.write8(5000, 1),
            Err(VmError::OutOfBounds { addr: 5000 })
        );
        // second byte of the word is past the end
        assert_eq!(mem.read16(0xFFF), Err(VmError::OutOfBounds { addr: 4096 }));
        assert!(mem.slice(0xFFE, 2).is_ok());
        assert_eq!(
            mem.slice(0xFFE, 3),
            Err(VmError::OutOfBounds { addr: 4096 })
        );
        assert_eq!(mem.slice(0xFFF, 0).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn glyph_offsets() {
        assert_eq!(glyph_offset(0x0), 0x000);
        assert_eq!(glyph_offset(0x3), 0x00F);
        assert_eq!(glyph_offset(0x1F), 155);
    }
}
