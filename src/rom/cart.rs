// ROM image loader
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Size of the optional copier header some dumps carry in front of the ROM.
pub const COPIER_HEADER_LEN: usize = 512;

/// An immutable ROM image read from disk.
#[derive(Clone)]
pub struct RomImage {
    rom: Vec<u8>,
    headered: bool,
}

impl RomImage {
    pub fn load(path: &Path) -> Result<Self> {
        let rom = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Self::from_bytes(rom))
    }

    pub fn from_bytes(rom: Vec<u8>) -> Self {
        // Copier headers leave the length 512 past a 32 KiB boundary.
        let headered = rom.len() % 0x8000 == COPIER_HEADER_LEN;
        Self { rom, headered }
    }

    pub fn len(&self) -> usize {
        self.rom.len()
    }

    pub fn has_copier_header(&self) -> bool {
        self.headered
    }

    /// Shift applied to every header offset.
    pub fn header_shift(&self) -> usize {
        if self.headered { COPIER_HEADER_LEN } else { 0 }
    }

    pub fn read8(&self, offset: usize) -> Option<u8> {
        self.rom.get(offset).copied()
    }

    /// Little-endian 16-bit read.
    pub fn read16(&self, offset: usize) -> Option<u16> {
        let lo = self.read8(offset)? as u16;
        let hi = self.read8(offset.checked_add(1)?)? as u16;
        Some((hi << 8) | lo)
    }
}
