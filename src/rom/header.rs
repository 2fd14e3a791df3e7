// Header scoring for the three SNES memory layouts.
//
// Each layout keeps its internal header at a fixed base ($7FC0 LoROM,
// $FFC0 HiROM, $40FFC0 ExHiROM). The score adds up independent signals:
// a checksum/complement pair that XORs to $FFFF, a plausible map-mode
// byte and, for LoROM/HiROM, a small ROM-size byte.

use super::cart::RomImage;

const CHECKSUM: usize = 0x1C; // $xxDC
const COMPLEMENT: usize = 0x1E; // $xxDE
const MAP_MODE: usize = 0x15; // $xxD5
const ROM_SIZE: usize = 0x18; // $xxD8

/// Smallest image that can hold an ExHiROM header.
pub const EXHIROM_MIN_LEN: usize = 0x410000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    LoRom,
    HiRom,
    ExHiRom,
}

impl Layout {
    pub fn base(self) -> usize {
        match self {
            Layout::LoRom => 0x7FC0,
            Layout::HiRom => 0xFFC0,
            Layout::ExHiRom => 0x40FFC0,
        }
    }

    fn map_modes(self) -> &'static [u8] {
        match self {
            Layout::LoRom => &[0x20, 0x21, 0x30],
            Layout::HiRom => &[0x21, 0x31],
            Layout::ExHiRom => &[0x25, 0x35],
        }
    }

    fn map_mode_weight(self) -> u32 {
        match self {
            Layout::ExHiRom => 2,
            _ => 1,
        }
    }
}

/// Confidence that `rom` uses `layout`. Zero when the header would lie
/// past the end of the image.
pub fn score(rom: &RomImage, layout: Layout) -> u32 {
    if layout == Layout::ExHiRom && rom.len() < EXHIROM_MIN_LEN {
        return 0;
    }
    score_at(rom, layout, layout.base() + rom.header_shift()).unwrap_or(0)
}

fn score_at(rom: &RomImage, layout: Layout, off: usize) -> Option<u32> {
    let checksum = rom.read16(off + CHECKSUM)?;
    let complement = rom.read16(off + COMPLEMENT)?;
    let map_mode = rom.read8(off + MAP_MODE)?;
    let rom_size = rom.read8(off + ROM_SIZE)?;

    let mut score = 0;
    if checksum ^ complement == 0xFFFF {
        score += 2;
    }
    if layout.map_modes().contains(&map_mode) {
        score += layout.map_mode_weight();
    }
    if layout != Layout::ExHiRom && rom_size < 0x10 {
        score += 1;
    }
    Some(score)
}

/// Scores for all three layouts of one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutScores {
    pub lorom: u32,
    pub hirom: u32,
    pub exhirom: u32,
}

impl LayoutScores {
    pub fn of(rom: &RomImage) -> Self {
        Self {
            lorom: score(rom, Layout::LoRom),
            hirom: score(rom, Layout::HiRom),
            exhirom: score(rom, Layout::ExHiRom),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Write a header at `base` with a valid checksum pair.
    pub(crate) fn put_header(buf: &mut [u8], base: usize, map_mode: u8, rom_size: u8) {
        let checksum: u16 = 0x5A3C;
        let complement = !checksum;
        buf[base + CHECKSUM..base + CHECKSUM + 2].copy_from_slice(&checksum.to_le_bytes());
        buf[base + COMPLEMENT..base + COMPLEMENT + 2].copy_from_slice(&complement.to_le_bytes());
        buf[base + MAP_MODE] = map_mode;
        buf[base + ROM_SIZE] = rom_size;
    }

    #[test]
    fn full_lorom_header_scores_four() {
        let mut buf = vec![0; 0x8000];
        put_header(&mut buf, 0x7FC0, 0x20, 0x05);
        let rom = RomImage::from_bytes(buf);

        assert_eq!(score(&rom, Layout::LoRom), 4);
        assert_eq!(score(&rom, Layout::HiRom), 0);
        assert_eq!(score(&rom, Layout::ExHiRom), 0);
    }

    #[test]
    fn copier_header_shifts_offsets() {
        let mut buf = vec![0; 0x10000 + 512];
        put_header(&mut buf, 0xFFC0 + 512, 0x31, 0x0B);
        let rom = RomImage::from_bytes(buf);

        assert_eq!(score(&rom, Layout::HiRom), 4);
    }

    #[test]
    fn checksum_only_scores_two() {
        let mut buf = vec![0; 0x10000];
        put_header(&mut buf, 0xFFC0, 0x00, 0xFF);
        let rom = RomImage::from_bytes(buf);

        assert_eq!(score(&rom, Layout::HiRom), 2);
    }

    #[test]
    fn hirom_rejects_lorom_only_map_modes() {
        let mut buf = vec![0; 0x10000];
        put_header(&mut buf, 0xFFC0, 0x20, 0x20);
        let rom = RomImage::from_bytes(buf);

        assert_eq!(score(&rom, Layout::HiRom), 2);
    }

    #[test]
    fn exhirom_forced_to_zero_below_minimum_length() {
        // A perfect ExHiROM header one byte short of the size gate.
        let mut buf = vec![0; EXHIROM_MIN_LEN - 1];
        put_header(&mut buf, 0x40FFC0, 0x35, 0x00);
        let rom = RomImage::from_bytes(buf);

        assert_eq!(score(&rom, Layout::ExHiRom), 0);
    }

    #[test]
    fn exhirom_map_mode_weighs_two_and_ignores_size() {
        let mut buf = vec![0; EXHIROM_MIN_LEN];
        put_header(&mut buf, 0x40FFC0, 0x35, 0x00);
        let rom = RomImage::from_bytes(buf);

        assert_eq!(score(&rom, Layout::ExHiRom), 4);
    }

    #[test]
    fn truncated_header_scores_zero() {
        let mut buf = vec![0; 0x7FC0 + 0x1F];
        buf[0x7FC0 + MAP_MODE] = 0x20;
        let rom = RomImage::from_bytes(buf);

        assert_eq!(LayoutScores::of(&rom), LayoutScores::default());
    }
}
