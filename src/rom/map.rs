// memory map classifier
use std::fmt;

use super::cart::RomImage;
use super::header::LayoutScores;

/// Final classification of a ROM image. Ordering is the order buckets are
/// processed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapLabel {
    LoRom,
    HiRom,
    ExHiRom,
    Unknown,
}

impl MapLabel {
    pub const ALL: [MapLabel; 4] = [
        MapLabel::LoRom,
        MapLabel::HiRom,
        MapLabel::ExHiRom,
        MapLabel::Unknown,
    ];

    /// Name of the top-level destination folder.
    pub fn folder_name(self) -> &'static str {
        match self {
            MapLabel::LoRom => "LoRom",
            MapLabel::HiRom => "HiRom",
            MapLabel::ExHiRom => "ExHiRom",
            MapLabel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for MapLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.folder_name())
    }
}

pub fn classify(rom: &RomImage) -> MapLabel {
    let scores = LayoutScores::of(rom);
    log::debug!(
        "scores lo={} hi={} exhi={} (len={:#X}, copier header={})",
        scores.lorom,
        scores.hirom,
        scores.exhirom,
        rom.len(),
        rom.has_copier_header()
    );
    resolve(scores)
}

/// Tie-break: ExHiROM first, then LoROM only when it strictly beats HiROM.
/// Equal LoROM/HiROM scores of 2 or more resolve to HiROM.
pub fn resolve(s: LayoutScores) -> MapLabel {
    if s.exhirom >= s.lorom.max(s.hirom) && s.exhirom >= 3 {
        MapLabel::ExHiRom
    } else if s.lorom > s.hirom && s.lorom >= 2 {
        MapLabel::LoRom
    } else if s.hirom >= 2 {
        MapLabel::HiRom
    } else {
        MapLabel::Unknown
    }
}
