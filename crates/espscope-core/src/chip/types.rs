//! Chip descriptor types

use core::fmt;

/// Static description of one ESP chip family
///
/// Flash-size and flash-frequency tables map a human-readable label to the
/// raw value stored in the image header. Size values are already shifted
/// into the high nibble (`"4MB" -> 0x20`), frequency values occupy the low
/// nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipDef {
    /// Registry key, e.g. `"esp32s3"`
    pub name: &'static str,
    /// Value of the chip-ID field in the extended image header
    pub image_chip_id: Option<u16>,
    /// Chip uses the original image layout without an extended header
    pub legacy_image_format: bool,
    /// Flash size labels and their header values, in ROM table order
    pub flash_sizes: &'static [(&'static str, u8)],
    /// Flash frequency labels and their header values, in ROM table order
    pub flash_frequencies: &'static [(&'static str, u8)],
}

impl ChipDef {
    /// Look up the label for a flash size value (`size_freq & 0xF0`)
    ///
    /// Returns the first label in table order carrying this value.
    pub fn flash_size_name(&self, value: u8) -> Option<&'static str> {
        self.flash_sizes
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(name, _)| *name)
    }

    /// Look up the label for a flash frequency value (`size_freq & 0x0F`)
    ///
    /// Several labels can share a value on some chips; the first one in
    /// table order wins.
    pub fn flash_freq_name(&self, value: u8) -> Option<&'static str> {
        self.flash_frequencies
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(name, _)| *name)
    }

    /// Check whether this chip writes its ID into the extended header
    pub fn has_extended_header(&self) -> bool {
        !self.legacy_image_format && self.image_chip_id.is_some()
    }
}

/// Chip family attributed to an image
///
/// `Detected` comes from the image header and is authoritative. `Guessed`
/// carries a label inferred from secondary evidence such as partition table
/// placement or bootloader location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChipTag<'a> {
    /// No evidence about the chip family
    #[default]
    Unknown,
    /// Chip identified from the extended image header
    Detected(&'a ChipDef),
    /// Best guess from layout heuristics
    Guessed(&'static str),
}

impl<'a> ChipTag<'a> {
    /// Label used in reports
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unknown => "Unknown",
            Self::Detected(def) => def.name,
            Self::Guessed(label) => label,
        }
    }

    /// Check whether no chip family has been attributed yet
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Chip descriptor, if the chip was identified from the header
    pub fn def(&self) -> Option<&'a ChipDef> {
        match *self {
            Self::Detected(def) => Some(def),
            _ => None,
        }
    }
}

impl fmt::Display for ChipTag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
