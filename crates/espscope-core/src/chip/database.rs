//! Static chip registry
//!
//! The registry is a plain slice so lookups are deterministic: entries are
//! scanned in declaration order and the first match wins.

use super::types::ChipDef;

/// Flash sizes for ESP8266 (values differ from every later chip)
const ESP8266_FLASH_SIZES: &[(&str, u8)] = &[
    ("512KB", 0x00),
    ("256KB", 0x10),
    ("1MB", 0x20),
    ("2MB", 0x30),
    ("4MB", 0x40),
    ("2MB-c1", 0x50),
    ("4MB-c1", 0x60),
    ("8MB", 0x80),
    ("16MB", 0x90),
];

/// Flash sizes shared by the ESP32 family
const ESP32_FLASH_SIZES: &[(&str, u8)] = &[
    ("1MB", 0x00),
    ("2MB", 0x10),
    ("4MB", 0x20),
    ("8MB", 0x30),
    ("16MB", 0x40),
    ("32MB", 0x50),
    ("64MB", 0x60),
    ("128MB", 0x70),
];

const FREQ_80_40_26_20: &[(&str, u8)] = &[("80m", 0xF), ("40m", 0x0), ("26m", 0x1), ("20m", 0x2)];

const FREQ_80_40_20: &[(&str, u8)] = &[("80m", 0xF), ("40m", 0x0), ("20m", 0x2)];

// ESP32-C2 runs its SPI flash from a 60 MHz source
const FREQ_ESP32C2: &[(&str, u8)] = &[("60m", 0xF), ("30m", 0x0), ("20m", 0x1), ("15m", 0x2)];

// 80m and 40m share a value on ESP32-C6
const FREQ_ESP32C6: &[(&str, u8)] = &[("80m", 0x0), ("40m", 0x0), ("20m", 0x2)];

const FREQ_ESP32H2: &[(&str, u8)] = &[("48m", 0xF), ("24m", 0x0), ("16m", 0x1), ("12m", 0x2)];

const fn chip(
    name: &'static str,
    image_chip_id: u16,
    flash_frequencies: &'static [(&'static str, u8)],
) -> ChipDef {
    ChipDef {
        name,
        image_chip_id: Some(image_chip_id),
        legacy_image_format: false,
        flash_sizes: ESP32_FLASH_SIZES,
        flash_frequencies,
    }
}

/// Every chip family known to the analyzer
///
/// Two families sharing an image chip ID would make the later one
/// unreachable; [`find_by_image_chip_id`] keeps first-match-wins.
pub static CHIP_DEFS: &[ChipDef] = &[
    ChipDef {
        name: "esp8266",
        image_chip_id: None,
        legacy_image_format: true,
        flash_sizes: ESP8266_FLASH_SIZES,
        flash_frequencies: FREQ_80_40_26_20,
    },
    chip("esp32", 0, FREQ_80_40_26_20),
    chip("esp32s2", 2, FREQ_80_40_26_20),
    chip("esp32s3", 9, FREQ_80_40_26_20),
    chip("esp32c3", 5, FREQ_80_40_26_20),
    chip("esp32c2", 12, FREQ_ESP32C2),
    chip("esp32c6", 13, FREQ_ESP32C6),
    chip("esp32c61", 20, FREQ_80_40_20),
    chip("esp32c5", 23, FREQ_80_40_20),
    chip("esp32h2", 16, FREQ_ESP32H2),
    chip("esp32p4", 18, FREQ_80_40_20),
];

/// Find the chip family whose image chip ID equals `chip_id`
///
/// Chips using the legacy image format are skipped: their headers carry no
/// chip-ID field, so any byte found at that position is unrelated data.
pub fn find_by_image_chip_id(chips: &[ChipDef], chip_id: u16) -> Option<&ChipDef> {
    chips
        .iter()
        .filter(|c| c.has_extended_header())
        .find(|c| c.image_chip_id == Some(chip_id))
}

/// Find a chip family by registry name (case-insensitive)
pub fn find_by_name<'a>(chips: &'a [ChipDef], name: &str) -> Option<&'a ChipDef> {
    chips.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}
