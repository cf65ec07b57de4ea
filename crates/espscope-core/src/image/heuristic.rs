//! Chip-agnostic header parsing
//!
//! Used when the chip family could not be identified. Flash mode and
//! frequency codes are interpreted through fixed tables that hold for the
//! original ESP32; the flash size code is reported raw since its meaning
//! depends on the chip.

use alloc::format;
use alloc::string::{String, ToString};

use super::{FlashMode, ImageError, ImageHeader, ImageHeaderFields, ESP_IMAGE_MAGIC};

/// Frequency labels assumed when the chip family is unknown
const FLASH_FREQS: [(u8, &str); 4] = [
    (0x0, "40MHz"),
    (0x1, "26MHz"),
    (0x2, "20MHz"),
    (0xF, "80MHz"),
];

/// Label for a flash frequency code without chip context
pub fn heuristic_flash_freq(code: u8) -> String {
    FLASH_FREQS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("Unknown({})", code))
}

/// Read flash mode, size code and frequency from the basic header
///
/// Only the 8-byte basic header is needed. Entry point and segment count are
/// left unset.
pub fn parse_header_heuristic(data: &[u8]) -> Result<ImageHeaderFields, ImageError> {
    let header = ImageHeader::parse(data).ok_or(ImageError::Truncated {
        needed: ImageHeader::SIZE,
        available: data.len(),
    })?;
    if !header.has_magic() {
        return Err(ImageError::InvalidMagic(header.magic));
    }

    log::trace!(
        "heuristic header: mode=0x{:02x} size_freq=0x{:02x}",
        header.flash_mode,
        header.flash_size_freq
    );

    Ok(ImageHeaderFields {
        flash_mode: FlashMode::from_code(header.flash_mode),
        flash_size: None,
        flash_size_raw: Some(header.flash_size_code()),
        flash_freq: heuristic_flash_freq(header.flash_freq_code()),
        entry_point: None,
        segment_count: None,
    })
}
