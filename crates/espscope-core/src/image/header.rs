//! Raw image header layouts and chip detection
//!
//! Layout of the first 24 bytes of an image:
//!
//! ```text
//! 0x00  magic (0xE9)         0x08  WP pin
//! 0x01  segment count        0x09  SPI pin drive (3 bytes)
//! 0x02  flash mode           0x0C  chip ID (u16 LE)
//! 0x03  flash size | freq    0x0E  min chip revision
//! 0x04  entry point (u32 LE) 0x0F  min/max full revision (2x u16 LE)
//!                            0x13  reserved (4 bytes)
//!                            0x17  hash appended
//! ```

use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

use crate::chip::{find_by_image_chip_id, ChipDef, ChipTag};

/// First byte of every ESP image
pub const ESP_IMAGE_MAGIC: u8 = 0xE9;

/// Basic image header (8 bytes)
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct ImageHeader {
    /// Image magic, [`ESP_IMAGE_MAGIC`] for valid images
    pub magic: u8,
    /// Number of segments following the headers
    pub segment_count: u8,
    /// SPI flash mode code
    pub flash_mode: u8,
    /// Flash size code (high nibble) and frequency code (low nibble)
    pub flash_size_freq: u8,
    /// Entry point address
    pub entry: U32,
}

impl ImageHeader {
    /// Size of the basic header in bytes
    pub const SIZE: usize = 8;

    /// Read the basic header from the start of `data`
    pub fn parse(data: &[u8]) -> Option<Self> {
        Self::read_from_prefix(data).ok().map(|(header, _)| header)
    }

    /// Check the magic byte
    pub fn has_magic(&self) -> bool {
        self.magic == ESP_IMAGE_MAGIC
    }

    /// Flash size code (high nibble of byte 3)
    pub fn flash_size_code(&self) -> u8 {
        self.flash_size_freq >> 4
    }

    /// Flash frequency code (low nibble of byte 3)
    pub fn flash_freq_code(&self) -> u8 {
        self.flash_size_freq & 0x0F
    }

    /// Entry point address
    pub fn entry_point(&self) -> u32 {
        self.entry.get()
    }
}

/// Extended image header (16 bytes, not present on ESP8266)
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct ExtendedHeader {
    /// GPIO used for flash write protect
    pub wp_pin: u8,
    /// SPI pin drive strengths
    pub spi_pin_drv: [u8; 3],
    /// Chip ID the image was built for
    pub chip_id: U16,
    /// Minimum chip revision (legacy field)
    pub min_chip_rev: u8,
    /// Minimum chip revision, major * 100 + minor
    pub min_chip_rev_full: U16,
    /// Maximum chip revision, major * 100 + minor
    pub max_chip_rev_full: U16,
    /// Reserved
    pub reserved: [u8; 4],
    /// Non-zero when a SHA-256 digest follows the image
    pub hash_appended: u8,
}

impl ExtendedHeader {
    /// Size of the extended header in bytes
    pub const SIZE: usize = 16;

    /// Offset of the extended header within an image
    pub const OFFSET: usize = ImageHeader::SIZE;

    /// Read the extended header of the image starting at `data[0]`
    pub fn parse(data: &[u8]) -> Option<Self> {
        let rest = data.get(Self::OFFSET..)?;
        Self::read_from_prefix(rest).ok().map(|(header, _)| header)
    }

    /// Full 16-bit chip ID
    pub fn chip_id(&self) -> u16 {
        self.chip_id.get()
    }

    /// Low byte of the chip ID (byte 4 of the extended header)
    pub fn chip_id_byte(&self) -> u8 {
        (self.chip_id.get() & 0xFF) as u8
    }

    /// Check whether a SHA-256 digest is appended to the image
    pub fn has_hash(&self) -> bool {
        self.hash_appended != 0
    }
}

/// Identify the chip family an image was built for
///
/// Returns [`ChipTag::Unknown`] when the buffer does not start with the image
/// magic, is too short to hold both headers, or carries a chip ID that is not
/// in `chips`. Legacy-format chips are never returned.
pub fn detect_chip<'a>(data: &[u8], chips: &'a [ChipDef]) -> ChipTag<'a> {
    let Some(header) = ImageHeader::parse(data) else {
        return ChipTag::Unknown;
    };
    if !header.has_magic() {
        return ChipTag::Unknown;
    }
    let Some(extended) = ExtendedHeader::parse(data) else {
        log::debug!("image header present but extended header truncated");
        return ChipTag::Unknown;
    };

    let chip_id = extended.chip_id_byte();
    log::trace!("extended header chip id byte: {}", chip_id);

    match find_by_image_chip_id(chips, u16::from(chip_id)) {
        Some(def) => ChipTag::Detected(def),
        None => {
            log::debug!("chip id {} not in registry", chip_id);
            ChipTag::Unknown
        }
    }
}
