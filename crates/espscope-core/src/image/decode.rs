//! Structured image decoding for a known chip family

use alloc::format;
use alloc::vec::Vec;

use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

use super::{ExtendedHeader, FlashMode, ImageError, ImageHeader, ImageHeaderFields};
use crate::chip::ChipDef;

/// Maximum number of segments the ROM loader accepts
pub const MAX_SEGMENTS: u8 = 16;

/// Seed of the XOR checksum over segment data
const CHECKSUM_SEED: u8 = 0xEF;

/// Segment header preceding each segment's data
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct SegmentHeader {
    load_addr: U32,
    data_len: U32,
}

impl SegmentHeader {
    const SIZE: usize = 8;
}

/// One loadable segment of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Address the ROM loader copies the segment to
    pub load_addr: u32,
    /// Offset of the segment data within the image buffer
    pub data_offset: usize,
    /// Length of the segment data in bytes
    pub length: u32,
}

/// A fully decoded image
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Basic header
    pub header: ImageHeader,
    /// Extended header
    pub extended: ExtendedHeader,
    /// Segments in image order
    pub segments: Vec<Segment>,
    /// Checksum byte stored after the last segment
    pub stored_checksum: u8,
    /// Checksum computed over the segment data
    pub calculated_checksum: u8,
}

impl ImageInfo {
    /// Check the stored checksum against the segment data
    pub fn checksum_valid(&self) -> bool {
        self.stored_checksum == self.calculated_checksum
    }

    /// Resolve header fields against the chip's flash tables
    ///
    /// Values missing from the chip's tables are passed through: the size
    /// nibble lands in `flash_size_raw` and the frequency becomes
    /// `Unknown(<code>)`.
    pub fn header_fields(&self, chip: &ChipDef) -> ImageHeaderFields {
        let size_value = self.header.flash_size_freq & 0xF0;
        let freq_value = self.header.flash_freq_code();
        let flash_size = chip.flash_size_name(size_value);

        ImageHeaderFields {
            flash_mode: FlashMode::from_code(self.header.flash_mode),
            flash_size,
            flash_size_raw: match flash_size {
                Some(_) => None,
                None => Some(self.header.flash_size_code()),
            },
            flash_freq: match chip.flash_freq_name(freq_value) {
                Some(name) => name.into(),
                None => format!("Unknown({})", freq_value),
            },
            entry_point: Some(self.header.entry_point()),
            segment_count: Some(self.segments.len()),
        }
    }
}

/// Decode `data` as an image built for `chip`
///
/// Validates both headers, walks every segment and reads the checksum byte.
/// A checksum mismatch is logged but does not fail decoding.
pub fn decode_image(chip: &ChipDef, data: &[u8]) -> Result<ImageInfo, ImageError> {
    let expected_id = match chip.image_chip_id {
        Some(id) if !chip.legacy_image_format => id,
        _ => return Err(ImageError::LegacyFormat(chip.name)),
    };

    let header_len = ImageHeader::SIZE + ExtendedHeader::SIZE;
    let truncated = ImageError::Truncated {
        needed: header_len,
        available: data.len(),
    };
    let header = ImageHeader::parse(data).ok_or(truncated)?;
    if !header.has_magic() {
        return Err(ImageError::InvalidMagic(header.magic));
    }
    let extended = ExtendedHeader::parse(data).ok_or(truncated)?;

    // Chip identification keys on the low byte; a differing high byte only warns
    if u16::from(extended.chip_id_byte()) != expected_id {
        return Err(ImageError::ChipIdMismatch {
            expected: expected_id,
            found: extended.chip_id(),
        });
    }
    if extended.chip_id() != expected_id {
        log::warn!(
            "{} image carries chip id 0x{:04x}, expected {}",
            chip.name,
            extended.chip_id(),
            expected_id
        );
    }

    if header.segment_count > MAX_SEGMENTS {
        return Err(ImageError::InvalidSegmentCount(header.segment_count));
    }

    let mut pos = header_len;
    let mut checksum = CHECKSUM_SEED;
    let mut segments = Vec::with_capacity(usize::from(header.segment_count));

    for index in 0..usize::from(header.segment_count) {
        let seg_header = data
            .get(pos..)
            .and_then(|rest| SegmentHeader::read_from_prefix(rest).ok())
            .map(|(h, _)| h)
            .ok_or(ImageError::Truncated {
                needed: pos + SegmentHeader::SIZE,
                available: data.len(),
            })?;
        pos += SegmentHeader::SIZE;

        let length = seg_header.data_len.get();
        let available = data.len() - pos;
        let seg_data = usize::try_from(length)
            .ok()
            .and_then(|len| data.get(pos..pos.checked_add(len)?))
            .ok_or(ImageError::SegmentOutOfBounds {
                index,
                offset: pos,
                length,
                available,
            })?;

        checksum = seg_data.iter().fold(checksum, |acc, b| acc ^ b);
        segments.push(Segment {
            load_addr: seg_header.load_addr.get(),
            data_offset: pos,
            length,
        });
        log::trace!(
            "segment {}: load 0x{:08x}, {} bytes at 0x{:x}",
            index,
            seg_header.load_addr.get(),
            length,
            pos
        );
        pos += seg_data.len();
    }

    // Checksum sits in the last byte of the next 16-byte block
    let checksum_pos = pos + (15 - pos % 16);
    let stored_checksum = *data.get(checksum_pos).ok_or(ImageError::MissingChecksum)?;

    let info = ImageInfo {
        header,
        extended,
        segments,
        stored_checksum,
        calculated_checksum: checksum,
    };
    if !info.checksum_valid() {
        log::warn!(
            "{} image checksum mismatch: stored 0x{:02x}, calculated 0x{:02x}",
            chip.name,
            stored_checksum,
            checksum
        );
    }
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::{find_by_name, CHIP_DEFS};
    use crate::image::ESP_IMAGE_MAGIC;
    use std::vec;

    fn chip(name: &str) -> &'static ChipDef {
        find_by_name(CHIP_DEFS, name).unwrap()
    }

    /// Build a valid image with the given segment payloads
    fn make_image(chip_id: u16, size_freq: u8, segments: &[&[u8]]) -> Vec<u8> {
        let mut data = vec![0u8; 24];
        data[0] = ESP_IMAGE_MAGIC;
        data[1] = segments.len() as u8;
        data[2] = 2;
        data[3] = size_freq;
        data[4..8].copy_from_slice(&0x4037_8000u32.to_le_bytes());
        data[0x0C..0x0E].copy_from_slice(&chip_id.to_le_bytes());

        let mut checksum = CHECKSUM_SEED;
        for (i, seg) in segments.iter().enumerate() {
            let addr = 0x3FC8_0000u32 + (i as u32) * 0x1000;
            data.extend_from_slice(&addr.to_le_bytes());
            data.extend_from_slice(&(seg.len() as u32).to_le_bytes());
            data.extend_from_slice(seg);
            checksum = seg.iter().fold(checksum, |acc, b| acc ^ b);
        }
        while data.len() % 16 != 15 {
            data.push(0);
        }
        data.push(checksum);
        data
    }

    #[test]
    fn test_decode_valid_image() {
        let data = make_image(9, 0x2F, &[&[1, 2, 3, 4], &[0xAA; 10]]);
        let info = decode_image(chip("esp32s3"), &data).unwrap();

        assert_eq!(info.segments.len(), 2);
        assert_eq!(info.segments[0].data_offset, 32);
        assert_eq!(info.segments[1].length, 10);
        assert!(info.checksum_valid());

        let fields = info.header_fields(chip("esp32s3"));
        assert_eq!(fields.flash_mode, FlashMode::Dio);
        assert_eq!(fields.flash_size, Some("4MB"));
        assert_eq!(fields.flash_size_raw, None);
        assert_eq!(fields.flash_freq, "80m");
        assert_eq!(fields.entry_point, Some(0x4037_8000));
        assert_eq!(fields.segment_count, Some(2));
    }

    #[test]
    fn test_unmatched_table_values_pass_through() {
        let data = make_image(12, 0xF7, &[&[0; 4]]);
        let fields = decode_image(chip("esp32c2"), &data)
            .unwrap()
            .header_fields(chip("esp32c2"));
        assert_eq!(fields.flash_size, None);
        assert_eq!(fields.flash_size_raw, Some(0xF));
        assert_eq!(fields.flash_freq, "Unknown(7)");
    }

    #[test]
    fn test_bad_checksum_still_decodes() {
        let mut data = make_image(0, 0x20, &[&[5; 8]]);
        *data.last_mut().unwrap() ^= 0xFF;
        let info = decode_image(chip("esp32"), &data).unwrap();
        assert!(!info.checksum_valid());
    }

    #[test]
    fn test_chip_id_mismatch() {
        let data = make_image(5, 0x20, &[&[0; 4]]);
        assert_eq!(
            decode_image(chip("esp32"), &data).unwrap_err(),
            ImageError::ChipIdMismatch {
                expected: 0,
                found: 5
            }
        );
    }

    #[test]
    fn test_chip_id_high_byte_ignored() {
        let mut data = make_image(9, 0x2F, &[&[1, 2, 3, 4]]);
        data[0x0D] = 1;
        let info = decode_image(chip("esp32s3"), &data).unwrap();
        assert_eq!(info.extended.chip_id(), 0x0109);

        let fields = info.header_fields(chip("esp32s3"));
        assert_eq!(fields.flash_mode, FlashMode::Dio);
        assert_eq!(fields.segment_count, Some(1));
    }

    #[test]
    fn test_truncated_segment() {
        let data = make_image(0, 0x20, &[&[0; 64]]);
        let err = decode_image(chip("esp32"), &data[..40]).unwrap_err();
        assert!(matches!(
            err,
            ImageError::SegmentOutOfBounds {
                index: 0,
                length: 64,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_checksum() {
        let data = make_image(0, 0x20, &[&[0; 8]]);
        let err = decode_image(chip("esp32"), &data[..data.len() - 1]).unwrap_err();
        assert_eq!(err, ImageError::MissingChecksum);
    }

    #[test]
    fn test_too_many_segments() {
        let mut data = make_image(0, 0x20, &[]);
        data[1] = 17;
        assert_eq!(
            decode_image(chip("esp32"), &data).unwrap_err(),
            ImageError::InvalidSegmentCount(17)
        );
    }

    #[test]
    fn test_legacy_chip_rejected() {
        let data = make_image(0, 0x20, &[&[0; 4]]);
        assert_eq!(
            decode_image(chip("esp8266"), &data).unwrap_err(),
            ImageError::LegacyFormat("esp8266")
        );
    }
}
