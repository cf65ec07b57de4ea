//! Image decoding errors

use core::fmt;

/// Errors from structured or heuristic image header decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageError {
    /// Buffer ends before a fixed-size structure
    Truncated {
        /// Bytes required
        needed: usize,
        /// Bytes present
        available: usize,
    },
    /// First byte is not the image magic
    InvalidMagic(u8),
    /// Chip chosen for decoding is not the chip the image was built for
    ChipIdMismatch {
        /// Chip ID of the chip chosen for decoding
        expected: u16,
        /// Chip ID stored in the image
        found: u16,
    },
    /// More segments than the ROM loader accepts
    InvalidSegmentCount(u8),
    /// A segment runs past the end of the buffer
    SegmentOutOfBounds {
        /// Segment index
        index: usize,
        /// Offset of the segment data in the buffer
        offset: usize,
        /// Declared segment length
        length: u32,
        /// Bytes actually left in the buffer
        available: usize,
    },
    /// Buffer ends before the checksum byte
    MissingChecksum,
    /// Chip uses the legacy image format this decoder does not handle
    LegacyFormat(&'static str),
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { needed, available } => {
                write!(f, "image truncated: need {} bytes, got {}", needed, available)
            }
            Self::InvalidMagic(magic) => {
                write!(f, "invalid firmware image magic 0x{:02x}", magic)
            }
            Self::ChipIdMismatch { expected, found } => write!(
                f,
                "unexpected chip id in image: expected {} but value was {}",
                expected, found
            ),
            Self::InvalidSegmentCount(count) => {
                write!(f, "invalid segment count {} (max {})", count, super::MAX_SEGMENTS)
            }
            Self::SegmentOutOfBounds {
                index,
                offset,
                length,
                available,
            } => write!(
                f,
                "end of file reading segment {} at 0x{:x}, length {} (actual length {})",
                index, offset, length, available
            ),
            Self::MissingChecksum => write!(f, "end of file reading image checksum"),
            Self::LegacyFormat(name) => {
                write!(f, "{} images use the legacy header format", name)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ImageError {}
