//! Partition table decoding errors

use core::fmt;

/// Errors from decoding a partition table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionError {
    /// Row does not start with the partition magic
    InvalidMagic {
        /// Offset of the row within the table
        offset: usize,
        /// First two bytes of the row
        found: [u8; 2],
    },
    /// Table data ends in the middle of a row
    Misaligned {
        /// Total length of the table data
        length: usize,
    },
    /// MD5 row does not match the preceding rows
    Md5Mismatch,
    /// Partition name is not valid UTF-8
    InvalidName {
        /// Offset of the row within the table
        offset: usize,
    },
    /// No end-of-table row before the data ran out
    MissingEndMarker,
}

impl fmt::Display for PartitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMagic { offset, found } => write!(
                f,
                "invalid magic bytes {:02x}{:02x} for partition definition at 0x{:x}",
                found[0], found[1], offset
            ),
            Self::Misaligned { length } => write!(
                f,
                "partition table length {} is not a multiple of 32 bytes",
                length
            ),
            Self::Md5Mismatch => write!(f, "MD5 checksums don't match"),
            Self::InvalidName { offset } => {
                write!(f, "partition name at 0x{:x} is not valid UTF-8", offset)
            }
            Self::MissingEndMarker => {
                write!(f, "partition table is missing an end-of-table marker")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PartitionError {}
