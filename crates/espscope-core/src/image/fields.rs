//! Header fields shared by the structured and heuristic decoders

use alloc::string::String;
use core::fmt;

/// SPI flash mode stored in byte 2 of the image header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashMode {
    /// Quad I/O
    Qio,
    /// Quad output
    Qout,
    /// Dual I/O
    Dio,
    /// Dual output
    Dout,
    /// Any other code, reported as its decimal value
    Other(u8),
}

impl FlashMode {
    /// Decode a raw flash mode byte
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Qio,
            1 => Self::Qout,
            2 => Self::Dio,
            3 => Self::Dout,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for FlashMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qio => f.write_str("QIO"),
            Self::Qout => f.write_str("QOUT"),
            Self::Dio => f.write_str("DIO"),
            Self::Dout => f.write_str("DOUT"),
            Self::Other(code) => write!(f, "{}", code),
        }
    }
}

/// Flash configuration and entry information read from an image header
///
/// The structured decoder fills every field; the heuristic parser leaves
/// `flash_size`, `entry_point` and `segment_count` unset because it has no
/// chip-specific tables and does not walk segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHeaderFields {
    /// Flash mode
    pub flash_mode: FlashMode,
    /// Flash size label from the chip's size table
    pub flash_size: Option<&'static str>,
    /// Flash size nibble, set when no label could be resolved
    pub flash_size_raw: Option<u8>,
    /// Flash frequency label (or `Unknown(<code>)`)
    pub flash_freq: String,
    /// Entry point address
    pub entry_point: Option<u32>,
    /// Number of segments in the image
    pub segment_count: Option<usize>,
}
