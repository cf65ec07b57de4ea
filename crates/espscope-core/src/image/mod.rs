//! ESP application and bootloader image headers
//!
//! Every ESP image starts with an 8-byte basic header followed, on all chips
//! newer than the ESP8266, by a 16-byte extended header. This module reads
//! those headers three ways:
//!
//! - [`detect_chip`] recovers the chip family from the extended header
//! - [`decode_image`] walks the full image for a known chip family
//! - [`parse_header_heuristic`] reads fixed offsets without chip context

mod decode;
mod error;
mod fields;
mod header;
mod heuristic;

pub use decode::{decode_image, ImageInfo, Segment, MAX_SEGMENTS};
pub use error::ImageError;
pub use fields::{FlashMode, ImageHeaderFields};
pub use header::{detect_chip, ExtendedHeader, ImageHeader, ESP_IMAGE_MAGIC};
pub use heuristic::{heuristic_flash_freq, parse_header_heuristic};
