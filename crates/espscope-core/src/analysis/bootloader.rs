//! Bootloader location heuristic
//!
//! The original ESP32 runs its second-stage bootloader from 0x1000; newer
//! chips run it from offset 0. Finding an image header at either place tells
//! us the chip generation and the flash size the bootloader was built for.

use alloc::format;
use alloc::string::{String, ToString};

use crate::image::{ImageHeader, ESP_IMAGE_MAGIC};

/// Bootloader offset on the original ESP32
pub const ESP32_BOOTLOADER_OFFSET: usize = 0x1000;

/// Flash sizes by size code, as written by the ESP32 bootloader
const FLASH_SIZES: [&str; 6] = ["1MB", "2MB", "4MB", "8MB", "16MB", "32MB"];

/// Family label for bootloaders found at 0x1000
const ESP32_FAMILY: &str = "ESP32";

/// Family label for bootloaders found at offset 0
const NEWER_FAMILY: &str = "ESP32-S3/C3/S2";

/// Flash size and chip generation implied by the bootloader location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootloaderEstimate {
    /// Bootloader offset the header was found at
    pub offset: usize,
    /// Flash size label (or `Unknown ID <n>`)
    pub flash_size: String,
    /// Chip family label implied by the offset
    pub family: &'static str,
}

fn flash_size_name(code: u8) -> String {
    FLASH_SIZES
        .get(usize::from(code))
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("Unknown ID {}", code))
}

/// Look for a bootloader header at 0x1000, then at offset 0
pub fn estimate_bootloader(data: &[u8]) -> Option<BootloaderEstimate> {
    if data.len() > ESP32_BOOTLOADER_OFFSET + 4
        && data[ESP32_BOOTLOADER_OFFSET] == ESP_IMAGE_MAGIC
    {
        let size_code = data[ESP32_BOOTLOADER_OFFSET + 3] >> 4;
        return Some(BootloaderEstimate {
            offset: ESP32_BOOTLOADER_OFFSET,
            flash_size: flash_size_name(size_code),
            family: ESP32_FAMILY,
        });
    }

    let header = ImageHeader::parse(data)?;
    if !header.has_magic() {
        return None;
    }
    Some(BootloaderEstimate {
        offset: 0,
        flash_size: flash_size_name(header.flash_size_code()),
        family: NEWER_FAMILY,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec;

    #[test]
    fn test_esp32_bootloader() {
        let mut data = vec![0xFF; 0x2000];
        data[0x1000] = ESP_IMAGE_MAGIC;
        data[0x1003] = 0x20;
        let est = estimate_bootloader(&data).unwrap();
        assert_eq!(est.offset, 0x1000);
        assert_eq!(est.flash_size, "4MB");
        assert_eq!(est.family, "ESP32");
    }

    #[test]
    fn test_esp32_bootloader_wins_over_offset_zero() {
        let mut data = vec![0u8; 0x2000];
        data[0] = ESP_IMAGE_MAGIC;
        data[3] = 0x00;
        data[0x1000] = ESP_IMAGE_MAGIC;
        data[0x1003] = 0x40;
        let est = estimate_bootloader(&data).unwrap();
        assert_eq!(est.family, "ESP32");
        assert_eq!(est.flash_size, "16MB");
    }

    #[test]
    fn test_offset_zero_bootloader() {
        let data = [ESP_IMAGE_MAGIC, 3, 2, 0x3F, 0x00, 0x00, 0x38, 0x40];
        let est = estimate_bootloader(&data).unwrap();
        assert_eq!(est.offset, 0);
        assert_eq!(est.flash_size, "8MB");
        assert_eq!(est.family, "ESP32-S3/C3/S2");
    }

    #[test]
    fn test_unknown_size_code() {
        let data = [ESP_IMAGE_MAGIC, 3, 2, 0x9F, 0x00, 0x00, 0x38, 0x40];
        assert_eq!(estimate_bootloader(&data).unwrap().flash_size, "Unknown ID 9");
    }

    #[test]
    fn test_no_bootloader() {
        assert_eq!(estimate_bootloader(&[0xFF; 0x2000]), None);
        assert_eq!(estimate_bootloader(&[ESP_IMAGE_MAGIC, 0, 2, 0x10]), None);
        // 0x1000 probe needs a few header bytes past the magic
        let mut data = vec![0u8; 0x1004];
        data[0x1000] = ESP_IMAGE_MAGIC;
        assert_eq!(estimate_bootloader(&data), None);
    }
}
