//! Partition table search in flash images

use super::{PartitionTable, PARTITION_MAGIC};

/// Offsets probed for a partition table, in priority order
///
/// 0x8000 is the ESP-IDF default on every chip; the others cover relocated
/// tables and images with larger bootloaders.
pub const PARTITION_TABLE_OFFSETS: [usize; 4] = [0x8000, 0x9000, 0x10000, 0x20000];

/// Maximum size of a partition table region
pub const PARTITION_TABLE_WINDOW: usize = 0xC00;

/// A partition table located in an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// Offset of the table within the image
    pub offset: usize,
    /// Decoded table (never empty)
    pub table: PartitionTable,
}

/// Search `data` for a partition table at the candidate offsets
///
/// A candidate is tried only if its first two bytes carry the partition
/// magic. Candidates that fail to decode, or decode to an empty table, are
/// skipped. The first candidate yielding entries wins.
pub fn scan_partition_table(data: &[u8]) -> Option<ScanResult> {
    PARTITION_TABLE_OFFSETS
        .iter()
        .find_map(|&offset| try_offset(data, offset))
}

fn try_offset(data: &[u8], offset: usize) -> Option<ScanResult> {
    if data.len() <= offset + 2 || data[offset..offset + 2] != PARTITION_MAGIC {
        return None;
    }

    let end = data.len().min(offset + PARTITION_TABLE_WINDOW);
    match PartitionTable::from_binary(&data[offset..end]) {
        Ok(table) if !table.is_empty() => {
            log::debug!(
                "partition table at 0x{:x} with {} entries",
                offset,
                table.len()
            );
            Some(ScanResult { offset, table })
        }
        Ok(_) => {
            log::debug!("empty partition table at 0x{:x}, skipping", offset);
            None
        }
        Err(e) => {
            log::debug!("partition magic at 0x{:x} but {}", offset, e);
            None
        }
    }
}
