//! ESP-IDF partition tables
//!
//! A partition table is a sequence of 32-byte rows, usually flashed at
//! 0x8000, optionally followed by an MD5 row and terminated by a row of
//! `0xFF` bytes. [`PartitionTable::from_binary`] decodes one table and
//! [`scan_partition_table`] probes the usual flash offsets for it.

mod error;
mod scan;
mod table;

pub use error::PartitionError;
pub use scan::{scan_partition_table, ScanResult, PARTITION_TABLE_OFFSETS, PARTITION_TABLE_WINDOW};
pub use table::{PartitionEntry, PartitionFlags, PartitionTable, PARTITION_MAGIC};

#[cfg(test)]
pub(crate) use table::tests as test_util;
