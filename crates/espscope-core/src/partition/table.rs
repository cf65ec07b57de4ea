//! Binary partition table codec

use alloc::vec::Vec;

use bitflags::bitflags;
use md5::{Digest, Md5};
use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

use super::PartitionError;

/// Magic bytes at the start of every partition row
pub const PARTITION_MAGIC: [u8; 2] = [0xAA, 0x50];

/// First two bytes of the MD5 row
const MD5_MAGIC: [u8; 2] = [0xEB, 0xEB];

/// Size of one partition row
const ROW_SIZE: usize = 32;

/// Maximum partition name length
const NAME_LEN: usize = 16;

bitflags! {
    /// Partition flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PartitionFlags: u32 {
        /// Partition contents are flash-encrypted
        const ENCRYPTED = 1 << 0;
        /// Partition is mounted read-only
        const READONLY  = 1 << 1;
    }
}

/// On-flash row layout
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct RawEntry {
    magic: [u8; 2],
    ptype: u8,
    subtype: u8,
    offset: U32,
    size: U32,
    name: [u8; NAME_LEN],
    flags: U32,
}

/// One partition definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionEntry {
    /// Partition label
    pub name: heapless::String<NAME_LEN>,
    /// Partition type (0 = app, 1 = data, others custom)
    pub ptype: u8,
    /// Partition subtype
    pub subtype: u8,
    /// Flash offset in bytes
    pub offset: u32,
    /// Size in bytes
    pub size: u32,
    /// Flags
    pub flags: PartitionFlags,
}

impl PartitionEntry {
    /// Check whether the partition is encrypted
    pub fn encrypted(&self) -> bool {
        self.flags.contains(PartitionFlags::ENCRYPTED)
    }

    /// Check whether the partition is read-only
    pub fn readonly(&self) -> bool {
        self.flags.contains(PartitionFlags::READONLY)
    }

    fn from_row(row: &[u8], offset: usize) -> Result<Self, PartitionError> {
        let raw = RawEntry::read_from_bytes(row).map_err(|_| PartitionError::Misaligned {
            length: offset + row.len(),
        })?;
        if raw.magic != PARTITION_MAGIC {
            return Err(PartitionError::InvalidMagic {
                offset,
                found: raw.magic,
            });
        }

        Ok(Self {
            name: parse_name(&raw.name).ok_or(PartitionError::InvalidName { offset })?,
            ptype: raw.ptype,
            subtype: raw.subtype,
            offset: raw.offset.get(),
            size: raw.size.get(),
            flags: PartitionFlags::from_bits_truncate(raw.flags.get()),
        })
    }
}

/// Decode a NUL-padded partition name
fn parse_name(bytes: &[u8; NAME_LEN]) -> Option<heapless::String<NAME_LEN>> {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(NAME_LEN);
    let end = bytes.iter().rposition(|&b| b != 0).map_or(start, |i| i + 1);
    let name = core::str::from_utf8(&bytes[start..end]).ok()?;
    heapless::String::try_from(name).ok()
}

/// A decoded partition table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionTable {
    /// Entries in table order
    pub entries: Vec<PartitionEntry>,
    /// Whether the table carried an MD5 row (and it matched)
    pub md5_verified: bool,
}

impl PartitionTable {
    /// Decode a partition table from the start of `data`
    ///
    /// `data` may extend past the end of the table; decoding stops at the
    /// end-of-table row.
    pub fn from_binary(data: &[u8]) -> Result<Self, PartitionError> {
        let mut table = Self::default();

        for (index, row) in data.chunks(ROW_SIZE).enumerate() {
            let offset = index * ROW_SIZE;
            if row.len() != ROW_SIZE {
                return Err(PartitionError::Misaligned { length: data.len() });
            }

            if row.iter().all(|&b| b == 0xFF) {
                return Ok(table);
            }

            if row[..2] == MD5_MAGIC {
                let digest = Md5::digest(&data[..offset]);
                if digest.as_slice() != &row[16..] {
                    return Err(PartitionError::Md5Mismatch);
                }
                table.md5_verified = true;
                continue;
            }

            table.entries.push(PartitionEntry::from_row(row, offset)?);
        }

        Err(PartitionError::MissingEndMarker)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in table order
    pub fn iter(&self) -> impl Iterator<Item = &PartitionEntry> {
        self.entries.iter()
    }

    /// Find an entry by label
    pub fn find(&self, name: &str) -> Option<&PartitionEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::vec;

    pub(crate) fn make_row(
        name: &str,
        ptype: u8,
        subtype: u8,
        offset: u32,
        size: u32,
        flags: u32,
    ) -> Vec<u8> {
        let mut row = vec![0u8; ROW_SIZE];
        row[0..2].copy_from_slice(&PARTITION_MAGIC);
        row[2] = ptype;
        row[3] = subtype;
        row[4..8].copy_from_slice(&offset.to_le_bytes());
        row[8..12].copy_from_slice(&size.to_le_bytes());
        row[12..12 + name.len()].copy_from_slice(name.as_bytes());
        row[28..32].copy_from_slice(&flags.to_le_bytes());
        row
    }

    /// Default single-app layout with MD5 row and end marker
    pub(crate) fn make_table(with_md5: bool) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend(make_row("nvs", 1, 0x02, 0x9000, 0x6000, 0));
        data.extend(make_row("phy_init", 1, 0x01, 0xF000, 0x1000, 0));
        data.extend(make_row("factory", 0, 0x00, 0x10000, 0x10_0000, 1));
        if with_md5 {
            let digest = Md5::digest(&data);
            let mut row = vec![0xFF; ROW_SIZE];
            row[0..2].copy_from_slice(&MD5_MAGIC);
            row[16..].copy_from_slice(&digest);
            data.extend(row);
        }
        data.extend([0xFF; ROW_SIZE]);
        data
    }

    #[test]
    fn test_decode_table() {
        let table = PartitionTable::from_binary(&make_table(true)).unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.md5_verified);

        let nvs = &table.entries[0];
        assert_eq!(nvs.name, "nvs");
        assert_eq!(nvs.ptype, 1);
        assert_eq!(nvs.subtype, 2);
        assert_eq!(nvs.offset, 0x9000);
        assert_eq!(nvs.size, 0x6000);
        assert!(!nvs.encrypted());

        let factory = table.find("factory").unwrap();
        assert_eq!(factory.offset, 0x10000);
        assert!(factory.encrypted());
        assert!(!factory.readonly());
    }

    #[test]
    fn test_trailing_data_after_end_marker() {
        let mut data = make_table(false);
        data.extend([0x12; 100]);
        let table = PartitionTable::from_binary(&data).unwrap();
        assert_eq!(table.len(), 3);
        assert!(!table.md5_verified);
    }

    #[test]
    fn test_md5_mismatch() {
        let mut data = make_table(true);
        data[4] ^= 0x01;
        assert_eq!(
            PartitionTable::from_binary(&data),
            Err(PartitionError::Md5Mismatch)
        );
    }

    #[test]
    fn test_invalid_row_magic() {
        let mut data = make_table(false);
        data[32] = 0x00;
        assert_eq!(
            PartitionTable::from_binary(&data),
            Err(PartitionError::InvalidMagic {
                offset: 32,
                found: [0x00, 0x50]
            })
        );
    }

    #[test]
    fn test_missing_end_marker() {
        let data = make_table(false);
        assert_eq!(
            PartitionTable::from_binary(&data[..96]),
            Err(PartitionError::MissingEndMarker)
        );
    }

    #[test]
    fn test_partial_row() {
        let data = make_table(false);
        assert_eq!(
            PartitionTable::from_binary(&data[..80]),
            Err(PartitionError::Misaligned { length: 80 })
        );
    }

    #[test]
    fn test_readonly_flag_and_full_length_name() {
        let mut data = make_row("sixteen_chars_xx", 1, 0x81, 0x20_0000, 0x1000, 2);
        data.extend([0xFF; ROW_SIZE]);
        let table = PartitionTable::from_binary(&data).unwrap();
        assert_eq!(table.entries[0].name, "sixteen_chars_xx");
        assert!(table.entries[0].readonly());
    }

    #[test]
    fn test_invalid_name() {
        let mut data = make_row("ok", 1, 0, 0x9000, 0x1000, 0);
        data[12] = 0xC3;
        data[13] = 0x28;
        data.extend([0xFF; ROW_SIZE]);
        assert_eq!(
            PartitionTable::from_binary(&data),
            Err(PartitionError::InvalidName { offset: 0 })
        );
    }
}
