//! Report types

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::image::ImageHeaderFields;
use crate::partition::PartitionEntry;

/// Reserved bootloader details (always empty)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BootloaderInfo {}

/// Partition entry as reported
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PartitionReport {
    /// Partition label
    pub label: String,
    /// Partition type
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub ptype: u8,
    /// Partition subtype
    pub subtype: u8,
    /// Offset as `0x` hex
    pub offset: String,
    /// Size as `0x` hex
    pub size: String,
    /// Size in bytes
    pub size_dec: u32,
    /// Encryption flag
    pub encrypted: bool,
}

impl From<&PartitionEntry> for PartitionReport {
    fn from(entry: &PartitionEntry) -> Self {
        Self {
            label: entry.name.as_str().to_string(),
            ptype: entry.ptype,
            subtype: entry.subtype,
            offset: format!("{:#x}", entry.offset),
            size: format!("{:#x}", entry.size),
            size_dec: entry.size,
            encrypted: entry.encrypted(),
        }
    }
}

/// Best-effort analysis of one image
///
/// Optional fields are only present when the corresponding step produced
/// something. `esptool_error` and `header_error` annotate failed decoding
/// steps and do not invalidate the rest of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AnalysisReport {
    /// Chip family, or `Unknown`
    pub chip: String,
    /// Flash size label, or `Unknown`
    pub flash_size: String,
    /// Reserved
    pub features: Vec<String>,
    /// Partition table entries
    pub partitions: Vec<PartitionReport>,
    /// A partition table was found, so this is a full flash dump
    pub is_full_image: bool,
    /// Reserved
    pub bootloader_info: BootloaderInfo,
    /// Flash mode
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub flash_mode: Option<String>,
    /// Flash size nibble when no label is known
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub flash_size_raw: Option<u8>,
    /// Flash frequency
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub flash_freq: Option<String>,
    /// Entry point as `0x` hex
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub entry_point: Option<String>,
    /// Segment count
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub segments: Option<usize>,
    /// Structured decoding failure
    #[cfg_attr(
        feature = "serde",
        serde(rename = "esptool_error", skip_serializing_if = "Option::is_none")
    )]
    pub decode_error: Option<String>,
    /// Heuristic header parsing failure
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub header_error: Option<String>,
    /// Offset of the partition table as `0x` hex
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub partition_table_offset: Option<String>,
    /// Chip family implied by the partition table offset
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub chip_guess: Option<String>,
    /// Flash size read from the bootloader header
    pub bootloader_flash_size: String,
}

impl Default for AnalysisReport {
    fn default() -> Self {
        Self {
            chip: "Unknown".to_string(),
            flash_size: "Unknown".to_string(),
            features: Vec::new(),
            partitions: Vec::new(),
            is_full_image: false,
            bootloader_info: BootloaderInfo::default(),
            flash_mode: None,
            flash_size_raw: None,
            flash_freq: None,
            entry_point: None,
            segments: None,
            decode_error: None,
            header_error: None,
            partition_table_offset: None,
            chip_guess: None,
            bootloader_flash_size: "Unknown".to_string(),
        }
    }
}

impl AnalysisReport {
    /// Copy decoded header fields into the report
    pub fn apply_header(&mut self, fields: &ImageHeaderFields) {
        self.flash_mode = Some(fields.flash_mode.to_string());
        if let Some(size) = fields.flash_size {
            self.flash_size = size.to_string();
        }
        self.flash_size_raw = fields.flash_size_raw;
        self.flash_freq = Some(fields.flash_freq.clone());
        self.entry_point = fields.entry_point.map(|addr| format!("{:#x}", addr));
        self.segments = fields.segment_count;
    }

    /// Check whether any image header field was populated
    pub fn has_header_fields(&self) -> bool {
        self.flash_mode.is_some()
            || self.flash_freq.is_some()
            || self.flash_size_raw.is_some()
            || self.entry_point.is_some()
            || self.segments.is_some()
    }
}

/// Fatal analysis failure
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FailureReport {
    /// Error message
    pub error: String,
}

/// Outcome of analyzing a file
///
/// Exactly one of a best-effort report or an error is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Report {
    /// The file was read and analyzed
    Analysis(AnalysisReport),
    /// The file could not be read
    Failed(FailureReport),
}

impl Report {
    /// Build a failure report
    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed(FailureReport {
            error: error.into(),
        })
    }

    /// Check whether this is a failure report
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}
