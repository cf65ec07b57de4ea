//! Merge every analysis step into one report

use alloc::format;
use alloc::string::ToString;

use super::bootloader::estimate_bootloader;
use super::report::{AnalysisReport, PartitionReport};
use super::strategy::{run_strategies, HeaderStrategy};
use crate::chip::{ChipDef, ChipTag, CHIP_DEFS};
use crate::image::detect_chip;
use crate::partition::scan_partition_table;

/// Chip family implied by where the partition table was found
fn guess_from_partition_offset(offset: usize) -> Option<&'static str> {
    match offset {
        0x8000 => Some("ESP32"),
        0x9000 => Some("ESP32-S3/C3/S2 (Likely S3/C3)"),
        _ => None,
    }
}

/// Analyze an image using the built-in chip registry
pub fn analyze(data: &[u8]) -> AnalysisReport {
    analyze_with(data, CHIP_DEFS)
}

/// Analyze an image against a caller-provided chip registry
///
/// Never fails. Steps that cannot interpret the buffer leave their fields
/// unset; decoding failures are recorded as `esptool_error` or
/// `header_error`.
pub fn analyze_with(data: &[u8], chips: &[ChipDef]) -> AnalysisReport {
    let mut report = AnalysisReport::default();

    let mut chip = detect_chip(data, chips);
    log::debug!("chip from image header: {}", chip);

    let fields = run_strategies(data, chip, |strategy, error| match strategy {
        HeaderStrategy::Structured => report.decode_error = Some(error),
        HeaderStrategy::Heuristic => report.header_error = Some(error),
    });
    if let Some(fields) = fields {
        report.apply_header(&fields);
    }

    if let Some(found) = scan_partition_table(data) {
        report.partitions = found.table.iter().map(PartitionReport::from).collect();
        report.is_full_image = true;
        report.partition_table_offset = Some(format!("{:#x}", found.offset));

        if let Some(guess) = guess_from_partition_offset(found.offset) {
            report.chip_guess = Some(guess.to_string());
            if chip.is_unknown() {
                chip = ChipTag::Guessed(guess);
            }
        }
    }

    if let Some(bootloader) = estimate_bootloader(data) {
        log::debug!(
            "bootloader header at 0x{:x}, flash size {}",
            bootloader.offset,
            bootloader.flash_size
        );
        report.bootloader_flash_size = bootloader.flash_size;
        if chip.is_unknown() {
            chip = ChipTag::Guessed(bootloader.family);
        }
    }

    report.chip = chip.to_string();
    report
}

#[cfg(feature = "std")]
mod file {
    use std::fmt;
    use std::io;
    use std::path::Path;
    use std::string::ToString;

    use super::super::report::Report;
    use super::analyze;

    /// Errors reading an image file
    #[derive(Debug)]
    pub enum LoadError {
        /// Path does not exist
        NotFound,
        /// File exists but could not be read
        Io(io::Error),
        /// File is zero bytes long
        Empty,
    }

    impl From<io::Error> for LoadError {
        fn from(e: io::Error) -> Self {
            match e.kind() {
                io::ErrorKind::NotFound => LoadError::NotFound,
                _ => LoadError::Io(e),
            }
        }
    }

    impl fmt::Display for LoadError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                LoadError::NotFound => write!(f, "File not found"),
                LoadError::Io(e) => write!(f, "Failed to read file: {}", e),
                LoadError::Empty => write!(f, "File is empty"),
            }
        }
    }

    impl std::error::Error for LoadError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match self {
                LoadError::Io(e) => Some(e),
                _ => None,
            }
        }
    }

    fn load(path: &Path) -> Result<std::vec::Vec<u8>, LoadError> {
        let data = std::fs::read(path)?;
        if data.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(data)
    }

    /// Read and analyze an image file
    ///
    /// A missing, unreadable or empty file yields [`Report::Failed`]; any
    /// other file yields a best-effort [`Report::Analysis`].
    pub fn analyze_file(path: impl AsRef<Path>) -> Report {
        match load(path.as_ref()) {
            Ok(data) => {
                log::info!("analyzing {} ({} bytes)", path.as_ref().display(), data.len());
                Report::Analysis(analyze(&data))
            }
            Err(e) => {
                log::debug!("failed to load {}: {:?}", path.as_ref().display(), e);
                Report::failed(e.to_string())
            }
        }
    }
}

#[cfg(feature = "std")]
pub use file::{analyze_file, LoadError};
