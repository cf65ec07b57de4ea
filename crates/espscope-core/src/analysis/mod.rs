//! Firmware image analysis
//!
//! Runs chip detection, header decoding and the partition table scan over
//! one buffer and merges the results into an [`AnalysisReport`].
//!
//! # Precedence
//!
//! - Chip: extended header, then partition table placement, then
//!   bootloader location
//! - Header fields: structured decoding for a detected chip, otherwise the
//!   chip-agnostic heuristic
//! - Partitions: the first candidate offset that decodes to a non-empty
//!   table

mod aggregate;
mod bootloader;
mod report;
mod strategy;

pub use aggregate::{analyze, analyze_with};
#[cfg(feature = "std")]
pub use aggregate::{analyze_file, LoadError};
pub use bootloader::{estimate_bootloader, BootloaderEstimate};
pub use report::{AnalysisReport, BootloaderInfo, FailureReport, PartitionReport, Report};
pub use strategy::{HeaderStrategy, HEADER_STRATEGIES};
