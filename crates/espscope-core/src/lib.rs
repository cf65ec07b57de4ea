//! espscope-core - Best-effort ESP firmware image analysis
//!
//! This crate inspects an in-memory firmware blob and reports which ESP chip
//! family produced it, the flash configuration stored in its image header and
//! the partition table it embeds, if any. It is designed to be `no_std`
//! compatible (with `alloc`) so the same analysis can run in a browser or on
//! a device.
//!
//! Analysis never fails: a truncated, corrupted or unrelated file still
//! yields a partially populated [`analysis::AnalysisReport`]. Only reading
//! the file itself (see `analyze_file`, `std` feature) can produce a fatal
//! error report.
//!
//! # Features
//!
//! - `std` - Enable standard library support (file helpers, `std::error::Error`)
//! - `serde` - Derive `Serialize` for the report types
//!
//! # Example
//!
//! ```ignore
//! use espscope_core::analysis;
//!
//! let data = std::fs::read("firmware.bin")?;
//! let report = analysis::analyze(&data);
//! println!("chip: {}", report.chip);
//! for p in &report.partitions {
//!     println!("{:<16} {} {}", p.label, p.offset, p.size);
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod analysis;
pub mod chip;
pub mod image;
pub mod partition;

pub use analysis::{analyze, analyze_with, AnalysisReport, Report};
#[cfg(feature = "std")]
pub use analysis::analyze_file;
pub use chip::{ChipDef, ChipTag, CHIP_DEFS};
