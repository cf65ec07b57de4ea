//! ESP chip families and the chip registry
//!
//! This module describes the chip families an image can be attributed to
//! and provides the static registry used to map the chip-ID field of an
//! image's extended header back to a family.

mod database;
mod types;

pub use database::*;
pub use types::*;
