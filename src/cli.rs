//! CLI argument parsing

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "espscope")]
#[command(
    author,
    version,
    about = "Inspect ESP firmware images",
    long_about = "Reads a firmware file and prints a JSON report with the chip family, \
                  flash mode/size/frequency from the image header and the partition \
                  table, if the file is a full flash dump."
)]
pub struct Cli {
    /// Verbosity level for diagnostics on stderr (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Firmware image to analyze (bootloader, app image or full flash dump)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}
