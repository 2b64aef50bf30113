//! CLI argument definitions for pricesheet.
//!
//! Every value can be given as a flag; the three query values that are left
//! out are prompted for on the console.
//!
//! # Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--company` | prompt | Company full name or keyword |
//! | `--start` | prompt | First day, `DD-MM-YYYY` |
//! | `--end` | prompt | Day after the last one, `DD-MM-YYYY` |
//! | `--output-dir` | `.` | Directory receiving the `.xlsx` file |
//! | `--timeout-ms` | none | Per-request timeout, over `PRICESHEET_TIMEOUT_MS` |
//! | `--mock` | `false` | Use offline deterministic data |
//!
//! # Examples
//!
//! ```bash
//! # Fully interactive
//! pricesheet
//!
//! # No prompts
//! pricesheet --company "Tesla Inc" --start 01-07-2024 --end 16-07-2024
//! ```

use std::path::PathBuf;

use clap::Parser;

/// Download daily prices for a company and save them as a spreadsheet.
#[derive(Debug, Parser)]
#[command(
    name = "pricesheet",
    author,
    version,
    about = "Download daily prices for a company into an .xlsx file"
)]
pub struct Cli {
    /// Company full name or keyword.
    #[arg(long)]
    pub company: Option<String>,

    /// Start date (DD-MM-YYYY), inclusive.
    #[arg(long)]
    pub start: Option<String>,

    /// End date (DD-MM-YYYY), exclusive.
    #[arg(long)]
    pub end: Option<String>,

    /// Directory the spreadsheet is written to.
    #[arg(long, env = "PRICESHEET_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Request timeout in milliseconds. Unset falls back to
    /// `PRICESHEET_TIMEOUT_MS`, read by the source config.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Serve deterministic offline data instead of calling Yahoo Finance.
    #[arg(long, default_value_t = false)]
    pub mock: bool,
}
