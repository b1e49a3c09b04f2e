//! Command-line interface definition for filterlist-dedup
//!
//! Provides argument parsing and validation for the deduplication tool.

use crate::encoding::{encoding_for_label, DEFAULT_ENCODING_LABEL};
use clap::Parser;
use encoding_rs::Encoding;
use std::path::PathBuf;

/// Default location of the filter list to deduplicate
pub const DEFAULT_INPUT: &str = "filter_lists/filter.txt";

/// Default location of the deduplicated list
pub const DEFAULT_OUTPUT: &str = "filter_lists/filter_deduped.txt";

/// Exact-duplicate remover for adblock-style filter lists
///
/// Keeps comments, headers and every other non-rule line verbatim and drops
/// repeated `||domain^` rules.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "filterlist-dedup",
    author = "m0h1nd4",
    version,
    about = "Remove duplicate ||domain^ rules from a filter list",
    long_about = r#"
Remove duplicate rules from an adblock-style filter list.

A rule is a line that starts with "||" and ends with "^". The first
occurrence of every rule is kept, later identical copies are dropped.
Comments, headers, blank lines and anything else are kept untouched,
even when they repeat. Matching is exact: case and whitespace matter.

EXAMPLES:
    # Deduplicate filter_lists/filter.txt into filter_lists/filter_deduped.txt
    filterlist-dedup

    # Explicit paths
    filterlist-dedup -i lists/ads.txt -o lists/ads_clean.txt

    # Only report what would be removed
    filterlist-dedup -i lists/ads.txt --dry-run --stats

    # Legacy list in Windows-1252
    filterlist-dedup -i old.txt -o new.txt --encoding windows-1252
"#
)]
pub struct Args {
    /// Filter list to read
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Where to write the deduplicated list
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Text encoding of the input and output (WHATWG label)
    #[arg(long, value_name = "LABEL", default_value = DEFAULT_ENCODING_LABEL)]
    pub encoding: String,

    /// Buffer size for writing (e.g. "64KB", "8MB")
    #[arg(long, value_name = "SIZE", default_value = "8MB")]
    pub buffer_size: String,

    /// Run the deduplication and report, but do not write the output
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Show detailed statistics
    #[arg(long, default_value_t = false)]
    pub stats: bool,

    /// Do not print every removed duplicate
    #[arg(long, default_value_t = false)]
    pub no_report_duplicates: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, default_value_t = false, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode - detailed logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    /// Parse buffer size string to bytes
    pub fn parse_buffer_size(&self) -> anyhow::Result<usize> {
        let size = parse_size(&self.buffer_size)?;
        if size == 0 {
            anyhow::bail!("Buffer size must be greater than zero");
        }
        Ok(size)
    }

    /// Resolve the encoding label
    pub fn resolve_encoding(&self) -> anyhow::Result<&'static Encoding> {
        Ok(encoding_for_label(&self.encoding)?)
    }
}

/// Parse human-readable size string to bytes
fn parse_size(size_str: &str) -> anyhow::Result<usize> {
    let size_str = size_str.trim().to_uppercase();

    let (num_str, multiplier) = if let Some(num) = size_str.strip_suffix("GB") {
        (num, 1024 * 1024 * 1024)
    } else if let Some(num) = size_str.strip_suffix("MB") {
        (num, 1024 * 1024)
    } else if let Some(num) = size_str.strip_suffix("KB") {
        (num, 1024)
    } else if let Some(num) = size_str.strip_suffix('B') {
        (num, 1)
    } else {
        (size_str.as_str(), 1)
    };

    let num: usize = num_str
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid size format: '{}'", size_str))?;

    num.checked_mul(multiplier)
        .ok_or_else(|| anyhow::anyhow!("Size too large: '{}'", size_str))
}
