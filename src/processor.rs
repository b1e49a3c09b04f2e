//! Core processing engine
//!
//! Reads a filter list, runs the deduplication pass and commits the result.
//! The input is read completely before anything is written, so an unreadable
//! input never produces an output file.

use crate::cli::Args;
use crate::dedup::{DedupStats, Deduplicator};
use crate::encoding::LineReader;
use crate::error::{DedupError, Result};
use crate::output::{ensure_parent_dir, OutputWriter, DEFAULT_BUFFER_SIZE};
use crate::progress::{create_spinner, print_duplicate, print_header, print_info};

use bytesize::ByteSize;
use encoding_rs::Encoding;
use indicatif::ProgressBar;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Processor configuration
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub encoding: &'static Encoding,
    pub buffer_size: usize,
    pub dry_run: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub report_duplicates: bool,
    pub show_stats: bool,
}

impl ProcessorConfig {
    /// Configuration with default options for the given paths
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            encoding: encoding_rs::UTF_8,
            buffer_size: DEFAULT_BUFFER_SIZE,
            dry_run: false,
            quiet: false,
            verbose: false,
            report_duplicates: true,
            show_stats: false,
        }
    }

    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        Ok(Self {
            input_path: args.input.clone(),
            output_path: args.output.clone(),
            encoding: args.resolve_encoding()?,
            buffer_size: args.parse_buffer_size()?,
            dry_run: args.dry_run,
            quiet: args.quiet,
            verbose: args.verbose,
            report_duplicates: !args.no_report_duplicates,
            show_stats: args.stats,
        })
    }
}

/// Outcome of one run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub stats: DedupStats,
    pub output_path: PathBuf,
    /// False for dry runs
    pub written: bool,
    pub input_bytes: u64,
    pub output_bytes: u64,
    /// Approximate heap held by the seen-rules set at the end of the pass
    pub rule_set_bytes: u64,
    pub elapsed: Duration,
}

/// Main processor
pub struct Processor {
    config: ProcessorConfig,
}

impl Processor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Reject configurations that would read from and write to one file.
    /// Dry runs write nothing and skip that check.
    pub fn validate(&self) -> Result<()> {
        let input = &self.config.input_path;

        // A missing input is reported by the reader
        let Ok(metadata) = fs::metadata(input) else {
            return Ok(());
        };
        if !metadata.is_file() {
            return Err(DedupError::InvalidConfig(format!("input {:?} is not a file", input)));
        }

        if self.config.dry_run {
            return Ok(());
        }

        let same_file = match (fs::canonicalize(input), fs::canonicalize(&self.config.output_path)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        if same_file {
            return Err(DedupError::InvalidConfig(format!(
                "output {:?} is the same file as the input",
                self.config.output_path
            )));
        }

        Ok(())
    }

    /// Deduplicate the configured input into the configured output
    pub fn process(&self) -> Result<RunReport> {
        self.validate()?;
        let start = Instant::now();

        if !self.config.quiet {
            print_header("Reading filter list...");
        }
        let (lines, input_bytes) = self.read_input()?;

        if !self.config.quiet {
            print_info(&format!("{} lines ({})", lines.len(), ByteSize(input_bytes)));
            print_header("Removing duplicates...");
        }

        let mut writer = if self.config.dry_run {
            None
        } else {
            ensure_parent_dir(&self.config.output_path)?;
            Some(OutputWriter::new(
                self.config.output_path.clone(),
                self.config.buffer_size,
                self.config.encoding,
            )?)
        };

        let mut dedup = Deduplicator::with_capacity(lines.len(), self.duplicate_reporter());
        for line in &lines {
            if let (Some(kept), Some(writer)) = (dedup.push(line), writer.as_mut()) {
                writer.write_line(kept)?;
            }
        }

        let rule_set_bytes = dedup.rules().memory_usage() as u64;
        let stats = dedup.finish();

        let output_bytes = match writer {
            Some(writer) => {
                let bytes = writer.bytes_written();
                writer.commit()?;
                bytes
            }
            None => 0,
        };

        debug_assert!(stats.is_consistent());
        log::info!(
            "{} unique rules, {} duplicates removed, {} lines kept",
            stats.unique_rules,
            stats.duplicates_removed,
            stats.retained_lines()
        );

        Ok(RunReport {
            stats,
            output_path: self.config.output_path.clone(),
            written: !self.config.dry_run,
            input_bytes,
            output_bytes,
            rule_set_bytes,
            elapsed: start.elapsed(),
        })
    }

    fn read_input(&self) -> Result<(Vec<String>, u64)> {
        let reader = LineReader::open(&self.config.input_path, self.config.encoding)?;
        let size = reader.size() as u64;
        log::debug!("Reading {:?} ({} bytes, {})", self.config.input_path, size, reader.encoding().name());

        let spinner = if self.config.quiet {
            ProgressBar::hidden()
        } else {
            create_spinner("Reading...")
        };

        let lines = reader.collect::<Result<Vec<String>>>();
        spinner.finish_and_clear();

        Ok((lines?, size))
    }

    fn duplicate_reporter(&self) -> impl FnMut(usize, &str) {
        let print = self.config.report_duplicates && !self.config.quiet;

        move |line_number: usize, rule: &str| {
            log::debug!("Duplicate removed at line {}: {}", line_number, rule);
            if print {
                print_duplicate(line_number, rule);
            }
        }
    }
}
