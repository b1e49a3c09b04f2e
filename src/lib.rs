//! # Filterlist Dedup
//!
//! Exact-duplicate remover for adblock-style filter lists.
//!
//! ## Features
//!
//! - **Rule deduplication**: repeated `||domain^` rules are dropped, first occurrence wins
//! - **Passthrough**: comments, headers, blank and malformed lines are always kept
//! - **Stable order**: retained lines keep their input order
//! - **Safe output**: results are committed atomically, failed runs leave no partial file
//! - **Encodings**: UTF-8 by default, any ASCII-compatible WHATWG encoding on request
//!
//! ## Usage
//!
//! ```bash
//! # filter_lists/filter.txt -> filter_lists/filter_deduped.txt
//! filterlist-dedup
//!
//! # Explicit paths
//! filterlist-dedup -i lists/ads.txt -o lists/ads_clean.txt
//! ```
//!
//! ## Example
//!
//! ```rust
//! use filterlist_dedup::dedup::{deduplicate, NoopObserver};
//!
//! let outcome = deduplicate(
//!     ["! header", "||ads.example.com^", "||ads.example.com^", "||tracker.example.com^"],
//!     NoopObserver,
//! );
//!
//! assert_eq!(outcome.retained, vec!["! header", "||ads.example.com^", "||tracker.example.com^"]);
//! assert_eq!(outcome.unique_count(), 2);
//! assert_eq!(outcome.removed_count(), 1);
//! ```

pub mod cli;
pub mod dedup;
pub mod encoding;
pub mod error;
pub mod output;
pub mod processor;
pub mod progress;
pub mod rule;

pub use cli::Args;
pub use dedup::{deduplicate, DedupOutcome, DedupStats, Deduplicator, DuplicateObserver};
pub use error::DedupError;
pub use processor::{Processor, ProcessorConfig, RunReport};
