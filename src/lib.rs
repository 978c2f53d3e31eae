//! # Wordlist Gen
//!
//! High-performance combinatorial wordlist generator for penetration testing.
//!
//! ## Features
//!
//! - **Combinations with repetition**: every concatenation of the base words, level by level
//! - **Exact length targeting**: only repetition counts that can reach the length are generated
//! - **Feasibility limit**: unrestricted runs stop before the total exceeds a ceiling
//! - **Bounded memory**: lazy generation in fixed-size batches behind a bounded channel
//! - **Parallel processing**: one generator task per repetition level, a single writer
//! - **Encoding detection**: word sources in any common encoding are transcoded to UTF-8
//!
//! ## Usage
//!
//! ```bash
//! # Everything up to the default limit
//! wordlist-gen -f words.txt
//!
//! # Only 8-character candidates
//! wordlist-gen -f words.txt -l 8
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use wordlist_gen::pipeline::{Pipeline, PipelineConfig};
//! use std::path::PathBuf;
//!
//! let config = PipelineConfig {
//!     word_file: PathBuf::from("words.txt"),
//!     output: PathBuf::from("wordlist.txt"),
//!     target_length: Some(8),
//!     processes: 4,
//!     limit: 1_000_000_000,
//!     chunk_size: 10_000,
//!     buffer_size: 8 * 1024 * 1024,
//!     display: false,
//!     dry_run: false,
//!     quiet: false,
//!     verbose: false,
//! };
//!
//! let pipeline = Pipeline::new(config);
//! // pipeline.process().unwrap();
//! ```

pub mod cli;
pub mod error;
pub mod filter;
pub mod generator;
pub mod output;
pub mod pipeline;
pub mod plan;
pub mod pool;
pub mod progress;
pub mod words;

pub use cli::Args;
pub use error::{GenError, Result};
pub use pipeline::{Pipeline, PipelineConfig, RunSummary};
pub use plan::{plan, Plan, PlanRange};
pub use words::WordSet;
