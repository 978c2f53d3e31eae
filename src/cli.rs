//! Command-line interface definition for wordlist-gen
//!
//! Provides argument parsing and validation for the wordlist generator.

use clap::Parser;
use std::path::PathBuf;

use crate::plan::{DEFAULT_CHUNK_SIZE, DEFAULT_FEASIBILITY_LIMIT};

/// High-performance combinatorial wordlist generator for penetration testing
///
/// Concatenates base words with repetition across a range of repetition
/// counts and streams the result to a single output file.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "wordlist-gen",
    author = "m0h1nd4",
    version,
    about = "High-performance, parallel combinatorial wordlist generator",
    long_about = r#"
╔══════════════════════════════════════════════════════════════════════════════╗
║                            WORDLIST-GEN v1.0.0                               ║
║                  Parallel Combinatorial Wordlist Generation                   ║
║                         For Penetration Testing                               ║
╚══════════════════════════════════════════════════════════════════════════════╝

Builds every concatenation of the base words (with repetition) for each
repetition count, using a pool of generators and a single writer. Memory use
stays bounded no matter how large the wordlist gets.

Without --length, repetition counts are added until the total number of
generated words would exceed --limit. With --length, only repetition counts
that can reach that exact length are generated, and only words of exactly
that length are written.

EXAMPLES:
    # All combinations up to the default limit (1 billion words)
    wordlist-gen -f words.txt

    # Only candidates of exactly 8 characters
    wordlist-gen -f words.txt -l 8 -o len8.txt

    # Use 4 generator processes
    wordlist-gen -f words.txt -p 4

    # Pipe candidates into another tool instead of writing a file
    wordlist-gen -f words.txt -l 10 --display | hashcat -m 0 hashes.txt

    # Show what would be generated, without writing anything
    wordlist-gen -f words.txt --dry-run
"#,
    after_help = "For more information, visit: https://github.com/m0h1nd4/wordlist-gen"
)]
pub struct Args {
    /// File with base words, one per line
    #[arg(short, long, required = true, value_name = "PATH")]
    pub file: PathBuf,

    /// Output file
    #[arg(short, long, value_name = "PATH", default_value = "wordlist.txt")]
    pub output: PathBuf,

    /// Generate only words of this exact length
    #[arg(short, long, value_name = "LENGTH")]
    pub length: Option<usize>,

    /// Number of generator processes (default: CPU core count)
    #[arg(short, long, value_name = "NUM")]
    pub processes: Option<usize>,

    /// Maximum number of words to generate without --length
    #[arg(long, value_name = "COUNT", default_value_t = DEFAULT_FEASIBILITY_LIMIT)]
    pub limit: u64,

    /// Number of words per batch handed to the writer
    #[arg(long, value_name = "NUM", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Buffer size for the output file (default: 8MB)
    #[arg(long, value_name = "SIZE", default_value = "8MB")]
    pub buffer_size: String,

    /// Print generated words to stdout instead of writing the output file
    #[arg(long, default_value_t = false)]
    pub display: bool,

    /// Dry run - show the generation plan without writing anything
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Verbose mode - detailed logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    /// Worker count, defaulting to the number of CPU cores
    pub fn get_processes(&self) -> usize {
        self.processes.unwrap_or_else(num_cpus::get)
    }

    /// Parse buffer size string to bytes
    pub fn parse_buffer_size(&self) -> anyhow::Result<usize> {
        parse_size(&self.buffer_size)
    }

    /// Streaming to stdout leaves no room for console decoration
    pub fn is_quiet(&self) -> bool {
        self.quiet || self.display
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

    let num: usize = num_str.trim().parse()
        .map_err(|_| anyhow::anyhow!("Invalid size format: '{}'", size_str))?;

    num.checked_mul(multiplier)
        .ok_or_else(|| anyhow::anyhow!("Size too large: '{}'", size_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["wordlist-gen", "-f", "words.txt"]).unwrap();

        assert_eq!(args.file, PathBuf::from("words.txt"));
        assert_eq!(args.output, PathBuf::from("wordlist.txt"));
        assert_eq!(args.length, None);
        assert_eq!(args.limit, DEFAULT_FEASIBILITY_LIMIT);
        assert_eq!(args.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(args.get_processes(), num_cpus::get());
        assert!(!args.is_quiet());
    }

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from([
            "wordlist-gen", "-f", "w.txt", "-o", "out.txt", "-l", "8", "-p", "3",
        ])
        .unwrap();

        assert_eq!(args.output, PathBuf::from("out.txt"));
        assert_eq!(args.length, Some(8));
        assert_eq!(args.get_processes(), 3);
    }

    #[test]
    fn test_file_is_required() {
        assert!(Args::try_parse_from(["wordlist-gen"]).is_err());
    }

    #[test]
    fn test_display_implies_quiet() {
        let args = Args::try_parse_from(["wordlist-gen", "-f", "w.txt", "--display"]).unwrap();
        assert!(args.is_quiet());
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("64MB").unwrap(), 64 * 1024 * 1024);
        assert_eq!(parse_size("8GB").unwrap(), 8 * 1024 * 1024 * 1024);
        assert_eq!(parse_size("1024KB").unwrap(), 1024 * 1024);
        assert_eq!(parse_size("512").unwrap(), 512);
        assert!(parse_size("lots").is_err());
    }

    #[test]
    fn test_parse_size_overflow() {
        assert!(parse_size("99999999999999GB").is_err());
        assert!(parse_size(&format!("{}KB", usize::MAX)).is_err());

        let args = Args::try_parse_from([
            "wordlist-gen", "-f", "words.txt", "--buffer-size", "99999999999999GB",
        ])
        .unwrap();
        assert!(args.parse_buffer_size().is_err());
    }
}
