//! Progress display module
//!
//! Provides styled console output, the batch progress bar and the final
//! statistics for the pentesting aesthetic.

use bytesize::ByteSize;
use colored::*;
use crossbeam_channel::Receiver;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// One batch fully written. Carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick;

/// Print the application banner
pub fn print_banner() {
    let banner = r#"
╔══════════════════════════════════════════════════════════════════════════════╗
║                                                                              ║
║   ██╗    ██╗ ██████╗ ██████╗ ██████╗ ██╗     ██╗███████╗████████╗           ║
║   ██║    ██║██╔═══██╗██╔══██╗██╔══██╗██║     ██║██╔════╝╚══██╔══╝           ║
║   ██║ █╗ ██║██║   ██║██████╔╝██║  ██║██║     ██║███████╗   ██║              ║
║   ██║███╗██║██║   ██║██╔══██╗██║  ██║██║     ██║╚════██║   ██║              ║
║   ╚███╔███╔╝╚██████╔╝██║  ██║██████╔╝███████╗██║███████║   ██║              ║
║    ╚══╝╚══╝  ╚═════╝ ╚═╝  ╚═╝╚═════╝ ╚══════╝╚═╝╚══════╝   ╚═╝              ║
║                                                                              ║
║    ██████╗ ███████╗███╗   ██╗                                               ║
║   ██╔════╝ ██╔════╝████╗  ██║                                               ║
║   ██║  ███╗█████╗  ██╔██╗ ██║                                               ║
║   ██║   ██║██╔══╝  ██║╚██╗██║                                               ║
║   ╚██████╔╝███████╗██║ ╚████║                                               ║
║    ╚═════╝ ╚══════╝╚═╝  ╚═══╝                                               ║
║                                                                              ║
║                  Parallel Combinatorial Wordlist Generation                   ║
║                         For Penetration Testing                               ║
║                                                              v1.0.0          ║
╚══════════════════════════════════════════════════════════════════════════════╝
"#;

    println!("{}", banner.green());
}

/// Print a section header
pub fn print_header(text: &str) {
    println!("\n{} {}", "▶".green(), text.green().bold());
}

/// Print an info message
pub fn print_info(text: &str) {
    println!("  {} {}", "ℹ".cyan(), text);
}

/// Print a success message
pub fn print_success(text: &str) {
    println!("  {} {}", "✔".green(), text.green());
}

/// Print a warning message
pub fn print_warning(text: &str) {
    println!("  {} {}", "⚠".yellow(), text.yellow());
}

/// Print an error message
pub fn print_error(text: &str) {
    eprintln!("  {} {}", "✖".red(), text.red());
}

/// Print a bullet point
pub fn print_bullet(text: &str) {
    println!("  {} {}", "•".green(), text);
}

/// Create a styled progress bar
pub fn create_progress_bar(total: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);

    // The template is a constant; fall back to the default style rather than fail a run
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.green/dim}] {pos}/{len} batches ({percent}%) ETA {eta} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░");

    pb.set_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));

    pb
}

/// Count ticks on `bar` until `total` arrived or the sender side is gone.
///
/// Returns the number of ticks seen. A disconnected channel means the writer
/// stopped, so fewer ticks than planned never blocks the caller.
pub fn observe(ticks: Receiver<Tick>, total: u64, bar: &ProgressBar) -> u64 {
    let mut seen = 0u64;

    while seen < total {
        match ticks.recv() {
            Ok(Tick) => {
                seen += 1;
                bar.inc(1);
            }
            Err(_) => break,
        }
    }

    if seen >= total {
        bar.finish_with_message("Complete".green().to_string());
    } else {
        bar.abandon_with_message(format!("Stopped at {}/{} batches", seen, total).yellow().to_string());
    }

    seen
}

/// Generation statistics, updated by the writer
#[derive(Debug)]
pub struct GenerationStats {
    pub items_written: AtomicU64,
    pub batches_written: AtomicU64,
    pub bytes_written: AtomicU64,
    pub start_time: Instant,
}

impl GenerationStats {
    pub fn new() -> Self {
        Self {
            items_written: AtomicU64::new(0),
            batches_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn add_batch(&self, items: u64, bytes: u64) {
        self.batches_written.fetch_add(1, Ordering::Relaxed);
        self.items_written.fetch_add(items, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn get_items(&self) -> u64 {
        self.items_written.load(Ordering::Relaxed)
    }

    pub fn get_batches(&self) -> u64 {
        self.batches_written.load(Ordering::Relaxed)
    }

    pub fn get_bytes(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn items_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.get_items() as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn bytes_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.get_bytes() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Print final statistics
    pub fn print_summary(&self) {
        println!();
        println!("{}", "═".repeat(60).green());
        println!("{}", "                   GENERATION COMPLETE".green().bold());
        println!("{}", "═".repeat(60).green());
        println!();

        println!("  {} {}", "Words written:  ".green().bold(),
            format_number(self.get_items() as u128).green().bold());
        println!("  {} {}", "Batches:        ".green(),
            format_number(self.get_batches() as u128));
        println!("  {} {}", "Output size:    ".green(),
            ByteSize(self.get_bytes()));

        println!();
        println!("  {} {}", "Duration:       ".green(), format_duration(self.elapsed()));
        println!("  {} {:.2} words/sec", "Throughput:     ".green(),
            self.items_per_second());
        println!("  {} {}/sec", "Speed:          ".green(),
            ByteSize(self.bytes_per_second() as u64));
        println!();
        println!("{}", "═".repeat(60).green());
    }
}

impl Default for GenerationStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousand separators
pub fn format_number(n: u128) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    result
}

/// Format duration as human-readable string
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else if secs < 3600 {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}h {}m", hours, mins)
    }
}
