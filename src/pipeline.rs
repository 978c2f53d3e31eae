//! Core generation pipeline
//!
//! Wires the planner, the worker pool, the serializing writer and the
//! progress observer together:
//!
//! ```text
//!  plan ──▶ WorkerPool (one task per level) ──▶ bounded channel ──▶ writer ──▶ file
//!                                                                     │
//!                                                                     └──▶ ticks ──▶ progress bar
//! ```
//!
//! Shutdown: the end-of-stream message is sent only after the pool returned,
//! so nothing in flight can be dropped, and it is sent even when a worker
//! failed so the writer always finishes and the partial output is flushed.

use bytesize::ByteSize;
use colored::*;
use crossbeam_channel::{bounded, unbounded};
use indicatif::ProgressBar;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::cli::Args;
use crate::error::{GenError, Result};
use crate::filter::LengthFilter;
use crate::output::{self, BatchWriter, Sink};
use crate::plan::{self, Plan};
use crate::pool::{BatchProducer, CombinationProducer, Message, WorkerPool};
use crate::progress::{
    self, create_progress_bar, format_number, print_bullet, print_header, print_info,
    print_success, print_warning, GenerationStats,
};
use crate::words::WordSet;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub word_file: PathBuf,
    pub output: PathBuf,
    pub target_length: Option<usize>,
    pub processes: usize,
    pub limit: u64,
    pub chunk_size: usize,
    pub buffer_size: usize,
    pub display: bool,
    pub dry_run: bool,
    pub quiet: bool,
    pub verbose: bool,
}

impl PipelineConfig {
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        Ok(Self {
            word_file: args.file.clone(),
            output: args.output.clone(),
            target_length: args.length,
            processes: args.get_processes(),
            limit: args.limit,
            chunk_size: args.chunk_size,
            buffer_size: args.parse_buffer_size()?,
            display: args.display,
            dry_run: args.dry_run,
            quiet: args.is_quiet(),
            verbose: args.verbose,
        })
    }

    /// Producers may run this many batches ahead of the writer
    pub fn channel_capacity(&self) -> usize {
        self.processes.max(1) * 2
    }
}

/// What a finished run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub plan: Plan,
    pub items_written: u64,
    pub batches_written: u64,
    pub bytes_written: u64,
    pub elapsed: Duration,
}

/// Main generation pipeline
pub struct Pipeline {
    config: PipelineConfig,
    stats: Arc<GenerationStats>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            stats: Arc::new(GenerationStats::new()),
        }
    }

    /// Load the configured word file and run.
    pub fn process(&self) -> Result<RunSummary> {
        let words = WordSet::load(&self.config.word_file)?;

        if !self.config.quiet {
            print_header("Base words");
            print_info(&format!("Loaded {} words from {:?}", words.len(), self.config.word_file));
            if self.config.verbose {
                print_info(&format!("Words: {:?}", words.words()));
            }
        }

        self.run(words)
    }

    /// Plan the run for `words` and generate into the configured sink.
    pub fn run(&self, words: WordSet) -> Result<RunSummary> {
        let plan = plan::plan(
            &words,
            self.config.target_length,
            self.config.limit,
            self.config.chunk_size,
        )?;
        log::debug!("Plan: {:?}", plan);

        if !self.config.quiet {
            self.print_plan(&plan, &words);
        }

        if self.config.dry_run {
            return Ok(self.summary(plan));
        }

        if plan.is_empty() && !self.config.quiet {
            print_warning("Nothing to generate with the current limit");
        }

        let sink = if self.config.display {
            Sink::Stdout
        } else {
            Sink::File(self.config.output.clone())
        };
        let buffer_size = self.config.buffer_size;

        let producer = CombinationProducer::new(
            Arc::new(words),
            plan.chunk_size,
            plan.target_length.map(LengthFilter::new),
        );

        self.execute(&plan, &producer, move || sink.open(buffer_size))
    }

    /// Run the planned levels through `producer` into the writer returned by
    /// `open`, which is called on the writer thread.
    ///
    /// The pool is joined before the end-of-stream message is sent, and the
    /// writer is joined before returning. The writer's error wins over worker
    /// errors since a dead writer is what makes producers fail.
    pub fn execute<P, W, F>(&self, plan: &Plan, producer: &P, open: F) -> Result<RunSummary>
    where
        P: BatchProducer,
        W: Write,
        F: FnOnce() -> Result<BatchWriter<W>> + Send,
    {
        let pool = WorkerPool::new(self.config.processes)?;
        let (batch_tx, batch_rx) = bounded::<Message>(self.config.channel_capacity());
        let (tick_tx, tick_rx) = unbounded();
        let cancel = AtomicBool::new(false);

        let bar = if self.config.quiet {
            ProgressBar::hidden()
        } else {
            print_header(&format!(
                "Generating with {} workers (levels {}..={})...",
                pool.workers(),
                plan.range.min_rep,
                plan.range.max_rep
            ));
            create_progress_bar(plan.total_batches, "Generating...")
        };

        let stats = self.stats.as_ref();
        let bar_ref = &bar;
        let total_batches = plan.total_batches;

        let (dispatched, written) = thread::scope(|scope| {
            let writer_handle =
                scope.spawn(move || output::run(batch_rx, open()?, tick_tx, stats));
            let progress_handle =
                scope.spawn(move || progress::observe(tick_rx, total_batches, bar_ref));

            log::debug!("Awaiting producers");
            let dispatched = pool.dispatch(plan.range, producer, &batch_tx, &cancel);

            log::debug!("Producers done, signalling end of stream");
            if batch_tx.send(Message::Done).is_err() {
                log::debug!("Writer already stopped");
            }
            drop(batch_tx);

            let written = writer_handle.join().unwrap_or_else(|_| {
                Err(GenError::Writer(io::Error::new(
                    io::ErrorKind::Other,
                    "writer thread panicked",
                )))
            });
            let ticks = progress_handle.join().unwrap_or(0);
            log::debug!("Progress observer saw {} of {} batches", ticks, total_batches);

            (dispatched, written)
        });

        match (dispatched, written) {
            (Ok(()), Ok(items)) => {
                log::debug!("Run complete: {} items", items);
                let summary = self.summary(plan.clone());
                if !self.config.quiet {
                    self.report_success(&summary);
                }
                Ok(summary)
            }
            (_, Err(e)) | (Err(e), Ok(_)) => {
                log::warn!("Run failed: {}", e);
                if !self.config.quiet {
                    print_warning(&format!(
                        "Partial output preserved: {} words ({})",
                        format_number(self.stats.get_items() as u128),
                        ByteSize(self.stats.get_bytes())
                    ));
                }
                Err(e)
            }
        }
    }

    /// Get generation statistics
    pub fn stats(&self) -> Arc<GenerationStats> {
        Arc::clone(&self.stats)
    }

    fn summary(&self, plan: Plan) -> RunSummary {
        RunSummary {
            plan,
            items_written: self.stats.get_items(),
            batches_written: self.stats.get_batches(),
            bytes_written: self.stats.get_bytes(),
            elapsed: self.stats.elapsed(),
        }
    }

    fn print_plan(&self, plan: &Plan, words: &WordSet) {
        if self.config.dry_run {
            print_header("DRY RUN - No files will be written");
        } else {
            print_header("Generation plan");
        }

        match plan.target_length {
            Some(target) => print_bullet(&format!(
                "Target length: {} (word lengths {}..={})",
                target,
                words.min_len(),
                words.max_len()
            )),
            None => print_bullet(&format!(
                "Feasibility limit: {} words",
                format_number(self.config.limit as u128)
            )),
        }

        if plan.range.is_empty() {
            print_bullet("Repetition levels: none");
        } else {
            print_bullet(&format!(
                "Repetition levels: {}..={}",
                plan.range.min_rep, plan.range.max_rep
            ));
        }
        print_bullet(&format!("Words to write: {}", format_number(plan.total_items)));
        print_bullet(&format!(
            "Batches: {} (up to {} words each)",
            format_number(plan.total_batches as u128),
            format_number(plan.chunk_size as u128)
        ));
        print_bullet(&format!(
            "Estimated size: {}",
            ByteSize(u64::try_from(plan.estimated_bytes).unwrap_or(u64::MAX))
        ));

        if self.config.display {
            print_bullet("Output: stdout");
        } else {
            print_bullet(&format!("Output: {:?}", self.config.output));
        }
    }

    fn report_success(&self, summary: &RunSummary) {
        if self.config.display {
            print_success("Output streamed to stdout");
        } else {
            print_success(&format!("Output written to: {:?}", self.config.output));
        }

        if summary.items_written as u128 != summary.plan.total_items {
            log::warn!(
                "Planned {} words but wrote {}",
                summary.plan.total_items,
                summary.items_written
            );
        }

        println!(
            "  {} {}",
            "Total words written:".green(),
            format_number(summary.items_written as u128).green().bold()
        );
        self.stats.print_summary();
    }
}
