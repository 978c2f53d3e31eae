//! Worker pool and level dispatch
//!
//! One task per repetition level, run on a dedicated rayon pool. A level is
//! never split: whichever worker claims it generates it start to finish and
//! pushes its batches into the shared bounded channel, blocking while the
//! channel is full.

use crossbeam_channel::Sender;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{GenError, Result};
use crate::filter::LengthFilter;
use crate::generator::{generate, Batch};
use crate::plan::PlanRange;
use crate::words::WordSet;

/// Value carried by the batch channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Batch(Batch),
    /// End of stream. Sent once by the orchestrator after every producer returned.
    Done,
}

/// Source of batches for one repetition level.
pub trait BatchProducer: Send + Sync {
    /// Generate `level` and hand every batch to `emit`, in order.
    /// An error from `emit` must be returned as-is.
    fn produce(&self, level: usize, emit: &mut dyn FnMut(Batch) -> Result<()>) -> Result<()>;
}

/// Produces the Cartesian power of the word set, optionally length-filtered.
#[derive(Debug, Clone)]
pub struct CombinationProducer {
    words: Arc<WordSet>,
    chunk_size: usize,
    filter: Option<LengthFilter>,
}

impl CombinationProducer {
    pub fn new(words: Arc<WordSet>, chunk_size: usize, filter: Option<LengthFilter>) -> Self {
        Self {
            words,
            chunk_size,
            filter,
        }
    }
}

impl BatchProducer for CombinationProducer {
    fn produce(&self, level: usize, emit: &mut dyn FnMut(Batch) -> Result<()>) -> Result<()> {
        for batch in generate(&self.words, level, self.chunk_size, self.filter) {
            emit(batch)?;
        }
        Ok(())
    }
}

/// Fixed-size pool of generation workers.
pub struct WorkerPool {
    pool: ThreadPool,
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(GenError::config("At least one worker is required"));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("gen-worker-{}", i))
            .build()
            .map_err(|e| GenError::config(format!("Cannot start worker pool: {}", e)))?;

        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run every level of `range` and return once all of them finished.
    ///
    /// The first real failure raises `cancel`, so the remaining levels stop
    /// between batches. When several tasks fail, the most severe error wins.
    pub fn dispatch<P: BatchProducer>(
        &self,
        range: PlanRange,
        producer: &P,
        output: &Sender<Message>,
        cancel: &AtomicBool,
    ) -> Result<()> {
        self.pool.install(|| {
            range
                .levels()
                .into_par_iter()
                .with_max_len(1)
                .map(|level| run_level(level, producer, output, cancel))
                .reduce(|| Ok(()), most_severe)
        })
    }
}

fn run_level<P: BatchProducer>(
    level: usize,
    producer: &P,
    output: &Sender<Message>,
    cancel: &AtomicBool,
) -> Result<()> {
    if cancel.load(Ordering::Acquire) {
        return Err(GenError::Cancelled);
    }

    log::debug!("Level {} started", level);
    let mut sent = 0u64;

    let mut emit = |batch: Batch| -> Result<()> {
        if cancel.load(Ordering::Acquire) {
            return Err(GenError::Cancelled);
        }
        output
            .send(Message::Batch(batch))
            .map_err(|_| GenError::Channel {
                context: format!("writer stopped while level {} was sending", level),
            })?;
        sent += 1;
        Ok(())
    };

    let result = panic::catch_unwind(AssertUnwindSafe(|| producer.produce(level, &mut emit)))
        .unwrap_or_else(|payload| {
            Err(GenError::WorkerFailure {
                level,
                reason: panic_message(payload),
            })
        });

    match &result {
        Ok(()) => log::debug!("Level {} finished ({} batches)", level, sent),
        Err(GenError::Cancelled) => log::debug!("Level {} cancelled after {} batches", level, sent),
        Err(e) => {
            cancel.store(true, Ordering::Release);
            log::warn!("Level {} failed after {} batches: {}", level, sent, e);
        }
    }

    result
}

fn most_severe(a: Result<()>, b: Result<()>) -> Result<()> {
    match (a, b) {
        (Err(a), Err(b)) => Err(if b.severity() > a.severity() { b } else { a }),
        (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
        (Ok(()), Ok(())) => Ok(()),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
