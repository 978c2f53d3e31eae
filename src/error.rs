//! Error types for wordlist generation
//!
//! Every failure the pipeline can report maps to one `GenError` variant:
//! - `Configuration`: unusable input or a plan that cannot produce output
//! - `WordSource`: the base word file could not be read
//! - `WorkerFailure`: a generation task for one repetition level failed
//! - `Writer`: the output sink failed (disk full, permission denied, ...)
//! - `Channel`: the batch channel was disconnected underneath a producer
//! - `Cancelled`: a producer stopped early because another task failed

use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, GenError>;

/// Unified error type for the generation pipeline.
#[derive(thiserror::Error, Debug)]
pub enum GenError {
    /// Invalid input or an unreachable target, detected before generation starts.
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    /// The base word file could not be opened or read.
    #[error("Cannot read word source {path:?}")]
    WordSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A generation task failed.
    #[error("Worker failed at repetition level {level}: {reason}")]
    WorkerFailure { level: usize, reason: String },

    /// The output sink failed.
    #[error("Writer failed")]
    Writer(#[from] io::Error),

    /// A batch could not be handed over because the consumer is gone.
    #[error("Channel error: {context}")]
    Channel { context: String },

    /// The task was stopped because the run is shutting down after a failure.
    #[error("Generation cancelled")]
    Cancelled,
}

impl GenError {
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Rank used by the orchestrator to pick the root cause when several
    /// tasks fail during the same run.
    pub(crate) fn severity(&self) -> u8 {
        match self {
            Self::Writer(_) => 4,
            Self::WorkerFailure { .. } => 3,
            Self::Configuration { .. } | Self::WordSource { .. } => 2,
            Self::Channel { .. } => 1,
            Self::Cancelled => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_outranks_channel() {
        let writer = GenError::Writer(io::Error::new(io::ErrorKind::Other, "disk full"));
        let channel = GenError::Channel {
            context: "receiver dropped".to_string(),
        };
        assert!(writer.severity() > channel.severity());
        assert!(channel.severity() > GenError::Cancelled.severity());
    }

    #[test]
    fn test_display() {
        let err = GenError::WorkerFailure {
            level: 3,
            reason: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Worker failed at repetition level 3: boom");
        assert_eq!(
            GenError::config("no words").to_string(),
            "Configuration error: no words"
        );
    }
}
