//! Output management module
//!
//! The serializing writer: the only code that touches the output sink. It
//! drains the batch channel, writes one line per generated string and sends
//! one progress tick per batch.

use crossbeam_channel::{Receiver, Sender};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::pool::Message;
use crate::progress::{GenerationStats, Tick};

/// Buffered line writer that counts what it wrote.
pub struct BatchWriter<W: Write> {
    writer: BufWriter<W>,
    lines_written: u64,
    bytes_written: u64,
}

fn create_file(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

/// Where generated lines go. Opened by the writer thread, never before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    File(PathBuf),
    Stdout,
}

impl Sink {
    /// Open for writing, truncating an existing file.
    pub fn open(&self, buffer_size: usize) -> Result<BatchWriter<Box<dyn Write>>> {
        let inner: Box<dyn Write> = match self {
            Self::File(path) => Box::new(create_file(path)?),
            Self::Stdout => Box::new(io::stdout().lock()),
        };
        Ok(BatchWriter::new(inner, buffer_size))
    }
}

impl<W: Write> BatchWriter<W> {
    pub fn new(inner: W, buffer_size: usize) -> Self {
        Self {
            writer: BufWriter::with_capacity(buffer_size.max(1), inner),
            lines_written: 0,
            bytes_written: 0,
        }
    }

    /// Write every string of the batch, each followed by `\n`.
    pub fn write_batch(&mut self, batch: &[String]) -> io::Result<u64> {
        let mut bytes = 0u64;
        for line in batch {
            self.writer.write_all(line.as_bytes())?;
            self.writer.write_all(b"\n")?;
            bytes += line.len() as u64 + 1;
        }
        self.lines_written += batch.len() as u64;
        self.bytes_written += bytes;
        Ok(bytes)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

/// Drain `input` into `writer` until the end-of-stream message arrives (or
/// every sender is gone), then flush. Returns the number of lines written.
///
/// On error the receiver and the tick sender are dropped, which unblocks
/// producers and lets the progress observer finish.
pub fn run<W: Write>(
    input: Receiver<Message>,
    mut writer: BatchWriter<W>,
    ticks: Sender<Tick>,
    stats: &GenerationStats,
) -> Result<u64> {
    loop {
        match input.recv() {
            Ok(Message::Batch(batch)) => {
                let bytes = writer.write_batch(&batch)?;
                stats.add_batch(batch.len() as u64, bytes);
                // The observer may already be gone; that is not a write failure
                let _ = ticks.send(Tick);
            }
            Ok(Message::Done) => break,
            Err(_) => {
                log::debug!("All batch senders dropped before end of stream");
                break;
            }
        }
    }

    writer.flush()?;
    log::debug!(
        "Writer finished: {} lines, {} bytes",
        writer.lines_written(),
        writer.bytes_written()
    );
    Ok(writer.lines_written())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{bounded, unbounded};
    use tempfile::TempDir;

    /// Accepts `limit` bytes, then fails like a full disk.
    struct FullDisk {
        written: Vec<u8>,
        limit: usize,
    }

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.written.len() + buf.len() > self.limit {
                return Err(io::Error::new(io::ErrorKind::Other, "no space left on device"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_batch_writer() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.txt");

        let mut writer = Sink::File(path.clone()).open(1024).unwrap();
        writer.write_batch(&["hello".to_string(), "world".to_string()]).unwrap();
        writer.flush().unwrap();

        assert_eq!(writer.lines_written(), 2);
        assert_eq!(writer.bytes_written(), 12);
        drop(writer);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "hello\nworld\n");
    }

    #[test]
    fn test_sink_open_truncates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.txt");
        std::fs::write(&path, "stale\nlines\n").unwrap();

        let mut writer = Sink::File(path.clone()).open(8).unwrap();
        writer.write_batch(&["fresh".to_string()]).unwrap();
        writer.flush().unwrap();
        drop(writer);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh\n");
    }

    #[test]
    fn test_sink_open_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let sink = Sink::File(temp_dir.path().join("no/such/dir/out.txt"));
        assert!(matches!(sink.open(8), Err(crate::error::GenError::Writer(_))));
    }

    #[test]
    fn test_run_stops_at_done_and_keeps_arrival_order() {
        let (tx, rx) = unbounded();
        let (tick_tx, tick_rx) = unbounded();
        let stats = GenerationStats::new();

        tx.send(Message::Batch(vec!["bb".into(), "aa".into()])).unwrap();
        tx.send(Message::Batch(vec!["c".into()])).unwrap();
        tx.send(Message::Done).unwrap();
        // Anything after the end-of-stream message is never read
        tx.send(Message::Batch(vec!["late".into()])).unwrap();

        let mut sink = Vec::new();
        let written = run(rx, BatchWriter::new(&mut sink, 16), tick_tx, &stats).unwrap();

        assert_eq!(written, 3);
        assert_eq!(String::from_utf8(sink).unwrap(), "bb\naa\nc\n");
        assert_eq!(tick_rx.try_iter().count(), 2);
        assert_eq!(stats.get_batches(), 2);
        assert_eq!(stats.get_items(), 3);
    }

    #[test]
    fn test_run_ends_when_senders_disconnect() {
        let (tx, rx) = bounded(2);
        let (tick_tx, _tick_rx) = unbounded();
        let stats = GenerationStats::new();

        tx.send(Message::Batch(vec!["x".into()])).unwrap();
        drop(tx);

        let mut sink = Vec::new();
        let written = run(rx, BatchWriter::new(&mut sink, 16), tick_tx, &stats).unwrap();
        assert_eq!(written, 1);
    }

    #[test]
    fn test_write_failure_is_reported() {
        let (tx, rx) = unbounded();
        let (tick_tx, tick_rx) = unbounded();
        let stats = GenerationStats::new();

        tx.send(Message::Batch(vec!["abc".into(); 100])).unwrap();
        tx.send(Message::Done).unwrap();

        let sink = FullDisk {
            written: Vec::new(),
            limit: 10,
        };
        let err = run(rx, BatchWriter::new(sink, 1), tick_tx, &stats).unwrap_err();

        assert!(matches!(err, crate::error::GenError::Writer(_)));
        assert_eq!(tick_rx.try_iter().count(), 0);
        // The batch channel is closed once the writer is gone
        assert!(tx.send(Message::Done).is_err());
    }
}
