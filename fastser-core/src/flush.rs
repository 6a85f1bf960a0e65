//! Writer that streams its buffer into a sink.
//!
//! A [`BufferedStreamWriter`] encodes exactly like a
//! [`MemoryStreamWriter`](crate::writer::MemoryStreamWriter), but when its
//! buffer fills up the bytes are written out instead of the buffer growing.
//! Labels stay absolute: they count every byte already in the sink.

use crate::config::WriterConfig;
use crate::error::{Error, Result};
use crate::source::ByteSink;
use crate::writer::{SpaceStrategy, StreamWriter};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Space strategy of [`BufferedStreamWriter`].
#[derive(Debug)]
pub struct SinkFlush<W: ByteSink> {
    sink: Option<W>,
    flushed: u64,
}

impl<W: ByteSink> SinkFlush<W> {
    fn sink_mut(&mut self) -> io::Result<&mut W> {
        self.sink
            .as_mut()
            .ok_or_else(|| io::Error::other("sink already released"))
    }

    fn write_out(&mut self, pending: &[u8]) -> io::Result<()> {
        if pending.is_empty() {
            return Ok(());
        }
        self.sink_mut()?.write_all(pending)?;
        self.flushed += pending.len() as u64;
        tracing::trace!(
            "flushed {} bytes, {} bytes in sink",
            pending.len(),
            self.flushed
        );
        Ok(())
    }
}

impl<W: ByteSink> SpaceStrategy for SinkFlush<W> {
    fn make_space(&mut self, bytes: &mut Vec<u8>, end: &mut usize) -> Result<()> {
        self.write_out(&bytes[..*end])?;
        *end = 0;
        Ok(())
    }

    fn flushed(&self) -> u64 {
        self.flushed
    }

    fn clear(&mut self) -> Result<()> {
        self.sink_mut()?.truncate()?;
        self.flushed = 0;
        Ok(())
    }

    fn release(&mut self, pending: &[u8]) {
        if self.sink.is_none() {
            return;
        }
        let result = self
            .write_out(pending)
            .and_then(|()| self.sink_mut()?.flush());
        if let Err(e) = result {
            tracing::warn!("failed to flush buffered writer on drop: {}", e);
        }
    }
}

/// Writer that flushes its buffer into a [`ByteSink`].
///
/// Pass `&mut sink` to keep the sink open after the writer is dropped.
pub type BufferedStreamWriter<W> = StreamWriter<SinkFlush<W>>;

impl<W: ByteSink> StreamWriter<SinkFlush<W>> {
    /// Creates a writer with the default buffer size (8 KiB).
    ///
    /// # Errors
    /// Returns IO error if the sink length cannot be determined.
    pub fn new(sink: W) -> Result<Self> {
        Self::with_config(sink, WriterConfig::default())
    }

    /// Creates a writer appending to `sink`.
    ///
    /// Labels start at the sink's current length.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if the configuration is rejected, or
    /// IO error if the sink length cannot be determined.
    pub fn with_config(mut sink: W, config: WriterConfig) -> Result<Self> {
        config.validate()?;
        let flushed = sink.byte_len()?;
        tracing::debug!(
            "buffered writer opened: buffer {} bytes, sink at {}",
            config.buffer_size,
            flushed
        );
        Ok(Self::with_strategy(
            config.buffer_size,
            SinkFlush {
                sink: Some(sink),
                flushed,
            },
        ))
    }

    /// Writes the buffered bytes to the sink and flushes it.
    ///
    /// # Errors
    /// Returns IO error if the sink fails.
    pub fn flush(&mut self) -> Result<()> {
        self.strategy.make_space(&mut self.bytes, &mut self.end)?;
        self.strategy.sink_mut()?.flush()?;
        Ok(())
    }

    /// Returns the sink.
    ///
    /// Bytes still in the buffer are not visible in it until [`flush`](Self::flush).
    #[must_use]
    pub fn get_ref(&self) -> Option<&W> {
        self.strategy.sink.as_ref()
    }

    /// Flushes and returns the sink.
    ///
    /// # Errors
    /// Returns IO error if the final flush fails; the sink is dropped then.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        self.strategy
            .sink
            .take()
            .ok_or_else(|| Error::Io(io::Error::other("sink already released")))
    }
}

impl StreamWriter<SinkFlush<File>> {
    /// Creates (or truncates) a file and writes into it.
    ///
    /// # Errors
    /// Returns IO error if the file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::create_with_config(path, WriterConfig::default())
    }

    /// Creates (or truncates) a file and writes into it with the given
    /// buffer configuration.
    ///
    /// # Errors
    /// Returns IO error if the file cannot be created, or
    /// [`Error::InvalidConfig`] if the configuration is rejected.
    pub fn create_with_config(path: impl AsRef<Path>, config: WriterConfig) -> Result<Self> {
        config.validate()?;
        Self::with_config(File::create(path)?, config)
    }
}
