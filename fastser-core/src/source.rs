//! Byte source and sink abstractions for the buffered readers and writers.
//!
//! This module provides:
//! - [`ByteSource`] for seekable inputs (files, in-memory cursors)
//! - [`ByteSink`] for outputs that can be measured and truncated
//! - [`SharedSource`], a cloneable handle that serializes seek-then-read
//!   units across every reader sharing one source

use parking_lot::Mutex;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::sync::Arc;

/// Seekable input a buffered reader can pull windows from.
pub trait ByteSource: Read + Seek {
    /// Returns the total length of the source in bytes.
    ///
    /// The default implementation seeks to the end and back.
    ///
    /// # Errors
    /// Returns IO error if the length cannot be determined.
    fn byte_len(&mut self) -> io::Result<u64> {
        let pos = self.stream_position()?;
        let len = self.seek(SeekFrom::End(0))?;
        if pos != len {
            self.seek(SeekFrom::Start(pos))?;
        }
        Ok(len)
    }
}

impl ByteSource for File {
    fn byte_len(&mut self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }
}

impl<T: AsRef<[u8]>> ByteSource for Cursor<T> {
    fn byte_len(&mut self) -> io::Result<u64> {
        Ok(self.get_ref().as_ref().len() as u64)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn byte_len(&mut self) -> io::Result<u64> {
        (**self).byte_len()
    }
}

/// Output a buffered writer flushes into.
pub trait ByteSink: Write {
    /// Returns the number of bytes already in the sink.
    ///
    /// # Errors
    /// Returns IO error if the length cannot be determined.
    fn byte_len(&mut self) -> io::Result<u64>;

    /// Discards all content and rewinds to offset 0.
    ///
    /// # Errors
    /// Returns IO error if the sink cannot be truncated.
    fn truncate(&mut self) -> io::Result<()>;
}

impl ByteSink for File {
    fn byte_len(&mut self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&mut self) -> io::Result<()> {
        self.set_len(0)?;
        self.seek(SeekFrom::Start(0))?;
        Ok(())
    }
}

impl ByteSink for Vec<u8> {
    fn byte_len(&mut self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }

    fn truncate(&mut self) -> io::Result<()> {
        self.clear();
        Ok(())
    }
}

impl ByteSink for Cursor<Vec<u8>> {
    fn byte_len(&mut self) -> io::Result<u64> {
        Ok(self.get_ref().len() as u64)
    }

    fn truncate(&mut self) -> io::Result<()> {
        self.get_mut().clear();
        self.set_position(0);
        Ok(())
    }
}

impl<W: ByteSink + ?Sized> ByteSink for &mut W {
    fn byte_len(&mut self) -> io::Result<u64> {
        (**self).byte_len()
    }

    fn truncate(&mut self) -> io::Result<()> {
        (**self).truncate()
    }
}

/// Cloneable handle on a source shared by several readers.
///
/// Each reader keeps its own window and cursor; the handle only guarantees
/// that one reader's seek and the reads that follow it run as a unit.
/// The source is dropped (closed) together with the last handle.
pub struct SharedSource<S> {
    inner: Arc<Mutex<S>>,
}

impl<S: ByteSource> SharedSource<S> {
    /// Wraps a source.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(source)),
        }
    }

    /// Seeks to `offset` and reads until `buf` is full or the source is
    /// exhausted, all under the lock.
    ///
    /// # Returns
    /// Number of bytes read.
    ///
    /// # Errors
    /// Returns IO error if the seek or a read fails.
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut source = self.inner.lock();
        source.seek(SeekFrom::Start(offset))?;
        let mut filled = 0;
        while filled < buf.len() {
            match source.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    /// Returns the length of the source in bytes.
    ///
    /// # Errors
    /// Returns IO error if the length cannot be determined.
    pub fn len(&self) -> io::Result<u64> {
        self.inner.lock().byte_len()
    }

    /// Returns true if the source holds no bytes.
    ///
    /// # Errors
    /// Returns IO error if the length cannot be determined.
    pub fn is_empty(&self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Number of live handles on this source.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Recovers the source if this is the last handle.
    ///
    /// # Errors
    /// Returns the handle unchanged if other handles are still alive.
    pub fn try_into_inner(self) -> Result<S, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl<S> Clone for SharedSource<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> std::fmt::Debug for SharedSource<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSource")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}
