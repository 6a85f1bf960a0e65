//! Stream writers.
//!
//! This module provides:
//! - [`StreamWriter`], the encoder shared by every writer flavor
//! - [`SpaceStrategy`], the capability that frees room when the buffer is full
//! - [`Grow`] and [`MemoryStreamWriter`] for purely in-memory output
//!
//! The sink-backed flavor lives in [`crate::flush`].

use crate::chars;
use crate::error::{Error, Result};
use crate::label::Label;
use crate::reader::MemoryStreamReader;

/// Largest buffer the growth policy will allocate.
pub const MAX_BUFFER_LEN: usize = 0x7FFF_FFC7;

/// Default initial capacity of a memory writer.
pub const DEFAULT_INITIAL_CAPACITY: usize = 64;

/// Unused capacity above which `into_reader` compacts the bytes first.
pub const COMPACT_THRESHOLD: usize = 500_000;

/// Widest fixed-size value; a space strategy must free at least this much.
const MAX_VALUE_LEN: usize = 8;

/// Strategy invoked when a write does not fit in the remaining buffer.
pub trait SpaceStrategy {
    /// Frees at least 8 bytes after `*end` in `bytes`.
    ///
    /// `bytes.len()` is the buffer capacity and `*end` the number of valid
    /// bytes in it.
    ///
    /// # Errors
    /// Fails when no room can be made.
    fn make_space(&mut self, bytes: &mut Vec<u8>, end: &mut usize) -> Result<()>;

    /// Number of bytes that already left the buffer.
    fn flushed(&self) -> u64 {
        0
    }

    /// Discards everything written so far outside the buffer.
    ///
    /// # Errors
    /// Fails if the discarded bytes live in a sink that cannot be truncated.
    fn clear(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called once when the writer is dropped, with the unflushed bytes.
    fn release(&mut self, _pending: &[u8]) {}
}

/// Growth policy of the in-memory writer: 1.5x until the hard limit.
#[derive(Debug, Clone, Copy)]
pub struct Grow {
    limit: usize,
}

impl Default for Grow {
    fn default() -> Self {
        Self {
            limit: MAX_BUFFER_LEN,
        }
    }
}

impl Grow {
    /// Creates a growth policy that never exceeds `limit` bytes.
    ///
    /// The limit is capped at [`MAX_BUFFER_LEN`].
    #[must_use]
    pub const fn with_limit(limit: usize) -> Self {
        let limit = if limit > MAX_BUFFER_LEN {
            MAX_BUFFER_LEN
        } else {
            limit
        };
        Self { limit }
    }

    /// Returns the capacity limit in bytes.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Computes the next capacity after `current`, or `None` at the limit.
    ///
    /// A returned capacity always leaves at least 8 more bytes than `current`.
    #[must_use]
    pub fn next_capacity(&self, current: usize) -> Option<usize> {
        if current < (self.limit / 3) * 2 {
            let grown = ((current / 2) * 3).max(current + MAX_VALUE_LEN);
            if grown <= self.limit {
                return Some(grown);
            }
        }
        if current + MAX_VALUE_LEN < self.limit {
            Some(self.limit)
        } else {
            None
        }
    }
}

impl SpaceStrategy for Grow {
    fn make_space(&mut self, bytes: &mut Vec<u8>, _end: &mut usize) -> Result<()> {
        let capacity = bytes.len();
        let grown = self.next_capacity(capacity).ok_or(Error::OutOfCapacity {
            capacity,
            limit: self.limit,
        })?;
        bytes.reserve_exact(grown - capacity);
        bytes.resize(grown, 0);
        tracing::trace!("write buffer grown from {} to {} bytes", capacity, grown);
        Ok(())
    }
}

/// Little-endian encoder into a buffer whose overflow is handled by a
/// [`SpaceStrategy`].
pub struct StreamWriter<S: SpaceStrategy = Grow> {
    pub(crate) bytes: Vec<u8>,
    pub(crate) end: usize,
    pub(crate) strategy: S,
}

/// Writer into a growable in-memory buffer.
pub type MemoryStreamWriter = StreamWriter<Grow>;

impl StreamWriter<Grow> {
    /// Creates a memory writer with the default initial capacity (64 bytes).
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_CAPACITY)
    }

    /// Creates a memory writer with the given initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_strategy(capacity, Grow::default())
    }

    /// Creates a memory writer that never grows beyond `limit` bytes.
    ///
    /// Writes that would need more room fail with [`Error::OutOfCapacity`].
    #[must_use]
    pub fn with_limit(capacity: usize, limit: usize) -> Self {
        let grow = Grow::with_limit(limit);
        Self::with_strategy(capacity.min(grow.limit()), grow)
    }

    /// Returns the written bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.end]
    }

    /// Returns the current buffer capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Finishes writing and returns a reader over the written bytes.
    ///
    /// When more than 500,000 bytes of capacity are unused the bytes are
    /// copied into an exact-size buffer first.
    #[must_use]
    pub fn into_reader(mut self) -> MemoryStreamReader {
        let end = std::mem::take(&mut self.end);
        let mut bytes = std::mem::take(&mut self.bytes);
        if bytes.len() - end > COMPACT_THRESHOLD {
            bytes = bytes[..end].to_vec();
        } else {
            bytes.truncate(end);
        }
        MemoryStreamReader::new(bytes)
    }
}

impl Default for StreamWriter<Grow> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SpaceStrategy> StreamWriter<S> {
    pub(crate) fn with_strategy(capacity: usize, strategy: S) -> Self {
        Self {
            bytes: vec![0u8; capacity],
            end: 0,
            strategy,
        }
    }

    #[inline(always)]
    fn reserve(&mut self, len: usize) -> Result<()> {
        if self.end + len > self.bytes.len() {
            self.strategy.make_space(&mut self.bytes, &mut self.end)?;
            debug_assert!(self.end + len <= self.bytes.len());
        }
        Ok(())
    }

    #[inline(always)]
    fn put<const N: usize>(&mut self, value: [u8; N]) -> Result<()> {
        self.reserve(N)?;
        self.bytes[self.end..self.end + N].copy_from_slice(&value);
        self.end += N;
        Ok(())
    }

    /// Writes a u8.
    ///
    /// # Errors
    /// Fails if no room can be made.
    #[inline]
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.put([value])
    }

    /// Writes an i16 in little-endian.
    ///
    /// # Errors
    /// Fails if no room can be made.
    #[inline]
    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.put(value.to_le_bytes())
    }

    /// Writes an i32 in little-endian.
    ///
    /// # Errors
    /// Fails if no room can be made.
    #[inline]
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.put(value.to_le_bytes())
    }

    /// Writes an i64 in little-endian.
    ///
    /// # Errors
    /// Fails if no room can be made.
    #[inline]
    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.put(value.to_le_bytes())
    }

    /// Writes a label as its raw 32-bit offset.
    ///
    /// # Errors
    /// Fails if no room can be made.
    #[inline]
    pub fn write_label(&mut self, label: Label) -> Result<()> {
        self.put(label.offset().to_le_bytes())
    }

    /// Writes raw UTF-16 code units. `None` writes the null string.
    ///
    /// # Errors
    /// Returns [`Error::InvalidStringLength`] if there are more than
    /// `i32::MAX` units, or fails if no room can be made.
    pub fn write_utf16(&mut self, units: Option<&[u16]>) -> Result<()> {
        let Some(units) = units else {
            return self.write_i32(-1);
        };
        let count = i32::try_from(units.len()).map_err(|_| Error::InvalidStringLength {
            length: i32::MAX,
        })?;
        self.write_i32(count)?;
        for &unit in units {
            self.write_unit(unit)?;
        }
        Ok(())
    }

    /// Writes a string. `None` writes the null string, distinct from `""`.
    ///
    /// The count prefix is the number of UTF-16 code units.
    ///
    /// # Errors
    /// Fails if no room can be made.
    pub fn write_string(&mut self, value: Option<&str>) -> Result<()> {
        let Some(value) = value else {
            return self.write_i32(-1);
        };
        let count = value.encode_utf16().count();
        let count = i32::try_from(count).map_err(|_| Error::InvalidStringLength {
            length: i32::MAX,
        })?;
        self.write_i32(count)?;
        for unit in value.encode_utf16() {
            self.write_unit(unit)?;
        }
        Ok(())
    }

    #[inline]
    fn write_unit(&mut self, unit: u16) -> Result<()> {
        let (encoded, len) = chars::encode_unit(unit);
        self.reserve(len)?;
        self.bytes[self.end..self.end + len].copy_from_slice(&encoded[..len]);
        self.end += len;
        Ok(())
    }

    /// Writes the trailer label that closes a stream.
    ///
    /// Readers find it with
    /// [`StreamReader::goto_suffix_label`](crate::reader::StreamReader::goto_suffix_label).
    ///
    /// # Errors
    /// Fails if no room can be made.
    pub fn write_suffix_label(&mut self, label: Label) -> Result<()> {
        self.write_label(label)
    }

    /// Returns the label of the next byte to be written.
    ///
    /// # Errors
    /// Returns [`Error::AddressSpaceExceeded`] once the stream is longer
    /// than a 32-bit offset can address.
    pub fn get_label(&self) -> Result<Label> {
        Label::try_from(self.length())
    }

    /// Total number of bytes written, including flushed ones.
    #[must_use]
    pub fn length(&self) -> u64 {
        self.strategy.flushed() + self.end as u64
    }

    /// Number of bytes currently held in the buffer.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.end
    }

    /// Discards everything written; buffer capacity is kept.
    ///
    /// # Errors
    /// Fails if flushed bytes cannot be discarded.
    pub fn clear(&mut self) -> Result<()> {
        self.strategy.clear()?;
        self.end = 0;
        Ok(())
    }
}

impl<S: SpaceStrategy> Drop for StreamWriter<S> {
    fn drop(&mut self) {
        self.strategy.release(&self.bytes[..self.end]);
    }
}

impl<S: SpaceStrategy> std::fmt::Debug for StreamWriter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamWriter")
            .field("capacity", &self.bytes.len())
            .field("buffered", &self.end)
            .field("length", &self.length())
            .finish()
    }
}
