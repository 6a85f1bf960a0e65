//! Stream readers.
//!
//! This module provides:
//! - [`StreamReader`], the decoder shared by every reader flavor
//! - [`FillStrategy`], the capability that decides what happens when the
//!   cursor runs off the buffered bytes
//! - [`Resident`] and [`MemoryStreamReader`] for buffers fully in memory
//!
//! The buffered flavors live in [`crate::buffered`] and [`crate::pinned`].

use crate::chars;
use crate::error::{Error, Result};
use crate::label::Label;

/// Buffered bytes of a reader together with its cursor.
///
/// `0 <= position <= end <= bytes.len()` always holds, and the absolute
/// offset of the next byte is `origin + position`.
#[derive(Debug)]
pub struct Window {
    pub(crate) bytes: Vec<u8>,
    pub(crate) position: usize,
    pub(crate) end: usize,
    pub(crate) origin: u32,
}

impl Window {
    pub(crate) fn new(bytes: Vec<u8>, position: usize, end: usize) -> Self {
        debug_assert!(position <= end && end <= bytes.len());
        Self {
            bytes,
            position,
            end,
            origin: 0,
        }
    }

    /// Cursor index into the buffer.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// End of the valid bytes in the buffer.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Absolute stream offset of buffer index 0.
    #[must_use]
    pub const fn origin(&self) -> u32 {
        self.origin
    }

    /// Total length of the backing buffer.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Bytes available between the cursor and the end of the valid data.
    #[must_use]
    pub const fn available(&self) -> usize {
        self.end - self.position
    }

    /// Absolute offset of the next byte to read.
    #[must_use]
    pub const fn current(&self) -> u64 {
        self.origin as u64 + self.position as u64
    }

    /// Drops the buffered bytes and re-anchors the window at `origin`.
    pub(crate) fn invalidate(&mut self, origin: u32) {
        self.origin = origin;
        self.position = 0;
        self.end = 0;
    }
}

/// Strategy invoked when a read needs bytes that are not buffered.
pub trait FillStrategy {
    /// Makes at least `minimum` bytes available after the cursor.
    ///
    /// # Errors
    /// Fails when the bytes cannot be produced.
    fn fill(&mut self, window: &mut Window, minimum: usize) -> Result<()>;

    /// Moves the cursor to a label that lies outside the buffered bytes.
    ///
    /// # Errors
    /// Fails when the label cannot be reached.
    fn relocate(&mut self, window: &mut Window, label: Label) -> Result<()>;

    /// Returns the total length of the stream in bytes.
    ///
    /// # Errors
    /// Fails if the length has to be queried from a source and that fails.
    fn length(&self, window: &Window) -> Result<u64>;
}

/// Fill strategy for a buffer that already holds the whole stream.
///
/// There is never anything more to fetch, so every fill is a contract
/// violation by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resident;

impl FillStrategy for Resident {
    fn fill(&mut self, window: &mut Window, minimum: usize) -> Result<()> {
        Err(Error::ReadPastEnd {
            position: window.position,
            requested: minimum,
            end: window.end,
        })
    }

    fn relocate(&mut self, window: &mut Window, label: Label) -> Result<()> {
        Err(Error::LabelOutOfBounds {
            label: label.offset(),
            length: window.end as u64,
        })
    }

    fn length(&self, window: &Window) -> Result<u64> {
        Ok(window.end as u64)
    }
}

/// Little-endian decoder over a [`Window`], refilled by a [`FillStrategy`].
///
/// # Wire Format
/// ```text
/// i16/i32/i64  little-endian, fixed width
/// label        u32 little-endian
/// string       i32 unit count (-1 = null), then 1-3 bytes per unit
/// ```
#[derive(Debug)]
pub struct StreamReader<F: FillStrategy = Resident> {
    pub(crate) window: Window,
    pub(crate) strategy: F,
}

/// Reader over a byte buffer that is entirely in memory.
pub type MemoryStreamReader = StreamReader<Resident>;

impl StreamReader<Resident> {
    /// Creates a reader over the whole of `data`.
    ///
    /// Bytes past the 32-bit address space are not readable.
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        let end = data.len().min(u32::MAX as usize);
        Self::from_window(Window::new(data, 0, end), Resident)
    }

    /// Creates a reader over `data[start..start + length]`.
    ///
    /// Labels stay buffer-relative: the cursor starts at label `start`.
    ///
    /// # Errors
    /// Returns [`Error::LabelOutOfBounds`] if the region does not fit in `data`.
    pub fn from_region(data: Vec<u8>, start: usize, length: usize) -> Result<Self> {
        let end = start
            .checked_add(length)
            .filter(|&end| end <= data.len() && end <= u32::MAX as usize)
            .ok_or_else(|| Error::LabelOutOfBounds {
                label: u32::try_from(start).unwrap_or(u32::MAX),
                length: data.len() as u64,
            })?;
        Ok(Self::from_window(Window::new(data, start, end), Resident))
    }

    /// Returns the valid bytes of the stream.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.window.bytes[..self.window.end]
    }
}

impl<F: FillStrategy> StreamReader<F> {
    pub(crate) fn from_window(window: Window, strategy: F) -> Self {
        Self { window, strategy }
    }

    /// Makes sure `len` bytes follow the cursor, refilling if needed.
    #[inline(always)]
    pub(crate) fn ensure(&mut self, len: usize) -> Result<()> {
        if self.window.position + len > self.window.end {
            self.strategy.fill(&mut self.window, len)?;
        }
        Ok(())
    }

    #[inline(always)]
    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure(N)?;
        let start = self.window.position;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.window.bytes[start..start + N]);
        self.window.position += N;
        Ok(out)
    }

    /// Reads a u8.
    ///
    /// # Errors
    /// Fails if no byte can be made available.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        if self.window.position >= self.window.end {
            self.strategy.fill(&mut self.window, 1)?;
        }
        let value = self.window.bytes[self.window.position];
        self.window.position += 1;
        Ok(value)
    }

    /// Reads an i16 in little-endian.
    ///
    /// # Errors
    /// Fails if two bytes cannot be made available.
    #[inline]
    pub fn read_i16(&mut self) -> Result<i16> {
        self.take::<2>().map(i16::from_le_bytes)
    }

    /// Reads an i32 in little-endian.
    ///
    /// # Errors
    /// Fails if four bytes cannot be made available.
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        self.take::<4>().map(i32::from_le_bytes)
    }

    /// Reads an i64 as two little-endian 32-bit halves, low half first.
    ///
    /// # Errors
    /// Fails if eight bytes cannot be made available; the cursor is left
    /// where it was.
    #[inline]
    pub fn read_i64(&mut self) -> Result<i64> {
        let bytes = self.take::<8>()?;
        let low = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let high = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        Ok(((u64::from(high) << 32) | u64::from(low)) as i64)
    }

    /// Reads a label.
    ///
    /// # Errors
    /// Fails if four bytes cannot be made available.
    #[inline]
    pub fn read_label(&mut self) -> Result<Label> {
        self.take::<4>().map(|b| Label::new(u32::from_le_bytes(b)))
    }

    /// Reads a string as raw UTF-16 code units. `None` is the null string.
    ///
    /// # Errors
    /// Returns [`Error::InvalidStringLength`] for a negative count other
    /// than -1, or a read error if the payload is truncated.
    pub fn read_utf16(&mut self) -> Result<Option<Vec<u16>>> {
        let count = self.read_i32()?;
        if count == -1 {
            return Ok(None);
        }
        let count =
            usize::try_from(count).map_err(|_| Error::InvalidStringLength { length: count })?;

        // Each unit takes at least one byte, so the count bounds the allocation.
        let mut units = Vec::with_capacity(count.min(self.window.capacity()));
        let mut rest = [0u8; chars::MAX_UNIT_LEN - 1];
        for _ in 0..count {
            let lead = self.read_u8()?;
            let extra = chars::unit_len(lead) - 1;
            for slot in rest.iter_mut().take(extra) {
                *slot = self.read_u8()?;
            }
            units.push(chars::decode_unit(lead, &rest[..extra]));
        }
        Ok(Some(units))
    }

    /// Reads a string. `None` is the null string, distinct from `""`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidString`] if the units contain an unpaired
    /// surrogate, plus any error of [`StreamReader::read_utf16`].
    pub fn read_string(&mut self) -> Result<Option<String>> {
        let offset = self.window.current();
        match self.read_utf16()? {
            None => Ok(None),
            Some(units) => String::from_utf16(&units)
                .map(Some)
                .map_err(|_| Error::InvalidString { offset }),
        }
    }

    /// Moves the cursor to an absolute stream offset.
    ///
    /// # Errors
    /// Fails if the strategy cannot reach the label.
    pub fn goto(&mut self, label: Label) -> Result<()> {
        let offset = label.offset().wrapping_sub(self.window.origin) as usize;
        if offset <= self.window.end {
            self.window.position = offset;
            Ok(())
        } else {
            self.strategy.relocate(&mut self.window, label)
        }
    }

    /// Returns the label of the next byte to be read.
    #[inline]
    #[must_use]
    pub fn current(&self) -> Label {
        let current = self.window.current();
        debug_assert!(current <= u64::from(u32::MAX));
        Label::new(current as u32)
    }

    /// Returns the total length of the stream in bytes.
    ///
    /// # Errors
    /// Fails if the underlying source cannot report its length.
    pub fn length(&self) -> Result<u64> {
        self.strategy.length(&self.window)
    }

    /// Advances the cursor by `count` bytes.
    ///
    /// # Errors
    /// Fails if the target lies beyond the 32-bit address space or cannot
    /// be reached.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        let target = self.window.current() + count as u64;
        self.goto(Label::try_from(target)?)
    }

    /// Follows the label stored in the last four bytes of the stream.
    ///
    /// # Errors
    /// Fails if the stream is shorter than a label or either jump fails.
    pub fn goto_suffix_label(&mut self) -> Result<()> {
        let length = self.length()?;
        let trailer = length
            .checked_sub(Label::ENCODED_LENGTH as u64)
            .ok_or(Error::EndOfStream {
                offset: 0,
                required: Label::ENCODED_LENGTH,
                available: length as usize,
            })?;
        self.goto(Label::try_from(trailer)?)?;
        let target = self.read_label()?;
        tracing::trace!("suffix label at {:#x} points to {}", trailer, target);
        self.goto(target)
    }

    /// Returns the buffered window.
    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(bytes: &[u8]) -> MemoryStreamReader {
        MemoryStreamReader::new(bytes.to_vec())
    }

    #[test]
    fn test_read_primitives_little_endian() {
        let mut r = reader(&[
            0xAB, // u8
            0x34, 0x12, // i16
            0x78, 0x56, 0x34, 0x12, // i32
            0xF0, 0xDE, 0xBC, 0x9A, 0x78, 0x56, 0x34, 0x12, // i64
        ]);
        assert_eq!(r.read_u8().unwrap(), 0xAB);
        assert_eq!(r.read_i16().unwrap(), 0x1234);
        assert_eq!(r.read_i32().unwrap(), 0x1234_5678);
        assert_eq!(r.read_i64().unwrap(), 0x1234_5678_9ABC_DEF0);
        assert_eq!(r.current(), Label::new(15));
        assert_eq!(r.length().unwrap(), 15);
    }

    #[test]
    fn test_read_i64_combines_halves() {
        let mut r = reader(&(-2i64).to_le_bytes());
        assert_eq!(r.read_i64().unwrap(), -2);
    }

    #[test]
    fn test_read_past_end_fails() {
        let mut r = reader(&[1, 2, 3]);
        let err = r.read_i32().unwrap_err();
        assert!(matches!(
            err,
            Error::ReadPastEnd {
                position: 0,
                requested: 4,
                end: 3
            }
        ));
        // The failed read leaves the cursor alone.
        assert_eq!(r.current(), Label::ZERO);
        assert_eq!(r.read_u8().unwrap(), 1);
    }

    #[test]
    fn test_truncated_i64_leaves_cursor() {
        let mut r = reader(&[1, 0, 0, 0, 2, 0]);
        assert!(matches!(
            r.read_i64(),
            Err(Error::ReadPastEnd {
                position: 0,
                requested: 8,
                end: 6
            })
        ));
        assert_eq!(r.current(), Label::ZERO);
        assert_eq!(r.read_i32().unwrap(), 1);
    }

    #[test]
    fn test_read_u8_at_end_fails() {
        let mut r = reader(&[]);
        assert!(r.read_u8().unwrap_err().is_end_of_stream());
    }

    #[test]
    fn test_from_region() {
        let r = MemoryStreamReader::from_region(vec![9, 9, 1, 0, 0, 0, 9], 2, 4);
        let mut r = r.unwrap();
        assert_eq!(r.current(), Label::new(2));
        assert_eq!(r.read_i32().unwrap(), 1);
        assert!(r.read_u8().is_err());
        assert_eq!(r.length().unwrap(), 6);
    }

    #[test]
    fn test_from_region_out_of_bounds() {
        let result = MemoryStreamReader::from_region(vec![0; 4], 2, 3);
        assert!(matches!(result, Err(Error::LabelOutOfBounds { .. })));
    }

    #[test]
    fn test_goto_and_current() {
        let mut r = reader(&[0, 1, 2, 3, 4, 5]);
        r.goto(Label::new(4)).unwrap();
        assert_eq!(r.current(), Label::new(4));
        assert_eq!(r.read_u8().unwrap(), 4);

        // Jumping to the end is allowed, reading there is not.
        r.goto(Label::new(6)).unwrap();
        assert!(r.read_u8().is_err());

        let err = r.goto(Label::new(7)).unwrap_err();
        assert!(matches!(err, Error::LabelOutOfBounds { label: 7, length: 6 }));
    }

    #[test]
    fn test_skip() {
        let mut r = reader(&[0, 1, 2, 3]);
        r.skip(3).unwrap();
        assert_eq!(r.read_u8().unwrap(), 3);

        r.goto(Label::ZERO).unwrap();
        assert!(r.skip(4).is_ok());
        assert!(r.skip(1).is_err());
    }

    #[test]
    fn test_read_null_and_empty_string() {
        let mut bytes = (-1i32).to_le_bytes().to_vec();
        bytes.extend_from_slice(&0i32.to_le_bytes());
        let mut r = reader(&bytes);
        assert_eq!(r.read_string().unwrap(), None);
        assert_eq!(r.read_string().unwrap(), Some(String::new()));
    }

    #[test]
    fn test_read_string_multibyte_units() {
        // "é€" = 0x00E9, 0x20AC
        let mut bytes = 2i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0xC3, 0xA9, 0xE2, 0x82, 0xAC]);
        let mut r = reader(&bytes);
        assert_eq!(r.read_string().unwrap().as_deref(), Some("é€"));
    }

    #[test]
    fn test_read_string_rejects_bad_length() {
        let mut r = reader(&(-2i32).to_le_bytes());
        assert!(matches!(
            r.read_string(),
            Err(Error::InvalidStringLength { length: -2 })
        ));
    }

    #[test]
    fn test_read_string_truncated_payload() {
        let mut bytes = 3i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"ab");
        let mut r = reader(&bytes);
        assert!(r.read_string().unwrap_err().is_end_of_stream());
    }

    #[test]
    fn test_read_string_lone_surrogate() {
        let mut bytes = 1i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0xED, 0xA0, 0xBD]);

        let mut r = reader(&bytes);
        assert!(matches!(
            r.read_string(),
            Err(Error::InvalidString { offset: 0 })
        ));

        let mut r = reader(&bytes);
        assert_eq!(r.read_utf16().unwrap(), Some(vec![0xD83D]));
    }

    #[test]
    fn test_goto_suffix_label() {
        // payload, root at 2, trailer pointing at it
        let mut bytes = vec![0xEE, 0xEE, 0x2A, 0, 0, 0];
        bytes.extend_from_slice(&2u32.to_le_bytes());
        let mut r = reader(&bytes);
        r.goto_suffix_label().unwrap();
        assert_eq!(r.current(), Label::new(2));
        assert_eq!(r.read_i32().unwrap(), 42);
    }

    #[test]
    fn test_goto_suffix_label_short_stream() {
        let mut r = reader(&[1, 2]);
        assert!(r.goto_suffix_label().is_err());
    }

    #[test]
    fn test_window_accessors() {
        let mut r = reader(&[1, 2, 3, 4]);
        r.read_i16().unwrap();
        let window = r.window();
        assert_eq!(window.position(), 2);
        assert_eq!(window.end(), 4);
        assert_eq!(window.origin(), 0);
        assert_eq!(window.available(), 2);
        assert_eq!(window.capacity(), 4);
        assert_eq!(r.as_bytes(), &[1, 2, 3, 4]);
    }
}
