//! Windowed reader over an external byte source.
//!
//! A [`BufferedStreamReader`] keeps `window_size + alignment` bytes of the
//! source in memory. The window start is always a multiple of the
//! alignment, so a value at an aligned stream offset also sits at an
//! aligned buffer index whatever refills happened before.

use crate::config::ReaderConfig;
use crate::error::{Error, Result};
use crate::label::Label;
use crate::reader::{FillStrategy, StreamReader, Window};
use crate::source::{ByteSource, SharedSource};
use std::fs::File;
use std::path::Path;

/// Fill strategy that slides and refills the window from a shared source.
#[derive(Debug)]
pub struct SourceFill<S> {
    source: SharedSource<S>,
    alignment: usize,
}

impl<S: ByteSource> SourceFill<S> {
    pub(crate) fn new(source: SharedSource<S>, alignment: usize) -> Self {
        Self { source, alignment }
    }

    /// Returns the shared source handle.
    #[must_use]
    pub fn source(&self) -> &SharedSource<S> {
        &self.source
    }

    /// Returns the alignment unit in bytes.
    #[must_use]
    pub const fn alignment(&self) -> usize {
        self.alignment
    }

    /// Shifts the unread tail to the front, keeping the origin aligned.
    fn slide(&self, window: &mut Window) -> Result<()> {
        let slide = window.position & !(self.alignment - 1);
        if slide == 0 {
            return Ok(());
        }
        window.origin = u32::try_from(slide)
            .ok()
            .and_then(|slide| window.origin.checked_add(slide))
            .ok_or_else(|| Error::address_space(u64::from(window.origin) + slide as u64))?;
        window.bytes.copy_within(slide..window.end, 0);
        window.end -= slide;
        window.position -= slide;
        Ok(())
    }

    /// Empties the window and re-anchors it around the absolute cursor.
    fn restart(&self, window: &mut Window, minimum: usize) -> Result<()> {
        let cursor = window.current();
        let source_len = self.source.len()?;
        if cursor + minimum as u64 > source_len {
            return Err(Error::EndOfStream {
                offset: cursor,
                required: minimum,
                available: source_len.saturating_sub(cursor) as usize,
            });
        }

        // Near the end of the source, back up so the window holds the whole
        // final block instead of a short unaligned tail.
        let align = self.alignment as i64;
        let last_block =
            (source_len as i64 - window.capacity() as i64 + align) & !(align - 1);
        let start = if last_block >= 0 && cursor >= last_block as u64 {
            last_block as u64
        } else {
            cursor & !(self.alignment as u64 - 1)
        };

        window.origin = Label::try_from(start)?.offset();
        window.end = 0;
        window.position = (cursor - start) as usize;
        Ok(())
    }
}

impl<S: ByteSource> FillStrategy for SourceFill<S> {
    fn fill(&mut self, window: &mut Window, minimum: usize) -> Result<()> {
        // Every buffered byte must stay addressable by a label.
        let wanted = window.current() + minimum as u64;
        if wanted > u64::from(u32::MAX) {
            return Err(Error::address_space(wanted));
        }

        if window.end != window.position {
            self.slide(window)?;
        } else {
            self.restart(window, minimum)?;
        }
        debug_assert_eq!(window.origin as usize % self.alignment, 0);

        let offset = u64::from(window.origin) + window.end as u64;
        let room = (window.bytes.len() - window.end)
            .min(usize::try_from(u64::from(u32::MAX) - offset).unwrap_or(usize::MAX));
        let read = self
            .source
            .read_at(offset, &mut window.bytes[window.end..window.end + room])?;
        window.end += read;
        tracing::trace!(
            "window refilled: origin {:#x}, {} bytes read, {} valid",
            window.origin,
            read,
            window.end
        );

        let available = window.available();
        if available < minimum {
            return Err(Error::EndOfStream {
                offset: window.current(),
                required: minimum,
                available,
            });
        }
        Ok(())
    }

    fn relocate(&mut self, window: &mut Window, label: Label) -> Result<()> {
        window.invalidate(label.offset());
        Ok(())
    }

    fn length(&self, _window: &Window) -> Result<u64> {
        Ok(self.source.len()?)
    }
}

/// Reader over a seekable source, seen through a refilling window.
pub type BufferedStreamReader<S> = StreamReader<SourceFill<S>>;

/// Allocates the window buffer once; it is never resized afterwards.
pub(crate) fn allocate_window(config: &ReaderConfig) -> Result<Window> {
    config.validate()?;
    Ok(Window::new(vec![0u8; config.buffer_len()], 0, 0))
}

impl<S: ByteSource> StreamReader<SourceFill<S>> {
    /// Creates a reader that owns `source`, with the default configuration.
    ///
    /// Pass `&mut source` instead to leave the source open after the
    /// reader is dropped.
    ///
    /// # Errors
    /// Never fails with the default configuration.
    pub fn new(source: S) -> Result<Self> {
        Self::with_config(source, ReaderConfig::default())
    }

    /// Creates a reader that owns `source`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if the configuration is rejected.
    pub fn with_config(source: S, config: ReaderConfig) -> Result<Self> {
        Self::from_shared(SharedSource::new(source), config)
    }

    /// Creates a reader on a source shared with other readers.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if the configuration is rejected.
    pub fn from_shared(source: SharedSource<S>, config: ReaderConfig) -> Result<Self> {
        let window = allocate_window(&config)?;
        tracing::debug!(
            "buffered reader created: window {} bytes, alignment {}",
            config.window_size,
            config.alignment
        );
        Ok(Self::from_window(
            window,
            SourceFill::new(source, config.alignment),
        ))
    }

    /// Returns the shared source handle.
    #[must_use]
    pub fn source(&self) -> &SharedSource<S> {
        self.strategy.source()
    }
}

impl StreamReader<SourceFill<File>> {
    /// Opens a file for buffered reading.
    ///
    /// # Errors
    /// Returns IO error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, ReaderConfig::default())
    }

    /// Opens a file for buffered reading with the given configuration.
    ///
    /// # Errors
    /// Returns IO error if the file cannot be opened, or
    /// [`Error::InvalidConfig`] if the configuration is rejected.
    pub fn open_with_config(path: impl AsRef<Path>, config: ReaderConfig) -> Result<Self> {
        config.validate()?;
        let file = File::open(path)?;
        Self::with_config(file, config)
    }
}
