//! Address-stable windowed reader with zero-copy access.
//!
//! A [`PinnedBufferReader`] refills exactly like a
//! [`BufferedStreamReader`](crate::buffered::BufferedStreamReader), but its
//! buffer is allocated once and only ever rewritten in place. That lets it
//! hand out slices straight into the window instead of copying values out.

use crate::buffered::{SourceFill, allocate_window};
use crate::config::ReaderConfig;
use crate::error::{Error, Result};
use crate::label::Label;
use crate::reader::{FillStrategy, StreamReader, Window};
use crate::source::{ByteSource, SharedSource};
use std::fs::File;
use std::path::Path;

/// Fill strategy of [`PinnedBufferReader`].
///
/// Delegates to [`SourceFill`] and remembers where the window buffer lives
/// so every refill can check it was not moved.
#[derive(Debug)]
pub struct PinnedFill<S> {
    inner: SourceFill<S>,
    base: usize,
}

impl<S: ByteSource> PinnedFill<S> {
    #[inline(always)]
    fn check_pinned(&self, window: &Window) {
        debug_assert_eq!(
            window.bytes.as_ptr() as usize,
            self.base,
            "pinned window buffer was relocated"
        );
    }
}

impl<S: ByteSource> FillStrategy for PinnedFill<S> {
    fn fill(&mut self, window: &mut Window, minimum: usize) -> Result<()> {
        self.inner.fill(window, minimum)?;
        self.check_pinned(window);
        Ok(())
    }

    fn relocate(&mut self, window: &mut Window, label: Label) -> Result<()> {
        self.inner.relocate(window, label)
    }

    fn length(&self, window: &Window) -> Result<u64> {
        self.inner.length(window)
    }
}

/// Buffered reader whose window never moves in memory.
pub type PinnedBufferReader<S> = StreamReader<PinnedFill<S>>;

impl<S: ByteSource> StreamReader<PinnedFill<S>> {
    /// Creates a pinned reader that owns `source`, with the default configuration.
    ///
    /// # Errors
    /// Never fails with the default configuration.
    pub fn new(source: S) -> Result<Self> {
        Self::with_config(source, ReaderConfig::default())
    }

    /// Creates a pinned reader that owns `source`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if the configuration is rejected.
    pub fn with_config(source: S, config: ReaderConfig) -> Result<Self> {
        Self::from_shared(SharedSource::new(source), config)
    }

    /// Creates a pinned reader on a source shared with other readers.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if the configuration is rejected.
    pub fn from_shared(source: SharedSource<S>, config: ReaderConfig) -> Result<Self> {
        let window = allocate_window(&config)?;
        let base = window.bytes.as_ptr() as usize;
        Ok(Self::from_window(
            window,
            PinnedFill {
                inner: SourceFill::new(source, config.alignment),
                base,
            },
        ))
    }

    /// Number of bytes a single pointer request may cover.
    #[must_use]
    pub fn window_size(&self) -> usize {
        self.window.capacity() - self.strategy.inner.alignment()
    }

    /// Returns the shared source handle.
    #[must_use]
    pub fn source(&self) -> &SharedSource<S> {
        self.strategy.inner.source()
    }

    /// Returns the fixed address of the window buffer.
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.window.bytes.as_ptr()
    }

    /// Returns `len` bytes starting at the cursor, straight from the window.
    ///
    /// The cursor does not move; call [`StreamReader::skip`] to consume the
    /// bytes. The slice borrows the reader, so it cannot outlive the next
    /// read, seek or refill.
    ///
    /// # Errors
    /// Returns [`Error::WindowExceeded`] if `len` is larger than the window,
    /// or [`Error::EndOfStream`] if the source has fewer bytes left.
    pub fn get_pointer(&mut self, len: usize) -> Result<&[u8]> {
        let window_size = self.window_size();
        if len > window_size {
            return Err(Error::WindowExceeded {
                requested: len,
                window: window_size,
            });
        }
        self.ensure(len)?;
        self.strategy.check_pinned(&self.window);
        let start = self.window.position;
        Ok(&self.window.bytes[start..start + len])
    }

    /// Moves to `label` and returns `len` bytes from there.
    ///
    /// # Errors
    /// Same as [`StreamReader::get_pointer`].
    pub fn get_pointer_at(&mut self, label: Label, len: usize) -> Result<&[u8]> {
        self.goto(label)?;
        self.get_pointer(len)
    }

    /// Creates an independent reader over the same source.
    ///
    /// The clone has its own window and cursor (starting at offset 0) and
    /// the same window size and alignment. Refills from both readers are
    /// serialized on the shared source.
    ///
    /// # Errors
    /// Never fails for a reader built from a valid configuration.
    pub fn clone_reader(&self) -> Result<Self> {
        let config = ReaderConfig {
            window_size: self.window_size(),
            alignment: self.strategy.inner.alignment(),
        };
        let clone = Self::from_shared(self.source().clone(), config)?;
        tracing::debug!(
            "pinned reader cloned: {} readers share the source",
            clone.source().handle_count()
        );
        Ok(clone)
    }
}

impl StreamReader<PinnedFill<File>> {
    /// Opens a file for pinned reading.
    ///
    /// # Errors
    /// Returns IO error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, ReaderConfig::default())
    }

    /// Opens a file for pinned reading with the given configuration.
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
