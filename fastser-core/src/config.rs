//! Construction parameters for buffered readers and writers.

use crate::error::{Error, Result};

/// Default read window size (16KB).
pub const DEFAULT_WINDOW_SIZE: usize = 0x4000;

/// Default window alignment in bytes.
pub const DEFAULT_ALIGNMENT: usize = 8;

/// Default write buffer size (8KB).
pub const DEFAULT_WRITE_BUFFER_SIZE: usize = 8 * 1024;

/// Configuration for buffered and pinned readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Number of source bytes held in memory at once.
    pub window_size: usize,
    /// Boundary the window start is rounded down to (power of 2).
    pub alignment: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            alignment: DEFAULT_ALIGNMENT,
        }
    }
}

impl ReaderConfig {
    /// Creates a configuration with the given window size and default alignment.
    #[must_use]
    pub const fn with_window_size(window_size: usize) -> Self {
        Self {
            window_size,
            alignment: DEFAULT_ALIGNMENT,
        }
    }

    /// Total buffer length backing the window (one extra alignment unit).
    #[must_use]
    pub const fn buffer_len(&self) -> usize {
        self.window_size + self.alignment
    }

    /// Checks the alignment and window size.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if the alignment is not a power of
    /// two, or the window is smaller than 8 bytes or not a multiple of the
    /// alignment.
    pub fn validate(&self) -> Result<()> {
        if !self.alignment.is_power_of_two() {
            return Err(Error::invalid_config(format!(
                "alignment {} is not a power of 2",
                self.alignment
            )));
        }
        if self.window_size < 8 {
            return Err(Error::invalid_config(format!(
                "window size {} is smaller than 8 bytes",
                self.window_size
            )));
        }
        if self.window_size % self.alignment != 0 {
            return Err(Error::invalid_config(format!(
                "window size {} is not a multiple of alignment {}",
                self.window_size, self.alignment
            )));
        }
        Ok(())
    }
}

/// Configuration for buffered writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterConfig {
    /// Size of the in-memory buffer flushed to the sink when full.
    pub buffer_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_WRITE_BUFFER_SIZE,
        }
    }
}

impl WriterConfig {
    /// Checks the buffer size.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if the buffer is smaller than 16 bytes.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size < 16 {
            return Err(Error::invalid_config(format!(
                "write buffer size {} is smaller than 16 bytes",
                self.buffer_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_config_default() {
        let config = ReaderConfig::default();
        assert_eq!(config.window_size, 16384);
        assert_eq!(config.alignment, 8);
        assert_eq!(config.buffer_len(), 16392);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reader_config_rejects_bad_alignment() {
        let config = ReaderConfig {
            window_size: 48,
            alignment: 6,
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_reader_config_rejects_unaligned_window() {
        let config = ReaderConfig {
            window_size: 20,
            alignment: 8,
        };
        assert!(config.validate().is_err());

        let config = ReaderConfig::with_window_size(4);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reader_config_non_power_of_two_window() {
        // Only the alignment has to be a power of two.
        let config = ReaderConfig::with_window_size(40);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_writer_config() {
        assert_eq!(WriterConfig::default().buffer_size, 8192);
        assert!(WriterConfig::default().validate().is_ok());
        assert!(WriterConfig { buffer_size: 8 }.validate().is_err());
    }
}
