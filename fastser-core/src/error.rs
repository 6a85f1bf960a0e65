//! Error types for fastser stream operations.

use thiserror::Error;

/// Core error type for stream readers and writers.
#[derive(Debug, Error)]
pub enum Error {
    /// A read crossed the end of a fully resident buffer.
    #[error("read past end of buffer: position {position}, requested {requested} bytes, end {end}")]
    ReadPastEnd {
        /// Cursor position when the read was attempted.
        position: usize,
        /// Number of bytes the read required.
        requested: usize,
        /// Valid extent of the buffer.
        end: usize,
    },

    /// A label points outside a fully resident buffer.
    #[error("label {label:#x} out of bounds for stream of length {length}")]
    LabelOutOfBounds {
        /// Requested absolute offset.
        label: u32,
        /// Length of the stream in bytes.
        length: u64,
    },

    /// Stream length no longer fits in a 32-bit label.
    #[error("stream length {length} exceeds the 32-bit label address space")]
    AddressSpaceExceeded {
        /// Offending length in bytes.
        length: u64,
    },

    /// The write buffer cannot grow any further.
    #[error("out of capacity: buffer already at {capacity} bytes (limit {limit})")]
    OutOfCapacity {
        /// Current buffer capacity in bytes.
        capacity: usize,
        /// Hard capacity limit in bytes.
        limit: usize,
    },

    /// The underlying source ran out of data during a refill.
    #[error("read past end of stream at offset {offset}: required {required} bytes, available {available}")]
    EndOfStream {
        /// Absolute offset of the cursor.
        offset: u64,
        /// Number of bytes the caller required.
        required: usize,
        /// Number of bytes the source could supply.
        available: usize,
    },

    /// A pointer request is larger than the reader window.
    #[error("requested {requested} bytes exceeds window size {window}")]
    WindowExceeded {
        /// Requested length in bytes.
        requested: usize,
        /// Configured window size in bytes.
        window: usize,
    },

    /// A string length prefix is negative but not the null marker.
    #[error("invalid string length {length}")]
    InvalidStringLength {
        /// Decoded length prefix.
        length: i32,
    },

    /// Decoded code units do not form valid UTF-16.
    #[error("invalid string at offset {offset}: unpaired surrogate")]
    InvalidString {
        /// Absolute offset of the string's length prefix.
        offset: u64,
    },

    /// Construction parameters were rejected.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },

    /// IO error from a source or sink.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates an address space error for the given length.
    pub fn address_space(length: u64) -> Self {
        Self::AddressSpaceExceeded { length }
    }

    /// Returns true if the error was caused by running out of source data.
    #[must_use]
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::EndOfStream { .. } | Self::ReadPastEnd { .. })
    }
}

/// Result type alias for fastser stream operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_read_past_end() {
        let err = Error::ReadPastEnd {
            position: 10,
            requested: 4,
            end: 12,
        };
        let msg = err.to_string();
        assert!(msg.contains("read past end of buffer"));
        assert!(msg.contains("10"));
        assert!(msg.contains("12"));
    }

    #[test]
    fn test_error_display_label_hex() {
        let err = Error::LabelOutOfBounds {
            label: 0x40,
            length: 16,
        };
        assert!(err.to_string().contains("0x40"));
    }

    #[test]
    fn test_error_constructors() {
        let err = Error::invalid_config("alignment must be a power of two");
        assert!(matches!(err, Error::InvalidConfig { .. }));
        assert!(err.to_string().contains("power of two"));

        let err = Error::address_space(1 << 33);
        assert!(matches!(err, Error::AddressSpaceExceeded { length } if length == 1 << 33));
    }

    #[test]
    fn test_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().starts_with("IO error"));
    }

    #[test]
    fn test_is_end_of_stream() {
        let err = Error::EndOfStream {
            offset: 0,
            required: 4,
            available: 2,
        };
        assert!(err.is_end_of_stream());
        assert!(!Error::invalid_config("x").is_end_of_stream());
    }
}
