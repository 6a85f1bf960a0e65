//! # fastser
//!
//! Compact binary streams navigated by 32-bit labels.
//!
//! A writer records the [`Label`] of anything it will need to find again,
//! writes those labels into the stream itself and, when done, appends a
//! suffix label pointing at the root of the structure. A reader jumps to the
//! suffix label and follows labels from there.
//!
//! ## Quick Start
//!
//! ```
//! use fastser::prelude::*;
//!
//! let mut writer = MemoryStreamWriter::new();
//! let greeting = writer.get_label()?;
//! writer.write_string(Some("hello"))?;
//! writer.write_suffix_label(greeting)?;
//!
//! let mut reader = writer.into_reader();
//! reader.goto_suffix_label()?;
//! assert_eq!(reader.read_string()?.as_deref(), Some("hello"));
//! # Ok::<(), fastser::Error>(())
//! ```
//!
//! ## Readers and writers
//!
//! - [`MemoryStreamReader`] / [`MemoryStreamWriter`] work on a byte buffer
//! - [`BufferedStreamReader`] keeps an aligned window of a seekable source
//! - [`PinnedBufferReader`] adds zero-copy `get_pointer` access and cheap
//!   clones over one shared source
//! - [`BufferedStreamWriter`] flushes into a file or other sink
//!
//! ## Crate Organization
//!
//! - [`core`] - Labels, readers, writers, sources and sinks

pub mod prelude;

/// Stream readers, writers and their building blocks.
pub mod core {
    pub use fastser_core::*;
}

// Re-export commonly used items at the crate root
pub use fastser_core::{
    BufferedStreamReader, BufferedStreamWriter, Error, Label, MemoryStreamReader,
    MemoryStreamWriter, PinnedBufferReader, ReaderConfig, Result, WriterConfig,
};
