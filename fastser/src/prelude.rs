//! Prelude module for convenient imports.
//!
//! ```
//! use fastser::prelude::*;
//! ```

// Labels and errors
pub use fastser_core::error::{Error, Result};
pub use fastser_core::label::Label;

// Readers
pub use fastser_core::buffered::BufferedStreamReader;
pub use fastser_core::pinned::PinnedBufferReader;
pub use fastser_core::reader::{MemoryStreamReader, StreamReader};

// Writers
pub use fastser_core::flush::BufferedStreamWriter;
pub use fastser_core::writer::{MemoryStreamWriter, StreamWriter};

// Configuration and I/O
pub use fastser_core::config::{ReaderConfig, WriterConfig};
pub use fastser_core::source::{ByteSink, ByteSource, SharedSource};
