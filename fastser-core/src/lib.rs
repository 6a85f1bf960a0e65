//! # fastser Core
//!
//! Binary stream readers and writers addressed by 32-bit labels.
//!
//! This crate provides:
//! - [`Label`], the absolute byte offset every stream is navigated by
//! - Memory readers and writers over a contiguous byte buffer
//! - A windowed reader that refills aligned blocks from a seekable source
//! - A pinned reader handing out zero-copy slices of its window
//! - A writer that flushes into a file or any other sink
//! - Error and configuration types shared by all of them
//!
//! Values are little-endian. Strings carry an `i32` count of UTF-16 code
//! units (`-1` for null) followed by each unit in 1 to 3 bytes. A completed
//! stream ends with its suffix label, pointing at a root structure.

pub mod buffered;
pub mod chars;
pub mod config;
pub mod error;
pub mod flush;
pub mod label;
pub mod pinned;
pub mod reader;
pub mod source;
pub mod writer;

pub use buffered::{BufferedStreamReader, SourceFill};
pub use config::{ReaderConfig, WriterConfig};
pub use error::{Error, Result};
pub use flush::{BufferedStreamWriter, SinkFlush};
pub use label::Label;
pub use pinned::{PinnedBufferReader, PinnedFill};
pub use reader::{FillStrategy, MemoryStreamReader, Resident, StreamReader, Window};
pub use source::{ByteSink, ByteSource, SharedSource};
pub use writer::{Grow, MemoryStreamWriter, SpaceStrategy, StreamWriter};
