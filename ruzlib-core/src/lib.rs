//! # ruzlib Core
//!
//! Core components for the ruzlib compression library.
//!
//! This crate provides the fundamental building blocks shared by the DEFLATE
//! codec and the zlib stream wrapper:
//!
//! - [`bitstream`]: LSB-first bit-level I/O for variable-length codes
//! - [`window`]: 32 KiB sliding window for LZ77 back-references
//! - [`traits`]: Streaming compression/decompression traits
//! - [`error`]: Error types and zlib return codes
//!
//! ## Architecture
//!
//! ruzlib is layered the way RFC 1950 wraps RFC 1951:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ zlib stream (RFC 1950)                       │
//! │     header, preset dictionary, Adler-32      │
//! ├──────────────────────────────────────────────┤
//! │ DEFLATE codec (RFC 1951)                     │
//! │     LZ77 + canonical Huffman block coding    │
//! ├──────────────────────────────────────────────┤
//! │ this crate                                   │
//! │     BitReader/BitWriter, Window, traits      │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use ruzlib_core::bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b101, 3);
//! writer.write_bits(0x1F, 5);
//! let bytes = writer.finish();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(5).unwrap(), 0x1F);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod error;
pub mod traits;
pub mod window;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use error::{Result, ReturnCode, ZlibError};
pub use traits::{
    CompressStatus, CompressionLevel, Compressor, DecompressStatus, Decompressor, FlushMode,
};
pub use window::{DEFLATE_WINDOW_SIZE, Window};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitReader, BitWriter};
    pub use crate::error::{Result, ReturnCode, ZlibError};
    pub use crate::traits::{
        CompressStatus, CompressionLevel, Compressor, DecompressStatus, Decompressor, FlushMode,
    };
    pub use crate::window::Window;
}
