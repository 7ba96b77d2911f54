//! # ruzlib Deflate
//!
//! Pure Rust implementation of DEFLATE (RFC 1951) and the zlib stream
//! format that wraps it (RFC 1950).
//!
//! ## Features
//!
//! - **Decompression**: all DEFLATE block types, fully resumable
//!   - Stored (uncompressed) blocks
//!   - Fixed Huffman codes
//!   - Dynamic Huffman codes
//!   - Input and output supplied in arbitrarily small chunks
//! - **Compression**: LZ77 + canonical Huffman encoding
//!   - Compression levels 0-9
//!   - Per-block choice of stored, fixed, or dynamic coding
//!   - Sync / full / partial flush points
//! - **zlib streams**: header validation, preset dictionaries, Adler-32
//!
//! ## Example
//!
//! ```rust
//! use ruzlib_deflate::{zlib_compress, zlib_decompress};
//!
//! let original = b"Hello, World! Hello, World!";
//! let compressed = zlib_compress(original, 6).unwrap();
//! let decompressed = zlib_decompress(&compressed).unwrap();
//! assert_eq!(&decompressed, original);
//! ```
//!
//! ## Compression Levels
//!
//! - Level 0: No compression (stored blocks)
//! - Level 1-3: Fast compression
//! - Level 4-6: Balanced (default is 6)
//! - Level 7-9: Best compression (slower)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod deflate;
pub mod huffman;
pub mod inflate;
pub mod lz77;
pub mod tables;
pub mod zlib;

// Re-exports
pub use deflate::{Deflater, deflate};
pub use huffman::{CanonicalCode, HuffmanBuilder, HuffmanTable};
pub use inflate::{Inflater, inflate};
pub use lz77::{Lz77Encoder, Lz77Token};
pub use zlib::{
    Adler32, ZlibDecoder, ZlibEncoder, zlib_compress, zlib_compress_with_dict, zlib_decompress,
    zlib_decompress_with_dict, zlib_dictionary_id,
};
