//! Core traits for streaming compression and decompression.
//!
//! Both traits process data in chunks and report progress as a
//! `(consumed, produced, status)` triple. Recoverable exhaustion of input or
//! output space is a *status*, not an error; `Err` is reserved for corrupt
//! data and API misuse.

use crate::error::{Result, ZlibError};

/// Status of a streaming decompression operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressStatus {
    /// More input is needed to continue decompression.
    NeedsInput,
    /// More output buffer space is needed.
    NeedsOutput,
    /// A preset dictionary must be supplied before decompression can continue.
    NeedsDict,
    /// Decompression is complete.
    Done,
}

/// Status of a streaming compression operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressStatus {
    /// More input data can be accepted.
    NeedsInput,
    /// More output buffer space is needed.
    NeedsOutput,
    /// Compression is complete.
    Done,
}

/// Flush mode for compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// No flush - buffer data for best compression.
    #[default]
    None,
    /// Partial flush - emit pending output; the stream may stay bit-aligned.
    Partial,
    /// Sync flush - emit pending output and align to a byte boundary.
    Sync,
    /// Full flush - like sync, but also reset the match window so
    /// decompression can restart from this point.
    Full,
    /// Finish - complete the stream.
    Finish,
}

/// A streaming decompressor (decoder).
///
/// Implementations never fail just because a buffer ran out: they report
/// [`DecompressStatus::NeedsInput`] or [`DecompressStatus::NeedsOutput`] and
/// resume exactly where they stopped on the next call.
pub trait Decompressor {
    /// Decompress data from input to output.
    ///
    /// # Arguments
    ///
    /// * `input` - Input compressed data
    /// * `output` - Output buffer for decompressed data
    ///
    /// # Returns
    ///
    /// A tuple of (bytes consumed from input, bytes written to output, status)
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)>;

    /// Reset the decompressor to its initial state.
    fn reset(&mut self);

    /// Check if the decompressor has finished.
    fn is_finished(&self) -> bool;

    /// Decompress all data at once (convenience method).
    ///
    /// Truncated input and streams that demand a preset dictionary are
    /// errors here, since no further input can arrive.
    fn decompress_all(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut input_pos = 0;
        let mut buffer = vec![0u8; 32768];

        loop {
            let (consumed, produced, status) = self.decompress(&input[input_pos..], &mut buffer)?;

            input_pos += consumed;
            output.extend_from_slice(&buffer[..produced]);

            match status {
                DecompressStatus::Done => break,
                DecompressStatus::NeedsOutput => continue,
                DecompressStatus::NeedsDict => {
                    return Err(ZlibError::invalid_parameter(
                        "stream requires a preset dictionary",
                    ));
                }
                DecompressStatus::NeedsInput => {
                    if input_pos >= input.len() && produced == 0 {
                        return Err(ZlibError::unexpected_eof(1));
                    }
                }
            }
        }

        Ok(output)
    }
}

/// A streaming compressor (encoder).
pub trait Compressor {
    /// Compress data from input to output.
    ///
    /// # Arguments
    ///
    /// * `input` - Input data to compress
    /// * `output` - Output buffer for compressed data
    /// * `flush` - Flush mode
    ///
    /// # Returns
    ///
    /// A tuple of (bytes consumed from input, bytes written to output, status)
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, CompressStatus)>;

    /// Reset the compressor to its initial state.
    fn reset(&mut self);

    /// Check if the compressor has finished.
    fn is_finished(&self) -> bool;

    /// Compress all data at once (convenience method).
    fn compress_all(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut input_pos = 0;
        let mut buffer = vec![0u8; 32768];

        loop {
            let flush = if input_pos >= input.len() {
                FlushMode::Finish
            } else {
                FlushMode::None
            };

            let (consumed, produced, status) =
                self.compress(&input[input_pos..], &mut buffer, flush)?;

            input_pos += consumed;
            output.extend_from_slice(&buffer[..produced]);

            if status == CompressStatus::Done {
                break;
            }
        }

        Ok(output)
    }
}

/// Compression level (0-9, zlib's scale).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// No compression (stored blocks only).
    pub const NONE: Self = Self(0);
    /// Fastest compression.
    pub const FAST: Self = Self(1);
    /// Default compression (balanced).
    pub const DEFAULT: Self = Self(6);
    /// Best compression (slowest).
    pub const BEST: Self = Self(9);

    /// Create a custom compression level (0-9, clamped).
    pub fn new(level: u8) -> Self {
        Self(level.min(9))
    }

    /// Interpret a zlib-style level: -1 means "default", 0-9 are literal.
    ///
    /// Anything else is a stream error, matching zlib's parameter checks.
    pub fn from_zlib(level: i32) -> Result<Self> {
        match level {
            -1 => Ok(Self::DEFAULT),
            0..=9 => Ok(Self(level as u8)),
            _ => Err(ZlibError::invalid_parameter(format!(
                "compression level {level} out of range"
            ))),
        }
    }

    /// Get the level value.
    pub fn level(&self) -> u8 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u8> for CompressionLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}
