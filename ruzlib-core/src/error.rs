//! Error types for ruzlib operations.
//!
//! This module provides the error type shared by the DEFLATE codec and the
//! zlib stream wrapper, plus the numeric return codes that the classic zlib
//! API exposes to callers.

use std::io;
use thiserror::Error;

/// The main error type for ruzlib operations.
#[derive(Debug, Error)]
pub enum ZlibError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid stream or block header.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Corrupted compressed data.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Invalid Huffman code encountered during decompression.
    #[error("Invalid Huffman code at bit position {bit_position}")]
    InvalidHuffmanCode {
        /// Bit position where the invalid code was found.
        bit_position: u64,
    },

    /// Invalid distance in an LZ77 back-reference.
    #[error("Invalid back-reference distance: {distance} exceeds history size {history_size}")]
    InvalidDistance {
        /// The invalid distance value.
        distance: usize,
        /// Current history buffer size.
        history_size: usize,
    },

    /// Adler-32 checksum mismatch.
    #[error("Checksum mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// Checksum value stored in the stream.
        expected: u32,
        /// Checksum value computed from the data.
        computed: u32,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input: expected {expected} more bytes")]
    UnexpectedEof {
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// Invalid parameter or misuse of the streaming API.
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Description of the parameter error.
        message: String,
    },
}

/// Result type alias for ruzlib operations.
pub type Result<T> = std::result::Result<T, ZlibError>;

/// Numeric return codes of the classic zlib API.
///
/// Streaming calls in this crate report recoverable exhaustion through
/// status enums and reserve `Err` for real failures, but callers that speak
/// the traditional integer protocol can map both views through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ReturnCode {
    /// Operation succeeded.
    Ok = 0,
    /// The end of the stream was reached.
    StreamEnd = 1,
    /// A preset dictionary is required to continue.
    NeedDict = 2,
    /// File or OS level error.
    Errno = -1,
    /// Inconsistent stream state or invalid parameter.
    StreamError = -2,
    /// The input data was corrupted.
    DataError = -3,
    /// Not enough memory.
    MemError = -4,
    /// No progress was possible; provide more input or output space.
    BufError = -5,
    /// Incompatible library version.
    VersionError = -6,
}

impl ZlibError {
    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(bit_position: u64) -> Self {
        Self::InvalidHuffmanCode { bit_position }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, history_size: usize) -> Self {
        Self::InvalidDistance {
            distance,
            history_size,
        }
    }

    /// Create a checksum mismatch error.
    pub fn checksum_mismatch(expected: u32, computed: u32) -> Self {
        Self::ChecksumMismatch { expected, computed }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(expected: usize) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Whether this error means the input ran out mid-element.
    ///
    /// Streaming decoders treat this as "wait for more input" rather than
    /// a fatal condition.
    pub fn is_unexpected_eof(&self) -> bool {
        matches!(self, Self::UnexpectedEof { .. })
    }

    /// The numeric code the classic zlib API would report for this error.
    pub fn return_code(&self) -> ReturnCode {
        match self {
            Self::Io(_) => ReturnCode::Errno,
            Self::InvalidParameter { .. } => ReturnCode::StreamError,
            Self::UnexpectedEof { .. } => ReturnCode::BufError,
            Self::InvalidHeader { .. }
            | Self::CorruptedData { .. }
            | Self::InvalidHuffmanCode { .. }
            | Self::InvalidDistance { .. }
            | Self::ChecksumMismatch { .. } => ReturnCode::DataError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ZlibError::invalid_header("unsupported compression method");
        assert!(err.to_string().contains("Invalid header"));

        let err = ZlibError::checksum_mismatch(0x12345678, 0xDEADBEEF);
        assert!(err.to_string().contains("0x12345678"));

        let err = ZlibError::invalid_distance(40000, 1024);
        assert!(err.to_string().contains("40000"));
    }

    #[test]
    fn test_return_codes() {
        assert_eq!(ReturnCode::Ok as i32, 0);
        assert_eq!(ReturnCode::StreamEnd as i32, 1);
        assert_eq!(ReturnCode::NeedDict as i32, 2);
        assert_eq!(ReturnCode::StreamError as i32, -2);
        assert_eq!(ReturnCode::DataError as i32, -3);
        assert_eq!(ReturnCode::BufError as i32, -5);

        assert_eq!(
            ZlibError::unexpected_eof(4).return_code(),
            ReturnCode::BufError
        );
        assert_eq!(
            ZlibError::corrupted(0, "bad block").return_code(),
            ReturnCode::DataError
        );
        assert_eq!(
            ZlibError::invalid_parameter("level").return_code(),
            ReturnCode::StreamError
        );
    }

    #[test]
    fn test_eof_is_recoverable() {
        assert!(ZlibError::unexpected_eof(1).is_unexpected_eof());
        assert!(!ZlibError::invalid_huffman(17).is_unexpected_eof());
    }
}
