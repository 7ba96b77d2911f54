//! Sliding window history for LZ77 back-references.
//!
//! A decoder keeps the most recent output bytes so that `<length, distance>`
//! pairs can be resolved against them. DEFLATE's window is 32 KiB; a preset
//! dictionary simply preloads the window before the first byte of output.

use crate::error::{Result, ZlibError};

/// DEFLATE's window size in bytes (and its maximum back-reference distance).
pub const DEFLATE_WINDOW_SIZE: usize = 32768;

/// A power-of-two ring buffer holding the most recent output bytes.
#[derive(Debug, Clone)]
pub struct Window {
    buffer: Vec<u8>,
    /// Next write position.
    pos: usize,
    /// Bytes written so far, saturating at the capacity.
    filled: usize,
    mask: usize,
}

impl Window {
    /// Create a window with the given capacity (must be a power of two).
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity.is_power_of_two(),
            "window capacity must be a power of two"
        );
        Self {
            buffer: vec![0; capacity],
            pos: 0,
            filled: 0,
            mask: capacity - 1,
        }
    }

    /// Create a 32 KiB window as used by DEFLATE.
    pub fn deflate() -> Self {
        Self::new(DEFLATE_WINDOW_SIZE)
    }

    /// Number of history bytes currently available.
    pub fn len(&self) -> usize {
        self.filled
    }

    /// Whether the window holds no history yet.
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Total capacity of the window.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Record a single output byte.
    pub fn push(&mut self, byte: u8) {
        self.buffer[self.pos] = byte;
        self.pos = (self.pos + 1) & self.mask;
        if self.filled < self.buffer.len() {
            self.filled += 1;
        }
    }

    /// Record a run of output bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push(byte);
        }
    }

    /// Read the byte `distance` positions back (1 = most recent).
    pub fn byte_at(&self, distance: usize) -> Result<u8> {
        if distance == 0 || distance > self.filled {
            return Err(ZlibError::invalid_distance(distance, self.filled));
        }
        Ok(self.buffer[(self.pos.wrapping_sub(distance)) & self.mask])
    }

    /// Resolve a `<length, distance>` back-reference.
    ///
    /// Each copied byte is appended to both the window and `out`, byte by
    /// byte, so a match that overlaps its own output (distance < length)
    /// replicates the just-written bytes exactly as RFC 1951 requires.
    pub fn copy_match(&mut self, distance: usize, length: usize, out: &mut Vec<u8>) -> Result<()> {
        if distance == 0 || distance > self.filled {
            return Err(ZlibError::invalid_distance(distance, self.filled));
        }
        out.reserve(length);
        for _ in 0..length {
            let byte = self.buffer[(self.pos.wrapping_sub(distance)) & self.mask];
            self.push(byte);
            out.push(byte);
        }
        Ok(())
    }

    /// Preload the window with a preset dictionary.
    ///
    /// Only the final `capacity` bytes matter; anything older could never be
    /// reached by a valid distance.
    pub fn preload(&mut self, dictionary: &[u8]) {
        let start = dictionary.len().saturating_sub(self.buffer.len());
        self.extend(&dictionary[start..]);
    }

    /// Forget all history.
    pub fn clear(&mut self) {
        self.pos = 0;
        self.filled = 0;
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::deflate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_read_back() {
        let mut window = Window::new(16);
        window.extend(b"abcd");
        assert_eq!(window.len(), 4);
        assert_eq!(window.byte_at(1).unwrap(), b'd');
        assert_eq!(window.byte_at(4).unwrap(), b'a');
    }

    #[test]
    fn test_invalid_distances() {
        let mut window = Window::new(16);
        window.extend(b"abc");
        assert!(window.byte_at(0).is_err());
        assert!(window.byte_at(4).is_err());
    }

    #[test]
    fn test_copy_match_simple() {
        let mut window = Window::new(16);
        let mut out = Vec::new();
        window.extend(b"abc");
        window.copy_match(3, 3, &mut out).unwrap();
        assert_eq!(out, b"abc");
        assert_eq!(window.len(), 6);
    }

    #[test]
    fn test_copy_match_overlapping() {
        // "a" + <distance 1, length 5> expands to "aaaaaa".
        let mut window = Window::new(16);
        let mut out = Vec::new();
        window.push(b'a');
        window.copy_match(1, 5, &mut out).unwrap();
        assert_eq!(out, b"aaaaa");

        // "ab" + <distance 2, length 6> alternates.
        let mut window = Window::new(16);
        let mut out = Vec::new();
        window.extend(b"ab");
        window.copy_match(2, 6, &mut out).unwrap();
        assert_eq!(out, b"ababab");
    }

    #[test]
    fn test_copy_match_too_far() {
        let mut window = Window::new(16);
        let mut out = Vec::new();
        window.extend(b"ab");
        let err = window.copy_match(3, 1, &mut out).unwrap_err();
        assert!(matches!(err, ZlibError::InvalidDistance { .. }));
    }

    #[test]
    fn test_wraparound() {
        let mut window = Window::new(8);
        window.extend(b"0123456789");
        assert_eq!(window.len(), 8);
        assert_eq!(window.byte_at(1).unwrap(), b'9');
        assert_eq!(window.byte_at(8).unwrap(), b'2');
    }

    #[test]
    fn test_preload_truncates_to_capacity() {
        let mut window = Window::new(8);
        window.preload(b"0123456789ab");
        assert_eq!(window.len(), 8);
        assert_eq!(window.byte_at(8).unwrap(), b'4');
        assert_eq!(window.byte_at(1).unwrap(), b'b');
    }

    #[test]
    fn test_clear() {
        let mut window = Window::new(8);
        window.extend(b"abc");
        window.clear();
        assert!(window.is_empty());
        assert!(window.byte_at(1).is_err());
    }
}
