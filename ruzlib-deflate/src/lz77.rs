//! LZ77 match finding for DEFLATE compression.
//!
//! The encoder keeps a double-size buffer so matching never wraps: new input
//! is appended after the existing history, and when the buffer fills, the
//! most recent 32 KiB is slid back to the front. Candidate match positions
//! are found through a hash of the next three bytes; candidates at the same
//! hash are chained from newest to oldest, so the first match of a given
//! length is also the one with the smallest distance.

use ruzlib_core::window::DEFLATE_WINDOW_SIZE;

/// Maximum back-reference distance.
pub const WINDOW_SIZE: usize = DEFLATE_WINDOW_SIZE;

/// Minimum match length worth encoding.
pub const MIN_MATCH: usize = 3;

/// Maximum match length.
pub const MAX_MATCH: usize = 258;

/// Number of hash buckets (15 bits of the three-byte hash).
const HASH_SIZE: usize = 1 << 15;

const HASH_MASK: usize = HASH_SIZE - 1;

/// Hard cap on hash chain traversal at the highest level.
const MAX_CHAIN_LENGTH: usize = 4096;

/// Sentinel for an empty hash bucket or chain end.
const NO_POS: u32 = u32::MAX;

/// A single LZ77 token: either a literal byte or a back-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lz77Token {
    /// A literal byte.
    Literal(u8),
    /// A back-reference to earlier output.
    Match {
        /// Match length (3-258).
        length: u16,
        /// Distance back into the history (1-32768).
        distance: u16,
    },
}

/// Streaming LZ77 encoder with hash-chain match search.
#[derive(Debug)]
pub struct Lz77Encoder {
    /// Double-size buffer: history plus incoming data.
    window: Vec<u8>,
    /// End of valid data in `window`.
    window_pos: usize,
    /// Most recent position per hash bucket.
    head: Vec<u32>,
    /// Previous position with the same hash, indexed by position.
    chain: Vec<u32>,
    /// How many chain links to follow per search.
    max_chain: usize,
    /// Shortest match this level will accept.
    min_match: usize,
    /// Enable lazy matching.
    lazy_match: bool,
}

impl Lz77Encoder {
    /// Create a new LZ77 encoder with default settings.
    pub fn new() -> Self {
        Self::with_level(6)
    }

    /// Create a new LZ77 encoder tuned for the given compression level (0-9).
    pub fn with_level(level: u8) -> Self {
        let level = level.min(9);

        let (max_chain, min_match, lazy_match) = match level {
            0 => (0, MAX_MATCH + 1, false), // store only, matching disabled
            1 => (4, 4, false),
            2 => (8, 4, false),
            3 => (16, 4, false),
            4 => (32, 4, false),
            5 => (64, 4, true),
            6 => (128, 4, true),
            7 => (256, 3, true),
            8 => (1024, 3, true),
            9 => (MAX_CHAIN_LENGTH, 3, true),
            _ => unreachable!(),
        };

        Self {
            window: vec![0; WINDOW_SIZE * 2],
            window_pos: 0,
            head: vec![NO_POS; HASH_SIZE],
            chain: vec![NO_POS; WINDOW_SIZE * 2],
            max_chain,
            min_match,
            lazy_match,
        }
    }

    /// Reset the encoder state, forgetting all history.
    pub fn reset(&mut self) {
        self.window_pos = 0;
        self.head.fill(NO_POS);
        self.chain.fill(NO_POS);
    }

    /// Preload the window with a preset dictionary.
    ///
    /// Matches may then reference dictionary content from the first byte of
    /// input. Only the last 32 KiB of a longer dictionary is kept, since
    /// nothing beyond that is reachable by a valid distance.
    pub fn set_dictionary(&mut self, dictionary: &[u8]) {
        self.reset();

        let dict = if dictionary.len() > WINDOW_SIZE {
            &dictionary[dictionary.len() - WINDOW_SIZE..]
        } else {
            dictionary
        };

        self.window[..dict.len()].copy_from_slice(dict);
        self.window_pos = dict.len();
        for pos in 0..dict.len() {
            self.insert(pos, dict.len());
        }
    }

    /// Whether any history (dictionary or prior input) is loaded.
    pub fn has_history(&self) -> bool {
        self.window_pos > 0
    }

    /// Hash of the three bytes starting at `pos`.
    fn hash(window: &[u8], pos: usize) -> usize {
        let value = u32::from(window[pos])
            | u32::from(window[pos + 1]) << 8
            | u32::from(window[pos + 2]) << 16;
        (value.wrapping_mul(0x9E37_79B1) >> 17) as usize & HASH_MASK
    }

    /// Insert `pos` into its hash chain, if three bytes are available there.
    fn insert(&mut self, pos: usize, end: usize) {
        if pos + MIN_MATCH > end {
            return;
        }
        let hash = Self::hash(&self.window, pos);
        self.chain[pos] = self.head[hash];
        self.head[hash] = pos as u32;
    }

    /// Search the hash chain for the longest match at `pos`.
    ///
    /// Chains run newest-first and only a strictly longer match replaces the
    /// current best, so among equal-length matches the nearest one wins.
    fn find_match(&self, pos: usize, end: usize) -> Option<(u16, u16)> {
        let max_len = (end - pos).min(MAX_MATCH);
        if max_len < MIN_MATCH || self.max_chain == 0 {
            return None;
        }

        let min_pos = pos.saturating_sub(WINDOW_SIZE);
        let mut candidate = self.head[Self::hash(&self.window, pos)];
        let mut best_len = 0usize;
        let mut best_dist = 0usize;
        let mut depth = self.max_chain;

        while candidate != NO_POS && candidate as usize >= min_pos && depth > 0 {
            let match_pos = candidate as usize;
            if match_pos < pos {
                // Quick reject: a longer match must agree at best_len.
                let could_improve = best_len == 0
                    || (best_len < max_len
                        && self.window[match_pos + best_len] == self.window[pos + best_len]);
                if could_improve {
                    let mut len = 0;
                    while len < max_len && self.window[match_pos + len] == self.window[pos + len] {
                        len += 1;
                    }
                    if len > best_len {
                        best_len = len;
                        best_dist = pos - match_pos;
                        if len >= max_len {
                            break;
                        }
                    }
                }
            }
            candidate = self.chain[match_pos];
            depth -= 1;
        }

        if best_len >= self.min_match && best_len >= MIN_MATCH {
            Some((best_len as u16, best_dist as u16))
        } else {
            None
        }
    }

    /// Compress input data to LZ77 tokens.
    ///
    /// History persists across calls, so tokens may reference data from
    /// earlier invocations (or a preset dictionary).
    pub fn compress(&mut self, input: &[u8]) -> Vec<Lz77Token> {
        let mut tokens = Vec::with_capacity(input.len() / 2 + 1);
        let mut input_pos = 0;

        while input_pos < input.len() {
            if self.window_pos == self.window.len() {
                self.slide_window();
            }

            let chunk = (self.window.len() - self.window_pos).min(input.len() - input_pos);
            let start = self.window_pos;
            self.window[start..start + chunk]
                .copy_from_slice(&input[input_pos..input_pos + chunk]);
            let end = start + chunk;
            self.window_pos = end;
            input_pos += chunk;

            let mut pos = start;
            while pos < end {
                if let Some((length, distance)) = self.find_match(pos, end) {
                    self.insert(pos, end);

                    // Lazy matching: if the next position matches strictly
                    // longer, emit a literal here and take that match instead.
                    let defer = self.lazy_match
                        && (length as usize) < MAX_MATCH
                        && pos + 1 < end
                        && match self.find_match(pos + 1, end) {
                            Some((next_len, _)) => next_len > length,
                            None => false,
                        };

                    if defer {
                        tokens.push(Lz77Token::Literal(self.window[pos]));
                        pos += 1;
                    } else {
                        tokens.push(Lz77Token::Match { length, distance });
                        for p in pos + 1..pos + length as usize {
                            self.insert(p, end);
                        }
                        pos += length as usize;
                    }
                } else {
                    tokens.push(Lz77Token::Literal(self.window[pos]));
                    self.insert(pos, end);
                    pos += 1;
                }
            }
        }

        tokens
    }

    /// Slide the buffer so that exactly the last 32 KiB of history remains.
    fn slide_window(&mut self) {
        let shift = self.window_pos - WINDOW_SIZE;
        self.window.copy_within(shift..self.window_pos, 0);
        self.window_pos = WINDOW_SIZE;

        let adjust = |entry: u32| {
            if entry == NO_POS || (entry as usize) < shift {
                NO_POS
            } else {
                entry - shift as u32
            }
        };
        for entry in &mut self.head {
            *entry = adjust(*entry);
        }
        for i in 0..WINDOW_SIZE {
            self.chain[i] = adjust(self.chain[i + shift]);
        }
    }
}

impl Default for Lz77Encoder {
    fn default() -> Self {
        Self::new()
    }
}
