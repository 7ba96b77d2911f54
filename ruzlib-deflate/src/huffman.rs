//! Canonical Huffman coding for DEFLATE (RFC 1951 Section 3.2.2).
//!
//! DEFLATE transmits only code *lengths*; both sides reconstruct the same
//! codes by assigning values in order of (length, symbol). Within a code the
//! bits appear on the wire most significant first, so every code is
//! bit-reversed before use with the LSB-first bitstream.
//!
//! Decoding uses a flat table of `2^max_len` entries: the next `max_len`
//! bits of input index the table directly, and each entry says which symbol
//! was coded and how many of the peeked bits it actually used. Entries whose
//! prefix matches no code hold a consumed-bits value of zero.

use ruzlib_core::bitstream::{BitReader, BitWriter};
use ruzlib_core::error::{Result, ZlibError};

/// Longest code length DEFLATE allows for literal/length and distance codes.
pub const MAX_CODE_LENGTH: u8 = 15;

/// Longest code length allowed for the code-length alphabet.
pub const MAX_CODELEN_LENGTH: u8 = 7;

/// Number of literal/length symbols an encoder can use (256 literals,
/// end-of-block, 29 length codes).
pub const LITLEN_SYMBOLS: usize = 286;

/// Number of distance symbols.
pub const DISTANCE_SYMBOLS: usize = 30;

/// Number of symbols in the code-length alphabet.
pub const CODELEN_SYMBOLS: usize = 19;

/// The end-of-block symbol.
pub const END_OF_BLOCK: u16 = 256;

/// Reverse the low `len` bits of `code`.
fn reverse_bits(code: u16, len: u8) -> u16 {
    code.reverse_bits() >> (16 - len)
}

/// Assign canonical codes to a set of code lengths.
///
/// Returns `(codes, max_len)` where `codes[symbol]` is the canonical code
/// value (not yet bit-reversed). Fails if any length exceeds
/// [`MAX_CODE_LENGTH`] or the lengths oversubscribe the code space.
fn assign_codes(lengths: &[u8]) -> Result<(Vec<u16>, u8)> {
    let mut bl_count = [0u32; MAX_CODE_LENGTH as usize + 1];
    let mut max_len = 0u8;
    for &len in lengths {
        if len > MAX_CODE_LENGTH {
            return Err(ZlibError::invalid_header(format!(
                "code length {len} exceeds 15"
            )));
        }
        bl_count[len as usize] += 1;
        max_len = max_len.max(len);
    }

    if max_len == 0 {
        return Ok((vec![0; lengths.len()], 0));
    }

    // Kraft check: the lengths must not claim more codes than exist.
    let mut available = 1i64;
    for count in &bl_count[1..=max_len as usize] {
        available = (available << 1) - i64::from(*count);
        if available < 0 {
            return Err(ZlibError::invalid_header(
                "oversubscribed Huffman code lengths",
            ));
        }
    }

    // Zero-length entries mean "symbol unused" and claim no code space.
    bl_count[0] = 0;
    let mut next_code = [0u16; MAX_CODE_LENGTH as usize + 1];
    let mut code = 0u16;
    for len in 1..=max_len as usize {
        code = (code + bl_count[len - 1] as u16) << 1;
        next_code[len] = code;
    }

    let mut codes = vec![0u16; lengths.len()];
    for (symbol, &len) in lengths.iter().enumerate() {
        if len > 0 {
            codes[symbol] = next_code[len as usize];
            next_code[len as usize] += 1;
        }
    }

    Ok((codes, max_len))
}

/// A flat Huffman decode table.
#[derive(Debug, Clone)]
pub struct HuffmanTable {
    /// Indexed by the next `max_len` input bits (LSB-first); each entry is
    /// `(consumed_bits, symbol)`, with `consumed_bits == 0` marking a prefix
    /// that matches no code.
    lookup: Vec<(u8, u16)>,
    max_len: u8,
}

impl HuffmanTable {
    /// Build a decode table from canonical code lengths.
    ///
    /// Incomplete codes are accepted; their unreachable prefixes decode as
    /// errors. Oversubscribed lengths are rejected.
    pub fn from_code_lengths(lengths: &[u8]) -> Result<Self> {
        let (codes, max_len) = assign_codes(lengths)?;
        if max_len == 0 {
            return Ok(Self {
                lookup: Vec::new(),
                max_len: 0,
            });
        }

        let mut lookup = vec![(0u8, 0u16); 1usize << max_len];
        for (symbol, &len) in lengths.iter().enumerate() {
            if len == 0 {
                continue;
            }
            // A code of length L occupies every table slot whose low L bits
            // equal the reversed code.
            let reversed = reverse_bits(codes[symbol], len) as usize;
            let step = 1usize << len;
            let mut index = reversed;
            while index < lookup.len() {
                lookup[index] = (len, symbol as u16);
                index += step;
            }
        }

        Ok(Self { lookup, max_len })
    }

    /// Decode one symbol from the reader.
    ///
    /// Reports [`ZlibError::UnexpectedEof`] when the input ends before the
    /// code completes, and [`ZlibError::InvalidHuffmanCode`] when the bits
    /// match no code.
    pub fn decode(&self, reader: &mut BitReader<'_>) -> Result<u16> {
        if self.max_len == 0 {
            return Err(ZlibError::invalid_huffman(reader.bit_position()));
        }
        let (bits, available) = reader.peek_up_to(self.max_len);
        let (consumed, symbol) = self.lookup[bits as usize];
        if consumed == 0 || consumed > available {
            if available < self.max_len {
                // The zero padding may have truncated a valid code.
                return Err(ZlibError::unexpected_eof(1));
            }
            return Err(ZlibError::invalid_huffman(reader.bit_position()));
        }
        reader.skip_bits(consumed)?;
        Ok(symbol)
    }

    /// Longest code length in this table (0 for an empty table).
    pub fn max_code_length(&self) -> u8 {
        self.max_len
    }

    /// Whether the table contains no codes at all.
    pub fn is_empty(&self) -> bool {
        self.max_len == 0
    }
}

/// Encoder-side canonical codes: bit-reversed code values ready for
/// [`BitWriter::write_bits`].
#[derive(Debug, Clone)]
pub struct CanonicalCode {
    /// `(reversed code, length)` per symbol; length 0 means unused.
    codes: Vec<(u16, u8)>,
}

impl CanonicalCode {
    /// Build encoder codes from canonical code lengths.
    ///
    /// The lengths are expected to come from [`HuffmanBuilder`] or one of
    /// the fixed tables, so oversubscription is a programming error here.
    pub fn from_lengths(lengths: &[u8]) -> Self {
        let (codes, _) = assign_codes(lengths).expect("encoder code lengths must be consistent");
        let codes = codes
            .iter()
            .zip(lengths)
            .map(|(&code, &len)| (reverse_bits(code, len.max(1)), len))
            .collect();
        Self { codes }
    }

    /// Emit the code for `symbol`.
    pub fn emit(&self, writer: &mut BitWriter, symbol: u16) {
        let (code, len) = self.codes[symbol as usize];
        debug_assert!(len > 0, "emitting symbol {symbol} with no code");
        writer.write_bits(u32::from(code), len);
    }

    /// Code length of `symbol` in bits (0 if the symbol has no code).
    pub fn bit_length(&self, symbol: u16) -> u8 {
        self.codes[symbol as usize].1
    }
}

/// Collects symbol frequencies and derives length-limited code lengths.
///
/// Uses the package-merge algorithm, which yields optimal code lengths under
/// a maximum-length constraint and always satisfies the Kraft equality, so
/// the resulting code is complete and decodable.
#[derive(Debug, Clone)]
pub struct HuffmanBuilder {
    frequencies: Vec<u32>,
    max_length: u8,
}

impl HuffmanBuilder {
    /// Create a builder for `alphabet_size` symbols with codes limited to
    /// `max_length` bits.
    pub fn new(alphabet_size: usize, max_length: u8) -> Self {
        debug_assert!(max_length >= 1);
        Self {
            frequencies: vec![0; alphabet_size],
            max_length,
        }
    }

    /// Count one occurrence of `symbol`.
    pub fn add(&mut self, symbol: u16) {
        self.frequencies[symbol as usize] += 1;
    }

    /// Count `count` occurrences of `symbol`.
    pub fn add_count(&mut self, symbol: u16, count: u32) {
        self.frequencies[symbol as usize] += count;
    }

    /// Compute code lengths for all symbols; unused symbols get length 0.
    pub fn build_lengths(&self) -> Vec<u8> {
        let mut lengths = vec![0u8; self.frequencies.len()];

        let leaves: Vec<(u32, u16)> = self
            .frequencies
            .iter()
            .enumerate()
            .filter(|&(_, &freq)| freq > 0)
            .map(|(symbol, &freq)| (freq, symbol as u16))
            .collect();

        match leaves.len() {
            0 => return lengths,
            1 => {
                // A one-symbol alphabet still needs one bit on the wire.
                lengths[leaves[0].1 as usize] = 1;
                return lengths;
            }
            _ => {}
        }

        // Package-merge: repeatedly pair up the cheapest items, merging the
        // pairs back into the leaf list. After max_length rounds, each
        // appearance of a leaf among the first 2n-2 items adds one bit to
        // its code length.
        let mut sorted = leaves.clone();
        sorted.sort_unstable();
        let singletons: Vec<(u64, Vec<u16>)> = sorted
            .iter()
            .map(|&(freq, symbol)| (u64::from(freq), vec![symbol]))
            .collect();

        let mut items: Vec<(u64, Vec<u16>)> = Vec::new();
        for _ in 0..self.max_length {
            let mut packages: Vec<(u64, Vec<u16>)> = Vec::with_capacity(items.len() / 2);
            for pair in items.chunks_exact(2) {
                let mut symbols = pair[0].1.clone();
                symbols.extend_from_slice(&pair[1].1);
                packages.push((pair[0].0 + pair[1].0, symbols));
            }
            let mut merged = Vec::with_capacity(singletons.len() + packages.len());
            merged.extend(singletons.iter().cloned());
            merged.extend(packages);
            merged.sort_by_key(|item| item.0);
            items = merged;
        }

        for (_, symbols) in items.iter().take(2 * leaves.len() - 2) {
            for &symbol in symbols {
                lengths[symbol as usize] += 1;
            }
        }

        lengths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kraft_sum(lengths: &[u8]) -> f64 {
        lengths
            .iter()
            .filter(|&&len| len > 0)
            .map(|&len| 1.0 / f64::from(1u32 << len))
            .sum()
    }

    #[test]
    fn test_reverse_bits() {
        assert_eq!(reverse_bits(0b110, 3), 0b011);
        assert_eq!(reverse_bits(0b1, 1), 0b1);
        assert_eq!(reverse_bits(0b10000000, 8), 0b00000001);
    }

    #[test]
    fn test_canonical_assignment() {
        // RFC 1951's worked example: lengths (3,3,3,3,3,2,4,4) for ABCDEFGH.
        let lengths = [3u8, 3, 3, 3, 3, 2, 4, 4];
        let (codes, max_len) = assign_codes(&lengths).unwrap();
        assert_eq!(max_len, 4);
        assert_eq!(codes, vec![0b010, 0b011, 0b100, 0b101, 0b110, 0b00, 0b1110, 0b1111]);
    }

    #[test]
    fn test_decode_round_trip() {
        let lengths = [3u8, 3, 3, 3, 3, 2, 4, 4];
        let table = HuffmanTable::from_code_lengths(&lengths).unwrap();
        let code = CanonicalCode::from_lengths(&lengths);

        let symbols = [5u16, 0, 7, 6, 2, 5, 4];
        let mut writer = BitWriter::new();
        for &symbol in &symbols {
            code.emit(&mut writer, symbol);
        }
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        for &symbol in &symbols {
            assert_eq!(table.decode(&mut reader).unwrap(), symbol);
        }
    }

    #[test]
    fn test_oversubscribed_lengths_rejected() {
        // Three codes of length 1 cannot exist.
        assert!(HuffmanTable::from_code_lengths(&[1, 1, 1]).is_err());
        assert!(HuffmanTable::from_code_lengths(&[2, 2, 2, 2, 1]).is_err());
    }

    #[test]
    fn test_incomplete_code_invalid_prefix() {
        // Single length-2 code: three of the four 2-bit prefixes are invalid.
        let table = HuffmanTable::from_code_lengths(&[2]).unwrap();
        let data = [0b0000_0000];
        let mut reader = BitReader::new(&data);
        assert_eq!(table.decode(&mut reader).unwrap(), 0);

        let data = [0b0000_0011];
        let mut reader = BitReader::new(&data);
        assert!(matches!(
            table.decode(&mut reader),
            Err(ZlibError::InvalidHuffmanCode { .. })
        ));
    }

    #[test]
    fn test_decode_truncated_input() {
        let lengths = [3u8, 3, 3, 3, 3, 2, 4, 4];
        let table = HuffmanTable::from_code_lengths(&lengths).unwrap();
        // Two bits of input cannot complete any 3-bit code.
        let code = CanonicalCode::from_lengths(&lengths);
        let mut writer = BitWriter::new();
        code.emit(&mut writer, 0);
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes[..0]);
        assert!(matches!(
            table.decode(&mut reader),
            Err(ZlibError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_empty_table() {
        let table = HuffmanTable::from_code_lengths(&[0, 0, 0]).unwrap();
        assert!(table.is_empty());
        let data = [0xFF];
        let mut reader = BitReader::new(&data);
        assert!(table.decode(&mut reader).is_err());
    }

    #[test]
    fn test_builder_balanced() {
        let mut builder = HuffmanBuilder::new(4, 15);
        for symbol in 0..4 {
            builder.add_count(symbol, 10);
        }
        let lengths = builder.build_lengths();
        assert_eq!(lengths, vec![2, 2, 2, 2]);
    }

    #[test]
    fn test_builder_skewed() {
        let mut builder = HuffmanBuilder::new(3, 15);
        builder.add_count(0, 1);
        builder.add_count(1, 1);
        builder.add_count(2, 4);
        let lengths = builder.build_lengths();
        assert_eq!(lengths, vec![2, 2, 1]);
    }

    #[test]
    fn test_builder_single_symbol() {
        let mut builder = HuffmanBuilder::new(10, 15);
        builder.add_count(7, 100);
        let lengths = builder.build_lengths();
        assert_eq!(lengths[7], 1);
        assert_eq!(lengths.iter().map(|&l| u32::from(l)).sum::<u32>(), 1);
    }

    #[test]
    fn test_builder_respects_length_limit() {
        // Fibonacci-like frequencies force long codes in an unconstrained
        // Huffman tree; the limit must cap them at 7 bits.
        let freqs = [1u32, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89, 144, 233, 377];
        let mut builder = HuffmanBuilder::new(freqs.len(), 7);
        for (symbol, &freq) in freqs.iter().enumerate() {
            builder.add_count(symbol as u16, freq);
        }
        let lengths = builder.build_lengths();
        assert!(lengths.iter().all(|&len| len > 0 && len <= 7));
        assert!((kraft_sum(&lengths) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_builder_lengths_are_kraft_exact() {
        let mut builder = HuffmanBuilder::new(LITLEN_SYMBOLS, MAX_CODE_LENGTH);
        for symbol in 0..256u16 {
            builder.add_count(symbol, u32::from(symbol) * 7 % 101 + 1);
        }
        builder.add(END_OF_BLOCK);
        let lengths = builder.build_lengths();
        assert!((kraft_sum(&lengths) - 1.0).abs() < 1e-9);
        // Builder output always round-trips through the decode table.
        assert!(HuffmanTable::from_code_lengths(&lengths).is_ok());
    }
}
