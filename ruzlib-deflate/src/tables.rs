//! DEFLATE code tables (RFC 1951 Sections 3.2.5-3.2.7).
//!
//! Length and distance symbols carry a base value plus a run of extra bits;
//! these tables map between the two representations. The fixed Huffman code
//! of Section 3.2.6 is also defined here, cached on first use.

use crate::huffman::{CanonicalCode, HuffmanTable};
use std::sync::OnceLock;

/// Length code base values for codes 257-285 (RFC 1951 Section 3.2.5).
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, // 257-264: 0 extra bits
    11, 13, 15, 17, // 265-268: 1 extra bit
    19, 23, 27, 31, // 269-272: 2 extra bits
    35, 43, 51, 59, // 273-276: 3 extra bits
    67, 83, 99, 115, // 277-280: 4 extra bits
    131, 163, 195, 227, // 281-284: 5 extra bits
    258, // 285: 0 extra bits (special case)
];

/// Number of extra bits for length codes 257-285.
pub const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, // 257-264
    1, 1, 1, 1, // 265-268
    2, 2, 2, 2, // 269-272
    3, 3, 3, 3, // 273-276
    4, 4, 4, 4, // 277-280
    5, 5, 5, 5, // 281-284
    0, // 285
];

/// Distance code base values for codes 0-29 (RFC 1951 Section 3.2.5).
pub const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, // 0-3: 0 extra bits
    5, 7, // 4-5: 1 extra bit
    9, 13, // 6-7: 2 extra bits
    17, 25, // 8-9: 3 extra bits
    33, 49, // 10-11: 4 extra bits
    65, 97, // 12-13: 5 extra bits
    129, 193, // 14-15: 6 extra bits
    257, 385, // 16-17: 7 extra bits
    513, 769, // 18-19: 8 extra bits
    1025, 1537, // 20-21: 9 extra bits
    2049, 3073, // 22-23: 10 extra bits
    4097, 6145, // 24-25: 11 extra bits
    8193, 12289, // 26-27: 12 extra bits
    16385, 24577, // 28-29: 13 extra bits
];

/// Number of extra bits for distance codes 0-29.
pub const DISTANCE_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Transmission order of code-length code lengths in a dynamic block header
/// (RFC 1951 Section 3.2.7).
pub const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Fixed literal/length code lengths (RFC 1951 Section 3.2.6).
///
/// - Symbols 0-143: 8 bits
/// - Symbols 144-255: 9 bits
/// - Symbols 256-279: 7 bits
/// - Symbols 280-287: 8 bits
pub fn fixed_litlen_lengths() -> [u8; 288] {
    let mut lengths = [8u8; 288];
    for len in &mut lengths[144..256] {
        *len = 9;
    }
    for len in &mut lengths[256..280] {
        *len = 7;
    }
    lengths
}

/// Fixed distance code lengths: all 30 codes use 5 bits.
pub fn fixed_distance_lengths() -> [u8; 30] {
    [5u8; 30]
}

/// The fixed literal/length decode table, cached after first construction.
pub fn fixed_litlen_table() -> &'static HuffmanTable {
    static TABLE: OnceLock<HuffmanTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        HuffmanTable::from_code_lengths(&fixed_litlen_lengths())
            .expect("fixed litlen table construction should never fail")
    })
}

/// The fixed distance decode table, cached after first construction.
pub fn fixed_distance_table() -> &'static HuffmanTable {
    static TABLE: OnceLock<HuffmanTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        HuffmanTable::from_code_lengths(&fixed_distance_lengths())
            .expect("fixed distance table construction should never fail")
    })
}

/// The fixed literal/length encoder code, cached after first construction.
pub fn fixed_litlen_code() -> &'static CanonicalCode {
    static CODE: OnceLock<CanonicalCode> = OnceLock::new();
    CODE.get_or_init(|| CanonicalCode::from_lengths(&fixed_litlen_lengths()))
}

/// The fixed distance encoder code, cached after first construction.
pub fn fixed_distance_code() -> &'static CanonicalCode {
    static CODE: OnceLock<CanonicalCode> = OnceLock::new();
    CODE.get_or_init(|| CanonicalCode::from_lengths(&fixed_distance_lengths()))
}

/// Map a match length (3-258) to `(code, extra_bits, extra_value)`.
pub fn length_to_code(length: u16) -> (u16, u8, u16) {
    debug_assert!((3..=258).contains(&length));
    if length == 258 {
        return (285, 0, 0);
    }
    let mut idx = 27;
    while LENGTH_BASE[idx] > length {
        idx -= 1;
    }
    (
        257 + idx as u16,
        LENGTH_EXTRA_BITS[idx],
        length - LENGTH_BASE[idx],
    )
}

/// Map a match distance (1-32768) to `(code, extra_bits, extra_value)`.
pub fn distance_to_code(distance: u16) -> (u16, u8, u16) {
    debug_assert!(distance >= 1);
    let mut idx = 29;
    while DISTANCE_BASE[idx] > distance {
        idx -= 1;
    }
    (
        idx as u16,
        DISTANCE_EXTRA_BITS[idx],
        distance - DISTANCE_BASE[idx],
    )
}

/// Reconstruct a match length from a length code (257-285) and its extra bits.
pub fn decode_length(code: u16, extra: u16) -> u16 {
    LENGTH_BASE[(code - 257) as usize] + extra
}

/// Reconstruct a match distance from a distance code (0-29) and its extra bits.
pub fn decode_distance(code: u16, extra: u16) -> u16 {
    DISTANCE_BASE[code as usize] + extra
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_codes_round_trip() {
        for length in 3..=258u16 {
            let (code, extra_bits, extra) = length_to_code(length);
            assert!((257..=285).contains(&code), "length {length} -> {code}");
            assert!(extra < (1 << extra_bits) || extra_bits == 0);
            assert_eq!(decode_length(code, extra), length);
        }
    }

    #[test]
    fn test_length_boundaries() {
        assert_eq!(length_to_code(3), (257, 0, 0));
        assert_eq!(length_to_code(10), (264, 0, 0));
        assert_eq!(length_to_code(11), (265, 1, 0));
        assert_eq!(length_to_code(12), (265, 1, 1));
        assert_eq!(length_to_code(257), (284, 5, 30));
        assert_eq!(length_to_code(258), (285, 0, 0));
    }

    #[test]
    fn test_distance_codes_round_trip() {
        for distance in 1..=32768u32 {
            let (code, extra_bits, extra) = distance_to_code(distance as u16);
            assert!(code < 30);
            assert!(extra < (1 << extra_bits) || extra_bits == 0);
            assert_eq!(u32::from(decode_distance(code, extra)), distance);
        }
    }

    #[test]
    fn test_distance_boundaries() {
        assert_eq!(distance_to_code(1), (0, 0, 0));
        assert_eq!(distance_to_code(4), (3, 0, 0));
        assert_eq!(distance_to_code(5), (4, 1, 0));
        assert_eq!(distance_to_code(24577), (29, 13, 0));
        assert_eq!(distance_to_code(32768), (29, 13, 8191));
    }

    #[test]
    fn test_fixed_lengths() {
        let litlen = fixed_litlen_lengths();
        assert_eq!(litlen[0], 8);
        assert_eq!(litlen[143], 8);
        assert_eq!(litlen[144], 9);
        assert_eq!(litlen[255], 9);
        assert_eq!(litlen[256], 7);
        assert_eq!(litlen[279], 7);
        assert_eq!(litlen[280], 8);
        assert_eq!(litlen[287], 8);

        assert!(fixed_distance_lengths().iter().all(|&l| l == 5));
    }

    #[test]
    fn test_fixed_tables_build() {
        assert_eq!(fixed_litlen_table().max_code_length(), 9);
        assert_eq!(fixed_distance_table().max_code_length(), 5);
    }
}
