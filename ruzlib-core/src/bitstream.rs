//! Bit-level I/O for DEFLATE's variable-length codes.
//!
//! DEFLATE packs bits LSB-first: the first bit of the stream is the least
//! significant bit of the first byte. Huffman codes are written most
//! significant bit first, which is why encoders reverse code bits before
//! handing them to [`BitWriter::write_bits`].
//!
//! [`BitReader`] works over a borrowed byte slice and exposes its exact
//! position, so a streaming decoder can checkpoint before a decode element
//! and rewind when the slice ends mid-element.

use crate::error::{Result, ZlibError};

/// Reads bits LSB-first from a byte slice.
#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    byte_pos: usize,
    /// Bits of `data[byte_pos]` already consumed (0..8).
    bit_pos: u8,
}

impl<'a> BitReader<'a> {
    /// Create a new bit reader over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            bit_pos: 0,
        }
    }

    /// Read up to `count` bits (max 32), returning them in the low bits.
    ///
    /// Fails with [`ZlibError::UnexpectedEof`] if the slice runs out.
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        let (bits, got) = self.peek_up_to(count);
        if got < count {
            return Err(ZlibError::unexpected_eof(
                usize::from(count - got).div_ceil(8),
            ));
        }
        self.advance(count);
        Ok(bits)
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Peek at `count` bits (max 32) without consuming them.
    pub fn peek_bits(&self, count: u8) -> Result<u32> {
        let (bits, got) = self.peek_up_to(count);
        if got < count {
            return Err(ZlibError::unexpected_eof(
                usize::from(count - got).div_ceil(8),
            ));
        }
        Ok(bits)
    }

    /// Peek at up to `count` bits (max 32) without consuming them.
    ///
    /// Returns the bits gathered (zero-padded above what was available) and
    /// how many of them were actually present. Never fails; the caller
    /// decides whether a short read matters.
    pub fn peek_up_to(&self, count: u8) -> (u32, u8) {
        debug_assert!(count <= 32);
        let mut bits = 0u64;
        let mut got = 0u8;
        let mut byte = self.byte_pos;
        let mut used = self.bit_pos;

        while got < count && byte < self.data.len() {
            let take = (8 - used).min(count - got);
            let chunk = (self.data[byte] >> used) & low_mask(take);
            bits |= u64::from(chunk) << got;
            got += take;
            used += take;
            if used == 8 {
                used = 0;
                byte += 1;
            }
        }

        (bits as u32, got)
    }

    /// Skip `count` bits (max 32).
    pub fn skip_bits(&mut self, count: u8) -> Result<()> {
        let (_, got) = self.peek_up_to(count);
        if got < count {
            return Err(ZlibError::unexpected_eof(
                usize::from(count - got).div_ceil(8),
            ));
        }
        self.advance(count);
        Ok(())
    }

    /// Discard any partially consumed byte so the next read is byte-aligned.
    pub fn align_to_byte(&mut self) {
        if self.bit_pos != 0 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }
    }

    /// Whole bytes remaining. Only meaningful when byte-aligned.
    pub fn remaining_bytes(&self) -> usize {
        debug_assert_eq!(self.bit_pos, 0, "remaining_bytes requires alignment");
        self.data.len() - self.byte_pos
    }

    /// Take `count` whole bytes from the current (aligned) position.
    pub fn take_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        debug_assert_eq!(self.bit_pos, 0, "take_bytes requires alignment");
        let remaining = self.data.len() - self.byte_pos;
        if remaining < count {
            return Err(ZlibError::unexpected_eof(count - remaining));
        }
        let bytes = &self.data[self.byte_pos..self.byte_pos + count];
        self.byte_pos += count;
        Ok(bytes)
    }

    /// Current position as (whole bytes consumed, bits consumed of the next byte).
    pub fn position(&self) -> (usize, u8) {
        (self.byte_pos, self.bit_pos)
    }

    /// Rewind or seek to a position previously returned by [`Self::position`].
    pub fn seek(&mut self, position: (usize, u8)) {
        debug_assert!(position.0 <= self.data.len());
        debug_assert!(position.1 < 8);
        self.byte_pos = position.0;
        self.bit_pos = position.1;
    }

    /// Total bits consumed so far.
    pub fn bit_position(&self) -> u64 {
        self.byte_pos as u64 * 8 + u64::from(self.bit_pos)
    }

    fn advance(&mut self, count: u8) {
        let total = usize::from(self.bit_pos) + usize::from(count);
        self.byte_pos += total / 8;
        self.bit_pos = (total % 8) as u8;
    }
}

fn low_mask(bits: u8) -> u8 {
    debug_assert!(bits <= 8);
    if bits >= 8 { 0xFF } else { (1u8 << bits) - 1 }
}

/// Writes bits LSB-first into an owned byte buffer.
///
/// Completed bytes can be drained incrementally with [`Self::take_bytes`]
/// while a partial byte stays buffered, which lets a streaming encoder hand
/// out output without ever emitting a torn byte.
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_buffer: u64,
    bit_count: u8,
}

impl BitWriter {
    /// Create a new bit writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the low `count` bits of `value` (max 32).
    pub fn write_bits(&mut self, value: u32, count: u8) {
        debug_assert!(count <= 32);
        debug_assert!(count == 32 || value < (1u32 << count) || count == 0);
        self.bit_buffer |= u64::from(value) << self.bit_count;
        self.bit_count += count;
        while self.bit_count >= 8 {
            self.bytes.push(self.bit_buffer as u8);
            self.bit_buffer >>= 8;
            self.bit_count -= 8;
        }
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) {
        self.write_bits(u32::from(bit), 1);
    }

    /// Pad with zero bits up to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        if self.bit_count > 0 {
            self.write_bits(0, 8 - self.bit_count);
        }
    }

    /// Append whole bytes. The writer must be byte-aligned.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        debug_assert_eq!(self.bit_count, 0, "write_bytes requires alignment");
        self.bytes.extend_from_slice(bytes);
    }

    /// Whether no partial byte is buffered.
    pub fn is_aligned(&self) -> bool {
        self.bit_count == 0
    }

    /// Drain the completed bytes, leaving any partial byte buffered.
    pub fn take_bytes(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }

    /// Number of completed bytes currently buffered.
    pub fn pending_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Align to a byte boundary and return the full output.
    pub fn finish(mut self) -> Vec<u8> {
        self.align_to_byte();
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bits_lsb_first() {
        // 0xAB = 0b10101011, 0xCD = 0b11001101
        let data = [0xAB, 0xCD];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits(4).unwrap(), 0xB);
        assert_eq!(reader.read_bits(4).unwrap(), 0xA);
        assert_eq!(reader.read_bits(8).unwrap(), 0xCD);
    }

    #[test]
    fn test_read_across_byte_boundary() {
        let data = [0xFF, 0x00, 0x0F];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits(12).unwrap(), 0x0FF);
        assert_eq!(reader.read_bits(12).unwrap(), 0x0F0);
    }

    #[test]
    fn test_read_past_end() {
        let data = [0xAA];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(8).unwrap(), 0xAA);
        assert!(matches!(
            reader.read_bits(1),
            Err(ZlibError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_peek_up_to_short() {
        let data = [0b0000_0101];
        let reader = BitReader::new(&data);
        let (bits, got) = reader.peek_up_to(16);
        assert_eq!(got, 8);
        assert_eq!(bits, 0b0000_0101);
        // Peeking consumes nothing.
        assert_eq!(reader.bit_position(), 0);
    }

    #[test]
    fn test_checkpoint_and_seek() {
        let data = [0xAB, 0xCD];
        let mut reader = BitReader::new(&data);
        reader.read_bits(3).unwrap();
        let mark = reader.position();
        assert_eq!(reader.read_bits(7).unwrap(), 0b01_10101);
        reader.seek(mark);
        assert_eq!(reader.read_bits(7).unwrap(), 0b01_10101);
    }

    #[test]
    fn test_align_and_take_bytes() {
        let data = [0xFF, 0x11, 0x22, 0x33];
        let mut reader = BitReader::new(&data);
        reader.read_bits(3).unwrap();
        reader.align_to_byte();
        assert_eq!(reader.remaining_bytes(), 3);
        assert_eq!(reader.take_bytes(2).unwrap(), &[0x11, 0x22]);
        assert_eq!(reader.read_bits(8).unwrap(), 0x33);
    }

    #[test]
    fn test_align_when_already_aligned() {
        let data = [0x01, 0x02];
        let mut reader = BitReader::new(&data);
        reader.read_bits(8).unwrap();
        reader.align_to_byte();
        assert_eq!(reader.position(), (1, 0));
    }

    #[test]
    fn test_writer_round_trip() {
        let mut writer = BitWriter::new();
        writer.write_bits(0xB, 4);
        writer.write_bits(0xA, 4);
        writer.write_bits(0xCD, 8);
        let bytes = writer.finish();
        assert_eq!(bytes, vec![0xAB, 0xCD]);

        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_bits(4).unwrap(), 0xB);
        assert_eq!(reader.read_bits(4).unwrap(), 0xA);
        assert_eq!(reader.read_bits(8).unwrap(), 0xCD);
    }

    #[test]
    fn test_writer_partial_byte_stays_buffered() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3);
        assert_eq!(writer.take_bytes(), Vec::<u8>::new());
        writer.write_bits(0b11111, 5);
        assert_eq!(writer.take_bytes(), vec![0b11111_101]);
        assert!(writer.is_aligned());
    }

    #[test]
    fn test_writer_align_pads_with_zeros() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b1, 1);
        writer.align_to_byte();
        assert_eq!(writer.finish(), vec![0x01]);
    }

    #[test]
    fn test_writer_bytes_after_align() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3);
        writer.align_to_byte();
        writer.write_bytes(&[0xDE, 0xAD]);
        assert_eq!(writer.finish(), vec![0b101, 0xDE, 0xAD]);
    }

    #[test]
    fn test_write_32_bits() {
        let mut writer = BitWriter::new();
        writer.write_bits(0xDEAD_BEEF, 32);
        assert_eq!(writer.finish(), vec![0xEF, 0xBE, 0xAD, 0xDE]);
    }
}
