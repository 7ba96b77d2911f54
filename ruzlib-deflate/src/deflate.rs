//! DEFLATE compression (RFC 1951).
//!
//! The [`Deflater`] buffers input, turns it into LZ77 tokens, and emits one
//! of the three block types per flush point, whichever costs the fewest
//! bits: stored (BTYPE=00), fixed Huffman (BTYPE=01), or dynamic Huffman
//! (BTYPE=10). Compressed bytes accumulate internally and are drained into
//! the caller's buffer, so output space can be supplied incrementally.

use crate::huffman::{
    CanonicalCode, CODELEN_SYMBOLS, DISTANCE_SYMBOLS, END_OF_BLOCK, HuffmanBuilder,
    LITLEN_SYMBOLS, MAX_CODE_LENGTH, MAX_CODELEN_LENGTH,
};
use crate::lz77::{Lz77Encoder, Lz77Token};
use crate::tables::{
    CODE_LENGTH_ORDER, distance_to_code, fixed_distance_code, fixed_litlen_code, length_to_code,
};
use ruzlib_core::bitstream::BitWriter;
use ruzlib_core::error::{Result, ZlibError};
use ruzlib_core::traits::{CompressStatus, CompressionLevel, Compressor, FlushMode};

/// Maximum payload of a stored block.
const MAX_STORED_BLOCK: usize = 65535;

/// Accumulate this much input before emitting a block without being asked.
const BLOCK_THRESHOLD: usize = 1 << 18;

/// One step of a code-length RLE stream: `(symbol, extra_value, extra_bits)`.
type RleOp = (u8, u8, u8);

/// Streaming DEFLATE compressor.
#[derive(Debug)]
pub struct Deflater {
    lz77: Lz77Encoder,
    level: CompressionLevel,
    writer: BitWriter,
    pending_input: Vec<u8>,
    pending_output: Vec<u8>,
    output_pos: usize,
    finished: bool,
}

impl Deflater {
    /// Create a compressor with the given level.
    pub fn new(level: CompressionLevel) -> Self {
        Self {
            lz77: Lz77Encoder::with_level(level.level()),
            level,
            writer: BitWriter::new(),
            pending_input: Vec::new(),
            pending_output: Vec::new(),
            output_pos: 0,
            finished: false,
        }
    }

    /// Create a compressor whose window is preloaded with a dictionary.
    pub fn with_dictionary(level: CompressionLevel, dictionary: &[u8]) -> Self {
        let mut deflater = Self::new(level);
        deflater.lz77.set_dictionary(dictionary);
        deflater
    }

    /// Reset to a fresh stream, keeping the level.
    pub fn reset(&mut self) {
        self.lz77.reset();
        self.writer = BitWriter::new();
        self.pending_input.clear();
        self.pending_output.clear();
        self.output_pos = 0;
        self.finished = false;
    }

    /// Tokenize and emit everything buffered so far as one or more blocks.
    fn emit_blocks(&mut self, is_final: bool) -> Result<()> {
        let data = std::mem::take(&mut self.pending_input);
        if data.is_empty() && !is_final {
            return Ok(());
        }
        if self.level.level() == 0 {
            self.write_stored_blocks(&data, is_final);
        } else {
            let tokens = self.lz77.compress(&data);
            self.write_best_block(&data, &tokens, is_final)?;
        }
        Ok(())
    }

    /// Empty stored block; used as the sync flush marker.
    fn write_sync_marker(&mut self) {
        self.writer.write_bits(0, 1);
        self.writer.write_bits(0b00, 2);
        self.writer.align_to_byte();
        self.writer.write_bits(0, 16);
        self.writer.write_bits(0xFFFF, 16);
    }

    /// Empty fixed block; used as the partial flush marker. Ten bits, so
    /// the stream need not become byte-aligned.
    fn write_partial_marker(&mut self) {
        self.writer.write_bits(0, 1);
        self.writer.write_bits(0b01, 2);
        self.writer.write_bits(0, 7); // end-of-block in the fixed code
    }

    fn write_stored_blocks(&mut self, data: &[u8], is_final: bool) {
        if data.is_empty() {
            if is_final {
                self.writer.write_bits(1, 1);
                self.writer.write_bits(0b00, 2);
                self.writer.align_to_byte();
                self.writer.write_bits(0, 16);
                self.writer.write_bits(0xFFFF, 16);
            }
            return;
        }

        let mut offset = 0;
        while offset < data.len() {
            let block = (data.len() - offset).min(MAX_STORED_BLOCK);
            let last = is_final && offset + block == data.len();
            self.writer.write_bits(u32::from(last), 1);
            self.writer.write_bits(0b00, 2);
            self.writer.align_to_byte();
            self.writer.write_bits(block as u32, 16);
            self.writer.write_bits(u32::from(!(block as u16)), 16);
            self.writer.write_bytes(&data[offset..offset + block]);
            offset += block;
        }
    }

    /// Pick the cheapest representation for this batch of tokens and write it.
    fn write_best_block(
        &mut self,
        data: &[u8],
        tokens: &[Lz77Token],
        is_final: bool,
    ) -> Result<()> {
        let (litlen_freq, dist_freq) = count_frequencies(tokens);

        let mut litlen_builder = HuffmanBuilder::new(LITLEN_SYMBOLS, MAX_CODE_LENGTH);
        for (symbol, &freq) in litlen_freq.iter().enumerate() {
            if freq > 0 {
                litlen_builder.add_count(symbol as u16, freq);
            }
        }
        let litlen_lengths = litlen_builder.build_lengths();

        let mut dist_builder = HuffmanBuilder::new(DISTANCE_SYMBOLS, MAX_CODE_LENGTH);
        for (symbol, &freq) in dist_freq.iter().enumerate() {
            if freq > 0 {
                dist_builder.add_count(symbol as u16, freq);
            }
        }
        let dist_lengths = dist_builder.build_lengths();

        // HLIT/HDIST counts: trailing zero lengths are not transmitted.
        let hlit = litlen_lengths
            .iter()
            .rposition(|&len| len != 0)
            .map_or(257, |i| (i + 1).max(257));
        let hdist = dist_lengths
            .iter()
            .rposition(|&len| len != 0)
            .map_or(1, |i| (i + 1).max(1));

        let mut combined = Vec::with_capacity(hlit + hdist);
        combined.extend_from_slice(&litlen_lengths[..hlit]);
        combined.extend_from_slice(&dist_lengths[..hdist]);
        let rle = rle_encode_lengths(&combined);

        let mut codelen_builder = HuffmanBuilder::new(CODELEN_SYMBOLS, MAX_CODELEN_LENGTH);
        for &(symbol, _, _) in &rle {
            codelen_builder.add(u16::from(symbol));
        }
        let codelen_lengths = codelen_builder.build_lengths();

        let mut hclen = CODELEN_SYMBOLS;
        while hclen > 4 && codelen_lengths[CODE_LENGTH_ORDER[hclen - 1]] == 0 {
            hclen -= 1;
        }

        let litlen_code = CanonicalCode::from_lengths(&litlen_lengths);
        let dist_code = CanonicalCode::from_lengths(&dist_lengths);
        let codelen_code = CanonicalCode::from_lengths(&codelen_lengths);

        let stored_cost = stored_cost_bits(data.len());
        let fixed_cost = 3 + token_cost_bits(tokens, fixed_litlen_code(), fixed_distance_code());
        let dynamic_cost = 3
            + dynamic_header_cost_bits(&codelen_code, &rle, hclen)
            + token_cost_bits(tokens, &litlen_code, &dist_code);

        if stored_cost <= fixed_cost && stored_cost <= dynamic_cost {
            self.write_stored_blocks(data, is_final);
        } else if dynamic_cost < fixed_cost {
            self.writer.write_bits(u32::from(is_final), 1);
            self.writer.write_bits(0b10, 2);
            self.writer.write_bits((hlit - 257) as u32, 5);
            self.writer.write_bits((hdist - 1) as u32, 5);
            self.writer.write_bits((hclen - 4) as u32, 4);
            for &order in CODE_LENGTH_ORDER.iter().take(hclen) {
                self.writer
                    .write_bits(u32::from(codelen_lengths[order]), 3);
            }
            for &(symbol, extra, extra_bits) in &rle {
                codelen_code.emit(&mut self.writer, u16::from(symbol));
                if extra_bits > 0 {
                    self.writer.write_bits(u32::from(extra), extra_bits);
                }
            }
            write_tokens(&mut self.writer, tokens, &litlen_code, &dist_code);
        } else {
            self.writer.write_bits(u32::from(is_final), 1);
            self.writer.write_bits(0b01, 2);
            write_tokens(&mut self.writer, tokens, fixed_litlen_code(), fixed_distance_code());
        }

        Ok(())
    }

    /// Move completed bytes from the bit writer into the drain queue.
    fn collect_output(&mut self) {
        if self.writer.pending_bytes() > 0 {
            let bytes = self.writer.take_bytes();
            self.pending_output.extend_from_slice(&bytes);
        }
    }

    fn deliver(&mut self, output: &mut [u8]) -> usize {
        let available = self.pending_output.len() - self.output_pos;
        let count = available.min(output.len());
        output[..count]
            .copy_from_slice(&self.pending_output[self.output_pos..self.output_pos + count]);
        self.output_pos += count;
        if self.output_pos == self.pending_output.len() {
            self.pending_output.clear();
            self.output_pos = 0;
        }
        count
    }

    fn undelivered(&self) -> usize {
        self.pending_output.len() - self.output_pos
    }
}

impl Compressor for Deflater {
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, CompressStatus)> {
        if self.finished {
            if !input.is_empty() {
                return Err(ZlibError::invalid_parameter(
                    "compress called after the stream was finished",
                ));
            }
        } else {
            self.pending_input.extend_from_slice(input);
            match flush {
                FlushMode::None => {
                    if self.pending_input.len() >= BLOCK_THRESHOLD {
                        self.emit_blocks(false)?;
                    }
                }
                FlushMode::Partial => {
                    self.emit_blocks(false)?;
                    self.write_partial_marker();
                }
                FlushMode::Sync => {
                    self.emit_blocks(false)?;
                    self.write_sync_marker();
                }
                FlushMode::Full => {
                    self.emit_blocks(false)?;
                    self.write_sync_marker();
                    // Forget history so decoding can restart at this point.
                    self.lz77.reset();
                }
                FlushMode::Finish => {
                    self.emit_blocks(true)?;
                    self.writer.align_to_byte();
                    self.finished = true;
                }
            }
            self.collect_output();
        }

        let produced = self.deliver(output);
        let status = if self.undelivered() > 0 {
            CompressStatus::NeedsOutput
        } else if self.finished {
            CompressStatus::Done
        } else {
            CompressStatus::NeedsInput
        };
        Ok((input.len(), produced, status))
    }

    fn reset(&mut self) {
        Deflater::reset(self);
    }

    fn is_finished(&self) -> bool {
        self.finished && self.undelivered() == 0
    }
}

/// Literal/length and distance symbol frequencies for a token stream,
/// including the end-of-block symbol every block carries.
fn count_frequencies(tokens: &[Lz77Token]) -> ([u32; LITLEN_SYMBOLS], [u32; DISTANCE_SYMBOLS]) {
    let mut litlen = [0u32; LITLEN_SYMBOLS];
    let mut dist = [0u32; DISTANCE_SYMBOLS];
    for token in tokens {
        match *token {
            Lz77Token::Literal(byte) => litlen[byte as usize] += 1,
            Lz77Token::Match { length, distance } => {
                let (length_code, _, _) = length_to_code(length);
                let (distance_code, _, _) = distance_to_code(distance);
                litlen[length_code as usize] += 1;
                dist[distance_code as usize] += 1;
            }
        }
    }
    litlen[END_OF_BLOCK as usize] += 1;
    (litlen, dist)
}

/// Run-length encode code lengths with symbols 16/17/18 (RFC 1951 3.2.7).
fn rle_encode_lengths(lengths: &[u8]) -> Vec<RleOp> {
    let mut ops = Vec::new();
    let mut pos = 0;

    while pos < lengths.len() {
        let value = lengths[pos];
        let mut run = 1;
        while pos + run < lengths.len() && lengths[pos + run] == value {
            run += 1;
        }

        if value == 0 {
            let mut left = run;
            while left >= 11 {
                let take = left.min(138);
                ops.push((18, (take - 11) as u8, 7));
                left -= take;
            }
            if left >= 3 {
                ops.push((17, (left - 3) as u8, 3));
                left = 0;
            }
            for _ in 0..left {
                ops.push((0, 0, 0));
            }
        } else {
            // The first occurrence is always literal; repeats of it can
            // then use symbol 16.
            ops.push((value, 0, 0));
            let mut left = run - 1;
            while left >= 3 {
                let take = left.min(6);
                ops.push((16, (take - 3) as u8, 2));
                left -= take;
            }
            for _ in 0..left {
                ops.push((value, 0, 0));
            }
        }

        pos += run;
    }

    ops
}

/// Emit all tokens plus the end-of-block symbol.
fn write_tokens(
    writer: &mut BitWriter,
    tokens: &[Lz77Token],
    litlen_code: &CanonicalCode,
    dist_code: &CanonicalCode,
) {
    for token in tokens {
        match *token {
            Lz77Token::Literal(byte) => litlen_code.emit(writer, u16::from(byte)),
            Lz77Token::Match { length, distance } => {
                let (length_sym, len_extra_bits, len_extra) = length_to_code(length);
                litlen_code.emit(writer, length_sym);
                if len_extra_bits > 0 {
                    writer.write_bits(u32::from(len_extra), len_extra_bits);
                }
                let (dist_sym, dist_extra_bits, dist_extra) = distance_to_code(distance);
                dist_code.emit(writer, dist_sym);
                if dist_extra_bits > 0 {
                    writer.write_bits(u32::from(dist_extra), dist_extra_bits);
                }
            }
        }
    }
    litlen_code.emit(writer, END_OF_BLOCK);
}

/// Worst-case cost of storing `len` bytes, including alignment padding.
fn stored_cost_bits(len: usize) -> u64 {
    let blocks = len.div_ceil(MAX_STORED_BLOCK).max(1) as u64;
    blocks * (3 + 32) + 7 + len as u64 * 8
}

/// Cost of the token stream (plus end-of-block) under the given codes.
fn token_cost_bits(
    tokens: &[Lz77Token],
    litlen_code: &CanonicalCode,
    dist_code: &CanonicalCode,
) -> u64 {
    let mut bits = u64::from(litlen_code.bit_length(END_OF_BLOCK));
    for token in tokens {
        bits += match *token {
            Lz77Token::Literal(byte) => u64::from(litlen_code.bit_length(u16::from(byte))),
            Lz77Token::Match { length, distance } => {
                let (length_sym, len_extra_bits, _) = length_to_code(length);
                let (dist_sym, dist_extra_bits, _) = distance_to_code(distance);
                u64::from(litlen_code.bit_length(length_sym))
                    + u64::from(len_extra_bits)
                    + u64::from(dist_code.bit_length(dist_sym))
                    + u64::from(dist_extra_bits)
            }
        };
    }
    bits
}

/// Cost of a dynamic block's code description.
fn dynamic_header_cost_bits(codelen_code: &CanonicalCode, rle: &[RleOp], hclen: usize) -> u64 {
    let mut bits = 5 + 5 + 4 + 3 * hclen as u64;
    for &(symbol, _, extra_bits) in rle {
        bits += u64::from(codelen_code.bit_length(u16::from(symbol))) + u64::from(extra_bits);
    }
    bits
}

/// Compress `data` to a raw DEFLATE stream in one call.
pub fn deflate(data: &[u8], level: u8) -> Result<Vec<u8>> {
    let mut deflater = Deflater::new(CompressionLevel::new(level));
    deflater.compress_all(data)
}
