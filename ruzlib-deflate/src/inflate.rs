//! DEFLATE decompression (RFC 1951).
//!
//! The [`Inflater`] is fully resumable: input arrives in arbitrary chunks
//! and is buffered internally, and the decoder checkpoints the bit position
//! before each decode element (a block header, a stored-block run, or one
//! literal/match symbol). When the buffered input ends mid-element, the
//! reader rewinds to the checkpoint and the call reports
//! [`DecompressStatus::NeedsInput`]; the next call re-decodes that element
//! from the start. Running out of input is therefore never a hard error,
//! only corrupt data is.

use crate::huffman::{END_OF_BLOCK, HuffmanTable};
use crate::tables::{
    CODE_LENGTH_ORDER, DISTANCE_EXTRA_BITS, LENGTH_EXTRA_BITS, decode_distance, decode_length,
    fixed_distance_table, fixed_litlen_table,
};
use ruzlib_core::bitstream::BitReader;
use ruzlib_core::error::{Result, ZlibError};
use ruzlib_core::traits::{DecompressStatus, Decompressor};
use ruzlib_core::window::Window;

/// Stop decoding once this much output is waiting to be drained.
const PENDING_LIMIT: usize = 65536;

/// Where the decoder is within the block structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InflateState {
    /// Expecting the 3-bit block header.
    BlockHeader,
    /// Copying a stored block's payload.
    Stored {
        /// Payload bytes still to copy.
        remaining: usize,
    },
    /// Decoding symbols of a fixed or dynamic block.
    Block,
    /// The final block has ended.
    Done,
    /// A fatal error was reported; the stream is unusable.
    Bad,
}

/// Outcome of decoding one literal/length symbol.
enum SymbolStep {
    Progress,
    EndOfBlock,
}

/// Streaming, resumable DEFLATE decompressor.
#[derive(Debug)]
pub struct Inflater {
    state: InflateState,
    /// Buffered compressed bytes not yet fully consumed.
    input: Vec<u8>,
    /// Bits of `input[0]` already consumed.
    bit_offset: u8,
    /// Decode tables for the current block (`state == Block`).
    litlen_table: Option<HuffmanTable>,
    dist_table: Option<HuffmanTable>,
    /// Whether the current block has BFINAL set.
    final_block: bool,
    window: Window,
    /// Decoded bytes waiting to be drained into caller buffers.
    pending: Vec<u8>,
    pending_pos: usize,
    total_in: u64,
    total_out: u64,
}

impl Inflater {
    /// Create a new decompressor.
    pub fn new() -> Self {
        Self {
            state: InflateState::BlockHeader,
            input: Vec::new(),
            bit_offset: 0,
            litlen_table: None,
            dist_table: None,
            final_block: false,
            window: Window::deflate(),
            pending: Vec::new(),
            pending_pos: 0,
            total_in: 0,
            total_out: 0,
        }
    }

    /// Create a decompressor whose window is preloaded with a dictionary.
    pub fn with_dictionary(dictionary: &[u8]) -> Self {
        let mut inflater = Self::new();
        inflater.set_dictionary(dictionary);
        inflater
    }

    /// Preload the window with a preset dictionary.
    ///
    /// Must happen before any output has been produced; back-references may
    /// then reach into the dictionary.
    pub fn set_dictionary(&mut self, dictionary: &[u8]) {
        self.window.preload(dictionary);
    }

    /// Total compressed bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Total decompressed bytes delivered so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// After the stream is done: buffered input bytes that belong to
    /// whatever follows the DEFLATE data (e.g. a container's trailer).
    pub fn take_leftover(&mut self) -> Vec<u8> {
        debug_assert_eq!(self.bit_offset, 0);
        std::mem::take(&mut self.input)
    }

    fn pending_len(&self) -> usize {
        self.pending.len() - self.pending_pos
    }

    fn deliver(&mut self, output: &mut [u8]) -> usize {
        let count = self.pending_len().min(output.len());
        output[..count]
            .copy_from_slice(&self.pending[self.pending_pos..self.pending_pos + count]);
        self.pending_pos += count;
        if self.pending_pos == self.pending.len() {
            self.pending.clear();
            self.pending_pos = 0;
        }
        count
    }

    /// Decode as much as possible from `data`, checkpointing per element.
    ///
    /// Returns the committed position: everything before it was fully
    /// decoded, anything after belongs to an incomplete element.
    fn run(&mut self, data: &[u8]) -> Result<(usize, u8)> {
        let mut reader = BitReader::new(data);
        reader.seek((0, self.bit_offset));

        loop {
            if self.pending_len() >= PENDING_LIMIT {
                break;
            }
            let checkpoint = reader.position();
            match self.step(&mut reader) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) if e.is_unexpected_eof() => {
                    reader.seek(checkpoint);
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(reader.position())
    }

    /// Decode one element. Returns whether there is more to do.
    ///
    /// Every input read happens before any state change, so an
    /// `UnexpectedEof` leaves the element undecoded and restartable.
    fn step(&mut self, reader: &mut BitReader<'_>) -> Result<bool> {
        match self.state {
            InflateState::BlockHeader => {
                let bfinal = reader.read_bit()?;
                let btype = reader.read_bits(2)?;
                match btype {
                    0b00 => {
                        reader.align_to_byte();
                        let len = reader.read_bits(16)? as usize;
                        let nlen = reader.read_bits(16)? as usize;
                        if len != !nlen & 0xFFFF {
                            return Err(ZlibError::corrupted(
                                reader.bit_position() / 8,
                                "stored block LEN/NLEN mismatch",
                            ));
                        }
                        self.final_block = bfinal;
                        if len == 0 {
                            return Ok(self.end_of_block(reader));
                        }
                        self.state = InflateState::Stored { remaining: len };
                    }
                    0b01 => {
                        self.final_block = bfinal;
                        self.litlen_table = Some(fixed_litlen_table().clone());
                        self.dist_table = Some(fixed_distance_table().clone());
                        self.state = InflateState::Block;
                    }
                    0b10 => {
                        let (litlen, dist) = read_dynamic_header(reader)?;
                        self.final_block = bfinal;
                        self.litlen_table = Some(litlen);
                        self.dist_table = Some(dist);
                        self.state = InflateState::Block;
                    }
                    _ => {
                        return Err(ZlibError::corrupted(
                            reader.bit_position() / 8,
                            "reserved block type 3",
                        ));
                    }
                }
                Ok(true)
            }
            InflateState::Stored { remaining } => {
                let available = reader.remaining_bytes();
                if available == 0 {
                    return Err(ZlibError::unexpected_eof(remaining));
                }
                let count = remaining.min(available).min(PENDING_LIMIT);
                let bytes = reader.take_bytes(count)?;
                self.window.extend(bytes);
                self.pending.extend_from_slice(bytes);
                if count == remaining {
                    Ok(self.end_of_block(reader))
                } else {
                    self.state = InflateState::Stored {
                        remaining: remaining - count,
                    };
                    Ok(true)
                }
            }
            InflateState::Block => {
                let (Some(litlen), Some(dist)) = (&self.litlen_table, &self.dist_table) else {
                    return Err(ZlibError::invalid_parameter(
                        "block decode without code tables",
                    ));
                };
                match decode_symbol(reader, litlen, dist, &mut self.window, &mut self.pending)? {
                    SymbolStep::Progress => Ok(true),
                    SymbolStep::EndOfBlock => {
                        self.litlen_table = None;
                        self.dist_table = None;
                        Ok(self.end_of_block(reader))
                    }
                }
            }
            InflateState::Done => Ok(false),
            InflateState::Bad => Err(ZlibError::invalid_parameter(
                "inflate stream is in an error state",
            )),
        }
    }

    /// A block just ended; either continue with the next header or, on the
    /// final block, align and finish.
    fn end_of_block(&mut self, reader: &mut BitReader<'_>) -> bool {
        if self.final_block {
            reader.align_to_byte();
            self.state = InflateState::Done;
            false
        } else {
            self.state = InflateState::BlockHeader;
            true
        }
    }
}

impl Default for Inflater {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for Inflater {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)> {
        if self.state == InflateState::Bad {
            return Err(ZlibError::invalid_parameter(
                "inflate stream is in an error state",
            ));
        }

        self.input.extend_from_slice(input);
        self.total_in += input.len() as u64;

        let data = std::mem::take(&mut self.input);
        match self.run(&data) {
            Ok((byte_pos, bit_pos)) => {
                self.input = data[byte_pos..].to_vec();
                self.bit_offset = bit_pos;
            }
            Err(e) => {
                self.state = InflateState::Bad;
                return Err(e);
            }
        }

        let produced = self.deliver(output);
        self.total_out += produced as u64;

        let status = if self.pending_len() > 0 {
            DecompressStatus::NeedsOutput
        } else if self.state == InflateState::Done {
            DecompressStatus::Done
        } else {
            DecompressStatus::NeedsInput
        };
        Ok((input.len(), produced, status))
    }

    fn reset(&mut self) {
        self.state = InflateState::BlockHeader;
        self.input.clear();
        self.bit_offset = 0;
        self.litlen_table = None;
        self.dist_table = None;
        self.final_block = false;
        self.window.clear();
        self.pending.clear();
        self.pending_pos = 0;
        self.total_in = 0;
        self.total_out = 0;
    }

    fn is_finished(&self) -> bool {
        self.state == InflateState::Done && self.pending_len() == 0
    }
}

/// Decode one literal, back-reference, or end-of-block symbol.
fn decode_symbol(
    reader: &mut BitReader<'_>,
    litlen: &HuffmanTable,
    dist: &HuffmanTable,
    window: &mut Window,
    pending: &mut Vec<u8>,
) -> Result<SymbolStep> {
    let symbol = litlen.decode(reader)?;
    if symbol < 256 {
        let byte = symbol as u8;
        window.push(byte);
        pending.push(byte);
        return Ok(SymbolStep::Progress);
    }
    if symbol == END_OF_BLOCK {
        return Ok(SymbolStep::EndOfBlock);
    }
    if symbol > 285 {
        return Err(ZlibError::corrupted(
            reader.bit_position() / 8,
            format!("invalid literal/length symbol {symbol}"),
        ));
    }

    let length_extra = reader.read_bits(LENGTH_EXTRA_BITS[(symbol - 257) as usize])?;
    let length = decode_length(symbol, length_extra as u16) as usize;

    let dist_symbol = dist.decode(reader)?;
    if dist_symbol > 29 {
        return Err(ZlibError::corrupted(
            reader.bit_position() / 8,
            format!("invalid distance symbol {dist_symbol}"),
        ));
    }
    let dist_extra = reader.read_bits(DISTANCE_EXTRA_BITS[dist_symbol as usize])?;
    let distance = decode_distance(dist_symbol, dist_extra as u16) as usize;

    window.copy_match(distance, length, pending)?;
    Ok(SymbolStep::Progress)
}

/// Read a dynamic block's code description (RFC 1951 Section 3.2.7).
///
/// Pure reads, no decoder state changes: safe to restart from the header's
/// first bit if the input runs out anywhere inside it.
fn read_dynamic_header(reader: &mut BitReader<'_>) -> Result<(HuffmanTable, HuffmanTable)> {
    let hlit = reader.read_bits(5)? as usize + 257;
    let hdist = reader.read_bits(5)? as usize + 1;
    let hclen = reader.read_bits(4)? as usize + 4;

    let mut codelen_lengths = [0u8; 19];
    for &order in CODE_LENGTH_ORDER.iter().take(hclen) {
        codelen_lengths[order] = reader.read_bits(3)? as u8;
    }
    let codelen_table = HuffmanTable::from_code_lengths(&codelen_lengths)?;

    let mut lengths = vec![0u8; hlit + hdist];
    let mut index = 0;
    while index < lengths.len() {
        let symbol = codelen_table.decode(reader)?;
        match symbol {
            0..=15 => {
                lengths[index] = symbol as u8;
                index += 1;
            }
            16 => {
                if index == 0 {
                    return Err(ZlibError::corrupted(
                        reader.bit_position() / 8,
                        "length repeat with no previous length",
                    ));
                }
                let repeat = 3 + reader.read_bits(2)? as usize;
                if index + repeat > lengths.len() {
                    return Err(ZlibError::corrupted(
                        reader.bit_position() / 8,
                        "length repeat overruns the code description",
                    ));
                }
                let previous = lengths[index - 1];
                lengths[index..index + repeat].fill(previous);
                index += repeat;
            }
            17 | 18 => {
                let repeat = if symbol == 17 {
                    3 + reader.read_bits(3)? as usize
                } else {
                    11 + reader.read_bits(7)? as usize
                };
                if index + repeat > lengths.len() {
                    return Err(ZlibError::corrupted(
                        reader.bit_position() / 8,
                        "zero-run overruns the code description",
                    ));
                }
                index += repeat; // lengths are zero-initialized
            }
            _ => {
                return Err(ZlibError::corrupted(
                    reader.bit_position() / 8,
                    format!("invalid code-length symbol {symbol}"),
                ));
            }
        }
    }

    let litlen = HuffmanTable::from_code_lengths(&lengths[..hlit])?;
    if litlen.is_empty() {
        return Err(ZlibError::invalid_header("empty literal/length code"));
    }
    let dist = HuffmanTable::from_code_lengths(&lengths[hlit..])?;
    Ok((litlen, dist))
}

/// Decompress a complete raw DEFLATE stream in one call.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    Inflater::new().decompress_all(data)
}
