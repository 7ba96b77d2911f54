//! zlib stream format (RFC 1950).
//!
//! A zlib stream is a two-byte header, an optional preset-dictionary
//! identifier, raw DEFLATE data, and a big-endian Adler-32 trailer over the
//! uncompressed bytes. [`ZlibEncoder`] and [`ZlibDecoder`] wrap the codec's
//! [`Deflater`]/[`Inflater`] with that framing; the one-shot helpers cover
//! the common whole-buffer case.

use crate::deflate::Deflater;
use crate::inflate::Inflater;
use ruzlib_core::error::{Result, ZlibError};
use ruzlib_core::traits::{
    CompressStatus, CompressionLevel, Compressor, DecompressStatus, Decompressor, FlushMode,
};

/// Largest prime below 2^16, the Adler-32 modulus.
const ADLER_BASE: u32 = 65521;

/// How many bytes can be summed before `b` can overflow a u32.
const ADLER_NMAX: usize = 5552;

/// CM=8 (deflate), CINFO=7 (32 KiB window).
const CMF_DEFLATE_32K: u8 = 0x78;

/// Incremental Adler-32 checksum (RFC 1950 Section 8.2).
#[derive(Debug, Clone)]
pub struct Adler32 {
    a: u32,
    b: u32,
}

impl Adler32 {
    /// Create a checksum in its initial state (value 1).
    pub fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    /// Feed bytes into the checksum.
    pub fn update(&mut self, data: &[u8]) {
        // The modulo can be deferred for NMAX bytes without overflow.
        for chunk in data.chunks(ADLER_NMAX) {
            for &byte in chunk {
                self.a += u32::from(byte);
                self.b += self.a;
            }
            self.a %= ADLER_BASE;
            self.b %= ADLER_BASE;
        }
    }

    /// Current checksum value.
    pub fn finish(&self) -> u32 {
        (self.b << 16) | self.a
    }

    /// Reset to the initial state.
    pub fn reset(&mut self) {
        self.a = 1;
        self.b = 0;
    }

    /// Checksum a whole buffer in one call.
    pub fn checksum(data: &[u8]) -> u32 {
        let mut adler = Self::new();
        adler.update(data);
        adler.finish()
    }
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the CMF/FLG header pair for the given level.
///
/// FCHECK makes the pair a multiple of 31; FLEVEL advertises the rough
/// compression effort and is ignored by decoders.
fn header_bytes(level: CompressionLevel, has_dict: bool) -> [u8; 2] {
    let flevel: u8 = match level.level() {
        0..=2 => 0,
        3..=5 => 1,
        6 => 2,
        _ => 3,
    };
    let mut flg = (flevel << 6) | (u8::from(has_dict) << 5);
    let value = u16::from(CMF_DEFLATE_32K) * 256 + u16::from(flg);
    flg += ((31 - value % 31) % 31) as u8;
    [CMF_DEFLATE_32K, flg]
}

/// Streaming zlib compressor.
#[derive(Debug)]
pub struct ZlibEncoder {
    deflater: Deflater,
    adler: Adler32,
    level: CompressionLevel,
    dict_id: Option<u32>,
    header_queued: bool,
    finished: bool,
    pending: Vec<u8>,
    pending_pos: usize,
    total_in: u64,
    total_out: u64,
}

impl ZlibEncoder {
    /// Create an encoder from a zlib-style level (-1 for default, 0-9).
    pub fn new(level: i32) -> Result<Self> {
        Ok(Self::with_level(CompressionLevel::from_zlib(level)?))
    }

    /// Create an encoder with an already-validated level.
    pub fn with_level(level: CompressionLevel) -> Self {
        Self {
            deflater: Deflater::new(level),
            adler: Adler32::new(),
            level,
            dict_id: None,
            header_queued: false,
            finished: false,
            pending: Vec::new(),
            pending_pos: 0,
            total_in: 0,
            total_out: 0,
        }
    }

    /// Create an encoder that compresses against a preset dictionary.
    ///
    /// The header will carry FDICT and the dictionary's Adler-32 so the
    /// decoder can check it was given the same bytes.
    pub fn with_dictionary(level: CompressionLevel, dictionary: &[u8]) -> Self {
        let mut encoder = Self::with_level(level);
        encoder.deflater = Deflater::with_dictionary(level, dictionary);
        encoder.dict_id = Some(Adler32::checksum(dictionary));
        encoder
    }

    /// Total uncompressed bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Total compressed bytes delivered so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
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
}

impl Compressor for ZlibEncoder {
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, CompressStatus)> {
        if !self.header_queued {
            let header = header_bytes(self.level, self.dict_id.is_some());
            self.pending.extend_from_slice(&header);
            if let Some(id) = self.dict_id {
                self.pending.extend_from_slice(&id.to_be_bytes());
            }
            self.header_queued = true;
        }

        if self.finished {
            if !input.is_empty() {
                return Err(ZlibError::invalid_parameter(
                    "compress called after the stream was finished",
                ));
            }
        } else {
            self.adler.update(input);
            self.total_in += input.len() as u64;

            // Drive the deflater to completion into our queue; caller
            // buffer size is handled at delivery.
            let mut buffer = [0u8; 8192];
            let mut fed = false;
            loop {
                let chunk: &[u8] = if fed { &[] } else { input };
                // The flush request applies once; draining leftovers with it
                // would append a fresh flush marker on every iteration.
                let step_flush = if fed { FlushMode::None } else { flush };
                let (_, produced, status) = self.deflater.compress(chunk, &mut buffer, step_flush)?;
                fed = true;
                self.pending.extend_from_slice(&buffer[..produced]);
                match status {
                    CompressStatus::Done => {
                        self.pending
                            .extend_from_slice(&self.adler.finish().to_be_bytes());
                        self.finished = true;
                        break;
                    }
                    CompressStatus::NeedsOutput => {}
                    CompressStatus::NeedsInput => {
                        if produced == 0 {
                            break;
                        }
                    }
                }
            }
        }

        let produced = self.deliver(output);
        self.total_out += produced as u64;
        let status = if self.pending_len() > 0 {
            CompressStatus::NeedsOutput
        } else if self.finished {
            CompressStatus::Done
        } else {
            CompressStatus::NeedsInput
        };
        Ok((input.len(), produced, status))
    }

    fn reset(&mut self) {
        self.deflater.reset();
        self.adler.reset();
        self.header_queued = false;
        self.finished = false;
        self.pending.clear();
        self.pending_pos = 0;
        self.total_in = 0;
        self.total_out = 0;
    }

    fn is_finished(&self) -> bool {
        self.finished && self.pending_len() == 0
    }
}

/// Where the decoder is within the zlib framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZlibState {
    /// Expecting the two header bytes.
    Header,
    /// Expecting the four-byte dictionary identifier.
    DictId,
    /// Waiting for the caller to supply the preset dictionary.
    AwaitDict,
    /// Decoding the DEFLATE body.
    Body,
    /// Expecting the four-byte Adler-32 trailer.
    Check,
    /// Stream complete and verified.
    Done,
    /// A fatal error was reported.
    Bad,
}

/// Streaming zlib decompressor.
#[derive(Debug)]
pub struct ZlibDecoder {
    state: ZlibState,
    inflater: Inflater,
    adler: Adler32,
    /// Phase scratch: partial header/trailer bytes, or compressed bytes
    /// stashed while waiting for a dictionary.
    buffer: Vec<u8>,
    dict_id: u32,
    total_in: u64,
    total_out: u64,
}

impl ZlibDecoder {
    /// Create a new decoder.
    pub fn new() -> Self {
        Self {
            state: ZlibState::Header,
            inflater: Inflater::new(),
            adler: Adler32::new(),
            buffer: Vec::new(),
            dict_id: 0,
            total_in: 0,
            total_out: 0,
        }
    }

    /// The dictionary identifier from the header, once FDICT was seen.
    pub fn dictionary_id(&self) -> Option<u32> {
        match self.state {
            ZlibState::AwaitDict => Some(self.dict_id),
            _ => None,
        }
    }

    /// Supply the preset dictionary after [`DecompressStatus::NeedsDict`].
    ///
    /// The dictionary's Adler-32 must match the identifier in the header.
    pub fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<()> {
        if self.state != ZlibState::AwaitDict {
            return Err(ZlibError::invalid_parameter(
                "no dictionary was requested at this point",
            ));
        }
        let computed = Adler32::checksum(dictionary);
        if computed != self.dict_id {
            return Err(ZlibError::checksum_mismatch(self.dict_id, computed));
        }
        self.inflater.set_dictionary(dictionary);
        self.state = ZlibState::Body;
        Ok(())
    }

    /// Take any input bytes that arrived after the end of the stream.
    ///
    /// The decoder counts everything it was handed as consumed; once the
    /// trailer has been verified, bytes beyond it (for example the start of
    /// a following concatenated stream) are held here instead of dropped.
    pub fn take_leftover(&mut self) -> Vec<u8> {
        match self.state {
            ZlibState::Done => std::mem::take(&mut self.buffer),
            _ => Vec::new(),
        }
    }

    /// Total compressed bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Total decompressed bytes delivered so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Move bytes from `rest` into the scratch buffer until it holds `need`.
    fn fill_buffer<'a>(&mut self, rest: &'a [u8], need: usize) -> &'a [u8] {
        let take = need.saturating_sub(self.buffer.len()).min(rest.len());
        self.buffer.extend_from_slice(&rest[..take]);
        &rest[take..]
    }
}

impl Default for ZlibDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for ZlibDecoder {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)> {
        let consumed = input.len();
        self.total_in += consumed as u64;
        let mut rest = input;

        loop {
            match self.state {
                ZlibState::Header => {
                    rest = self.fill_buffer(rest, 2);
                    if self.buffer.len() < 2 {
                        return Ok((consumed, 0, DecompressStatus::NeedsInput));
                    }
                    let cmf = self.buffer[0];
                    let flg = self.buffer[1];
                    self.buffer.clear();
                    if cmf & 0x0F != 8 {
                        self.state = ZlibState::Bad;
                        return Err(ZlibError::invalid_header(format!(
                            "unsupported compression method {}",
                            cmf & 0x0F
                        )));
                    }
                    if cmf >> 4 > 7 {
                        self.state = ZlibState::Bad;
                        return Err(ZlibError::invalid_header(format!(
                            "invalid window size exponent {}",
                            cmf >> 4
                        )));
                    }
                    if (u16::from(cmf) * 256 + u16::from(flg)) % 31 != 0 {
                        self.state = ZlibState::Bad;
                        return Err(ZlibError::invalid_header("header check bits failed"));
                    }
                    self.state = if flg & 0x20 != 0 {
                        ZlibState::DictId
                    } else {
                        ZlibState::Body
                    };
                }
                ZlibState::DictId => {
                    rest = self.fill_buffer(rest, 4);
                    if self.buffer.len() < 4 {
                        return Ok((consumed, 0, DecompressStatus::NeedsInput));
                    }
                    self.dict_id =
                        u32::from_be_bytes([self.buffer[0], self.buffer[1], self.buffer[2], self.buffer[3]]);
                    self.buffer.clear();
                    self.state = ZlibState::AwaitDict;
                }
                ZlibState::AwaitDict => {
                    // Compressed bytes arriving early wait with us.
                    self.buffer.extend_from_slice(rest);
                    return Ok((consumed, 0, DecompressStatus::NeedsDict));
                }
                ZlibState::Body => {
                    let result = if self.buffer.is_empty() {
                        self.inflater.decompress(rest, output)
                    } else {
                        let mut stashed = std::mem::take(&mut self.buffer);
                        stashed.extend_from_slice(rest);
                        self.inflater.decompress(&stashed, output)
                    };
                    rest = &[];
                    let (_, produced, status) = match result {
                        Ok(step) => step,
                        Err(e) => {
                            self.state = ZlibState::Bad;
                            return Err(e);
                        }
                    };
                    self.adler.update(&output[..produced]);
                    self.total_out += produced as u64;
                    match status {
                        DecompressStatus::Done => {
                            self.buffer = self.inflater.take_leftover();
                            self.state = ZlibState::Check;
                            if produced > 0 {
                                // Deliver before verifying the trailer so the
                                // caller's buffer is not overwritten mid-call.
                                return Ok((consumed, produced, DecompressStatus::NeedsOutput));
                            }
                        }
                        other => return Ok((consumed, produced, other)),
                    }
                }
                ZlibState::Check => {
                    rest = self.fill_buffer(rest, 4);
                    if self.buffer.len() < 4 {
                        return Ok((consumed, 0, DecompressStatus::NeedsInput));
                    }
                    let stored = u32::from_be_bytes([
                        self.buffer[0],
                        self.buffer[1],
                        self.buffer[2],
                        self.buffer[3],
                    ]);
                    // Bytes past the trailer are not ours to interpret, but
                    // they are not ours to drop either.
                    self.buffer.drain(..4);
                    let computed = self.adler.finish();
                    if stored != computed {
                        self.state = ZlibState::Bad;
                        return Err(ZlibError::checksum_mismatch(stored, computed));
                    }
                    self.state = ZlibState::Done;
                }
                ZlibState::Done => {
                    // Hold anything past the trailer for `take_leftover`.
                    self.buffer.extend_from_slice(rest);
                    return Ok((consumed, 0, DecompressStatus::Done));
                }
                ZlibState::Bad => {
                    return Err(ZlibError::invalid_parameter(
                        "inflate stream is in an error state",
                    ));
                }
            }
        }
    }

    fn reset(&mut self) {
        self.state = ZlibState::Header;
        self.inflater.reset();
        self.adler.reset();
        self.buffer.clear();
        self.dict_id = 0;
        self.total_in = 0;
        self.total_out = 0;
    }

    fn is_finished(&self) -> bool {
        self.state == ZlibState::Done
    }
}

/// Compress a whole buffer into a zlib stream.
pub fn zlib_compress(data: &[u8], level: u8) -> Result<Vec<u8>> {
    ZlibEncoder::with_level(CompressionLevel::new(level)).compress_all(data)
}

/// Compress a whole buffer into a zlib stream using a preset dictionary.
pub fn zlib_compress_with_dict(data: &[u8], level: u8, dictionary: &[u8]) -> Result<Vec<u8>> {
    ZlibEncoder::with_dictionary(CompressionLevel::new(level), dictionary).compress_all(data)
}

/// Decompress a whole zlib stream.
pub fn zlib_decompress(data: &[u8]) -> Result<Vec<u8>> {
    ZlibDecoder::new().decompress_all(data)
}

/// Decompress a whole zlib stream that may require a preset dictionary.
pub fn zlib_decompress_with_dict(data: &[u8], dictionary: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new();
    let mut output = Vec::new();
    let mut buffer = vec![0u8; 32768];
    let mut pos = 0;
    loop {
        let (consumed, produced, status) = decoder.decompress(&data[pos..], &mut buffer)?;
        pos += consumed;
        output.extend_from_slice(&buffer[..produced]);
        match status {
            DecompressStatus::Done => break,
            DecompressStatus::NeedsDict => decoder.set_dictionary(dictionary)?,
            DecompressStatus::NeedsOutput => {}
            DecompressStatus::NeedsInput => {
                if pos >= data.len() && produced == 0 {
                    return Err(ZlibError::unexpected_eof(1));
                }
            }
        }
    }
    Ok(output)
}

/// If `data` starts a zlib stream that demands a preset dictionary,
/// return the dictionary's Adler-32 identifier.
pub fn zlib_dictionary_id(data: &[u8]) -> Option<u32> {
    if data.len() < 6 || data[1] & 0x20 == 0 {
        return None;
    }
    Some(u32::from_be_bytes([data[2], data[3], data[4], data[5]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adler32_vectors() {
        assert_eq!(Adler32::checksum(b""), 1);
        assert_eq!(Adler32::checksum(b"Hello"), 0x058C_01F5);
        assert_eq!(Adler32::checksum(b"Wikipedia"), 0x11E6_0398);
    }

    #[test]
    fn test_adler32_incremental_matches_oneshot() {
        let data: Vec<u8> = (0..100_000u32).map(|i| (i * 31 % 257) as u8).collect();
        let mut adler = Adler32::new();
        for chunk in data.chunks(999) {
            adler.update(chunk);
        }
        assert_eq!(adler.finish(), Adler32::checksum(&data));
    }

    #[test]
    fn test_header_bytes() {
        // The classic level-6 header.
        assert_eq!(header_bytes(CompressionLevel::DEFAULT, false), [0x78, 0x9C]);
        // Level 0/1 advertise "fastest".
        assert_eq!(header_bytes(CompressionLevel::NONE, false), [0x78, 0x01]);
        assert_eq!(header_bytes(CompressionLevel::BEST, false), [0x78, 0xDA]);
        // Every header must pass the mod-31 check.
        for level in 0..=9u8 {
            for has_dict in [false, true] {
                let [cmf, flg] = header_bytes(CompressionLevel::new(level), has_dict);
                assert_eq!((u16::from(cmf) * 256 + u16::from(flg)) % 31, 0);
                assert_eq!(flg & 0x20 != 0, has_dict);
            }
        }
    }

    #[test]
    fn test_round_trip() {
        let data = b"zlib wraps deflate with a tiny header and an Adler-32 trailer";
        for level in [0u8, 1, 6, 9] {
            let compressed = zlib_compress(data, level).unwrap();
            assert_eq!(compressed[0], 0x78);
            assert_eq!(zlib_decompress(&compressed).unwrap(), data);
        }
    }

    #[test]
    fn test_single_byte_default_header() {
        let compressed = zlib_compress(b"A", 6).unwrap();
        assert_eq!(&compressed[..2], [0x78, 0x9C]);
        assert_eq!(zlib_decompress(&compressed).unwrap(), b"A");
    }

    #[test]
    fn test_empty_round_trip() {
        let compressed = zlib_compress(b"", 6).unwrap();
        assert_eq!(zlib_decompress(&compressed).unwrap(), b"");
    }

    #[test]
    fn test_corrupted_trailer_detected() {
        let mut compressed = zlib_compress(b"checksummed payload", 6).unwrap();
        let last = compressed.len() - 1;
        compressed[last] ^= 0xFF;
        let err = zlib_decompress(&compressed).unwrap_err();
        assert!(matches!(err, ZlibError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_bad_method_rejected() {
        // CM=9 is not deflate; keep the check bits valid.
        let mut header = [0x79u8, 0];
        let value = u16::from(header[0]) * 256;
        header[1] = ((31 - value % 31) % 31) as u8;
        let err = zlib_decompress(&header).unwrap_err();
        assert!(matches!(err, ZlibError::InvalidHeader { .. }));
    }

    #[test]
    fn test_bad_check_bits_rejected() {
        let err = zlib_decompress(&[0x78, 0x9D, 0x03, 0x00]).unwrap_err();
        assert!(matches!(err, ZlibError::InvalidHeader { .. }));
    }

    #[test]
    fn test_dictionary_round_trip() {
        let dict = b"preset dictionaries prime the window";
        let data = b"dictionaries prime the window for better ratios";

        let compressed = zlib_compress_with_dict(data, 9, dict).unwrap();
        assert_eq!(zlib_dictionary_id(&compressed), Some(Adler32::checksum(dict)));
        assert_eq!(zlib_decompress_with_dict(&compressed, dict).unwrap(), data);

        // Without the dictionary the one-shot path must refuse.
        assert!(zlib_decompress(&compressed).is_err());
    }

    #[test]
    fn test_wrong_dictionary_rejected() {
        let dict = b"the right dictionary";
        let compressed = zlib_compress_with_dict(b"payload", 6, dict).unwrap();
        let err = zlib_decompress_with_dict(&compressed, b"the wrong dictionary").unwrap_err();
        assert!(matches!(err, ZlibError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_needs_dict_status() {
        let dict = b"shared";
        let compressed = zlib_compress_with_dict(b"shared data", 6, dict).unwrap();

        let mut decoder = ZlibDecoder::new();
        let mut buf = [0u8; 64];
        let (_, produced, status) = decoder.decompress(&compressed, &mut buf).unwrap();
        assert_eq!(produced, 0);
        assert_eq!(status, DecompressStatus::NeedsDict);
        assert_eq!(decoder.dictionary_id(), Some(Adler32::checksum(dict)));

        decoder.set_dictionary(dict).unwrap();
        let mut out = Vec::new();
        loop {
            let (_, produced, status) = decoder.decompress(&[], &mut buf).unwrap();
            out.extend_from_slice(&buf[..produced]);
            if status == DecompressStatus::Done {
                break;
            }
        }
        assert_eq!(out, b"shared data");
    }

    #[test]
    fn test_truncated_header_needs_input() {
        let mut decoder = ZlibDecoder::new();
        let mut buf = [0u8; 16];
        let (consumed, produced, status) = decoder.decompress(&[0x78], &mut buf).unwrap();
        assert_eq!((consumed, produced), (1, 0));
        assert_eq!(status, DecompressStatus::NeedsInput);

        // The second byte completes the header.
        let (_, _, status) = decoder.decompress(&[0x9C], &mut buf).unwrap();
        assert_eq!(status, DecompressStatus::NeedsInput);
    }

    #[test]
    fn test_sync_flush_returns_with_one_marker() {
        let mut encoder = ZlibEncoder::with_level(CompressionLevel::DEFAULT);
        let mut buf = [0u8; 4096];
        let (_, produced, status) = encoder
            .compress(b"flushed once", &mut buf, FlushMode::Sync)
            .unwrap();
        assert_eq!(status, CompressStatus::NeedsInput);

        // The flushed data ends on the empty stored block, and only one
        // such marker was written.
        let out = &buf[..produced];
        assert_eq!(out[out.len() - 4..], [0x00, 0x00, 0xFF, 0xFF]);
        let markers = out
            .windows(4)
            .filter(|w| **w == [0x00, 0x00, 0xFF, 0xFF])
            .count();
        assert_eq!(markers, 1);

        // A second flush with no input is its own marker, not a hang.
        let (_, produced, _) = encoder.compress(&[], &mut buf, FlushMode::Sync).unwrap();
        assert_eq!(buf[..produced], [0x00, 0x00, 0x00, 0xFF, 0xFF]);
    }

    #[test]
    fn test_leftover_after_stream_end() {
        let first = zlib_compress(b"stream one", 6).unwrap();
        let second = zlib_compress(b"stream two", 6).unwrap();
        let mut joined = first.clone();
        joined.extend_from_slice(&second);

        // One call consumes everything, but the second stream survives.
        let mut decoder = ZlibDecoder::new();
        let out = decoder.decompress_all(&joined).unwrap();
        assert_eq!(out, b"stream one");
        let leftover = decoder.take_leftover();
        assert_eq!(leftover, second);

        decoder.reset();
        assert_eq!(decoder.decompress_all(&leftover).unwrap(), b"stream two");
        assert!(decoder.take_leftover().is_empty());
    }

    #[test]
    fn test_totals() {
        let data = vec![7u8; 4096];
        let mut encoder = ZlibEncoder::with_level(CompressionLevel::DEFAULT);
        let compressed = encoder.compress_all(&data).unwrap();
        assert_eq!(encoder.total_in(), data.len() as u64);
        assert_eq!(encoder.total_out(), compressed.len() as u64);

        let mut decoder = ZlibDecoder::new();
        let out = decoder.decompress_all(&compressed).unwrap();
        assert_eq!(out, data);
        assert_eq!(decoder.total_out(), data.len() as u64);
    }

    #[test]
    fn test_invalid_level_rejected() {
        assert!(ZlibEncoder::new(10).is_err());
        assert!(ZlibEncoder::new(-1).is_ok());
    }
}
