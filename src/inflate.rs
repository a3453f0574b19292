//! Inflate feeder (C4): turns the concatenated `IDAT` payload into a
//! filtered-pixel byte stream the rest of the pipeline can pull from a
//! scanline at a time.
//!
//! The actual DEFLATE/zlib state machine is provided by `zune_inflate`, a
//! real streaming-inflate engine whose public contract is whole-buffer
//! (`decode_zlib` takes the full compressed input and hands back the full
//! decompressed output). This feeder wraps that contract behind the
//! pull-based `feed`/`drain` shape the rest of the decoder expects, by
//! accumulating IDAT bytes into a `Vec<u8>` and decoding once `finish_feeding`
//! is called. Accumulating the (much smaller) compressed bytes is the one
//! place this crate does not avoid heap allocation.
use alloc::vec::Vec;

use crate::error::{err, Result};

pub struct InflateFeeder {
    compressed:     Vec<u8>,
    decoded:        Option<Vec<u8>>,
    cursor:         usize,
    expected_total: usize
}

impl InflateFeeder {
    pub fn new() -> InflateFeeder {
        InflateFeeder { compressed: Vec::new(), decoded: None, cursor: 0, expected_total: 0 }
    }

    /// Append one IDAT chunk's payload bytes. IDAT payloads may be split
    /// across consecutive chunks; the PNG format requires they be treated
    /// as one logical zlib stream, so callers just keep appending.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.compressed.extend_from_slice(bytes);
    }

    /// Total decompressed byte count the caller expects (sum over passes
    /// of `passHeight * (1 + passPitch)`, or `height * (1 + pitch)` for a
    /// non-interlaced image). Enforced once inflate completes.
    pub fn set_expected_total(&mut self, total: usize) {
        self.expected_total = total;
    }

    /// Run the DEFLATE engine to completion over everything fed so far.
    /// Must be called once, after every IDAT chunk has been fed and before
    /// the first `drain`.
    pub fn finish_feeding(&mut self) -> Result<()> {
        let mut decoder = zune_inflate::DeflateDecoder::new(&self.compressed);
        let decoded = decoder.decode_zlib()?;

        if decoded.len() < self.expected_total {
            return err!(DecodeError, "truncated IDAT stream: fewer bytes than the image needs");
        }

        self.decoded = Some(decoded);
        Ok(())
    }

    /// Pull exactly `buf.len()` decompressed bytes, or error if the stream
    /// is exhausted first (which `finish_feeding`'s length check should
    /// already have ruled out for any in-bounds request).
    pub fn drain_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let decoded = self
            .decoded
            .as_ref()
            .ok_or_else(|| crate::error::PngError::new(crate::error::ErrorKind::DecodeError, "drain called before inflate finished"))?;

        let end = self.cursor + buf.len();
        if end > decoded.len() {
            return err!(DecodeError, "inflate stream exhausted before the expected total size");
        }
        buf.copy_from_slice(&decoded[self.cursor..end]);
        self.cursor = end;
        Ok(())
    }
}

impl Default for InflateFeeder {
    fn default() -> InflateFeeder {
        InflateFeeder::new()
    }
}
