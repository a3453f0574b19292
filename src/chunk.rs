//! Chunk reader (C2): walks `length|type|data|crc` records off a
//! [`DataSource`], optionally verifying each chunk's trailing CRC-32, and
//! enforces the chunk-ordering rules the PNG spec requires. Chunk payloads are pulled through
//! the small fixed read buffer rather than materialized whole, so an IDAT
//! chunk of any length never needs a buffer sized to hold it.
use crate::constants::{MAX_CHUNK_LENGTH, PNG_SIGNATURE};
use crate::crc::Crc32;
use crate::enums::ChunkKind;
use crate::error::{err, Result};
use crate::source::DataSource;

#[derive(Copy, Clone, Debug)]
pub struct ChunkHeader {
    pub length: u32,
    pub tag:    [u8; 4],
    pub kind:   ChunkKind
}

pub struct ChunkReader<'src, S: DataSource> {
    source:      &'src mut S,
    check_crc:   bool,
    remaining:   u32,
    crc:         Crc32,
    seen_ihdr:   bool,
    seen_idat:   bool,
    seen_iend:   bool
}

impl<'src, S: DataSource> ChunkReader<'src, S> {
    pub fn new(source: &'src mut S, check_crc: bool) -> ChunkReader<'src, S> {
        ChunkReader { source, check_crc, remaining: 0, crc: Crc32::new(), seen_ihdr: false, seen_idat: false, seen_iend: false }
    }

    /// Consume and validate the 8-byte PNG signature. Must be the first
    /// call made on a freshly opened source.
    pub fn read_signature(&mut self) -> Result<()> {
        let mut sig = [0u8; 8];
        self.read_exact_raw(&mut sig)?;
        if sig != PNG_SIGNATURE {
            return err!(InvalidFile, "signature mismatch, not a PNG stream");
        }
        Ok(())
    }

    /// Start the next chunk: reads the 4-byte length and 4-byte type tag,
    /// enforces the length cap and the IHDR-first/IEND-terminates ordering
    /// rules, and resets the running CRC to cover this chunk's `type||data`.
    pub fn begin_chunk(&mut self) -> Result<ChunkHeader> {
        if self.seen_iend {
            return err!(DecodeError, "chunk encountered after IEND");
        }

        let mut header_bytes = [0u8; 8];
        self.read_exact_raw(&mut header_bytes)?;

        let length = u32::from_be_bytes([header_bytes[0], header_bytes[1], header_bytes[2], header_bytes[3]]);
        if length > MAX_CHUNK_LENGTH {
            return err!(InvalidFile, "chunk length exceeds 2^31-1");
        }

        let tag = [header_bytes[4], header_bytes[5], header_bytes[6], header_bytes[7]];
        let kind = ChunkKind::from_tag(tag);

        if !self.seen_ihdr && kind != ChunkKind::Ihdr {
            return err!(DecodeError, "first chunk is not IHDR");
        }
        if self.seen_ihdr && kind == ChunkKind::Ihdr {
            return err!(DecodeError, "duplicate IHDR chunk");
        }

        match kind {
            ChunkKind::Ihdr => self.seen_ihdr = true,
            ChunkKind::Idat => self.seen_idat = true,
            ChunkKind::Plte | ChunkKind::Trns if self.seen_idat => {
                return err!(DecodeError, "PLTE/tRNS must precede the first IDAT");
            }
            ChunkKind::Iend => self.seen_iend = true,
            _ => {}
        }

        if !ChunkKind::is_ancillary(tag) && matches!(kind, ChunkKind::Other(_)) {
            return err!(UnsupportedFeature, "unknown critical chunk");
        }

        self.remaining = length;
        self.crc = Crc32::new();
        self.crc.update(&tag);

        Ok(ChunkHeader { length, tag, kind })
    }

    /// Read up to `buf.len()` bytes of the current chunk's payload,
    /// returning how many were read (`0` once the payload is exhausted).
    pub fn read_payload(&mut self, buf: &mut [u8]) -> Result<usize> {
        let want = buf.len().min(self.remaining as usize);
        if want == 0 {
            return Ok(0);
        }
        self.read_exact_raw(&mut buf[..want])?;
        self.crc.update(&buf[..want]);
        self.remaining -= want as u32;
        Ok(want)
    }

    /// Read exactly `buf.len()` bytes of payload; errors if the chunk has
    /// fewer bytes remaining than requested.
    pub fn read_payload_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if (self.remaining as usize) < buf.len() {
            return err!(InvalidFile, "chunk shorter than its declared fixed layout");
        }
        self.read_exact_raw(buf)?;
        self.crc.update(buf);
        self.remaining -= buf.len() as u32;
        Ok(())
    }

    /// Discard whatever payload bytes remain, via a small stack buffer, so
    /// callers never need a buffer sized to the chunk.
    pub fn skip_remaining(&mut self) -> Result<()> {
        let mut scratch = [0u8; 256];
        while self.remaining > 0 {
            let want = scratch.len().min(self.remaining as usize);
            self.read_payload(&mut scratch[..want])?;
        }
        Ok(())
    }

    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Read the trailing 4-byte CRC and, when enabled, verify it against
    /// the running accumulator covering this chunk's `type||data`.
    pub fn finish_chunk(&mut self) -> Result<()> {
        if self.remaining != 0 {
            return err!(DecodeError, "chunk payload not fully consumed before CRC");
        }
        let mut crc_bytes = [0u8; 4];
        self.read_exact_raw(&mut crc_bytes)?;

        if self.check_crc {
            let expected = u32::from_be_bytes(crc_bytes);
            let actual = self.crc.finalize();
            if expected != actual {
                return err!(DecodeError, "chunk CRC mismatch");
            }
        }
        Ok(())
    }

    fn read_exact_raw(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.source.read(&mut buf[filled..])?;
            if n == 0 {
                return err!(InvalidFile, "unexpected end of stream");
            }
            filled += n;
        }
        Ok(())
    }
}
