//! Compile-time limits that back the decoder's fixed-capacity scratch arenas.
//!
//! None of these can grow at runtime: they are the knobs a firmware build
//! tunes once for its target's RAM budget.

/// The eight magic bytes every PNG stream must open with.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Maximum number of palette entries a PLTE chunk may contribute.
pub const MAX_PALETTE_ENTRIES: usize = 256;

/// Default cap on bytes per filtered scanline (including the filter-type
/// tag byte) that the two scanline arenas are sized to. Images whose pitch
/// exceeds this fail open/decode with `ErrorKind::TooBig`, never by growing
/// a buffer.
pub const DEFAULT_MAX_ROW_BYTES: usize = 4096;

/// Chunk length cap mandated by the PNG spec (2^31 - 1).
pub const MAX_CHUNK_LENGTH: u32 = 0x7FFF_FFFF;

/// CRC-32 polynomial used by PNG, reflected form.
pub const CRC32_POLY_REFLECTED: u32 = 0xEDB8_8320;

/// Multiplier that scales a sub-8-bit grayscale sample to fill 0..=255,
/// indexed by `bit_depth` (e.g. a 1-bit sample of `1` becomes `0xFF`).
/// Applied identically to decoded pixel bytes and to a parsed `tRNS` gray
/// value, so the two stay comparable regardless of bit depth.
pub const GRAY_DEPTH_SCALE: [u8; 9] = [0, 0xFF, 0x55, 0, 0x11, 0, 0, 0, 0x01];
