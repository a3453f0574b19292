//! Decode-time options bitset.
//!
//! Mirrors the `optionsBitset` parameter of `decode()`: a plain `u32`
//! newtype with `const` flags rather than a derive-heavy bitflags type,
//! since this crate avoids pulling in extra dependencies for something
//! this small.
use crate::constants::DEFAULT_MAX_ROW_BYTES;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DecodeOptions {
    flags:      u32,
    max_width:  usize,
    max_height: usize
}

impl DecodeOptions {
    /// Verify the trailing CRC-32 of every chunk (C2). Costs one pass over
    /// the chunk payload per chunk.
    pub const CHECK_CRC: u32 = 1 << 0;
    /// Ask the row presenter (C7) to build and use a precomputed 256-entry
    /// RGB565 palette instead of converting each indexed pixel individually.
    pub const FAST_PALETTE: u32 = 1 << 1;

    pub const fn new() -> DecodeOptions {
        DecodeOptions {
            flags:      Self::CHECK_CRC,
            max_width:  DEFAULT_MAX_ROW_BYTES * 8,
            max_height: usize::MAX
        }
    }

    pub const fn with_flags(mut self, flags: u32) -> DecodeOptions {
        self.flags = flags;
        self
    }

    pub const fn with_max_dimensions(mut self, max_width: usize, max_height: usize) -> DecodeOptions {
        self.max_width = max_width;
        self.max_height = max_height;
        self
    }

    pub const fn has(self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    pub const fn check_crc(self) -> bool {
        self.has(Self::CHECK_CRC)
    }

    pub const fn fast_palette(self) -> bool {
        self.has(Self::FAST_PALETTE)
    }

    pub const fn max_width(self) -> usize {
        self.max_width
    }

    pub const fn max_height(self) -> usize {
        self.max_height
    }
}

impl Default for DecodeOptions {
    fn default() -> DecodeOptions {
        DecodeOptions::new()
    }
}
