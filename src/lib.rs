//! A streaming, allocation-free* PNG decoder for constrained and embedded
//! targets.
//!
//! Bind a source with [`PngDecoder::open_ram`], [`PngDecoder::open_flash`],
//! or (with the `std` feature) [`PngDecoder::open_file`], then call
//! [`PngDecoder::decode`] with a sink closure that receives one
//! [`row::RowDescriptor`] per scanline (or per Adam7 pass-row, for
//! interlaced images). The decoder's working set is two fixed-size
//! scanline arenas sized by the `ROW_CAP` const generic parameter plus a
//! small read-ahead buffer: no whole-image buffer is ever allocated.
//!
//! *The one exception is the internal inflate feeder, which accumulates the
//! compressed `IDAT` stream on the heap because the underlying DEFLATE
//! engine's contract is whole-buffer, not incremental.
#![cfg_attr(not(feature = "std"), no_std)]
extern crate alloc;

pub use crate::decoder::{DecodeOutcome, DecoderPhase, PngDecoder, SinkControl};
pub use crate::enums::{ChunkKind, ColorType, FilterMethod, InterlaceMethod};
pub use crate::error::{ErrorKind, PngError, Result};
pub use crate::options::DecodeOptions;
pub use crate::row::{Background, Endianness, RowDescriptor};
pub use crate::source::{DataSource, FlashSource, RamSource};
pub use crate::state::{AncillaryMetadata, Palette, PhysicalDimensions, RgbEntry, TimeInfo, TransparentColor};

#[cfg(feature = "std")]
pub use crate::source::FileSource;

mod chunk;
mod constants;
mod crc;
mod decoder;
mod enums;
pub mod error;
mod filters;
mod headers;
mod inflate;
mod interlace;
mod options;
pub mod row;
mod source;
mod state;
