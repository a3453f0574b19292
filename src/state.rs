//! The data model: parsed header geometry, palette, and the
//! decoder's fixed-capacity scratch arenas.
use crate::constants::{DEFAULT_MAX_ROW_BYTES, MAX_PALETTE_ENTRIES};
use crate::enums::{ColorType, InterlaceMethod};

/// One RGB palette entry.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RgbEntry {
    pub r: u8,
    pub g: u8,
    pub b: u8
}

/// An ordered sequence of up to 256 RGB triplets plus an optional parallel
/// alpha byte per entry (populated from `tRNS` for indexed images; entries
/// with no supplied alpha default to fully opaque, per spec).
#[derive(Copy, Clone)]
pub struct Palette {
    entries: [RgbEntry; MAX_PALETTE_ENTRIES],
    alpha:   [u8; MAX_PALETTE_ENTRIES],
    len:     usize
}

impl Palette {
    pub const fn empty() -> Palette {
        Palette { entries: [RgbEntry { r: 0, g: 0, b: 0 }; MAX_PALETTE_ENTRIES], alpha: [0xFF; MAX_PALETTE_ENTRIES], len: 0 }
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn set_len(&mut self, len: usize) {
        self.len = len;
    }

    pub fn entries(&self) -> &[RgbEntry] {
        &self.entries[..self.len]
    }

    pub fn entry_mut(&mut self, index: usize) -> &mut RgbEntry {
        &mut self.entries[index]
    }

    pub fn alpha(&self) -> &[u8] {
        &self.alpha[..self.len]
    }

    pub fn set_alpha(&mut self, index: usize, value: u8) {
        self.alpha[index] = value;
    }

    /// Reset every alpha entry to fully opaque; called when a fresh PLTE
    /// chunk is parsed, before any tRNS overrides are applied.
    pub fn reset_alpha(&mut self) {
        self.alpha = [0xFF; MAX_PALETTE_ENTRIES];
    }
}

impl Default for Palette {
    fn default() -> Palette {
        Palette::empty()
    }
}

/// The scalar transparent-color carried by a `tRNS` chunk for non-indexed
/// color types.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TransparentColor {
    None,
    Gray(u16),
    Rgb(u16, u16, u16)
}

/// Derived from `IHDR`. Invariant: `color_type.allows_depth(bit_depth)`
/// must hold; the header interpreter rejects any combination that doesn't.
#[derive(Copy, Clone, Debug, Default)]
pub struct ImageHeader {
    pub width:      u32,
    pub height:     u32,
    pub bit_depth:  u8,
    pub color_type: ColorType,
    pub interlace:  InterlaceMethod
}

/// Geometry derived from [`ImageHeader`]: bits per pixel, channel
/// count, and the filtered-row pitch (pixel bytes, *not* counting the
/// leading filter-tag byte).
#[derive(Copy, Clone, Debug, Default)]
pub struct DerivedGeometry {
    pub bits_per_pixel: usize,
    pub channels:       u8,
    pub row_pitch:      usize
}

impl DerivedGeometry {
    pub fn for_width(header: &ImageHeader, width: u32) -> DerivedGeometry {
        let channels = header.color_type.channels();
        let bits_per_pixel = usize::from(header.bit_depth) * usize::from(channels);
        let row_pitch = (usize::try_from(width).unwrap_or(0) * bits_per_pixel + 7) / 8;

        DerivedGeometry { bits_per_pixel, channels, row_pitch }
    }

    /// Bytes of a filtered scanline including the leading filter-tag byte.
    pub const fn filtered_row_len(&self) -> usize {
        self.row_pitch + 1
    }
}

/// Fixed-capacity scratch arenas the decoder owns for its entire lifetime,
/// used in place of dynamic allocation. `ROW_CAP` bounds how wide a
/// scanline (filter byte plus pixel bytes) this instance can ever process;
/// wider images fail with [`crate::error::ErrorKind::TooBig`] or
/// [`crate::error::ErrorKind::MemError`] rather than growing a buffer.
pub struct DecoderState<const ROW_CAP: usize = DEFAULT_MAX_ROW_BYTES> {
    pub(crate) current:  [u8; ROW_CAP],
    pub(crate) previous: [u8; ROW_CAP],
    pub(crate) palette:  Palette
}

impl<const ROW_CAP: usize> DecoderState<ROW_CAP> {
    pub const fn new() -> DecoderState<ROW_CAP> {
        DecoderState { current: [0; ROW_CAP], previous: [0; ROW_CAP], palette: Palette::empty() }
    }
}

impl<const ROW_CAP: usize> Default for DecoderState<ROW_CAP> {
    fn default() -> DecoderState<ROW_CAP> {
        DecoderState::new()
    }
}

/// Timestamp carried by an optional `tIME` chunk: purely informational,
/// never affects decoded pixels.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TimeInfo {
    pub year:   u16,
    pub month:  u8,
    pub day:    u8,
    pub hour:   u8,
    pub minute: u8,
    pub second: u8
}

/// Physical pixel density carried by an optional `pHYs` chunk.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PhysicalDimensions {
    pub pixels_per_unit_x: u32,
    pub pixels_per_unit_y: u32,
    pub unit_is_meter:     bool
}

/// Informational-only ancillary metadata that never influences decoded
/// pixels. `exif` is a bounded raw-byte capture: EXIF
/// blobs larger than the capacity are simply not captured, since retaining
/// them isn't worth growing the decoder's fixed working set for metadata
/// nobody asked this crate to interpret.
#[derive(Copy, Clone, Default)]
pub struct AncillaryMetadata {
    pub physical_dimensions: Option<PhysicalDimensions>,
    pub time:                Option<TimeInfo>,
    pub gamma:                Option<f32>,
    exif_buf:                 [u8; 64],
    exif_len:                 usize
}

impl AncillaryMetadata {
    pub const fn new() -> AncillaryMetadata {
        AncillaryMetadata { physical_dimensions: None, time: None, gamma: None, exif_buf: [0; 64], exif_len: 0 }
    }

    pub fn set_exif(&mut self, data: &[u8]) {
        let n = data.len().min(self.exif_buf.len());
        self.exif_buf[..n].copy_from_slice(&data[..n]);
        self.exif_len = n;
    }

    /// The captured prefix of the `eXIf` payload, or an empty slice if no
    /// `eXIf` chunk was seen (or it exceeded the capture capacity).
    pub fn exif(&self) -> &[u8] {
        &self.exif_buf[..self.exif_len]
    }
}
