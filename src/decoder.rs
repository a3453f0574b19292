//! Public API surface (C9) and error/state machine (C8).
//!
//! `PngDecoder` drives the whole pipeline: C2 (chunk reader) feeds C3
//! (header/palette interpreter) and C4 (inflate feeder); C4's byte stream
//! feeds C5 (filter reversal); C6 (Adam7 driver) sequences C5 per pass when
//! interlaced; C7 (row presenter) hands each reconstructed row to the
//! caller's sink.
use log::{debug, info};

use crate::chunk::ChunkReader;
use crate::constants::DEFAULT_MAX_ROW_BYTES;
use crate::enums::{ColorType, FilterMethod, InterlaceMethod};
use crate::error::{err, ErrorKind, PngError, Result};
use crate::filters::{pixel_byte_distance, reverse_row};
use crate::headers;
use crate::inflate::InflateFeeder;
use crate::interlace::ADAM7_PASSES;
use crate::options::DecodeOptions;
use crate::row::RowDescriptor;
use crate::source::DataSource;
use crate::state::{AncillaryMetadata, DecoderState, DerivedGeometry, ImageHeader, TransparentColor};

#[cfg(feature = "std")]
use crate::source::{FileSource, FlashSource, RamSource};
#[cfg(not(feature = "std"))]
use crate::source::{FlashSource, RamSource};

/// Lifecycle states (C8). Any call outside the allowed set for the
/// current state returns `ErrorKind::InvalidParameter` without mutating
/// state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DecoderPhase {
    Uninitialized,
    Opened,
    Decoding,
    Done,
    Failed,
    Closed
}

/// What a completed `decode()` call tells the caller: whether every row
/// was delivered, or the sink asked to stop early. Both are success
/// outcomes: the draw sink's abort return is a clean termination, not
/// an error.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DecodeOutcome {
    Completed,
    Aborted
}

/// Returned by the draw sink to request the decoder keep going or stop.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SinkControl {
    Continue,
    Abort
}

pub struct PngDecoder<S, const ROW_CAP: usize = DEFAULT_MAX_ROW_BYTES> {
    phase:      DecoderPhase,
    source:     S,
    options:    DecodeOptions,
    header:     Option<ImageHeader>,
    geometry:   Option<DerivedGeometry>,
    ancillary:  AncillaryMetadata,
    arenas:     DecoderState<ROW_CAP>,
    trns:       TransparentColor,
    last_error: Option<PngError>
}

impl<'a, const ROW_CAP: usize> PngDecoder<RamSource<'a>, ROW_CAP> {
    /// `openRAM`: bind to an in-memory buffer.
    pub fn open_ram(data: &'a [u8], options: DecodeOptions) -> PngDecoder<RamSource<'a>, ROW_CAP> {
        PngDecoder::new(RamSource::new(data), options)
    }
}

impl<'a, const ROW_CAP: usize> PngDecoder<FlashSource<'a>, ROW_CAP> {
    /// `openFLASH`: bind to a read-only flash-resident buffer.
    pub fn open_flash(data: &'a [u8], options: DecodeOptions) -> PngDecoder<FlashSource<'a>, ROW_CAP> {
        PngDecoder::new(FlashSource::new(data), options)
    }
}

#[cfg(feature = "std")]
impl<T: std::io::Read + std::io::Seek, const ROW_CAP: usize> PngDecoder<FileSource<T>, ROW_CAP> {
    /// `openFile`: bind to a host file handle (or anything `Read + Seek`).
    pub fn open_file(handle: T, options: DecodeOptions) -> Result<PngDecoder<FileSource<T>, ROW_CAP>> {
        Ok(PngDecoder::new(FileSource::new(handle)?, options))
    }
}

impl<S: DataSource, const ROW_CAP: usize> PngDecoder<S, ROW_CAP> {
    fn new(source: S, options: DecodeOptions) -> PngDecoder<S, ROW_CAP> {
        PngDecoder {
            phase: DecoderPhase::Opened,
            source,
            options,
            header: None,
            geometry: None,
            ancillary: AncillaryMetadata::new(),
            arenas: DecoderState::new(),
            trns: TransparentColor::None,
            last_error: None
        }
    }

    /// Drive the decoder to completion, invoking `sink` once per delivered
    /// row. Re-entering the decoder from within `sink` has no way to happen:
    /// `sink` does not receive `&mut self`.
    pub fn decode(&mut self, mut sink: impl FnMut(&RowDescriptor) -> SinkControl) -> Result<DecodeOutcome> {
        if self.phase != DecoderPhase::Opened {
            return err!(InvalidParameter, "decode() called outside the Opened state");
        }
        self.phase = DecoderPhase::Decoding;

        match self.run_decode(&mut sink) {
            Ok(outcome) => {
                self.phase = DecoderPhase::Done;
                Ok(outcome)
            }
            Err(e) => {
                self.phase = DecoderPhase::Failed;
                self.last_error = Some(e);
                Err(e)
            }
        }
    }

    fn run_decode(&mut self, sink: &mut impl FnMut(&RowDescriptor) -> SinkControl) -> Result<DecodeOutcome> {
        let mut reader = ChunkReader::new(&mut self.source, self.options.check_crc());
        reader.read_signature()?;

        let mut feeder = InflateFeeder::new();

        loop {
            let chunk = reader.begin_chunk()?;
            match chunk.kind {
                crate::enums::ChunkKind::Ihdr => {
                    let header = headers::parse_ihdr(&mut reader, &chunk, &self.options)?;
                    let geometry = DerivedGeometry::for_width(&header, header.width);
                    if geometry.row_pitch + 1 > ROW_CAP {
                        return err!(MemError, "image row does not fit the configured scratch arena");
                    }
                    self.header = Some(header);
                    self.geometry = Some(geometry);
                }
                crate::enums::ChunkKind::Plte => {
                    headers::parse_plte(&mut reader, &chunk, &mut self.arenas.palette)?;
                }
                crate::enums::ChunkKind::Trns => {
                    let header = self.header.ok_or_else(missing_ihdr)?;
                    self.trns = headers::parse_trns(&mut reader, &chunk, &header, &mut self.arenas.palette)?;
                }
                crate::enums::ChunkKind::Phys => headers::parse_phys(&mut reader, &chunk, &mut self.ancillary)?,
                crate::enums::ChunkKind::Time => headers::parse_time(&mut reader, &chunk, &mut self.ancillary)?,
                crate::enums::ChunkKind::Gama => headers::parse_gama(&mut reader, &chunk, &mut self.ancillary)?,
                crate::enums::ChunkKind::Exif => headers::parse_exif(&mut reader, &chunk, &mut self.ancillary)?,
                crate::enums::ChunkKind::Idat => {
                    let header = self.header.ok_or_else(missing_ihdr)?;
                    if header.color_type == ColorType::Indexed && self.arenas.palette.is_empty() {
                        return err!(DecodeError, "indexed image has no PLTE before IDAT");
                    }
                    while reader.remaining() > 0 {
                        let mut scratch = [0u8; 512];
                        let n = scratch.len().min(reader.remaining() as usize);
                        reader.read_payload(&mut scratch[..n])?;
                        feeder.feed(&scratch[..n]);
                    }
                    reader.finish_chunk()?;
                }
                crate::enums::ChunkKind::Iend => {
                    reader.finish_chunk()?;
                    break;
                }
                crate::enums::ChunkKind::Other(tag) => {
                    debug!("skipping unrecognized ancillary chunk {tag:?}");
                    reader.skip_remaining()?;
                    reader.finish_chunk()?;
                }
            }
        }

        let header = self.header.ok_or_else(missing_ihdr)?;
        let geometry = self.geometry.ok_or_else(missing_ihdr)?;

        feeder.set_expected_total(expected_decompressed_size(&header, &geometry));
        feeder.finish_feeding()?;

        info!("decoding {}x{} interlace={:?}", header.width, header.height, header.interlace);

        match header.interlace {
            InterlaceMethod::None => self.decode_plain(&header, &geometry, &mut feeder, sink),
            InterlaceMethod::Adam7 => self.decode_adam7(&header, &mut feeder, sink)
        }
    }

    fn decode_plain(
        &mut self, header: &ImageHeader, geometry: &DerivedGeometry, feeder: &mut InflateFeeder,
        sink: &mut impl FnMut(&RowDescriptor) -> SinkControl
    ) -> Result<DecodeOutcome> {
        let dist = pixel_byte_distance(geometry.bits_per_pixel);
        let filtered_len = geometry.filtered_row_len();

        for y in 0..header.height {
            let is_first = y == 0;
            let control =
                self.decode_one_row(header, geometry, feeder, dist, filtered_len, header.width, y, is_first, 0, 0, 1, sink)?;
            if control == SinkControl::Abort {
                return Ok(DecodeOutcome::Aborted);
            }
        }
        Ok(DecodeOutcome::Completed)
    }

    fn decode_adam7(
        &mut self, header: &ImageHeader, feeder: &mut InflateFeeder, sink: &mut impl FnMut(&RowDescriptor) -> SinkControl
    ) -> Result<DecodeOutcome> {
        for pass in ADAM7_PASSES {
            let (pass_w, pass_h) = pass.dimensions(header.width as usize, header.height as usize);
            if pass_w == 0 || pass_h == 0 {
                continue;
            }

            let pass_geometry = DerivedGeometry::for_width(header, pass_w as u32);
            if pass_geometry.row_pitch + 1 > ROW_CAP {
                return err!(MemError, "Adam7 pass row does not fit the configured scratch arena");
            }
            let dist = pixel_byte_distance(pass_geometry.bits_per_pixel);
            let filtered_len = pass_geometry.filtered_row_len();

            for py in 0..pass_h {
                let (_, out_y) = pass.place(0, py);
                let is_first = py == 0;
                let control = self.decode_one_row(
                    header,
                    &pass_geometry,
                    feeder,
                    dist,
                    filtered_len,
                    pass_w as u32,
                    out_y as u32,
                    is_first,
                    pass.index,
                    pass.x_start,
                    pass.x_stride,
                    sink
                )?;
                if control == SinkControl::Abort {
                    return Ok(DecodeOutcome::Aborted);
                }
            }
        }
        Ok(DecodeOutcome::Completed)
    }

    #[allow(clippy::too_many_arguments)]
    fn decode_one_row(
        &mut self, header: &ImageHeader, geometry: &DerivedGeometry, feeder: &mut InflateFeeder, dist: usize,
        filtered_len: usize, width: u32, out_y: u32, is_first_row: bool, pass: u8, x_start: usize, x_stride: usize,
        sink: &mut impl FnMut(&RowDescriptor) -> SinkControl
    ) -> Result<SinkControl> {
        let mut filtered = [0u8; ROW_CAP];
        feeder.drain_exact(&mut filtered[..filtered_len])?;

        let filter_tag = filtered[0];
        let filter = FilterMethod::from_u8(filter_tag).ok_or_else(|| {
            PngError::new(ErrorKind::DecodeError, "unknown scanline filter byte")
        })?;
        let raw = &filtered[1..filtered_len];

        let prev = self.arenas.previous;
        reverse_row(filter, &prev[..geometry.row_pitch], raw, &mut self.arenas.current[..geometry.row_pitch], dist, is_first_row);

        // expand sub-byte samples (1/2/4-bit grayscale or indexed) to one
        // byte per sample so the row presenter always sees byte-aligned
        // pixels.
        let expanded_len = width as usize * usize::from(geometry.channels);
        let mut expanded = [0u8; ROW_CAP];
        expand_samples(header, &self.arenas.current[..geometry.row_pitch], &mut expanded[..expanded_len]);

        self.arenas.previous[..geometry.row_pitch].copy_from_slice(&self.arenas.current[..geometry.row_pitch]);

        let rgb565_table = if self.options.fast_palette() && header.color_type == ColorType::Indexed {
            let mut table = [0u16; 256];
            crate::row::build_rgb565_palette(&self.arenas.palette, &mut table);
            Some(table)
        } else {
            None
        };

        let descriptor = RowDescriptor {
            y: out_y,
            width,
            pitch: expanded_len,
            pixel_type: header.color_type,
            bits_per_pixel: usize::from(geometry.channels) * 8,
            has_alpha: header.color_type.has_alpha(),
            palette: if self.arenas.palette.is_empty() { None } else { Some(&self.arenas.palette) },
            rgb565_palette: rgb565_table.as_ref(),
            pixels: &expanded[..expanded_len],
            pass,
            x_start,
            x_stride
        };

        Ok(sink(&descriptor))
    }

    pub fn close(&mut self) {
        self.phase = DecoderPhase::Closed;
    }

    pub fn last_error(&self) -> Option<&PngError> {
        self.last_error.as_ref()
    }

    pub fn phase(&self) -> DecoderPhase {
        self.phase
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.header.map(|h| (h.width, h.height))
    }

    pub fn bits_per_pixel(&self) -> Option<usize> {
        self.geometry.map(|g| g.bits_per_pixel)
    }

    pub fn has_alpha(&self) -> Option<bool> {
        self.header.map(|h| h.color_type.has_alpha())
    }

    pub fn is_interlaced(&self) -> Option<bool> {
        self.header.map(|h| h.interlace == InterlaceMethod::Adam7)
    }

    pub fn pixel_type(&self) -> Option<ColorType> {
        self.header.map(|h| h.color_type)
    }

    pub fn transparent_color(&self) -> TransparentColor {
        self.trns
    }

    pub fn palette(&self) -> Option<&crate::state::Palette> {
        if self.arenas.palette.is_empty() {
            None
        } else {
            Some(&self.arenas.palette)
        }
    }

    pub fn ancillary(&self) -> &AncillaryMetadata {
        &self.ancillary
    }

    pub const fn buffer_size(&self) -> usize {
        ROW_CAP
    }
}

fn missing_ihdr() -> PngError {
    PngError::new(ErrorKind::DecodeError, "chunk encountered before IHDR")
}

/// Total bytes the inflate feeder must produce: `height * (1 + pitch)` for
/// a non-interlaced image, or the sum over the seven Adam7 passes of
/// `passHeight * (1 + passPitch)`.
fn expected_decompressed_size(header: &ImageHeader, geometry: &DerivedGeometry) -> usize {
    match header.interlace {
        InterlaceMethod::None => header.height as usize * geometry.filtered_row_len(),
        InterlaceMethod::Adam7 => {
            let mut total = 0usize;
            for pass in ADAM7_PASSES {
                let (pass_w, pass_h) = pass.dimensions(header.width as usize, header.height as usize);
                if pass_w == 0 || pass_h == 0 {
                    continue;
                }
                let pass_geometry = DerivedGeometry::for_width(header, pass_w as u32);
                total += pass_h * pass_geometry.filtered_row_len();
            }
            total
        }
    }
}

/// Expand a row of possibly sub-byte samples (`bit_depth` 1/2/4, always
/// one channel: grayscale or palette index) to one byte per sample.
/// Grayscale samples are scaled to fill the 0..=255 range; indexed samples
/// are left as raw index bytes. 8-bit rows are a straight copy.
fn expand_samples(header: &ImageHeader, src: &[u8], dst: &mut [u8]) {
    if header.bit_depth == 8 {
        dst.copy_from_slice(src);
        return;
    }

    let scale = if header.color_type == ColorType::Grayscale {
        crate::constants::GRAY_DEPTH_SCALE[usize::from(header.bit_depth)]
    } else {
        1
    };

    let depth = usize::from(header.bit_depth);
    let mask = (1u16 << depth) - 1;

    for (i, out) in dst.iter_mut().enumerate() {
        let bit_offset = i * depth;
        let byte_index = bit_offset / 8;
        let shift = 8 - depth - (bit_offset % 8);
        let sample = (u16::from(src[byte_index]) >> shift) & mask;
        *out = (sample as u8).wrapping_mul(scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_size_matches_plain_formula() {
        let header = ImageHeader { width: 4, height: 3, bit_depth: 8, color_type: ColorType::TrueColor, interlace: InterlaceMethod::None };
        let geometry = DerivedGeometry::for_width(&header, header.width);
        // width=4, channels=3, bpp=24 -> pitch=12, filtered_len=13, *3 rows = 39
        assert_eq!(expected_decompressed_size(&header, &geometry), 39);
    }

    #[test]
    fn expand_samples_one_bit_scales_to_extremes() {
        let header = ImageHeader { width: 8, height: 1, bit_depth: 1, color_type: ColorType::Grayscale, interlace: InterlaceMethod::None };
        let src = [0b1010_1010u8];
        let mut dst = [0u8; 8];
        expand_samples(&header, &src, &mut dst);
        assert_eq!(dst, [0xFF, 0, 0xFF, 0, 0xFF, 0, 0xFF, 0]);
    }

    #[test]
    fn expand_samples_indexed_keeps_raw_index() {
        let header = ImageHeader { width: 4, height: 1, bit_depth: 2, color_type: ColorType::Indexed, interlace: InterlaceMethod::None };
        let src = [0b01_10_11_00u8];
        let mut dst = [0u8; 4];
        expand_samples(&header, &src, &mut dst);
        assert_eq!(dst, [0b01, 0b10, 0b11, 0b00]);
    }
}
