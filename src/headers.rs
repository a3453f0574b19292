//! Header and palette interpreter (C3): `IHDR`, `PLTE`, `tRNS`, plus the
//! supplemented informational chunks `pHYs`, `tIME`, `gAMA`, `eXIf`.
use log::{info, warn};

use crate::chunk::{ChunkHeader, ChunkReader};
use crate::enums::ColorType;
use crate::error::{err, Result};
use crate::options::DecodeOptions;
use crate::source::DataSource;
use crate::state::{AncillaryMetadata, ImageHeader, Palette, PhysicalDimensions, TimeInfo, TransparentColor};

pub fn parse_ihdr<S: DataSource>(
    reader: &mut ChunkReader<S>, chunk: &ChunkHeader, options: &DecodeOptions
) -> Result<ImageHeader> {
    if chunk.length != 13 {
        return err!(InvalidFile, "IHDR length must be 13");
    }

    let mut body = [0u8; 13];
    reader.read_payload_exact(&mut body)?;

    let width = u32::from_be_bytes([body[0], body[1], body[2], body[3]]);
    let height = u32::from_be_bytes([body[4], body[5], body[6], body[7]]);

    if width == 0 || height == 0 {
        return err!(InvalidFile, "width or height is zero");
    }
    if (width as usize) > options.max_width() {
        return err!(TooBig, "image width exceeds configured maximum");
    }
    if (height as usize) > options.max_height() {
        return err!(TooBig, "image height exceeds configured maximum");
    }

    let bit_depth = body[8];
    let color_type = ColorType::from_u8(body[9]).ok_or_else(|| {
        crate::error::PngError::new(crate::error::ErrorKind::InvalidFile, "unknown IHDR color type")
    })?;

    if !color_type.allows_depth(bit_depth) {
        return err!(UnsupportedFeature, "bit depth not permitted for this color type");
    }
    if bit_depth == 16 {
        // declared supported by the color-type matrix, but this build's
        // fixed scanline arenas assume 8-bit-equivalent throughput:
        // treat as unimplemented.
        return err!(UnsupportedFeature, "16 bit-per-channel depth is not implemented");
    }

    if body[10] != 0 {
        return err!(InvalidFile, "unknown compression method");
    }
    if body[11] != 0 {
        return err!(InvalidFile, "unknown filter method");
    }

    let interlace = crate::enums::InterlaceMethod::from_u8(body[12])
        .ok_or_else(|| crate::error::PngError::new(crate::error::ErrorKind::InvalidFile, "unknown interlace method"))?;

    reader.finish_chunk()?;

    info!("IHDR: {width}x{height} depth={bit_depth} color={color_type:?} interlace={interlace:?}");

    Ok(ImageHeader { width, height, bit_depth, color_type, interlace })
}

pub fn parse_plte<S: DataSource>(reader: &mut ChunkReader<S>, chunk: &ChunkHeader, palette: &mut Palette) -> Result<()> {
    if chunk.length % 3 != 0 || chunk.length > 768 {
        return err!(InvalidFile, "PLTE length must be a multiple of 3, at most 768");
    }

    let count = chunk.length as usize / 3;
    palette.reset_alpha();
    palette.set_len(count);

    let mut rgb = [0u8; 3];
    for i in 0..count {
        reader.read_payload_exact(&mut rgb)?;
        let entry = palette.entry_mut(i);
        entry.r = rgb[0];
        entry.g = rgb[1];
        entry.b = rgb[2];
    }

    reader.finish_chunk()
}

pub fn parse_trns<S: DataSource>(
    reader: &mut ChunkReader<S>, chunk: &ChunkHeader, header: &ImageHeader, palette: &mut Palette
) -> Result<TransparentColor> {
    let result = match header.color_type {
        ColorType::Grayscale => {
            if chunk.length != 2 {
                return err!(InvalidFile, "grayscale tRNS must be 2 bytes");
            }
            let mut bytes = [0u8; 2];
            reader.read_payload_exact(&mut bytes)?;
            // stored in the same scaled 0..=255 domain the decoded pixel
            // bytes end up in, not the raw sub-8-bit sample value, so it
            // stays directly comparable to a decoded row's gray byte.
            let raw = u16::from_be_bytes(bytes);
            let scale = crate::constants::GRAY_DEPTH_SCALE[usize::from(header.bit_depth)];
            TransparentColor::Gray(u16::from((raw as u8).wrapping_mul(scale)))
        }
        ColorType::TrueColor => {
            if chunk.length != 6 {
                return err!(InvalidFile, "truecolor tRNS must be 6 bytes");
            }
            let mut bytes = [0u8; 6];
            reader.read_payload_exact(&mut bytes)?;
            TransparentColor::Rgb(
                u16::from_be_bytes([bytes[0], bytes[1]]),
                u16::from_be_bytes([bytes[2], bytes[3]]),
                u16::from_be_bytes([bytes[4], bytes[5]])
            )
        }
        ColorType::Indexed => {
            if palette.is_empty() {
                return err!(DecodeError, "tRNS chunk before PLTE");
            }
            if chunk.length as usize > palette.len() {
                return err!(InvalidFile, "tRNS has more entries than the palette");
            }
            let mut byte = [0u8];
            for i in 0..chunk.length as usize {
                reader.read_payload_exact(&mut byte)?;
                palette.set_alpha(i, byte[0]);
            }
            TransparentColor::None
        }
        ColorType::GrayscaleAlpha | ColorType::TrueColorAlpha => {
            return err!(DecodeError, "tRNS is invalid for a color type with an alpha channel");
        }
    };

    reader.finish_chunk()?;
    Ok(result)
}

pub fn parse_phys<S: DataSource>(reader: &mut ChunkReader<S>, chunk: &ChunkHeader, out: &mut AncillaryMetadata) -> Result<()> {
    if chunk.length != 9 {
        warn!("malformed pHYs chunk length {}, ignoring", chunk.length);
        reader.skip_remaining()?;
        return reader.finish_chunk();
    }
    let mut body = [0u8; 9];
    reader.read_payload_exact(&mut body)?;
    out.physical_dimensions = Some(PhysicalDimensions {
        pixels_per_unit_x: u32::from_be_bytes([body[0], body[1], body[2], body[3]]),
        pixels_per_unit_y: u32::from_be_bytes([body[4], body[5], body[6], body[7]]),
        unit_is_meter:     body[8] == 1
    });
    reader.finish_chunk()
}

pub fn parse_time<S: DataSource>(reader: &mut ChunkReader<S>, chunk: &ChunkHeader, out: &mut AncillaryMetadata) -> Result<()> {
    if chunk.length != 7 {
        warn!("malformed tIME chunk length {}, ignoring", chunk.length);
        reader.skip_remaining()?;
        return reader.finish_chunk();
    }
    let mut body = [0u8; 7];
    reader.read_payload_exact(&mut body)?;

    // defensive clamping rather than a hard error: a bad tIME never
    // affects pixels, so we keep decoding and just narrow the fields.
    out.time = Some(TimeInfo {
        year:   u16::from_be_bytes([body[0], body[1]]),
        month:  body[2] % 13,
        day:    body[3] % 32,
        hour:   body[4] % 24,
        minute: body[5] % 60,
        second: body[6] % 61
    });
    reader.finish_chunk()
}

pub fn parse_gama<S: DataSource>(reader: &mut ChunkReader<S>, chunk: &ChunkHeader, out: &mut AncillaryMetadata) -> Result<()> {
    if chunk.length != 4 {
        return err!(InvalidFile, "gAMA chunk length is not 4");
    }
    let mut body = [0u8; 4];
    reader.read_payload_exact(&mut body)?;

    let raw = u32::from_be_bytes(body);
    out.gamma = Some(if raw == 0 {
        warn!("gAMA value of 0 is invalid, reporting the PNG default of 1/2.2");
        1.0 / 2.2
    } else {
        raw as f32 / 100_000.0
    });
    reader.finish_chunk()
}

pub fn parse_exif<S: DataSource>(reader: &mut ChunkReader<S>, chunk: &ChunkHeader, out: &mut AncillaryMetadata) -> Result<()> {
    let mut captured = [0u8; 64];
    let n = chunk.length.min(captured.len() as u32) as usize;
    reader.read_payload_exact(&mut captured[..n])?;

    // recommended check: the payload should start with a TIFF byte-order
    // magic (II*\0 little-endian or MM\0* big-endian).
    let magic_ok = n >= 4 && (captured[..4] == [0x49, 0x49, 0x2A, 0x00] || captured[..4] == [0x4D, 0x4D, 0x00, 0x2A]);

    reader.skip_remaining()?;
    reader.finish_chunk()?;

    if !magic_ok {
        warn!("eXIf chunk missing TIFF byte-order magic, discarding");
        return Ok(());
    }
    out.set_exif(&captured[..n]);
    Ok(())
}
