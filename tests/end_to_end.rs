//! End-to-end scenarios against hand-built PNG byte streams. Every fixture
//! below is assembled at test time (CRC-32 and Adler-32 computed here, not
//! precomputed literals) using zlib "stored" (uncompressed) DEFLATE blocks,
//! since the fixtures are tiny and exercising the real compressor is not
//! the point of these tests -- the chunk/inflate-feeder/filter/interlace
//! pipeline is.
use nanopng::row::make_mask;
use nanopng::{ColorType, DecodeOptions, ErrorKind, PngDecoder, RamSource, SinkControl, TransparentColor};

const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

fn crc32(data: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
        }
    }
    !crc
}

fn adler32(data: &[u8]) -> u32 {
    const MODULO: u32 = 65521;
    let mut a: u32 = 1;
    let mut b: u32 = 0;
    for &byte in data {
        a = (a + u32::from(byte)) % MODULO;
        b = (b + a) % MODULO;
    }
    (b << 16) | a
}

/// Wrap `data` in a minimal one-block zlib stream (stored/uncompressed
/// DEFLATE), valid only for inputs up to 65535 bytes -- ample for every
/// fixture here.
fn zlib_stored(data: &[u8]) -> Vec<u8> {
    assert!(data.len() <= 0xFFFF);
    let mut out = Vec::new();
    out.extend_from_slice(&[0x78, 0x01]);
    out.push(0x01); // BFINAL=1, BTYPE=00 (stored)
    let len = data.len() as u16;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&(!len).to_le_bytes());
    out.extend_from_slice(data);
    out.extend_from_slice(&adler32(data).to_be_bytes());
    out
}

fn chunk(tag: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(tag);
    out.extend_from_slice(data);

    let mut covered = Vec::with_capacity(4 + data.len());
    covered.extend_from_slice(tag);
    covered.extend_from_slice(data);
    out.extend_from_slice(&crc32(&covered).to_be_bytes());
    out
}

fn ihdr_body(width: u32, height: u32, bit_depth: u8, color_type: u8, interlace: u8) -> Vec<u8> {
    let mut body = Vec::with_capacity(13);
    body.extend_from_slice(&width.to_be_bytes());
    body.extend_from_slice(&height.to_be_bytes());
    body.extend_from_slice(&[bit_depth, color_type, 0, 0, interlace]);
    body
}

/// Assemble a full PNG stream: signature, IHDR, optional PLTE/tRNS, one
/// IDAT holding `zlib_stored(raw_scanlines)`, IEND.
#[allow(clippy::too_many_arguments)]
fn build_png(
    width: u32, height: u32, bit_depth: u8, color_type: u8, interlace: u8, palette: Option<&[(u8, u8, u8)]>,
    trns: Option<&[u8]>, raw_scanlines: &[u8]
) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&SIGNATURE);
    out.extend_from_slice(&chunk(b"IHDR", &ihdr_body(width, height, bit_depth, color_type, interlace)));

    if let Some(entries) = palette {
        let mut data = Vec::with_capacity(entries.len() * 3);
        for &(r, g, b) in entries {
            data.extend_from_slice(&[r, g, b]);
        }
        out.extend_from_slice(&chunk(b"PLTE", &data));
    }
    if let Some(alpha) = trns {
        out.extend_from_slice(&chunk(b"tRNS", alpha));
    }

    out.extend_from_slice(&chunk(b"IDAT", &zlib_stored(raw_scanlines)));
    out.extend_from_slice(&chunk(b"IEND", &[]));
    out
}

#[test]
fn s1_opaque_red_truecolor() {
    let raw = [0u8, 255, 0, 0]; // filter None, R=255 G=0 B=0
    let png = build_png(1, 1, 8, 2, 0, None, None, &raw);

    let mut decoder: PngDecoder<RamSource> = PngDecoder::open_ram(&png, DecodeOptions::new());
    let mut rows: Vec<(u32, usize, Vec<u8>)> = Vec::new();
    decoder
        .decode(|row| {
            rows.push((row.width, row.bits_per_pixel, row.pixels.to_vec()));
            SinkControl::Continue
        })
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0], (1, 24, alloc_vec(&[255, 0, 0])));
}

fn alloc_vec(bytes: &[u8]) -> Vec<u8> {
    bytes.to_vec()
}

#[test]
fn s2_indexed_with_mask() {
    // 2x2, 1-bit indexed. Row 0 packs pixels {0,1} into bits 7,6 of one
    // byte; row 1 packs {1,0} the same way. Palette entry 0 is black,
    // entry 1 is white; tRNS makes entry 0 fully transparent.
    let row0 = [0u8, 0b0100_0000];
    let row1 = [0u8, 0b1000_0000];
    let raw: Vec<u8> = row0.iter().chain(row1.iter()).copied().collect();

    let palette = [(0u8, 0u8, 0u8), (255, 255, 255)];
    let trns = [0u8, 255];
    let png = build_png(2, 2, 1, 3, 0, Some(&palette), Some(&trns), &raw);

    let mut decoder: PngDecoder<RamSource> = PngDecoder::open_ram(&png, DecodeOptions::new());
    let mut rows: Vec<Vec<u8>> = Vec::new();
    let mut masks: Vec<u8> = Vec::new();

    decoder
        .decode(|row| {
            assert_eq!(row.bits_per_pixel, 8);
            assert_eq!(row.pixel_type, ColorType::Indexed);
            let mut mask = [0u8; 1];
            make_mask(row, 128, TransparentColor::None, &mut mask);
            masks.push(mask[0]);
            rows.push(row.pixels.to_vec());
            SinkControl::Continue
        })
        .unwrap();

    assert_eq!(rows, vec![vec![0, 1], vec![1, 0]]);
    // index 0 (alpha 0) never sets its bit; index 1 (alpha 255) always does.
    assert_eq!(masks[0], 0b0100_0000); // row 0: pixel0 transparent, pixel1 opaque
    assert_eq!(masks[1], 0b1000_0000); // row 1: pixel0 opaque, pixel1 transparent
}

/// Standard Adam7 pass geometry for an 8x8 image (pass index -> (x_start,
/// y_start, x_stride, y_stride)), duplicated here only to build the raw
/// byte stream a real encoder would produce -- not a reimplementation of
/// the decoder's own interlace driver.
const ADAM7_8X8: [(usize, usize, usize, usize); 7] =
    [(0, 0, 8, 8), (4, 0, 8, 8), (0, 4, 4, 8), (2, 0, 4, 4), (0, 2, 2, 4), (1, 0, 2, 2), (0, 1, 1, 2)];

fn pass_dims(pass: (usize, usize, usize, usize), width: usize, height: usize) -> (usize, usize) {
    let (x_start, y_start, x_stride, y_stride) = pass;
    let w = if width > x_start { (width - x_start + x_stride - 1) / x_stride } else { 0 };
    let h = if height > y_start { (height - y_start + y_stride - 1) / y_stride } else { 0 };
    (w, h)
}

#[test]
fn s3_adam7_coverage() {
    let mut raw = Vec::new();
    for pass in ADAM7_8X8 {
        let (w, h) = pass_dims(pass, 8, 8);
        for _ in 0..h {
            raw.push(0); // filter: None
            raw.extend(core::iter::repeat(0x42u8).take(w));
        }
    }

    let png = build_png(8, 8, 8, 0, 1, None, None, &raw);
    let mut decoder: PngDecoder<RamSource> = PngDecoder::open_ram(&png, DecodeOptions::new());

    let mut covered: std::collections::HashSet<(usize, usize)> = std::collections::HashSet::new();
    decoder
        .decode(|row| {
            for px in 0..row.width as usize {
                let x = row.x_start + px * row.x_stride;
                assert!(covered.insert((x, row.y as usize)), "pixel ({x},{}) placed twice", row.y);
            }
            SinkControl::Continue
        })
        .unwrap();

    assert_eq!(covered.len(), 64);
    for y in 0..8 {
        for x in 0..8 {
            assert!(covered.contains(&(x, y)), "pixel ({x},{y}) never placed");
        }
    }
}

#[test]
fn s4_corrupt_crc() {
    let raw = [0u8, 255, 0, 0];
    let mut png = build_png(1, 1, 8, 2, 0, None, None, &raw);

    // flip the first content byte of IDAT's payload (past the 2-byte zlib
    // header and 5-byte stored-block header), leaving the chunk's CRC
    // trailer stale relative to the new (corrupted) payload.
    let idat_tag = png.windows(4).position(|w| w == b"IDAT").expect("IDAT present");
    let data_start = idat_tag + 4;
    png[data_start + 7] ^= 0xFF;

    let mut lenient: PngDecoder<RamSource> = PngDecoder::open_ram(&png, DecodeOptions::new().with_flags(0));
    assert!(lenient.decode(|_| SinkControl::Continue).is_ok());

    let mut strict: PngDecoder<RamSource> =
        PngDecoder::open_ram(&png, DecodeOptions::new().with_flags(DecodeOptions::CHECK_CRC));
    let err = strict.decode(|_| SinkControl::Continue).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DecodeError);
    assert_eq!(err.kind().code(), 2);
}

#[test]
fn s5_truncated_idat() {
    // IHDR declares 2 rows but IDAT only carries one: the inflate feeder's
    // expected-total check must catch this before any row is delivered.
    let one_row = [0u8, 128];
    let png = build_png(1, 2, 8, 0, 0, None, None, &one_row);

    let mut decoder: PngDecoder<RamSource> = PngDecoder::open_ram(&png, DecodeOptions::new());
    let mut delivered = 0;
    let err = decoder
        .decode(|_| {
            delivered += 1;
            SinkControl::Continue
        })
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DecodeError);
    assert_eq!(err.kind().code(), 2);
    assert_eq!(delivered, 0, "a rejected decode must not have delivered any row");
}

#[test]
fn s6_oversize_image() {
    let mut png = Vec::new();
    png.extend_from_slice(&SIGNATURE);
    png.extend_from_slice(&chunk(b"IHDR", &ihdr_body(10_000, 1, 8, 0, 0)));

    let options = DecodeOptions::new().with_max_dimensions(640, 640);
    let mut decoder: PngDecoder<RamSource> = PngDecoder::open_ram(&png, options);
    let err = decoder.decode(|_| SinkControl::Continue).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TooBig);
    assert_eq!(err.kind().code(), 7);
}

/// Round-trip (testable property #3) against a real, independently written
/// encoder rather than this file's own hand-built stored-block fixtures:
/// the `png` crate picks real adaptive filters and real DEFLATE compression,
/// exercising `zune_inflate` and the filter-reversal table this file's other
/// fixtures mostly bypass.
#[test]
fn differential_round_trip_against_independent_encoder() {
    let (width, height) = (5u32, 4u32);
    let mut raster = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            raster.push(((x * 37 + y * 11) % 256) as u8);
            raster.push(((x * 59 + y * 23) % 256) as u8);
            raster.push(((x * 83 + y * 5) % 256) as u8);
        }
    }

    let mut png_bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_bytes, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&raster).unwrap();
    }

    let mut decoder: PngDecoder<RamSource> = PngDecoder::open_ram(&png_bytes, DecodeOptions::new());
    let mut decoded = Vec::new();
    decoder
        .decode(|row| {
            decoded.extend_from_slice(row.pixels);
            SinkControl::Continue
        })
        .unwrap();

    assert_eq!(decoded, raster);
}
