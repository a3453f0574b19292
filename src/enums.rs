//! Small closed enumerations shared across the decoder's modules.

/// PNG color type, straight off the `IHDR` colour-type byte.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum ColorType {
    #[default]
    Grayscale = 0,
    TrueColor = 2,
    Indexed = 3,
    GrayscaleAlpha = 4,
    TrueColorAlpha = 6
}

impl ColorType {
    pub const fn from_u8(value: u8) -> Option<ColorType> {
        match value {
            0 => Some(ColorType::Grayscale),
            2 => Some(ColorType::TrueColor),
            3 => Some(ColorType::Indexed),
            4 => Some(ColorType::GrayscaleAlpha),
            6 => Some(ColorType::TrueColorAlpha),
            _ => None
        }
    }

    /// Number of samples per pixel, before any palette expansion.
    pub const fn channels(self) -> u8 {
        match self {
            ColorType::Grayscale => 1,
            ColorType::TrueColor => 3,
            ColorType::Indexed => 1,
            ColorType::GrayscaleAlpha => 2,
            ColorType::TrueColorAlpha => 4
        }
    }

    pub const fn has_alpha(self) -> bool {
        matches!(self, ColorType::GrayscaleAlpha | ColorType::TrueColorAlpha)
    }

    /// Whether `depth` is one of the bit depths this PNG spec permits for
    /// this colour type.
    pub const fn allows_depth(self, depth: u8) -> bool {
        match self {
            ColorType::Grayscale => matches!(depth, 1 | 2 | 4 | 8 | 16),
            ColorType::Indexed => matches!(depth, 1 | 2 | 4 | 8),
            ColorType::TrueColor | ColorType::GrayscaleAlpha | ColorType::TrueColorAlpha => {
                matches!(depth, 8 | 16)
            }
        }
    }
}

/// Per-scanline filter predictor tag (the first byte of every filtered row).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FilterMethod {
    None,
    Sub,
    Up,
    Average,
    Paeth
}

impl FilterMethod {
    pub const fn from_u8(value: u8) -> Option<FilterMethod> {
        match value {
            0 => Some(FilterMethod::None),
            1 => Some(FilterMethod::Sub),
            2 => Some(FilterMethod::Up),
            3 => Some(FilterMethod::Average),
            4 => Some(FilterMethod::Paeth),
            _ => None
        }
    }
}

/// `IHDR` interlace method.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum InterlaceMethod {
    #[default]
    None = 0,
    Adam7 = 1
}

impl InterlaceMethod {
    pub const fn from_u8(value: u8) -> Option<InterlaceMethod> {
        match value {
            0 => Some(InterlaceMethod::None),
            1 => Some(InterlaceMethod::Adam7),
            _ => None
        }
    }
}

/// Chunk types the decoder recognizes by name; everything else is routed
/// through the ancillary/critical skip-or-reject rule in [`crate::chunk`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ChunkKind {
    Ihdr,
    Plte,
    Idat,
    Trns,
    Iend,
    Phys,
    Time,
    Gama,
    Exif,
    Other([u8; 4])
}

impl ChunkKind {
    pub fn from_tag(tag: [u8; 4]) -> ChunkKind {
        match &tag {
            b"IHDR" => ChunkKind::Ihdr,
            b"PLTE" => ChunkKind::Plte,
            b"IDAT" => ChunkKind::Idat,
            b"tRNS" => ChunkKind::Trns,
            b"IEND" => ChunkKind::Iend,
            b"pHYs" => ChunkKind::Phys,
            b"tIME" => ChunkKind::Time,
            b"gAMA" => ChunkKind::Gama,
            b"eXIf" => ChunkKind::Exif,
            _ => ChunkKind::Other(tag)
        }
    }

    /// A chunk is "ancillary" (safe to skip if unrecognized) when the first
    /// byte of its tag is lowercase, per the PNG chunk-naming convention.
    pub fn is_ancillary(tag: [u8; 4]) -> bool {
        tag[0] & 0x20 != 0
    }
}
