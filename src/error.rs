//! The decoder's error taxonomy.
//!
//! `ErrorKind` carries a small set of stable numeric status codes;
//! `PngError` pairs a kind with a short, static explanation. Reasons are
//! `&'static str` rather than an owned `String`, since every reason is
//! known at the call site and this keeps error reporting allocation-free.
use core::fmt::{Debug, Formatter};

/// Stable numeric status codes. `0` (success) is represented by `Ok(())`
/// at the call site and has no variant here.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum ErrorKind {
    InvalidParameter   = 1,
    DecodeError        = 2,
    MemError           = 3,
    NoBuffer           = 4,
    UnsupportedFeature = 5,
    InvalidFile        = 6,
    TooBig             = 7
}

impl ErrorKind {
    /// The integer return code an embedded caller would see.
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// A decode-time failure: a stable [`ErrorKind`] plus a human-readable
/// static reason. Reasons are `&'static str` so reporting an error never
/// needs to allocate.
#[derive(Copy, Clone)]
pub struct PngError {
    kind:   ErrorKind,
    reason: &'static str
}

impl PngError {
    pub const fn new(kind: ErrorKind, reason: &'static str) -> PngError {
        PngError { kind, reason }
    }

    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub const fn reason(&self) -> &'static str {
        self.reason
    }
}

impl Debug for PngError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.reason)
    }
}

impl core::fmt::Display for PngError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.reason)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PngError {}

impl From<zune_inflate::errors::InflateDecodeErrors> for PngError {
    fn from(_: zune_inflate::errors::InflateDecodeErrors) -> Self {
        PngError::new(ErrorKind::DecodeError, "inflate: malformed zlib/DEFLATE stream")
    }
}

pub type Result<T> = core::result::Result<T, PngError>;

macro_rules! err {
    ($kind:ident, $reason:expr) => {
        Err($crate::error::PngError::new($crate::error::ErrorKind::$kind, $reason))
    };
}
pub(crate) use err;
