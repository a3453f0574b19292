//! Source adapter (C1): a uniform read/seek surface over RAM, read-only
//! flash, or a host file handle, behind a common `open/read/seek/close`
//! callback set. Modeled as a small trait with three implementors rather
//! than an inheritance hierarchy.
use crate::error::{err, Result};

/// Anything the chunk reader can pull bytes from. Short reads are
/// permitted; `read` returning `Ok(0)` means end-of-stream, matching the
/// caller-supplied `read()` callback's contract.
pub trait DataSource {
    /// Fill as much of `buf` as is available, returning the number of
    /// bytes written. `Ok(0)` means end of stream.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Move the read cursor to an absolute byte offset, returning the new
    /// position.
    fn seek(&mut self, absolute_position: u64) -> Result<u64>;

    /// Total size in bytes, when known up front (RAM/FLASH sources always
    /// know this; a host file handle may not for exotic streams).
    fn size(&self) -> Option<u64>;
}

/// A source over an in-memory buffer the caller owns and can mutate
/// elsewhere (`openRAM`).
pub struct RamSource<'a> {
    data:   &'a [u8],
    cursor: usize
}

impl<'a> RamSource<'a> {
    pub const fn new(data: &'a [u8]) -> RamSource<'a> {
        RamSource { data, cursor: 0 }
    }
}

impl<'a> DataSource for RamSource<'a> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let remaining = &self.data[self.cursor.min(self.data.len())..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.cursor += n;
        Ok(n)
    }

    fn seek(&mut self, absolute_position: u64) -> Result<u64> {
        let position = usize::try_from(absolute_position).unwrap_or(usize::MAX);
        if position > self.data.len() {
            return err!(InvalidParameter, "seek past end of RAM source");
        }
        self.cursor = position;
        Ok(absolute_position)
    }

    fn size(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }
}

/// A source over read-only program memory (`openFLASH`). Functionally
/// identical to [`RamSource`] in this port since Rust slices already
/// guarantee the caller cannot hand us writable aliasing; kept as a
/// distinct type so call sites document intent and so a target with a
/// genuinely different flash-read primitive (e.g. a memory-mapped XIP
/// region needing a fence) has a single seam to specialize.
pub struct FlashSource<'a> {
    inner: RamSource<'a>
}

impl<'a> FlashSource<'a> {
    pub const fn new(data: &'a [u8]) -> FlashSource<'a> {
        FlashSource { inner: RamSource::new(data) }
    }
}

impl<'a> DataSource for FlashSource<'a> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.inner.read(buf)
    }

    fn seek(&mut self, absolute_position: u64) -> Result<u64> {
        self.inner.seek(absolute_position)
    }

    fn size(&self) -> Option<u64> {
        self.inner.size()
    }
}

/// A source backed by a host file handle (`openFile`), for builds with the
/// `std` feature enabled. Generic over anything `Read + Seek` so a caller
/// can hand in a `std::fs::File`, an in-memory `Cursor`, or their own
/// handle type implementing the two standard traits.
#[cfg(feature = "std")]
pub struct FileSource<T> {
    inner: T,
    size:  Option<u64>
}

#[cfg(feature = "std")]
impl<T: std::io::Read + std::io::Seek> FileSource<T> {
    pub fn new(mut inner: T) -> Result<FileSource<T>> {
        let size = inner.seek(std::io::SeekFrom::End(0)).ok();
        if size.is_some() {
            let _ = inner.seek(std::io::SeekFrom::Start(0));
        }
        Ok(FileSource { inner, size })
    }
}

#[cfg(feature = "std")]
impl<T: std::io::Read + std::io::Seek> DataSource for FileSource<T> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.inner
            .read(buf)
            .map_err(|_| crate::error::PngError::new(crate::error::ErrorKind::InvalidParameter, "file read callback failed"))
    }

    fn seek(&mut self, absolute_position: u64) -> Result<u64> {
        self.inner
            .seek(std::io::SeekFrom::Start(absolute_position))
            .map_err(|_| crate::error::PngError::new(crate::error::ErrorKind::InvalidParameter, "file seek callback failed"))
    }

    fn size(&self) -> Option<u64> {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ram_source_short_reads_then_eof() {
        let data = [1u8, 2, 3, 4, 5];
        let mut src = RamSource::new(&data);

        let mut buf = [0u8; 3];
        assert_eq!(src.read(&mut buf).unwrap(), 3);
        assert_eq!(buf, [1, 2, 3]);

        assert_eq!(src.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[4, 5]);

        assert_eq!(src.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn ram_source_seek_rewinds() {
        let data = [1u8, 2, 3, 4];
        let mut src = RamSource::new(&data);
        src.seek(2).unwrap();
        let mut buf = [0u8; 2];
        assert_eq!(src.read(&mut buf).unwrap(), 2);
        assert_eq!(buf, [3, 4]);
    }
}
