//! Underlying byte sources for buffered streams.
//!
//! A [`SeekableSource`] is anything that can position itself at an absolute
//! offset and read bytes from there. Sources are deliberately dumb: they do
//! no caching of their own, so every call they receive is a real I/O
//! operation (a disk read, an HTTP range request, an S3 `GetObject`).
//!
//! # Implementations
//!
//! - [`MemorySource`] - In-memory bytes
//! - [`FileSource`] - Local filesystem
//! - [`RemoteSource`] - Any async [`RangeFetcher`], such as [`HttpFetcher`] or [`S3Fetcher`]
//!
//! # Example
//!
//! ```no_run
//! use seekbuf::source::{FileSource, SeekableSource};
//!
//! let mut source = FileSource::open("sample.fa")?;
//! source.seek(1024)?;
//! let mut buf = [0u8; 64];
//! let n = source.read(&mut buf)?;
//! # Ok::<(), seekbuf::Error>(())
//! ```

mod local;
mod location;
mod memory;
mod remote;

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "s3")]
mod s3;

pub use local::FileSource;
pub use location::{Location, OpenOptions, open};
pub use memory::MemorySource;
pub use remote::{RangeFetcher, RemoteSource};

#[cfg(feature = "http")]
pub use http::HttpFetcher;
#[cfg(feature = "s3")]
pub use s3::S3Fetcher;

use crate::Result;

/// Byte range within a source. `end` is exclusive; `None` means "to the end".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl ByteRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn len(&self) -> Option<u64> {
        self.end.map(|end| end.saturating_sub(self.start))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Value for an HTTP `Range` header. HTTP ranges are inclusive.
    pub fn header_value(&self) -> String {
        match self.end {
            Some(end) => format!("bytes={}-{}", self.start, end.saturating_sub(1)),
            None => format!("bytes={}-", self.start),
        }
    }
}

/// Random-access byte provider wrapped by a buffered stream.
pub trait SeekableSource {
    /// Position the source at an absolute byte offset.
    fn seek(&mut self, position: u64) -> Result<()>;

    /// Read up to `buf.len()` bytes at the current position. Returns 0 at
    /// end-of-stream.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Total length in bytes, if the source knows it.
    fn length(&self) -> Option<u64>;

    /// Release the source. Called at most once by the owning stream.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// Human readable name used in log output.
    fn describe(&self) -> String;
}

impl<S: SeekableSource + ?Sized> SeekableSource for Box<S> {
    fn seek(&mut self, position: u64) -> Result<()> {
        (**self).seek(position)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn length(&self) -> Option<u64> {
        (**self).length()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
