//! Synchronous source over an async range fetcher.
//!
//! Remote backends (HTTP, S3) are naturally async. The buffered stream is
//! a blocking, single-reader abstraction, so [`RemoteSource`] owns a small
//! current-thread runtime and blocks on each fetch. It must not be used from
//! inside another tokio runtime's worker thread.

use super::{ByteRange, SeekableSource};
use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::runtime::{Builder, Runtime};

/// Async backend able to serve arbitrary byte ranges of one object.
#[async_trait]
pub trait RangeFetcher: Send + Sync {
    /// Total object size, if the backend can report it.
    async fn content_length(&self) -> Result<Option<u64>>;

    /// Fetch the bytes in `range`. May return fewer bytes at end-of-object
    /// and an empty buffer past it.
    async fn fetch(&self, range: ByteRange) -> Result<Bytes>;

    fn describe(&self) -> String;
}

pub struct RemoteSource<F> {
    fetcher: F,
    runtime: Runtime,
    position: u64,
    length: Option<u64>,
}

impl<F: RangeFetcher> RemoteSource<F> {
    /// Wrap `fetcher`, querying its length up front.
    pub fn new(fetcher: F) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Self::with_runtime(fetcher, runtime)
    }

    /// Wrap `fetcher` using an existing runtime (useful when the fetcher was
    /// itself constructed on that runtime).
    pub fn with_runtime(fetcher: F, runtime: Runtime) -> Result<Self> {
        let length = runtime.block_on(fetcher.content_length())?;

        tracing::debug!(
            "remote source {} length {:?}",
            fetcher.describe(),
            length
        );

        Ok(Self {
            fetcher,
            runtime,
            position: 0,
            length,
        })
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }
}

impl<F: RangeFetcher> SeekableSource for RemoteSource<F> {
    fn seek(&mut self, position: u64) -> Result<()> {
        self.position = position;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut end = self.position + buf.len() as u64;
        if let Some(length) = self.length {
            if self.position >= length {
                return Ok(0);
            }
            end = end.min(length);
        }

        let range = ByteRange::new(self.position, end);
        let bytes = self.runtime.block_on(self.fetcher.fetch(range))?;

        let n = bytes.len().min(buf.len());
        buf[..n].copy_from_slice(&bytes[..n]);
        self.position += n as u64;
        Ok(n)
    }

    fn length(&self) -> Option<u64> {
        self.length
    }

    fn describe(&self) -> String {
        self.fetcher.describe()
    }
}

/// Slice a full-object body down to `range`, for servers that ignore
/// `Range` and reply with the whole object.
pub(crate) fn slice_full_body(body: Bytes, range: ByteRange) -> Result<Bytes> {
    let len = body.len() as u64;
    if range.start >= len {
        return Ok(Bytes::new());
    }
    let end = range.end.unwrap_or(len).min(len);
    if end < range.start {
        return Err(Error::InvalidArgument(format!(
            "inverted byte range {}..{}",
            range.start, end
        )));
    }
    Ok(body.slice(range.start as usize..end as usize))
}
