//! Buffered seekable stream.
//!
//! [`BufferedSeekableStream`] wraps a [`SeekableSource`] and keeps a single
//! cached window of at most `capacity` bytes. Seeks only move a cursor;
//! reads are classified against the window (see [`overlap`]) and touch the
//! source only for bytes the window does not already hold.
//!
//! # Example
//!
//! ```
//! use seekbuf::source::MemorySource;
//! use seekbuf::stream::{BufferedSeekableStream, ReadStatus};
//!
//! let source = MemorySource::new(&b"ACGTACGTNNNNACGT"[..]);
//! let mut stream = BufferedSeekableStream::new(source, 8)?;
//!
//! stream.seek(4)?;
//! let mut buf = [0u8; 4];
//! assert_eq!(stream.read_fully(&mut buf)?, ReadStatus::Complete(4));
//! assert_eq!(&buf, b"ACGT");
//!
//! // Served from the window, no source I/O
//! stream.seek(5)?;
//! assert_eq!(stream.read_byte()?, Some(b'C'));
//! assert_eq!(stream.stats().hits, 1);
//! # Ok::<(), seekbuf::Error>(())
//! ```

pub mod overlap;
mod stats;
mod window;

pub use overlap::{Carry, Plan, RefillKind};
pub use stats::IoStats;

use crate::source::SeekableSource;
use crate::{Error, Result};
use bytes::Bytes;
use std::io::{self, Read, Seek, SeekFrom};
use std::ops::Range;
use window::Window;

/// Buffer size used by [`BufferedSeekableStream::with_default_capacity`].
pub const DEFAULT_BUFFER_SIZE: usize = 512_000;

/// Outcome of a [`BufferedSeekableStream::read_fully`] call.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// Every requested byte was filled.
    Complete(usize),
    /// The stream ended after this many bytes; the rest of the destination
    /// is untouched.
    Short(usize),
    /// Nothing left to read at the cursor.
    EndOfStream,
}

impl ReadStatus {
    fn from_counts(requested: usize, filled: usize) -> Self {
        if filled == requested {
            ReadStatus::Complete(filled)
        } else if filled == 0 {
            ReadStatus::EndOfStream
        } else {
            ReadStatus::Short(filled)
        }
    }

    /// Number of destination bytes that hold valid data.
    pub fn filled(&self) -> usize {
        match self {
            ReadStatus::Complete(n) | ReadStatus::Short(n) => *n,
            ReadStatus::EndOfStream => 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, ReadStatus::Complete(_))
    }

    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, ReadStatus::EndOfStream)
    }
}

/// Single-window read cache over a [`SeekableSource`].
///
/// Not internally synchronized: one logical reader at a time.
pub struct BufferedSeekableStream<S> {
    source: Option<S>,
    buffer: Box<[u8]>,
    window: Window,
    position: u64,
    length: Option<u64>,
    stats: IoStats,
}

impl<S: SeekableSource> BufferedSeekableStream<S> {
    /// Wrap `source` with a window of `capacity` bytes.
    pub fn new(source: S, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(capacity));
        }

        let length = source.length();
        tracing::debug!(
            "buffering {} (length {:?}) with capacity {}",
            source.describe(),
            length,
            capacity
        );

        Ok(Self {
            source: Some(source),
            buffer: vec![0u8; capacity].into_boxed_slice(),
            window: Window::default(),
            position: 0,
            length,
            stats: IoStats::default(),
        })
    }

    pub fn with_default_capacity(source: S) -> Result<Self> {
        Self::new(source, DEFAULT_BUFFER_SIZE)
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Cursor for the next read.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Total length of the source, if known.
    pub fn length(&self) -> Option<u64> {
        self.length
    }

    /// Source range currently cached.
    pub fn window(&self) -> Option<Range<u64>> {
        self.window.range()
    }

    pub fn stats(&self) -> IoStats {
        self.stats
    }

    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    /// Move the cursor. Never touches the source; positions past the end are
    /// allowed and read as end-of-stream.
    pub fn seek(&mut self, position: u64) -> Result<()> {
        self.ensure_open()?;
        self.position = position;
        Ok(())
    }

    /// Read the byte at the cursor, or `None` at end-of-stream.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.read_fully(&mut byte)? {
            ReadStatus::Complete(1) => Ok(Some(byte[0])),
            _ => Ok(None),
        }
    }

    /// Fill `dst` from the cursor and advance past the bytes filled.
    ///
    /// Returns [`ReadStatus::Short`] or [`ReadStatus::EndOfStream`] when the
    /// source ends first; bytes past the filled count are left untouched.
    pub fn read_fully(&mut self, dst: &mut [u8]) -> Result<ReadStatus> {
        self.ensure_open()?;

        let requested = dst.len();
        if requested == 0 {
            return Ok(ReadStatus::Complete(0));
        }

        let end = match (self.position.checked_add(requested as u64), self.length) {
            (Some(end), _) => end,
            (None, Some(length)) if self.position >= length => {
                return Ok(ReadStatus::EndOfStream);
            }
            // classify truncates to the length anyway
            (None, Some(length)) => length,
            (None, None) => {
                return Err(Error::InvalidArgument(format!(
                    "read of {} bytes at {} overflows the offset range",
                    requested, self.position
                )));
            }
        };
        let request = self.position..end;
        let plan = overlap::classify(request, self.window.range(), self.capacity(), self.length);

        tracing::trace!("read {} bytes at {}: {:?}", requested, self.position, plan);

        let filled = match plan {
            Plan::Empty => return Ok(ReadStatus::Complete(0)),
            Plan::EndOfStream => return Ok(ReadStatus::EndOfStream),
            Plan::Bypass { range } => {
                self.stats.bypasses += 1;
                self.window.clear();
                let len = (range.end - range.start) as usize;
                let source = self.source.as_mut().ok_or(Error::Closed)?;
                fetch(source, &mut self.stats, range.start, &mut dst[..len])?
            }
            Plan::Hit { offset } => {
                self.stats.hits += 1;
                let n = requested.min(self.window.end().saturating_sub(self.position) as usize);
                dst[..n].copy_from_slice(&self.buffer[offset..offset + n]);
                n
            }
            Plan::Miss { fill } => {
                self.stats.misses += 1;
                self.fill(fill)?;
                self.serve(dst)
            }
            Plan::Refill {
                kind,
                window,
                carry,
                left,
                right,
            } => {
                self.stats.refills += 1;
                tracing::trace!("{:?} refill of {:?}", kind, window);
                self.refill(window.start, carry, left, right)?;
                self.serve(dst)
            }
        };

        self.position += filled as u64;
        Ok(ReadStatus::from_counts(requested, filled))
    }

    /// Read `length` bytes at `position` into a new buffer. The result is
    /// shorter than `length` only when the stream ends first.
    pub fn fetch(&mut self, position: u64, length: usize) -> Result<Bytes> {
        self.seek(position)?;
        let mut buf = vec![0u8; length];
        let filled = self.read_fully(&mut buf)?.filled();
        buf.truncate(filled);
        Ok(Bytes::from(buf))
    }

    /// Release the source. Every later call fails with [`Error::Closed`].
    pub fn close(&mut self) -> Result<()> {
        let mut source = self.source.take().ok_or(Error::Closed)?;
        self.window.clear();

        tracing::debug!("closing {}: {:?}", source.describe(), self.stats);
        source.close()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.source.is_none() {
            return Err(Error::Closed);
        }
        Ok(())
    }

    /// Copy what the window holds at the cursor into `dst`.
    fn serve(&self, dst: &mut [u8]) -> usize {
        match self.window.available_from(self.position, dst.len()) {
            Some(range) => {
                let n = range.len();
                dst[..n].copy_from_slice(&self.buffer[range]);
                n
            }
            None => 0,
        }
    }

    /// Replace the window with a fresh read of `fill`.
    fn fill(&mut self, fill: Range<u64>) -> Result<()> {
        self.window.clear();
        let len = (fill.end - fill.start) as usize;
        let source = self.source.as_mut().ok_or(Error::Closed)?;
        let n = fetch(source, &mut self.stats, fill.start, &mut self.buffer[..len])?;
        self.window.set(fill.start, n);
        Ok(())
    }

    /// Rebuild the window at `start`, keeping `carry` and fetching the left
    /// gap before the right gap.
    fn refill(
        &mut self,
        start: u64,
        carry: Carry,
        left: Option<Range<u64>>,
        right: Option<Range<u64>>,
    ) -> Result<()> {
        // Buffer contents are in flux until the new window is set
        self.window.clear();

        self.buffer
            .copy_within(carry.from..carry.from + carry.len, carry.to);

        let source = self.source.as_mut().ok_or(Error::Closed)?;

        if let Some(left) = left {
            let len = (left.end - left.start) as usize;
            let n = fetch(source, &mut self.stats, left.start, &mut self.buffer[..len])?;
            if n < len {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "source ended at {} before previously cached byte {}",
                        left.start + n as u64,
                        left.end
                    ),
                )));
            }
        }

        let mut valid = carry.to + carry.len;
        if let Some(right) = right {
            let len = (right.end - right.start) as usize;
            valid += fetch(
                source,
                &mut self.stats,
                right.start,
                &mut self.buffer[valid..valid + len],
            )?;
        }

        self.window.set(start, valid);
        Ok(())
    }
}

/// Fill `buf` from `source` at `start`, stopping early only at end-of-stream.
fn fetch<S: SeekableSource>(
    source: &mut S,
    stats: &mut IoStats,
    start: u64,
    buf: &mut [u8],
) -> Result<usize> {
    source.seek(start)?;
    stats.source_seeks += 1;

    let mut filled = 0;
    while filled < buf.len() {
        let n = source.read(&mut buf[filled..])?;
        stats.source_reads += 1;
        if n == 0 {
            break;
        }
        filled += n;
    }
    stats.bytes_fetched += filled as u64;

    tracing::debug!(
        "fetched {} of {} bytes at {} from {}",
        filled,
        buf.len(),
        start,
        source.describe()
    );

    Ok(filled)
}

impl<S: SeekableSource> Read for BufferedSeekableStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_fully(buf)?.filled())
    }
}

impl<S: SeekableSource> Seek for BufferedSeekableStream<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
            SeekFrom::End(delta) => {
                let length = self.length.ok_or_else(|| {
                    io::Error::new(io::ErrorKind::Unsupported, "stream length unknown")
                })?;
                length.checked_add_signed(delta)
            }
        };

        let target = target.ok_or_else(|| {
            Error::InvalidArgument(format!("seek to negative or overflowing offset: {:?}", pos))
        })?;

        BufferedSeekableStream::seek(self, target)?;
        Ok(target)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        self.ensure_open()?;
        Ok(self.position)
    }
}
