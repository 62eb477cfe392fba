//! Indexed FASTA access through a buffered stream.
//!
//! Sequence tiles are fetched by translating a region into a byte range with
//! the FAI index and reading that range through a [`BufferedSeekableStream`],
//! so neighbouring tiles share one cached window.

use crate::source::{ByteRange, SeekableSource};
use crate::stream::BufferedSeekableStream;
use crate::types::Region;
use crate::{Error, Result};
use noodles::fasta::fai;
use std::path::Path;

pub struct IndexedFasta<S> {
    stream: BufferedSeekableStream<S>,
    index: fai::Index,
}

impl<S: SeekableSource> IndexedFasta<S> {
    pub fn new(stream: BufferedSeekableStream<S>, index: fai::Index) -> Self {
        Self { stream, index }
    }

    /// Pair `stream` with the FAI index at `index_path`.
    pub fn open(stream: BufferedSeekableStream<S>, index_path: &Path) -> Result<Self> {
        let index = fai::read(index_path).map_err(|e| {
            Error::InvalidInput(format!(
                "failed to read FAI index {}: {}",
                index_path.display(),
                e
            ))
        })?;
        Ok(Self::new(stream, index))
    }

    pub fn stream(&self) -> &BufferedSeekableStream<S> {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut BufferedSeekableStream<S> {
        &mut self.stream
    }

    pub fn into_stream(self) -> BufferedSeekableStream<S> {
        self.stream
    }

    /// Parse a region string against this index. A string naming an indexed
    /// sequence is that whole sequence, so names such as `HLA-A*01:01` are
    /// not split at their last colon.
    pub fn region(&self, s: &str) -> Result<Region> {
        if self.record(s).is_some() {
            return Ok(Region::whole(s));
        }
        s.parse()
    }

    fn record(&self, name: &str) -> Option<&fai::Record> {
        // FAI Index wraps Vec<Record>, access via as_ref()
        self.index
            .as_ref()
            .iter()
            .find(|r| r.name() == name.as_bytes())
    }

    /// Byte range in the FASTA file holding the bases of `region`, or `None`
    /// when the region is empty.
    pub fn byte_range(&self, region: &Region) -> Result<Option<ByteRange>> {
        let record = self.record(&region.reference_name).ok_or_else(|| {
            Error::NotFound(format!("sequence not found: {}", region.reference_name))
        })?;

        let seq_length = record.length() as u64;
        let offset = record.offset() as u64;
        let line_bases = record.line_bases() as u64;
        let line_width = record.line_width() as u64;

        if line_bases == 0 {
            return Err(Error::InvalidInput(format!(
                "FAI record for {} has zero bases per line",
                region.reference_name
            )));
        }

        let start_base = region.start.unwrap_or(0);
        let end_base = region.end.unwrap_or(seq_length).min(seq_length);

        if region.end.is_some_and(|end| end < start_base) {
            return Err(Error::InvalidInput(format!("inverted region: {}", region)));
        }
        if start_base >= end_base {
            return Ok(None);
        }

        // Each line holds line_bases bases in line_width bytes
        let start_line = start_base / line_bases;
        let end_line = (end_base - 1) / line_bases;

        let byte_start = offset + start_line * line_width + (start_base % line_bases);
        let byte_end = offset + end_line * line_width + ((end_base - 1) % line_bases) + 1;

        Ok(Some(ByteRange::new(byte_start, byte_end)))
    }

    /// Bases of `region`, with line terminators removed.
    pub fn sequence(&mut self, region: &Region) -> Result<Vec<u8>> {
        let Some(range) = self.byte_range(region)? else {
            return Ok(Vec::new());
        };

        let len = range.len().unwrap_or(0) as usize;
        let bytes = self.stream.fetch(range.start, len)?;
        if bytes.len() < len {
            return Err(Error::InvalidInput(format!(
                "FASTA shorter than its index: {} ends at byte {}",
                region,
                range.start + bytes.len() as u64
            )));
        }

        tracing::debug!("{}: {} bytes at {}", region, len, range.start);

        Ok(bytes
            .iter()
            .copied()
            .filter(|&b| b != b'\n' && b != b'\r')
            .collect())
    }
}
