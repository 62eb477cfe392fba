use super::SeekableSource;
use crate::Result;
use bytes::Bytes;

/// Source backed by bytes already in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Bytes,
    position: u64,
}

impl MemorySource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            position: 0,
        }
    }
}

impl SeekableSource for MemorySource {
    fn seek(&mut self, position: u64) -> Result<()> {
        self.position = position;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let len = self.data.len() as u64;
        if self.position >= len {
            return Ok(0);
        }
        let start = self.position as usize;
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        self.position += n as u64;
        Ok(n)
    }

    fn length(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }

    fn describe(&self) -> String {
        format!("memory ({} bytes)", self.data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_from_start() {
        let mut source = MemorySource::new(&b"hello world"[..]);
        let mut buf = [0u8; 5];
        assert_eq!(source.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf, b"hello");
        assert_eq!(source.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf, b" worl");
    }

    #[test]
    fn test_short_read_at_end() {
        let mut source = MemorySource::new(vec![1u8, 2, 3, 4]);
        source.seek(2).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(source.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[3, 4]);
        assert_eq!(source.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_seek_past_end_reads_nothing() {
        let mut source = MemorySource::new(vec![0u8; 10]);
        source.seek(100).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(source.read(&mut buf).unwrap(), 0);
    }
}
