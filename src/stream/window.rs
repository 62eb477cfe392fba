use std::ops::Range;

/// Descriptor of the cached region held in the stream's buffer.
///
/// `len` bytes starting at buffer offset 0 mirror the source starting at
/// `start`. A zero `len` means no window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Window {
    start: u64,
    len: usize,
}

impl Window {
    pub fn set(&mut self, start: u64, len: usize) {
        self.start = start;
        self.len = len;
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn end(&self) -> u64 {
        self.start + self.len as u64
    }

    pub fn range(&self) -> Option<Range<u64>> {
        (!self.is_empty()).then(|| self.start..self.end())
    }

    /// Buffer offsets of the cached bytes available from `position` on,
    /// capped at `max` bytes.
    pub fn available_from(&self, position: u64, max: usize) -> Option<Range<usize>> {
        if self.is_empty() || position < self.start || position >= self.end() {
            return None;
        }
        let offset = (position - self.start) as usize;
        let n = max.min(self.len - offset);
        Some(offset..offset + n)
    }
}
