use serde::Serialize;

/// Counters describing how a stream used its source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IoStats {
    /// `seek` calls issued to the source
    pub source_seeks: u64,
    /// `read` calls issued to the source
    pub source_reads: u64,
    /// Bytes received from the source
    pub bytes_fetched: u64,
    /// Requests served entirely from the window
    pub hits: u64,
    /// Requests that replaced the window
    pub misses: u64,
    /// Requests that reused part of the window
    pub refills: u64,
    /// Oversized requests read around the window
    pub bypasses: u64,
}

impl IoStats {
    /// Fraction of non-empty requests served without touching the source.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses + self.refills + self.bypasses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
