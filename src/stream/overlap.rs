//! Overlap classification.
//!
//! Decides, from four comparisons between the requested range and the
//! current window, which underlying reads a request needs. No I/O happens
//! here; the engine in [`super::BufferedSeekableStream`] executes the plan.

use std::ops::Range;

/// Which side(s) of the old window a partially overlapping request misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefillKind {
    /// Request starts before the window and ends inside it.
    LeftGap,
    /// Request starts inside the window and ends after it.
    RightGap,
    /// Request covers the whole window and sticks out on both sides.
    BothGaps,
}

/// Bytes moved from their old buffer offset to their new one during a refill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carry {
    pub from: usize,
    pub to: usize,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Zero-length request.
    Empty,
    /// Request starts at or past the known end of the stream.
    EndOfStream,
    /// Request is larger than the buffer; read straight into the caller's
    /// buffer and drop the window.
    Bypass { range: Range<u64> },
    /// Request lies entirely inside the window, at `offset` into the buffer.
    Hit { offset: usize },
    /// Request does not touch the window; replace it with `fill`.
    Miss { fill: Range<u64> },
    /// Request partially overlaps the window. The new window is `window`;
    /// `carry` is reused, `left` then `right` are fetched.
    Refill {
        kind: RefillKind,
        window: Range<u64>,
        carry: Carry,
        left: Option<Range<u64>>,
        right: Option<Range<u64>>,
    },
}

/// Classify `request` against the current `window`.
///
/// Requests extending past a known `stream_length` are truncated to it. New
/// windows always start at the request start and span `capacity` bytes,
/// clamped to `stream_length`.
pub fn classify(
    request: Range<u64>,
    window: Option<Range<u64>>,
    capacity: usize,
    stream_length: Option<u64>,
) -> Plan {
    if request.is_empty() {
        return Plan::Empty;
    }

    let start = request.start;
    let mut end = request.end;
    if let Some(length) = stream_length {
        if start >= length {
            return Plan::EndOfStream;
        }
        end = end.min(length);
    }

    if end - start > capacity as u64 {
        return Plan::Bypass { range: start..end };
    }

    let mut fill_end = start.saturating_add(capacity as u64);
    if let Some(length) = stream_length {
        fill_end = fill_end.min(length);
    }

    let Some(win) = window.filter(|w| !w.is_empty()) else {
        return Plan::Miss {
            fill: start..fill_end,
        };
    };

    if start >= win.start && end <= win.end {
        return Plan::Hit {
            offset: (start - win.start) as usize,
        };
    }

    if end <= win.start || start >= win.end {
        return Plan::Miss {
            fill: start..fill_end,
        };
    }

    let kind = match (start < win.start, end > win.end) {
        (true, true) => RefillKind::BothGaps,
        (true, false) => RefillKind::LeftGap,
        _ => RefillKind::RightGap,
    };

    let keep = start.max(win.start)..fill_end.min(win.end);
    let carry = Carry {
        from: (keep.start - win.start) as usize,
        to: (keep.start - start) as usize,
        len: (keep.end - keep.start) as usize,
    };

    Plan::Refill {
        kind,
        window: start..fill_end,
        carry,
        left: (start < keep.start).then_some(start..keep.start),
        right: (keep.end < fill_end).then_some(keep.end..fill_end),
    }
}
