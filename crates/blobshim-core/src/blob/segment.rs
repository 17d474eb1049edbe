//! A window over one shared, immutable buffer.

use std::ops::Range;
use std::sync::Arc;

/// One contiguous piece of a blob. Clones share the buffer.
#[derive(Debug, Clone)]
pub(crate) struct Segment {
    buf: Arc<[u8]>,
    range: Range<usize>,
}

impl Segment {
    pub(crate) fn whole(buf: Arc<[u8]>) -> Self {
        let len = buf.len();
        Self { buf, range: 0..len }
    }

    pub(crate) fn len(&self) -> usize {
        self.range.len()
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.buf[self.range.clone()]
    }

    /// The backing buffer, when this segment spans all of it.
    pub(crate) fn as_whole(&self) -> Option<&Arc<[u8]>> {
        (self.range.start == 0 && self.range.end == self.buf.len()).then_some(&self.buf)
    }

    /// Sub-window `[start, end)` relative to this segment, clamped to it.
    pub(crate) fn sub(&self, start: usize, end: usize) -> Self {
        let end = (self.range.start + end).min(self.range.end);
        let start = (self.range.start + start).min(end);
        Self {
            buf: Arc::clone(&self.buf),
            range: start..end,
        }
    }
}
