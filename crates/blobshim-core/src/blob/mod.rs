//! Immutable, composable byte payloads with a media type (the host's `Blob`).
//!
//! A blob is an ordered list of shared segments plus a cached size. Nothing
//! is copied on construction beyond what coercion requires, nested blobs and
//! slices share the buffers of their source, and bytes are only concatenated
//! when a caller materialises them.

mod part;
mod segment;

use std::sync::Arc;

pub use part::{BlobPart, BufferView};

use segment::Segment;

/// Shared, immutable byte buffer (the host's `ArrayBuffer`).
pub type ByteBuf = Arc<[u8]>;

/// Construction options (the host's `{ type }` bag).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobOptions {
    pub media_type: String,
}

impl BlobOptions {
    pub fn with_type(media_type: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Blob {
    segments: Arc<[Segment]>,
    size: usize,
    media_type: String,
}

impl Default for Blob {
    fn default() -> Self {
        Self::from_segments(Vec::new(), String::new())
    }
}

impl Blob {
    /// Build a blob from heterogeneous parts. Never fails.
    ///
    /// ```
    /// use blobshim_core::blob::{Blob, BlobOptions, BlobPart};
    ///
    /// let inner = Blob::new(["ab"], BlobOptions::default());
    /// let blob = Blob::new(
    ///     [BlobPart::from(inner), BlobPart::from("cd")],
    ///     BlobOptions::with_type("text/plain"),
    /// );
    /// assert_eq!(blob.size(), 4);
    /// assert_eq!(&blob.bytes()[..], b"abcd");
    /// ```
    pub fn new<I, P>(parts: I, options: BlobOptions) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<BlobPart>,
    {
        let mut segments = Vec::new();
        for part in parts {
            part.into().append_to(&mut segments);
        }
        Self::from_segments(segments, options.media_type)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    fn from_segments(segments: Vec<Segment>, media_type: String) -> Self {
        let size = segments.iter().map(Segment::len).sum();
        Self {
            segments: segments.into(),
            size,
            media_type,
        }
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Total length in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Media type tag; empty when none was given.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Concatenated bytes as one contiguous buffer.
    ///
    /// A blob over a single whole buffer hands that buffer back without
    /// copying; otherwise one buffer of `size` bytes is filled in order.
    pub fn bytes(&self) -> ByteBuf {
        match &self.segments[..] {
            [] => Arc::from(&[][..]),
            [only] => match only.as_whole() {
                Some(buf) => Arc::clone(buf),
                None => Arc::from(only.as_slice()),
            },
            many => {
                let mut out = Vec::with_capacity(self.size);
                for seg in many {
                    out.extend_from_slice(seg.as_slice());
                }
                Arc::from(out)
            }
        }
    }

    /// The host's `arrayBuffer()`.
    pub async fn array_buffer(&self) -> ByteBuf {
        self.bytes()
    }

    /// The host's `text()`: UTF-8 decode, invalid sequences replaced.
    pub async fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    /// New blob over the half-open byte range `[start, end)`.
    ///
    /// Indices follow the host rules: `None` means the start or end of the
    /// blob, negative values count back from the end, and both are clamped
    /// to `[0, size]`. An inverted range yields an empty blob. `media_type`
    /// of `None` keeps this blob's type.
    pub fn slice(&self, start: Option<i64>, end: Option<i64>, media_type: Option<&str>) -> Blob {
        let start = start.map_or(0, |i| relative_index(i, self.size));
        let end = end.map_or(self.size, |i| relative_index(i, self.size));
        let media_type = media_type.map_or_else(|| self.media_type.clone(), str::to_string);
        if end <= start {
            return Self::from_segments(Vec::new(), media_type);
        }

        let mut segments = Vec::new();
        let mut offset = 0usize;
        for seg in self.segments.iter() {
            let seg_start = offset;
            let seg_end = offset + seg.len();
            offset = seg_end;
            if seg_end <= start {
                continue;
            }
            if seg_start >= end {
                break;
            }
            segments.push(seg.sub(start.saturating_sub(seg_start), end - seg_start));
        }
        Self::from_segments(segments, media_type)
    }
}

/// Resolve a possibly negative host index against `size`.
fn relative_index(index: i64, size: usize) -> usize {
    let magnitude = usize::try_from(index.unsigned_abs()).unwrap_or(usize::MAX);
    if index < 0 {
        size.saturating_sub(magnitude)
    } else {
        magnitude.min(size)
    }
}
