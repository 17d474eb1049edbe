//! Blob construction inputs and their coercion into segments.
//!
//! Every input is accepted: buffers are shared as-is, typed views are copied
//! over their logical byte range, text is UTF-8 encoded, nested blobs lend
//! their segment list, and anything else goes through its `Display` text.

use std::fmt::Display;
use std::sync::Arc;

use super::segment::Segment;
use super::{Blob, ByteBuf};

/// A byte window over a shared buffer (the host's `DataView` / typed array).
#[derive(Debug, Clone)]
pub struct BufferView {
    pub buffer: ByteBuf,
    pub byte_offset: usize,
    pub byte_length: usize,
}

impl BufferView {
    pub fn new(buffer: ByteBuf, byte_offset: usize, byte_length: usize) -> Self {
        Self {
            buffer,
            byte_offset,
            byte_length,
        }
    }

    /// Bytes covered by the view. A window past the end of the buffer is
    /// clamped rather than rejected.
    pub fn as_bytes(&self) -> &[u8] {
        let start = self.byte_offset.min(self.buffer.len());
        let end = start
            .saturating_add(self.byte_length)
            .min(self.buffer.len());
        &self.buffer[start..end]
    }
}

/// One input to [`Blob::new`].
#[derive(Debug, Clone)]
pub enum BlobPart {
    /// Raw buffer, stored without copying.
    Buffer(ByteBuf),
    /// Typed view, copied over its byte range.
    View(BufferView),
    /// Text, stored as UTF-8.
    Text(String),
    /// Nested blob whose segments are shared.
    Blob(Blob),
}

impl BlobPart {
    /// Copy a typed numeric slice (e.g. `&[f32]`, `&[u16]`) in native byte order.
    pub fn view<T: bytemuck::Pod>(values: &[T]) -> Self {
        BlobPart::Buffer(Arc::from(bytemuck::cast_slice::<T, u8>(values)))
    }

    /// Fallback for values with no binary form: their text representation.
    pub fn display(value: impl Display) -> Self {
        BlobPart::Text(value.to_string())
    }

    pub(crate) fn append_to(self, segments: &mut Vec<Segment>) {
        let seg = match self {
            BlobPart::Buffer(buf) => Segment::whole(buf),
            BlobPart::View(view) => Segment::whole(Arc::from(view.as_bytes())),
            BlobPart::Text(text) => Segment::whole(Arc::from(text.into_bytes())),
            BlobPart::Blob(blob) => {
                segments.extend(blob.segments().iter().cloned());
                return;
            }
        };
        if seg.len() > 0 {
            segments.push(seg);
        }
    }
}

impl From<ByteBuf> for BlobPart {
    fn from(buf: ByteBuf) -> Self {
        BlobPart::Buffer(buf)
    }
}

impl From<Vec<u8>> for BlobPart {
    fn from(bytes: Vec<u8>) -> Self {
        BlobPart::Buffer(Arc::from(bytes))
    }
}

impl From<&[u8]> for BlobPart {
    fn from(bytes: &[u8]) -> Self {
        BlobPart::Buffer(Arc::from(bytes))
    }
}

impl<const N: usize> From<&[u8; N]> for BlobPart {
    fn from(bytes: &[u8; N]) -> Self {
        BlobPart::Buffer(Arc::from(&bytes[..]))
    }
}

impl From<BufferView> for BlobPart {
    fn from(view: BufferView) -> Self {
        BlobPart::View(view)
    }
}

impl From<&str> for BlobPart {
    fn from(text: &str) -> Self {
        BlobPart::Text(text.to_string())
    }
}

impl From<String> for BlobPart {
    fn from(text: String) -> Self {
        BlobPart::Text(text)
    }
}

impl From<&String> for BlobPart {
    fn from(text: &String) -> Self {
        BlobPart::Text(text.clone())
    }
}

impl From<Blob> for BlobPart {
    fn from(blob: Blob) -> Self {
        BlobPart::Blob(blob)
    }
}

impl From<&Blob> for BlobPart {
    fn from(blob: &Blob) -> Self {
        BlobPart::Blob(blob.clone())
    }
}

macro_rules! display_parts {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for BlobPart {
                fn from(value: $ty) -> Self {
                    BlobPart::display(value)
                }
            }
        )*
    };
}

display_parts!(bool, char, i32, i64, u32, u64, usize, f32, f64);
