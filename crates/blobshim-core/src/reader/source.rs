//! What a [`FileReader`](super::FileReader) can read from.

use std::fmt;
use std::rc::Rc;

use super::ReadError;
use crate::blob::{Blob, ByteBuf};

/// Capability to materialise bytes.
///
/// The default `materialize` reports [`ReadError::UnsupportedSource`], so a
/// type that only carries metadata can still be handed to a reader and fail
/// the host way.
pub trait ByteSource {
    fn media_type(&self) -> &str {
        ""
    }

    fn materialize(&self) -> Result<ByteBuf, ReadError> {
        Err(ReadError::UnsupportedSource)
    }
}

impl ByteSource for Blob {
    fn media_type(&self) -> &str {
        Blob::media_type(self)
    }

    fn materialize(&self) -> Result<ByteBuf, ReadError> {
        Ok(self.bytes())
    }
}

/// Input to a read.
#[derive(Clone)]
pub enum ReadSource {
    /// A raw buffer; read back as-is.
    Buffer(ByteBuf),
    Blob(Blob),
    Custom(Rc<dyn ByteSource>),
}

impl ReadSource {
    pub fn custom(source: impl ByteSource + 'static) -> Self {
        ReadSource::Custom(Rc::new(source))
    }

    pub fn media_type(&self) -> &str {
        match self {
            ReadSource::Buffer(_) => "",
            ReadSource::Blob(blob) => blob.media_type(),
            ReadSource::Custom(source) => source.media_type(),
        }
    }

    pub fn materialize(&self) -> Result<ByteBuf, ReadError> {
        match self {
            ReadSource::Buffer(buf) => Ok(ByteBuf::clone(buf)),
            ReadSource::Blob(blob) => Ok(blob.bytes()),
            ReadSource::Custom(source) => source.materialize(),
        }
    }
}

impl fmt::Debug for ReadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadSource::Buffer(buf) => f.debug_tuple("Buffer").field(&buf.len()).finish(),
            ReadSource::Blob(blob) => f.debug_tuple("Blob").field(blob).finish(),
            ReadSource::Custom(source) => f
                .debug_tuple("Custom")
                .field(&source.media_type())
                .finish(),
        }
    }
}

impl From<ByteBuf> for ReadSource {
    fn from(buf: ByteBuf) -> Self {
        ReadSource::Buffer(buf)
    }
}

impl From<Vec<u8>> for ReadSource {
    fn from(bytes: Vec<u8>) -> Self {
        ReadSource::Buffer(bytes.into())
    }
}

impl From<Blob> for ReadSource {
    fn from(blob: Blob) -> Self {
        ReadSource::Blob(blob)
    }
}

impl From<&Blob> for ReadSource {
    fn from(blob: &Blob) -> Self {
        ReadSource::Blob(blob.clone())
    }
}

impl From<Rc<dyn ByteSource>> for ReadSource {
    fn from(source: Rc<dyn ByteSource>) -> Self {
        ReadSource::Custom(source)
    }
}
