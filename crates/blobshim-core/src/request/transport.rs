//! The real transport that the interceptor wraps.
//!
//! Only requests whose URL is not an object URL reach a [`Transport`].
//! Implementations must complete on a later turn of the task queue, never
//! inside `send`.

use crate::blob::ByteBuf;

#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: String,
    pub url: String,
    pub body: Option<ByteBuf>,
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: ByteBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("network access is disabled: {0}")]
    Offline(String),
    #[error("unsupported URL: {0}")]
    UnsupportedUrl(String),
    #[error("method {0} not allowed")]
    MethodNotAllowed(String),
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },
}

/// Called exactly once with the outcome of a request.
pub type Completion = Box<dyn FnOnce(Result<TransportResponse, TransportError>)>;

pub trait Transport {
    fn send(&self, request: TransportRequest, done: Completion);
}
