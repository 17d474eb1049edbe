//! Bundled transports: an offline one that refuses everything, and a local
//! `file://` reader.

use std::io;

use url::Url;

use super::transport::{Completion, Transport, TransportError, TransportRequest, TransportResponse};
use crate::media_type;
use crate::task_queue::TaskQueue;

/// Fails every request on the next turn.
#[derive(Debug, Clone)]
pub struct OfflineTransport {
    queue: TaskQueue,
}

impl OfflineTransport {
    pub fn new(queue: TaskQueue) -> Self {
        Self { queue }
    }
}

impl Transport for OfflineTransport {
    fn send(&self, request: TransportRequest, done: Completion) {
        tracing::debug!(url = %request.url, "offline transport refusing request");
        self.queue
            .defer(move || done(Err(TransportError::Offline(request.url))));
    }
}

/// Serves `GET`/`HEAD` for `file://` URLs from the local filesystem.
///
/// A missing file is a `404` response, not a transport error.
#[derive(Debug, Clone)]
pub struct FileTransport {
    queue: TaskQueue,
}

impl FileTransport {
    pub fn new(queue: TaskQueue) -> Self {
        Self { queue }
    }
}

impl Transport for FileTransport {
    fn send(&self, request: TransportRequest, done: Completion) {
        self.queue.defer(move || done(read_file(&request)));
    }
}

fn read_file(request: &TransportRequest) -> Result<TransportResponse, TransportError> {
    let method = request.method.to_ascii_uppercase();
    if method != "GET" && method != "HEAD" {
        return Err(TransportError::MethodNotAllowed(request.method.clone()));
    }

    let url = Url::parse(&request.url)
        .map_err(|_| TransportError::UnsupportedUrl(request.url.clone()))?;
    if url.scheme() != "file" {
        return Err(TransportError::UnsupportedUrl(request.url.clone()));
    }
    let path = url
        .to_file_path()
        .map_err(|()| TransportError::UnsupportedUrl(request.url.clone()))?;

    match std::fs::read(&path) {
        Ok(bytes) => {
            let mut headers = vec![("Content-Length".to_string(), bytes.len().to_string())];
            if let Some(mt) = media_type::guess_from_path(&path) {
                headers.push(("Content-Type".to_string(), mt.to_string()));
            }
            let body = if method == "HEAD" { Vec::new() } else { bytes };
            tracing::debug!(path = %path.display(), "served file request");
            Ok(TransportResponse {
                status: 200,
                status_text: "OK".to_string(),
                headers,
                body: body.into(),
            })
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(TransportResponse {
            status: 404,
            status_text: "Not Found".to_string(),
            headers: Vec::new(),
            body: Vec::new().into(),
        }),
        Err(e) => Err(TransportError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
    }
}
