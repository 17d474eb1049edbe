//! Per-request state for a send served from the object-URL registry.

use crate::blob::Blob;

/// Lives from `open` to the end of one cycle.
#[derive(Debug, Clone)]
pub(super) struct Interception {
    pub(super) locator: String,
    pub(super) resolved: Option<Blob>,
    pub(super) loaded: u64,
    pub(super) total: u64,
}

impl Interception {
    pub(super) fn new(locator: &str) -> Self {
        Self {
            locator: locator.to_string(),
            resolved: None,
            loaded: 0,
            total: 0,
        }
    }

    /// Completion is atomic: loaded and total land together.
    pub(super) fn resolved(&mut self, blob: Blob, len: u64) {
        self.resolved = Some(blob);
        self.loaded = len;
        self.total = len;
    }
}

/// Headers a local response carries: length always, type when the blob has one.
pub(super) fn synthesized_headers(blob: &Blob) -> Vec<(String, String)> {
    let mut headers = vec![("Content-Length".to_string(), blob.size().to_string())];
    if !blob.media_type().is_empty() {
        headers.push(("Content-Type".to_string(), blob.media_type().to_string()));
    }
    headers
}
