//! Seam for a platform object-URL facility, when one exists.

use crate::blob::Blob;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NativeUrlError {
    #[error("native facility rejected the blob: {0}")]
    Rejected(String),
    #[error("native facility unavailable")]
    Unavailable,
}

/// A host-provided `createObjectURL` / `revokeObjectURL` pair.
///
/// The registry tries this first for blobs it [`accepts`](Self::accepts) and
/// mints its own locator when delegation fails.
pub trait NativeUrlFacility {
    /// True when this facility knows how to reference `blob`.
    fn accepts(&self, blob: &Blob) -> bool;

    fn create_object_url(&self, blob: &Blob) -> Result<String, NativeUrlError>;

    fn revoke_object_url(&self, url: &str);
}
