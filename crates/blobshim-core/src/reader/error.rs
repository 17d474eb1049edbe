//! Reader failure taxonomy.

/// Why a read ended without a result. Delivered through the `error`
/// notification and [`FileReader::error`](super::FileReader::error), never
/// returned from the `read_as_*` calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    /// The source has no way to produce bytes.
    #[error("source does not expose binary data")]
    UnsupportedSource,
    /// `abort()` was called.
    #[error("read aborted")]
    Aborted,
    /// The source failed while producing its bytes.
    #[error("failed to read source: {0}")]
    Source(String),
}
