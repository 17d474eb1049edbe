//! CLI command handlers, one file per command.

mod encode;
mod fetch;
mod roundtrip;
mod text;

pub use encode::run_encode;
pub use fetch::run_fetch;
pub use roundtrip::run_roundtrip;
pub use text::run_text;

use anyhow::{Context, Result};
use blobshim_core::blob::{Blob, BlobOptions, ByteBuf};
use blobshim_core::media_type;
use std::path::Path;

/// Read `path` into a blob tagged with `declared`, or a type guessed from the extension.
fn blob_from_file(path: &Path, declared: Option<&str>) -> Result<Blob> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let media_type = declared
        .or_else(|| media_type::guess_from_path(path))
        .unwrap_or_default();
    Ok(Blob::new(
        [ByteBuf::from(bytes)],
        BlobOptions::with_type(media_type),
    ))
}
