//! `blobshim text` – decode a file as UTF-8 through the reader.

use anyhow::{anyhow, Result};
use blobshim_core::host::HostCapabilities;
use std::path::Path;

use super::blob_from_file;

pub async fn run_text(host: &HostCapabilities, path: &Path) -> Result<()> {
    let blob = blob_from_file(path, Some("text/plain"))?;
    let reader = host.file_reader();
    reader.read_as_text(&blob, None);
    host.queue().run_until_idle();

    if let Some(err) = reader.error() {
        return Err(anyhow!("text {}: {}", path.display(), err));
    }
    let text = reader
        .result()
        .and_then(|r| r.as_text().map(str::to_string))
        .unwrap_or_default();
    print!("{}", text);
    Ok(())
}
