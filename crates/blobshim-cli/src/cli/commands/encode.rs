//! `blobshim encode` – file to data: URL through the reader.

use anyhow::{anyhow, Result};
use blobshim_core::host::HostCapabilities;
use std::path::Path;

use super::blob_from_file;

pub async fn run_encode(
    host: &HostCapabilities,
    path: &Path,
    media_type: Option<&str>,
) -> Result<()> {
    let blob = blob_from_file(path, media_type)?;
    let reader = host.file_reader();
    reader.read_as_data_url(&blob);
    host.queue().run_until_idle();

    if let Some(err) = reader.error() {
        return Err(anyhow!("encode {}: {}", path.display(), err));
    }
    let url = reader
        .result()
        .and_then(|r| r.as_text().map(str::to_string))
        .ok_or_else(|| anyhow!("encode {}: reader produced no data URL", path.display()))?;
    println!("{}", url);
    Ok(())
}
