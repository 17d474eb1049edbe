//! `blobshim roundtrip` – object URL a file and fetch it back through an intercepted request.

use anyhow::Result;
use blobshim_core::checksum;
use blobshim_core::host::HostCapabilities;
use blobshim_core::request::ResponseType;
use std::path::Path;

use super::blob_from_file;

pub async fn run_roundtrip(
    host: &HostCapabilities,
    path: &Path,
    media_type: Option<&str>,
    revoke_before_send: bool,
) -> Result<()> {
    let blob = blob_from_file(path, media_type)?;
    let expected = checksum::sha256_path(path)?;
    let url = host.create_object_url(&blob);
    tracing::info!(url = %url, size = blob.size(), "registered object URL");

    let request = host.request();
    request.set_response_type(ResponseType::ArrayBuffer);
    request.open("GET", &url);
    request.send(None)?;
    if revoke_before_send {
        host.revoke_object_url(&url);
    }
    host.queue().run_until_idle();

    let status = request.status();
    println!("{:<8} {}", "URL", url);
    println!("{:<8} {} {}", "STATUS", status, request.status_text());
    match request.response() {
        Some(body) if status == 200 => {
            let digest = checksum::sha256_bytes(&body);
            println!("{:<8} {}", "SHA256", digest);
            println!("{:<8} {}", "MATCH", if digest == expected { "yes" } else { "no" });
        }
        _ => println!("{:<8} -", "SHA256"),
    }

    if !revoke_before_send {
        host.revoke_object_url(&url);
    }
    Ok(())
}
