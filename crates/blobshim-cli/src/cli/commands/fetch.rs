//! `blobshim fetch` – load a URL with the resource loader.

use anyhow::Result;
use blobshim_core::checksum;
use blobshim_core::host::HostCapabilities;
use blobshim_core::loader::{LoadError, LoadedResource, ResourceLoader};
use std::cell::RefCell;
use std::rc::Rc;

pub async fn run_fetch(host: &HostCapabilities, url: &str) -> Result<()> {
    let loader = ResourceLoader::new(host.clone());
    let outcome: Rc<RefCell<Option<Result<LoadedResource, LoadError>>>> = Rc::default();
    let slot = Rc::clone(&outcome);
    loader.load(url, move |r| *slot.borrow_mut() = Some(r));
    let turns = host.queue().run_until_idle();
    tracing::debug!(url, turns, "fetch drained queue");

    let Some(result) = outcome.borrow_mut().take() else {
        anyhow::bail!("fetch {}: request never completed", url);
    };
    let res = result?;
    let media_type = if res.media_type.is_empty() {
        "-"
    } else {
        res.media_type.as_str()
    };
    println!(
        "{}  {} bytes  {}  {}",
        checksum::sha256_bytes(&res.bytes),
        res.bytes.len(),
        media_type,
        res.url
    );
    Ok(())
}
