//! A generic resource loader written only against [`HostCapabilities`].
//!
//! This is the consumer side of the layer: it knows URLs and requests, not
//! registries. `data:` URLs are decoded in place; everything else, object
//! URLs included, goes through [`HttpRequest`].

use std::cell::RefCell;
use std::rc::Rc;

use crate::blob::ByteBuf;
use crate::data_url::{self, DataUrlError};
use crate::host::HostCapabilities;
use crate::request::{HttpRequest, ResponseType};

/// Bytes fetched for one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedResource {
    pub url: String,
    /// From the `data:` header or the `Content-Type` response header; may be empty.
    pub media_type: String,
    pub bytes: ByteBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("invalid data URL: {0}")]
    DataUrl(#[from] DataUrlError),
    #[error("{url} answered HTTP {status} {status_text}")]
    Http {
        url: String,
        status: u16,
        status_text: String,
    },
    #[error("request for {url} failed (status {status})")]
    Failed { url: String, status: u16 },
}

type Done = Box<dyn FnOnce(Result<LoadedResource, LoadError>)>;

#[derive(Clone)]
pub struct ResourceLoader {
    host: HostCapabilities,
}

impl ResourceLoader {
    pub fn new(host: HostCapabilities) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &HostCapabilities {
        &self.host
    }

    /// Fetch `url`; `on_done` runs exactly once, on a later turn.
    pub fn load<F>(&self, url: &str, on_done: F)
    where
        F: FnOnce(Result<LoadedResource, LoadError>) + 'static,
    {
        let is_data = url
            .trim_start()
            .get(..5)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"));
        if is_data {
            let outcome = data_url::parse(url)
                .map(|parsed| LoadedResource {
                    url: url.to_string(),
                    media_type: parsed.media_type,
                    bytes: parsed.bytes,
                })
                .map_err(LoadError::from);
            self.host.queue().defer(move || on_done(outcome));
            return;
        }

        let done: Rc<RefCell<Option<Done>>> = Rc::new(RefCell::new(Some(Box::new(on_done))));
        let request = self.host.request();
        request.set_response_type(ResponseType::ArrayBuffer);

        let on_load = Rc::clone(&done);
        let target = url.to_string();
        request.set_on_load(move |req, _| {
            if let Some(done) = on_load.borrow_mut().take() {
                done(finished(req, &target));
            }
        });

        let on_error = Rc::clone(&done);
        let target = url.to_string();
        request.set_on_error(move |req, _| {
            if let Some(done) = on_error.borrow_mut().take() {
                done(Err(LoadError::Failed {
                    url: target.clone(),
                    status: req.status(),
                }));
            }
        });

        request.open("GET", url);
        if let Err(err) = request.send(None) {
            // A freshly opened request always accepts send.
            tracing::error!(error = %err, url, "loader request rejected");
        }
    }
}

fn finished(req: &HttpRequest, url: &str) -> Result<LoadedResource, LoadError> {
    let status = req.status();
    if !(200..300).contains(&status) {
        return Err(LoadError::Http {
            url: url.to_string(),
            status,
            status_text: req.status_text(),
        });
    }
    Ok(LoadedResource {
        url: url.to_string(),
        media_type: req.response_header("Content-Type").unwrap_or_default(),
        bytes: req.response().unwrap_or_else(|| ByteBuf::from(&[][..])),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::BlobOptions;

    type Slot = Rc<RefCell<Option<Result<LoadedResource, LoadError>>>>;

    fn load(loader: &ResourceLoader, url: &str) -> Slot {
        let slot: Slot = Rc::default();
        let out = Rc::clone(&slot);
        loader.load(url, move |r| *out.borrow_mut() = Some(r));
        assert!(slot.borrow().is_none());
        loader.host().queue().run_until_idle();
        slot
    }

    #[test]
    fn loads_data_url() {
        let loader = ResourceLoader::new(HostCapabilities::default());
        let slot = load(&loader, "data:application/octet-stream;base64,AQID");
        let res = slot.borrow_mut().take().unwrap().unwrap();
        assert_eq!(&res.bytes[..], &[1, 2, 3]);
        assert_eq!(res.media_type, "application/octet-stream");
    }

    #[test]
    fn loads_object_url_through_interception() {
        let host = HostCapabilities::default();
        let blob = host.blob([&b"glTF"[..]], BlobOptions::with_type("model/gltf-binary"));
        let url = host.create_object_url(&blob);
        let loader = ResourceLoader::new(host);

        let slot = load(&loader, &url);
        let res = slot.borrow_mut().take().unwrap().unwrap();
        assert_eq!(&res.bytes[..], b"glTF");
        assert_eq!(res.media_type, "model/gltf-binary");
    }

    #[test]
    fn revoked_object_url_fails() {
        let host = HostCapabilities::default();
        let url = host.create_object_url(&host.blob(["x"], BlobOptions::default()));
        host.revoke_object_url(&url);
        let loader = ResourceLoader::new(host);

        let slot = load(&loader, &url);
        assert_eq!(
            slot.borrow_mut().take().unwrap(),
            Err(LoadError::Failed { url, status: 500 })
        );
    }

    #[test]
    fn offline_urls_fail() {
        let loader = ResourceLoader::new(HostCapabilities::default());
        let slot = load(&loader, "https://example.com/model.glb");
        assert!(matches!(
            slot.borrow_mut().take().unwrap(),
            Err(LoadError::Failed { status: 0, .. })
        ));
    }

    #[test]
    fn bad_data_url_reports_error() {
        let loader = ResourceLoader::new(HostCapabilities::default());
        let slot = load(&loader, "data:text/plain");
        assert_eq!(
            slot.borrow_mut().take().unwrap(),
            Err(LoadError::DataUrl(DataUrlError::MissingComma))
        );
    }
}
