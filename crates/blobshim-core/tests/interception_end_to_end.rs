//! Integration test: object URLs served through intercepted requests.

mod common;

use blobshim_core::blob::BlobOptions;
use blobshim_core::config::{ShimConfig, TransportKind};
use blobshim_core::host::HostCapabilities;
use blobshim_core::loader::ResourceLoader;
use blobshim_core::request::{RequestReadyState, ResponseType};
use common::events::EventLog;
use std::cell::RefCell;
use std::rc::Rc;
use tempfile::tempdir;

#[test]
fn registered_blob_is_served_with_200() {
    let host = HostCapabilities::default();
    let url = host.create_object_url(&host.blob([&[1u8, 2, 3][..]], BlobOptions::default()));

    let request = host.request();
    let log = EventLog::default();
    log.attach_request(&request);
    request.set_response_type(ResponseType::ArrayBuffer);
    request.open("GET", &url);
    request.send(None).unwrap();

    assert_eq!(request.ready_state(), RequestReadyState::Opened);
    assert_eq!(log.entries(), ["readystatechange"]);

    host.queue().run_until_idle();
    assert_eq!(request.status(), 200);
    assert_eq!(request.ready_state(), RequestReadyState::Done);
    assert_eq!(&request.response().unwrap()[..], &[1, 2, 3]);
    assert_eq!(request.response_header("content-length").as_deref(), Some("3"));
    assert_eq!(log.entries(), ["readystatechange", "readystatechange", "load"]);
}

#[test]
fn revoke_before_completion_yields_500() {
    let host = HostCapabilities::default();
    let url = host.create_object_url(&host.blob([&[1u8, 2, 3][..]], BlobOptions::default()));

    let request = host.request();
    let log = EventLog::default();
    log.attach_request(&request);
    request.open("GET", &url);
    request.send(None).unwrap();
    host.revoke_object_url(&url);
    host.queue().run_until_idle();

    assert_eq!(request.status(), 500);
    assert_eq!(request.ready_state(), RequestReadyState::Done);
    assert!(request.response().is_none());
    assert_eq!(log.entries(), ["readystatechange", "error"]);
}

#[test]
fn locators_are_unique_and_revocation_is_idempotent() {
    let host = HostCapabilities::default();
    let a = host.create_object_url(&host.blob(["a"], BlobOptions::default()));
    let b = host.create_object_url(&host.blob(["b"], BlobOptions::default()));
    assert_ne!(a, b);

    host.revoke_object_url(&a);
    assert!(host.registry().resolve(&a).is_none());
    host.revoke_object_url(&a);
    assert!(host.registry().resolve(&b).is_some());
}

#[test]
fn loader_reads_file_urls_with_file_transport() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mesh.bin");
    std::fs::write(&path, [7u8, 8, 9]).unwrap();
    let file_url = url::Url::from_file_path(&path).unwrap().to_string();

    let config = ShimConfig {
        transport: Some(TransportKind::File),
        ..ShimConfig::default()
    };
    let host = HostCapabilities::from_config(config);
    let loader = ResourceLoader::new(host.clone());

    let slot = Rc::new(RefCell::new(None));
    let out = Rc::clone(&slot);
    loader.load(&file_url, move |r| *out.borrow_mut() = Some(r));
    host.queue().run_until_idle();

    let res = slot.borrow_mut().take().unwrap().unwrap();
    assert_eq!(&res.bytes[..], &[7, 8, 9]);
    assert_eq!(res.media_type, "application/octet-stream");
}
