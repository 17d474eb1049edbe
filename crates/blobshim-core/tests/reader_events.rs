//! Integration test: blob construction and reader notifications through a host bundle.

mod common;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use blobshim_core::blob::{Blob, BlobOptions, BlobPart};
use blobshim_core::host::HostCapabilities;
use blobshim_core::reader::{ByteSource, ReadError, ReadSource, ReadyState};
use common::events::EventLog;

struct Opaque;

impl ByteSource for Opaque {}

#[tokio::test]
async fn text_survives_construct_and_materialize() {
    for s in ["", "plain ascii", "ünïcödé", "\u{feff}leading bom", "🦀🦀"] {
        let blob = Blob::new([s], BlobOptions::default());
        assert_eq!(blob.text().await, s);
    }
}

#[test]
fn size_counts_nested_parts() {
    let inner = Blob::new([&[1u8, 2, 3][..], &[4u8][..]], BlobOptions::default());
    let outer = Blob::new(
        [
            BlobPart::from(inner.clone()),
            BlobPart::from("xyz"),
            BlobPart::from(inner),
        ],
        BlobOptions::default(),
    );
    assert_eq!(outer.size(), 4 + 3 + 4);
    assert_eq!(&outer.bytes()[..], &[1, 2, 3, 4, b'x', b'y', b'z', 1, 2, 3, 4]);
}

#[test]
fn data_url_round_trip() {
    let host = HostCapabilities::default();
    let blob = host.blob(["hello"], BlobOptions::with_type("text/plain"));
    let reader = host.file_reader();
    reader.read_as_data_url(&blob);
    host.queue().run_until_idle();

    let result = reader.result().expect("read result");
    let url = result.as_text().expect("data URL is text");
    let payload = url
        .strip_prefix("data:text/plain;base64,")
        .expect("prefix matches");
    assert_eq!(STANDARD.decode(payload).unwrap(), b"hello");
}

#[test]
fn successful_text_read_orders_notifications() {
    let host = HostCapabilities::default();
    let reader = host.file_reader();
    let log = EventLog::default();
    log.attach_reader(&reader);

    reader.read_as_text(&host.blob(["body"], BlobOptions::default()), None);
    assert_eq!(log.entries(), ["loadstart"]);
    assert_eq!(reader.ready_state(), ReadyState::Loading);

    host.queue().run_until_idle();
    assert_eq!(log.entries(), ["loadstart", "progress", "load", "loadend"]);
    assert_eq!(reader.ready_state(), ReadyState::Done);
    assert_eq!(reader.result().unwrap().as_text(), Some("body"));
}

#[test]
fn unsupported_source_reports_error_without_load() {
    let host = HostCapabilities::default();
    let reader = host.file_reader();
    let log = EventLog::default();
    log.attach_reader(&reader);

    reader.read_as_array_buffer(ReadSource::custom(Opaque));
    host.queue().run_until_idle();

    assert_eq!(log.entries(), ["loadstart", "error", "loadend"]);
    assert_eq!(reader.error(), Some(ReadError::UnsupportedSource));
    assert!(reader.result().is_none());
}

#[test]
fn abort_while_loading_suppresses_load() {
    let host = HostCapabilities::default();
    let reader = host.file_reader();
    let log = EventLog::default();
    log.attach_reader(&reader);

    reader.read_as_text(&host.blob(["late"], BlobOptions::default()), None);
    reader.abort();
    host.queue().run_until_idle();

    assert_eq!(log.entries(), ["loadstart", "error", "loadend"]);
    assert_eq!(reader.error(), Some(ReadError::Aborted));
}
