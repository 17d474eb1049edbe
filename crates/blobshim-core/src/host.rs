//! The capability bundle handed to consumers instead of global overrides.
//!
//! A loader written against the host's `Blob` / `FileReader` /
//! `createObjectURL` / `XMLHttpRequest` receives one [`HostCapabilities`]
//! and builds everything from it. Tests get a fresh bundle (and so a fresh
//! registry and queue) each time.

use std::rc::Rc;

use crate::blob::{Blob, BlobOptions, BlobPart};
use crate::config::{ShimConfig, TransportKind};
use crate::reader::FileReader;
use crate::registry::{NativeUrlFacility, ObjectUrlRegistry};
use crate::request::{FileTransport, HttpRequest, OfflineTransport, Transport};
use crate::task_queue::TaskQueue;

#[derive(Clone)]
pub struct HostCapabilities {
    queue: TaskQueue,
    registry: Rc<ObjectUrlRegistry>,
    transport: Rc<dyn Transport>,
    config: ShimConfig,
}

impl HostCapabilities {
    /// Bundle with a fresh queue and registry and the transport `config` names.
    pub fn from_config(config: ShimConfig) -> Self {
        let queue = TaskQueue::new();
        let registry = Rc::new(ObjectUrlRegistry::new(config.locator_prefix.clone()));
        let transport = default_transport(config.transport_kind(), &queue);
        Self::new(config, queue, registry, transport)
    }

    /// Same as [`from_config`](Self::from_config) but delegating locators to
    /// a native facility first.
    pub fn with_native(config: ShimConfig, native: Box<dyn NativeUrlFacility>) -> Self {
        let queue = TaskQueue::new();
        let registry = Rc::new(ObjectUrlRegistry::with_native(
            config.locator_prefix.clone(),
            native,
        ));
        let transport = default_transport(config.transport_kind(), &queue);
        Self::new(config, queue, registry, transport)
    }

    pub fn new(
        config: ShimConfig,
        queue: TaskQueue,
        registry: Rc<ObjectUrlRegistry>,
        transport: Rc<dyn Transport>,
    ) -> Self {
        Self {
            queue,
            registry,
            transport,
            config,
        }
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    pub fn registry(&self) -> &Rc<ObjectUrlRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &ShimConfig {
        &self.config
    }

    /// Container factory.
    pub fn blob<I, P>(&self, parts: I, options: BlobOptions) -> Blob
    where
        I: IntoIterator<Item = P>,
        P: Into<BlobPart>,
    {
        Blob::new(parts, options)
    }

    /// Reader factory.
    pub fn file_reader(&self) -> FileReader {
        FileReader::with_default_media_type(
            self.queue.clone(),
            self.config.default_media_type.clone(),
        )
    }

    /// Request factory; object URLs from this bundle's registry are intercepted.
    pub fn request(&self) -> HttpRequest {
        HttpRequest::with_placeholder(
            self.queue.clone(),
            Rc::clone(&self.registry),
            Rc::clone(&self.transport),
            self.config.placeholder_url.clone(),
        )
    }

    pub fn create_object_url(&self, blob: &Blob) -> String {
        self.registry.create_object_url(blob)
    }

    pub fn revoke_object_url(&self, url: &str) {
        self.registry.revoke_object_url(url);
    }
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self::from_config(ShimConfig::default())
    }
}

fn default_transport(kind: TransportKind, queue: &TaskQueue) -> Rc<dyn Transport> {
    match kind {
        TransportKind::Offline => Rc::new(OfflineTransport::new(queue.clone())),
        TransportKind::File => Rc::new(FileTransport::new(queue.clone())),
    }
}
