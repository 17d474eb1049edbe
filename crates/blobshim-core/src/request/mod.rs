//! Request surface with object-URL interception (the host's `XMLHttpRequest`).
//!
//! `open` checks the target against the registry's scheme. An object URL is
//! remembered and the request is re-pointed at a placeholder so the real
//! transport is never consulted; anything else is forwarded to the wrapped
//! [`Transport`] on `send`. Intercepted sends resolve the locator on a later
//! turn and complete atomically: `200 OK` with the blob's bytes, or
//! `500 Internal Error` when the locator is gone by then.
//!
//! An intercepted send cannot be cancelled once scheduled.

mod file;
mod intercept;
mod transport;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub use file::{FileTransport, OfflineTransport};
pub use transport::{Completion, Transport, TransportError, TransportRequest, TransportResponse};

use intercept::Interception;

use crate::blob::{Blob, ByteBuf};
use crate::event::{EventType, ProgressEvent};
use crate::registry::ObjectUrlRegistry;
use crate::task_queue::TaskQueue;

/// URL an intercepted request is re-pointed at.
pub const DEFAULT_PLACEHOLDER_URL: &str = "about:blank";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestReadyState {
    #[default]
    Unsent = 0,
    Opened = 1,
    HeadersReceived = 2,
    Loading = 3,
    Done = 4,
}

/// How the body is exposed (the host's `responseType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    #[default]
    Default,
    Text,
    ArrayBuffer,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("send() requires an opened, unsent request")]
    InvalidState,
}

pub type RequestHandler = Box<dyn FnMut(&HttpRequest, &ProgressEvent)>;

#[derive(Default)]
struct RequestState {
    method: String,
    url: String,
    interception: Option<Interception>,
    ready_state: RequestReadyState,
    response_type: ResponseType,
    /// Bumped by every `open`; completions of earlier cycles are dropped.
    generation: u64,
    sent: bool,
    status: u16,
    status_text: String,
    headers: Vec<(String, String)>,
    response: Option<ByteBuf>,
}

#[derive(Default)]
struct Handlers {
    ready_state_change: Option<RequestHandler>,
    load: Option<RequestHandler>,
    error: Option<RequestHandler>,
}

impl Handlers {
    fn slot(&mut self, event_type: EventType) -> Option<&mut Option<RequestHandler>> {
        match event_type {
            EventType::ReadyStateChange => Some(&mut self.ready_state_change),
            EventType::Load => Some(&mut self.load),
            EventType::Error => Some(&mut self.error),
            _ => None,
        }
    }
}

struct RequestInner {
    queue: TaskQueue,
    registry: Rc<ObjectUrlRegistry>,
    transport: Rc<dyn Transport>,
    placeholder_url: String,
    state: RefCell<RequestState>,
    handlers: RefCell<Handlers>,
}

/// Cheap-clone handle over one request/response cycle.
#[derive(Clone)]
pub struct HttpRequest {
    inner: Rc<RequestInner>,
}

impl HttpRequest {
    pub const UNSENT: u16 = RequestReadyState::Unsent as u16;
    pub const OPENED: u16 = RequestReadyState::Opened as u16;
    pub const HEADERS_RECEIVED: u16 = RequestReadyState::HeadersReceived as u16;
    pub const LOADING: u16 = RequestReadyState::Loading as u16;
    pub const DONE: u16 = RequestReadyState::Done as u16;

    pub fn new(
        queue: TaskQueue,
        registry: Rc<ObjectUrlRegistry>,
        transport: Rc<dyn Transport>,
    ) -> Self {
        Self::with_placeholder(queue, registry, transport, DEFAULT_PLACEHOLDER_URL)
    }

    pub fn with_placeholder(
        queue: TaskQueue,
        registry: Rc<ObjectUrlRegistry>,
        transport: Rc<dyn Transport>,
        placeholder_url: impl Into<String>,
    ) -> Self {
        Self {
            inner: Rc::new(RequestInner {
                queue,
                registry,
                transport,
                placeholder_url: placeholder_url.into(),
                state: RefCell::new(RequestState::default()),
                handlers: RefCell::new(Handlers::default()),
            }),
        }
    }

    pub fn set_on_ready_state_change(
        &self,
        handler: impl FnMut(&HttpRequest, &ProgressEvent) + 'static,
    ) {
        self.inner.handlers.borrow_mut().ready_state_change = Some(Box::new(handler));
    }

    pub fn set_on_load(&self, handler: impl FnMut(&HttpRequest, &ProgressEvent) + 'static) {
        self.inner.handlers.borrow_mut().load = Some(Box::new(handler));
    }

    pub fn set_on_error(&self, handler: impl FnMut(&HttpRequest, &ProgressEvent) + 'static) {
        self.inner.handlers.borrow_mut().error = Some(Box::new(handler));
    }

    pub fn set_response_type(&self, response_type: ResponseType) {
        self.inner.state.borrow_mut().response_type = response_type;
    }

    /// Start a new cycle for `method` on `url`, discarding any previous response.
    pub fn open(&self, method: &str, url: &str) {
        {
            let mut state = self.inner.state.borrow_mut();
            let response_type = state.response_type;
            let generation = state.generation + 1;
            if state.sent && state.ready_state != RequestReadyState::Done {
                tracing::debug!("re-open terminates the cycle in flight");
            }
            *state = RequestState {
                method: method.to_string(),
                response_type,
                generation,
                ready_state: RequestReadyState::Opened,
                ..RequestState::default()
            };
            if self.inner.registry.is_object_url(url) {
                tracing::debug!(url, "intercepting object URL request");
                state.interception = Some(Interception::new(url));
                state.url = self.inner.placeholder_url.clone();
            } else {
                state.url = url.to_string();
            }
        }
        self.fire(ProgressEvent::bare(EventType::ReadyStateChange));
    }

    /// Dispatch the request. Completion is always reported through the
    /// notifications on a later turn; only a call out of order fails here.
    ///
    /// There is no abort. A later `open` starts a new cycle and the pending
    /// completion of this one is dropped. Intercepted locators are looked up
    /// when the deferred turn runs.
    pub fn send(&self, body: Option<ByteBuf>) -> Result<(), RequestError> {
        let (generation, forward) = {
            let mut state = self.inner.state.borrow_mut();
            if state.ready_state != RequestReadyState::Opened || state.sent {
                return Err(RequestError::InvalidState);
            }
            state.sent = true;
            let forward = if state.interception.is_some() {
                None
            } else {
                Some(TransportRequest {
                    method: state.method.clone(),
                    url: state.url.clone(),
                    body,
                })
            };
            (state.generation, forward)
        };

        let request = self.clone();
        match forward {
            None => self
                .inner
                .queue
                .defer(move || request.finish_interception(generation)),
            Some(outgoing) => self.inner.transport.send(
                outgoing,
                Box::new(move |outcome| request.finish_transport(generation, outcome)),
            ),
        }
        Ok(())
    }

    pub fn ready_state(&self) -> RequestReadyState {
        self.inner.state.borrow().ready_state
    }

    pub fn status(&self) -> u16 {
        self.inner.state.borrow().status
    }

    pub fn status_text(&self) -> String {
        self.inner.state.borrow().status_text.clone()
    }

    /// Body bytes once the request is done.
    pub fn response(&self) -> Option<ByteBuf> {
        self.inner.state.borrow().response.clone()
    }

    /// Body as text for default/text response types; empty otherwise.
    pub fn response_text(&self) -> String {
        let state = self.inner.state.borrow();
        match (state.response_type, &state.response) {
            (ResponseType::Default | ResponseType::Text, Some(body)) => {
                String::from_utf8_lossy(body).into_owned()
            }
            _ => String::new(),
        }
    }

    /// Case-insensitive response header lookup.
    pub fn response_header(&self, name: &str) -> Option<String> {
        self.inner
            .state
            .borrow()
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    /// URL the request actually targets; the placeholder when intercepted.
    pub fn effective_url(&self) -> String {
        self.inner.state.borrow().url.clone()
    }

    /// True when `open` recognised an object URL.
    pub fn is_intercepted(&self) -> bool {
        self.inner.state.borrow().interception.is_some()
    }

    /// Blob an intercepted request was served from, once resolved.
    pub fn intercepted_blob(&self) -> Option<Blob> {
        self.inner
            .state
            .borrow()
            .interception
            .as_ref()
            .and_then(|i| i.resolved.clone())
    }

    /// `(loaded, total)` byte counts of an intercepted response.
    pub fn intercepted_progress(&self) -> Option<(u64, u64)> {
        self.inner
            .state
            .borrow()
            .interception
            .as_ref()
            .map(|i| (i.loaded, i.total))
    }

    fn is_current(&self, generation: u64) -> bool {
        let current = self.inner.state.borrow().generation == generation;
        if !current {
            tracing::debug!(generation, "dropping completion of a superseded cycle");
        }
        current
    }

    fn finish_interception(&self, generation: u64) {
        if !self.is_current(generation) {
            return;
        }
        let Some(locator) = self
            .inner
            .state
            .borrow()
            .interception
            .as_ref()
            .map(|i| i.locator.clone())
        else {
            return;
        };

        match self.inner.registry.resolve(&locator) {
            Some(blob) => {
                let body = blob.bytes();
                let len = body.len() as u64;
                {
                    let mut state = self.inner.state.borrow_mut();
                    state.headers = intercept::synthesized_headers(&blob);
                    if let Some(interception) = state.interception.as_mut() {
                        interception.resolved(blob, len);
                    }
                    state.status = 200;
                    state.status_text = "OK".to_string();
                    state.response = Some(body);
                    state.ready_state = RequestReadyState::Done;
                }
                self.fire(ProgressEvent::sized(EventType::ReadyStateChange, len, len));
                self.fire(ProgressEvent::sized(EventType::Load, len, len));
            }
            None => {
                tracing::warn!(url = %locator, "object URL no longer registered");
                {
                    let mut state = self.inner.state.borrow_mut();
                    state.status = 500;
                    state.status_text = "Internal Error".to_string();
                    state.ready_state = RequestReadyState::Done;
                }
                self.fire(ProgressEvent::bare(EventType::Error));
            }
        }
    }

    fn finish_transport(
        &self,
        generation: u64,
        outcome: Result<TransportResponse, TransportError>,
    ) {
        if !self.is_current(generation) {
            return;
        }
        match outcome {
            Ok(resp) => {
                let len = resp.body.len() as u64;
                {
                    let mut state = self.inner.state.borrow_mut();
                    state.status = resp.status;
                    state.status_text = resp.status_text;
                    state.headers = resp.headers;
                    state.response = Some(resp.body);
                    state.ready_state = RequestReadyState::Done;
                }
                self.fire(ProgressEvent::sized(EventType::ReadyStateChange, len, len));
                self.fire(ProgressEvent::sized(EventType::Load, len, len));
            }
            Err(err) => {
                tracing::debug!(error = %err, "transport request failed");
                {
                    let mut state = self.inner.state.borrow_mut();
                    state.status = 0;
                    state.status_text.clear();
                    state.ready_state = RequestReadyState::Done;
                }
                self.fire(ProgressEvent::bare(EventType::ReadyStateChange));
                self.fire(ProgressEvent::bare(EventType::Error));
            }
        }
    }

    fn fire(&self, event: ProgressEvent) {
        let taken = self
            .inner
            .handlers
            .borrow_mut()
            .slot(event.event_type)
            .and_then(Option::take);
        let Some(mut handler) = taken else {
            return;
        };
        handler(self, &event);
        let mut handlers = self.inner.handlers.borrow_mut();
        if let Some(slot) = handlers.slot(event.event_type) {
            if slot.is_none() {
                *slot = Some(handler);
            }
        }
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("HttpRequest")
            .field("method", &state.method)
            .field("url", &state.url)
            .field("intercepted", &state.interception.is_some())
            .field("ready_state", &state.ready_state)
            .field("status", &state.status)
            .finish()
    }
}
