//! Asynchronous decoding of blobs (the host's `FileReader`).
//!
//! Each `read_as_*` call moves the reader to `Loading`, fires `loadstart`
//! synchronously and defers the decode to the [`TaskQueue`]. The deferred
//! turn fires `progress`, then `load` on success or `error` on failure, and
//! always `loadend` last. Failures are never returned to the caller; they
//! land in [`FileReader::error`] and the `error` notification.

mod error;
mod source;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub use error::ReadError;
pub use source::{ByteSource, ReadSource};

use crate::blob::ByteBuf;
use crate::data_url;
use crate::event::{EventType, ProgressEvent};
use crate::task_queue::TaskQueue;

/// Media type used in data URLs for sources that carry none.
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Reader life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyState {
    #[default]
    Empty = 0,
    Loading = 1,
    Done = 2,
}

/// Decoded value of the last successful read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadResult {
    Bytes(ByteBuf),
    Text(String),
}

impl ReadResult {
    pub fn as_bytes(&self) -> Option<&ByteBuf> {
        match self {
            ReadResult::Bytes(buf) => Some(buf),
            ReadResult::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ReadResult::Text(text) => Some(text),
            ReadResult::Bytes(_) => None,
        }
    }
}

/// Notification callback; receives the reader so it can inspect `result`.
pub type ReaderHandler = Box<dyn FnMut(&FileReader, &ProgressEvent)>;

#[derive(Debug, Clone)]
enum ReadKind {
    ArrayBuffer,
    DataUrl,
    Text,
}

#[derive(Default)]
struct ReaderState {
    ready_state: ReadyState,
    result: Option<ReadResult>,
    error: Option<ReadError>,
    // Bumped by every read and abort; a deferred decode whose generation is
    // stale has been superseded and must not touch the state.
    generation: u64,
}

#[derive(Default)]
struct Handlers {
    load_start: Option<ReaderHandler>,
    progress: Option<ReaderHandler>,
    load: Option<ReaderHandler>,
    error: Option<ReaderHandler>,
    load_end: Option<ReaderHandler>,
}

impl Handlers {
    fn slot(&mut self, event_type: EventType) -> Option<&mut Option<ReaderHandler>> {
        match event_type {
            EventType::LoadStart => Some(&mut self.load_start),
            EventType::Progress => Some(&mut self.progress),
            EventType::Load => Some(&mut self.load),
            EventType::Error => Some(&mut self.error),
            EventType::LoadEnd => Some(&mut self.load_end),
            EventType::ReadyStateChange => None,
        }
    }
}

struct ReaderInner {
    queue: TaskQueue,
    default_media_type: String,
    state: RefCell<ReaderState>,
    handlers: RefCell<Handlers>,
}

/// Cheap-clone handle; clones observe and drive the same reader.
#[derive(Clone)]
pub struct FileReader {
    inner: Rc<ReaderInner>,
}

impl FileReader {
    pub const EMPTY: u16 = ReadyState::Empty as u16;
    pub const LOADING: u16 = ReadyState::Loading as u16;
    pub const DONE: u16 = ReadyState::Done as u16;

    pub fn new(queue: TaskQueue) -> Self {
        Self::with_default_media_type(queue, DEFAULT_MEDIA_TYPE)
    }

    /// Reader whose data URLs fall back to `media_type` for untyped sources.
    pub fn with_default_media_type(queue: TaskQueue, media_type: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(ReaderInner {
                queue,
                default_media_type: media_type.into(),
                state: RefCell::new(ReaderState::default()),
                handlers: RefCell::new(Handlers::default()),
            }),
        }
    }

    pub fn ready_state(&self) -> ReadyState {
        self.inner.state.borrow().ready_state
    }

    pub fn result(&self) -> Option<ReadResult> {
        self.inner.state.borrow().result.clone()
    }

    pub fn error(&self) -> Option<ReadError> {
        self.inner.state.borrow().error.clone()
    }

    pub fn set_on_load_start(&self, handler: impl FnMut(&FileReader, &ProgressEvent) + 'static) {
        self.inner.handlers.borrow_mut().load_start = Some(Box::new(handler));
    }

    pub fn set_on_progress(&self, handler: impl FnMut(&FileReader, &ProgressEvent) + 'static) {
        self.inner.handlers.borrow_mut().progress = Some(Box::new(handler));
    }

    pub fn set_on_load(&self, handler: impl FnMut(&FileReader, &ProgressEvent) + 'static) {
        self.inner.handlers.borrow_mut().load = Some(Box::new(handler));
    }

    pub fn set_on_error(&self, handler: impl FnMut(&FileReader, &ProgressEvent) + 'static) {
        self.inner.handlers.borrow_mut().error = Some(Box::new(handler));
    }

    pub fn set_on_load_end(&self, handler: impl FnMut(&FileReader, &ProgressEvent) + 'static) {
        self.inner.handlers.borrow_mut().load_end = Some(Box::new(handler));
    }

    /// Read raw bytes; a buffer source is handed back unchanged.
    pub fn read_as_array_buffer(&self, source: impl Into<ReadSource>) {
        self.start(source.into(), ReadKind::ArrayBuffer);
    }

    /// Read as `data:<type>;base64,<payload>`.
    pub fn read_as_data_url(&self, source: impl Into<ReadSource>) {
        self.start(source.into(), ReadKind::DataUrl);
    }

    /// Read as text. Only UTF-8 is decoded; other labels are logged and
    /// treated as UTF-8.
    pub fn read_as_text(&self, source: impl Into<ReadSource>, encoding: Option<&str>) {
        if let Some(label) = encoding.filter(|l| !is_utf8_label(l)) {
            tracing::warn!(encoding = label, "unsupported text encoding, decoding as utf-8");
        }
        self.start(source.into(), ReadKind::Text);
    }

    /// Cancel an in-flight read: `error` then `loadend` fire immediately and
    /// the deferred decode is discarded. With nothing in flight only the
    /// state changes (`Done`, `Aborted`); no notification fires.
    pub fn abort(&self) {
        let was_loading = {
            let mut state = self.inner.state.borrow_mut();
            let loading = state.ready_state == ReadyState::Loading;
            state.generation += 1;
            state.ready_state = ReadyState::Done;
            state.result = None;
            state.error = Some(ReadError::Aborted);
            loading
        };
        if was_loading {
            tracing::debug!("read aborted");
            self.fire(ProgressEvent::bare(EventType::Error));
            self.fire(ProgressEvent::bare(EventType::LoadEnd));
        }
    }

    fn start(&self, source: ReadSource, kind: ReadKind) {
        let generation = {
            let mut state = self.inner.state.borrow_mut();
            if state.ready_state == ReadyState::Loading {
                tracing::debug!("new read supersedes the one in flight");
            }
            state.generation += 1;
            state.ready_state = ReadyState::Loading;
            state.result = None;
            state.error = None;
            state.generation
        };
        self.fire(ProgressEvent::bare(EventType::LoadStart));

        let reader = self.clone();
        self.inner
            .queue
            .defer(move || reader.complete(generation, &source, &kind));
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.state.borrow().generation == generation
    }

    fn complete(&self, generation: u64, source: &ReadSource, kind: &ReadKind) {
        if !self.is_current(generation) {
            tracing::trace!("dropping superseded read");
            return;
        }

        match source.materialize() {
            Ok(bytes) => {
                let len = bytes.len() as u64;
                self.fire(ProgressEvent::sized(EventType::Progress, len, len));
                if !self.is_current(generation) {
                    return;
                }
                let result = self.decode(bytes, source.media_type(), kind);
                {
                    let mut state = self.inner.state.borrow_mut();
                    state.result = Some(result);
                    state.ready_state = ReadyState::Done;
                }
                self.fire(ProgressEvent::sized(EventType::Load, len, len));
                self.fire(ProgressEvent::sized(EventType::LoadEnd, len, len));
            }
            Err(err) => {
                tracing::debug!(error = %err, "read failed");
                {
                    let mut state = self.inner.state.borrow_mut();
                    state.error = Some(err);
                    state.ready_state = ReadyState::Done;
                }
                self.fire(ProgressEvent::bare(EventType::Error));
                self.fire(ProgressEvent::bare(EventType::LoadEnd));
            }
        }
    }

    fn decode(&self, bytes: ByteBuf, media_type: &str, kind: &ReadKind) -> ReadResult {
        match kind {
            ReadKind::ArrayBuffer => ReadResult::Bytes(bytes),
            ReadKind::Text => ReadResult::Text(String::from_utf8_lossy(&bytes).into_owned()),
            ReadKind::DataUrl => {
                let media_type = if media_type.is_empty() {
                    self.inner.default_media_type.as_str()
                } else {
                    media_type
                };
                ReadResult::Text(data_url::encode(media_type, &bytes))
            }
        }
    }

    /// Call the handler for `event` with no borrow held, so it may freely
    /// use the reader, including replacing itself.
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

impl fmt::Debug for FileReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("FileReader")
            .field("ready_state", &state.ready_state)
            .field("result", &state.result)
            .field("error", &state.error)
            .finish()
    }
}

fn is_utf8_label(label: &str) -> bool {
    matches!(
        label.trim().to_ascii_lowercase().as_str(),
        "utf-8" | "utf8" | "unicode-1-1-utf-8"
    )
}
