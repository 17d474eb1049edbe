//! Shared notification recorder for reader and request tests.

use std::cell::RefCell;
use std::rc::Rc;

use blobshim_core::event::{EventType, ProgressEvent};
use blobshim_core::reader::FileReader;
use blobshim_core::request::HttpRequest;

#[derive(Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<EventType>>>);

impl EventLog {
    pub fn entries(&self) -> Vec<&'static str> {
        self.0.borrow().iter().map(|t| t.as_str()).collect()
    }

    fn push(&self, event: &ProgressEvent) {
        self.0.borrow_mut().push(event.event_type);
    }

    /// Record every reader notification.
    pub fn attach_reader(&self, reader: &FileReader) {
        let log = self.clone();
        reader.set_on_load_start(move |_, e| log.push(e));
        let log = self.clone();
        reader.set_on_progress(move |_, e| log.push(e));
        let log = self.clone();
        reader.set_on_load(move |_, e| log.push(e));
        let log = self.clone();
        reader.set_on_error(move |_, e| log.push(e));
        let log = self.clone();
        reader.set_on_load_end(move |_, e| log.push(e));
    }

    /// Record every request notification.
    pub fn attach_request(&self, request: &HttpRequest) {
        let log = self.clone();
        request.set_on_ready_state_change(move |_, e| log.push(e));
        let log = self.clone();
        request.set_on_load(move |_, e| log.push(e));
        let log = self.clone();
        request.set_on_error(move |_, e| log.push(e));
    }
}
