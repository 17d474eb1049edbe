//! Notification payloads shared by the reader and the request surface.

/// Which notification is being delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    LoadStart,
    Progress,
    Load,
    Error,
    LoadEnd,
    ReadyStateChange,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::LoadStart => "loadstart",
            EventType::Progress => "progress",
            EventType::Load => "load",
            EventType::Error => "error",
            EventType::LoadEnd => "loadend",
            EventType::ReadyStateChange => "readystatechange",
        }
    }
}

/// The host's `ProgressEvent`: what fired and how many bytes were involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub event_type: EventType,
    pub loaded: u64,
    pub total: u64,
    pub length_computable: bool,
}

impl ProgressEvent {
    /// Event with no byte counts.
    pub fn bare(event_type: EventType) -> Self {
        Self {
            event_type,
            loaded: 0,
            total: 0,
            length_computable: false,
        }
    }

    /// Event reporting `loaded` of `total` bytes.
    pub fn sized(event_type: EventType, loaded: u64, total: u64) -> Self {
        Self {
            event_type,
            loaded,
            total,
            length_computable: true,
        }
    }
}
