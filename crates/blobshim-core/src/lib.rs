pub mod config;
pub mod logging;

pub mod blob;
pub mod checksum;
pub mod data_url;
pub mod event;
pub mod host;
pub mod loader;
pub mod media_type;
pub mod reader;
pub mod registry;
pub mod request;
pub mod task_queue;
