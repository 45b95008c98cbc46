//! Exports a content tree from a Notion workspace through the service's
//! task-based export API and downloads the resulting archive.
//!
//! An export runs as one sequential flow: the block id is normalized, an
//! export task is enqueued, its status is polled until it reaches a terminal
//! state and the finished archive is streamed to disk.

pub mod block;
pub mod download;
pub mod error;
pub mod model;
pub mod progress;
pub mod service;

pub use block::normalize_block_id;
pub use download::{download, DownloadResult};
pub use error::Error;
pub use model::{ExportOptions, ExportTask, TaskState};
pub use service::{ExportConfig, NotionExporter, NotionTaskClient, OnReady, TaskClient};
