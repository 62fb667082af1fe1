//! Processors driving the watch pipeline.
//!
//! - `ActivitySource`: fetches operation records from the indexer
//! - `NotificationSender`: delivers payloads to the webhook under its rate limit
//! - `ErrorReporter`: forwards failures to an optional reporting endpoint
//! - `Watcher`: the watermark-driven poll loop tying them together

pub mod activity_source;
pub mod error_reporter;
pub mod notification_sender;
pub mod watcher;

pub use activity_source::{ActivitySource, FetchError};
pub use error_reporter::ErrorReporter;
pub use notification_sender::{DeliveryError, NotificationSender, NotificationSink};
pub use watcher::{CycleOutcome, CycleReport, Watcher, WatcherState};
