use std::time::Duration;

/// Timing knobs for the poll loop and the notification sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    /// Sleep between polls that found nothing new.
    pub idle_interval: Duration,
    /// Added to the watermark to form the next `from` cursor, so the record
    /// that produced the watermark is not fetched again.
    pub boundary_offset_ms: i64,
    /// Fixed pause after every successful delivery.
    pub send_delay: Duration,
    /// Extra delivery attempts before a notification is dropped.
    pub delivery_retries: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            idle_interval: Duration::from_secs(30),
            boundary_offset_ms: 1000,
            send_delay: Duration::from_secs(1),
            delivery_retries: 3,
        }
    }
}
