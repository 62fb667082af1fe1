//! NotificationSender processor.
//!
//! The NotificationSender is responsible for:
//! - Posting a payload to the webhook sink
//! - Honouring the sink's rate-limit window: when the remaining quota reads
//!   zero it waits `reset_after + 1s` before handing control back
//! - Pausing a fixed delay after every successful delivery
//! - Retrying transient delivery failures with exponential backoff when
//!   asked to; other rejections fail at once

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dwatch_sdk::client::{ClientError, RateLimitStatus, WebhookClient};
use dwatch_sdk::objects::NotificationPayload;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::utils::backoff::backoff_delay;
use crate::utils::sleeper::Sleeper;

/// Padding added to the sink's reset window.
const RATE_LIMIT_PADDING: Duration = Duration::from_secs(1);

/// The webhook rejected the payload or could not be reached.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("webhook delivery failed: {0}")]
    Client(#[from] ClientError),
}

impl DeliveryError {
    /// Rejections that will repeat on every attempt are not worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            DeliveryError::Client(e) => e.is_transient(),
        }
    }
}

/// Where notifications go.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one payload, returning the sink's rate-limit state.
    async fn deliver(&self, payload: &NotificationPayload) -> Result<RateLimitStatus, DeliveryError>;
}

#[async_trait]
impl NotificationSink for WebhookClient {
    async fn deliver(&self, payload: &NotificationPayload) -> Result<RateLimitStatus, DeliveryError> {
        Ok(self.send(payload).await?)
    }
}

pub struct NotificationSender<K: NotificationSink> {
    sink: K,
    sleeper: Arc<dyn Sleeper>,
    send_delay: Duration,
}

impl<K: NotificationSink> NotificationSender<K> {
    /// Create a new NotificationSender.
    ///
    /// # Arguments
    ///
    /// * `sink` - Delivery target
    /// * `sleeper` - Used for the rate-limit and post-send pauses
    /// * `send_delay` - Fixed pause after every successful delivery
    pub fn new(sink: K, sleeper: Arc<dyn Sleeper>, send_delay: Duration) -> Self {
        Self {
            sink,
            sleeper,
            send_delay,
        }
    }

    /// Deliver `payload` once. Errors are returned without retrying.
    pub async fn send(&self, payload: &NotificationPayload) -> Result<(), DeliveryError> {
        let rate_limit = self.sink.deliver(payload).await?;

        if let Some(wait) = rate_limit_wait(&rate_limit) {
            info!(wait_secs = wait.as_secs_f64(), "Waiting for webhook rate limit");
            self.sleeper.sleep(wait).await;
        }

        self.sleeper.sleep(self.send_delay).await;
        Ok(())
    }

    /// Deliver `payload`, retrying transient failures up to `retries` more
    /// times with exponential backoff. Returns the last error if every
    /// attempt fails, or the first non-retryable one.
    pub async fn send_with_retry(
        &self,
        payload: &NotificationPayload,
        retries: u32,
    ) -> Result<(), DeliveryError> {
        let mut attempt = 0;
        loop {
            match self.send(payload).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < retries && e.is_retryable() => {
                    let delay = backoff_delay(attempt);
                    warn!(
                        error = %e,
                        attempt = attempt + 1,
                        retry_in_secs = delay.as_secs(),
                        "Webhook delivery failed, retrying"
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    debug!(
                        attempts = attempt + 1,
                        retryable = e.is_retryable(),
                        "Giving up on webhook delivery"
                    );
                    return Err(e);
                }
            }
        }
    }
}

/// How long to hold off before the next delivery, if the window is used up.
pub fn rate_limit_wait(status: &RateLimitStatus) -> Option<Duration> {
    if !status.is_exhausted() {
        return None;
    }
    Some(status.reset_after.unwrap_or_default() + RATE_LIMIT_PADDING)
}
