use std::time::Duration;

/// Largest back-off exponent (2^8 = 256 seconds).
pub const MAX_BACKOFF_EXPONENT: u32 = 8;

/// Exponential back-off: 2^attempt seconds, capped at 2^[`MAX_BACKOFF_EXPONENT`].
pub fn backoff_delay(attempt: u32) -> Duration {
    let seconds = 2u64.pow(attempt.min(MAX_BACKOFF_EXPONENT));
    Duration::from_secs(seconds)
}
