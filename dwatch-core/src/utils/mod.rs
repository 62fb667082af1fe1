pub mod amount;
pub mod backoff;
pub mod sleeper;
