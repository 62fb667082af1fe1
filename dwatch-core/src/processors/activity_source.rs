use async_trait::async_trait;
use dwatch_sdk::client::{ClientError, IndexerClient};
use dwatch_sdk::objects::OperationRecord;
use thiserror::Error;

/// The indexer could not be reached or answered with something unusable.
/// Always worth retrying later.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to fetch contract activity: {0}")]
    Client(#[from] ClientError),
}

/// Where operation records come from.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Most recent activity, or only activity at or after `cursor`
    /// (milliseconds since the epoch) when given.
    async fn fetch_activity_since(
        &self,
        cursor: Option<i64>,
    ) -> Result<Vec<OperationRecord>, FetchError>;

    /// Entire history, newest first.
    async fn fetch_all_history(&self) -> Result<Vec<OperationRecord>, FetchError>;
}

#[async_trait]
impl ActivitySource for IndexerClient {
    async fn fetch_activity_since(
        &self,
        cursor: Option<i64>,
    ) -> Result<Vec<OperationRecord>, FetchError> {
        Ok(IndexerClient::fetch_activity_since(self, cursor).await?)
    }

    async fn fetch_all_history(&self) -> Result<Vec<OperationRecord>, FetchError> {
        Ok(IndexerClient::fetch_all_history(self).await?)
    }
}
