//! Better Call Dev operations client.

use reqwest::Client;
use url::Url;

use super::{ClientError, parse_response};
use crate::objects::{ContractId, OperationRecord, OperationsPage, entrypoints};

/// Typed HTTP client for `GET /contract/{network}/{address}/operations`.
///
/// Only applied operations whose entrypoint is in [`entrypoints::WATCHED`]
/// are requested.
#[derive(Debug, Clone)]
pub struct IndexerClient {
    http: Client,
    base_url: Url,
    contract: ContractId,
}

impl IndexerClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.better-call.dev/v1/";

    /// Create a new `IndexerClient`.
    ///
    /// * `base_url` – API root, e.g. `https://api.better-call.dev/v1/`. The
    ///   trailing slash matters: the endpoint path is joined onto it.
    /// * `contract` – the contract whose operations are listed.
    pub fn new(base_url: Url, contract: ContractId) -> Self {
        Self {
            http: Client::new(),
            base_url,
            contract,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn contract(&self) -> &ContractId {
        &self.contract
    }

    /// Most recent operations, or only those at or after `from_millis` when
    /// given. The indexer returns them newest first.
    pub async fn fetch_activity_since(
        &self,
        from_millis: Option<i64>,
    ) -> Result<Vec<OperationRecord>, ClientError> {
        let from = from_millis.map(|ms| ms.to_string());
        let page = self.fetch_page(from.as_deref(), None).await?;
        Ok(page.operations)
    }

    /// Walk every page backwards through history, following `last_id` until
    /// the indexer stops returning one. Records are returned newest first.
    pub async fn fetch_all_history(&self) -> Result<Vec<OperationRecord>, ClientError> {
        let mut operations = Vec::new();
        let mut last_id: Option<String> = None;

        loop {
            let page = self.fetch_page(None, last_id.as_deref()).await?;
            let page_len = page.operations.len();
            operations.extend(page.operations);

            match page.last_id {
                Some(next) if page_len > 0 && last_id.as_deref() != Some(next.as_str()) => {
                    last_id = Some(next);
                }
                _ => break,
            }
        }

        Ok(operations)
    }

    async fn fetch_page(
        &self,
        from: Option<&str>,
        last_id: Option<&str>,
    ) -> Result<OperationsPage, ClientError> {
        let url = self.base_url.join(&format!(
            "contract/{}/{}/operations",
            self.contract.network, self.contract.address
        ))?;
        let watched = entrypoints::WATCHED.join(",");

        let mut query = vec![("status", "applied"), ("entrypoints", watched.as_str())];
        if let Some(from) = from {
            query.push(("from", from));
        }
        if let Some(last_id) = last_id {
            query.push(("last_id", last_id));
        }

        let resp = self.http.get(url).query(&query).send().await?;

        parse_response(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const CONTRACT: &str = "mainnet/KT1WZ1HJyx5wPt96ZTjtWPotoPUk7pXNPfT2";
    const PATH: &str = "/contract/mainnet/KT1WZ1HJyx5wPt96ZTjtWPotoPUk7pXNPfT2/operations";

    fn client(server: &Server) -> IndexerClient {
        IndexerClient::new(server.url().parse().unwrap(), CONTRACT.parse().unwrap())
    }

    fn record(counter: i64, entrypoint: &str) -> serde_json::Value {
        serde_json::json!({
            "counter": counter,
            "entrypoint": entrypoint,
            "source": "tz1source",
            "destination": "KT1WZ1HJyx5wPt96ZTjtWPotoPUk7pXNPfT2",
            "timestamp": "2021-09-08T15:37:24Z",
            "hash": format!("op{counter}"),
            "parameters": []
        })
    }

    fn base_query() -> Vec<Matcher> {
        vec![
            Matcher::UrlEncoded("status".into(), "applied".into()),
            Matcher::UrlEncoded(
                "entrypoints".into(),
                "vote,propose,executeTimelock,endVoting,cancelTimelock".into(),
            ),
        ]
    }

    #[tokio::test]
    async fn test_fetch_activity_since_sends_filters() {
        let mut server = Server::new_async().await;
        let mut query = base_query();
        query.push(Matcher::UrlEncoded("from".into(), "1631115445000".into()));
        let mock = server
            .mock("GET", PATH)
            .match_query(Matcher::AllOf(query))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::json!({ "operations": [record(7, "endVoting")] }).to_string())
            .expect(1)
            .create_async()
            .await;

        let records = client(&server)
            .fetch_activity_since(Some(1_631_115_445_000))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entrypoint, "endVoting");
    }

    #[tokio::test]
    async fn test_fetch_activity_rejects_bad_status_and_body() {
        let mut server = Server::new_async().await;
        let _bad_status = server
            .mock("GET", PATH)
            .match_query(Matcher::UrlEncoded("from".into(), "1".into()))
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;
        let _bad_body = server
            .mock("GET", PATH)
            .match_query(Matcher::UrlEncoded("from".into(), "2".into()))
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let client = client(&server);
        assert!(matches!(
            client.fetch_activity_since(Some(1)).await,
            Err(ClientError::Api { status, .. }) if status.as_u16() == 502
        ));
        assert!(matches!(
            client.fetch_activity_since(Some(2)).await,
            Err(ClientError::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_all_history_follows_last_id() {
        let mut server = Server::new_async().await;
        // The first page matches any query, so it must be registered first and
        // capped at one hit for the continuation request to reach the second mock.
        let first = server
            .mock("GET", PATH)
            .match_query(Matcher::AllOf(base_query()))
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "operations": [record(3, "vote"), record(3, "voteCallback")],
                    "last_id": "200"
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let mut second_query = base_query();
        second_query.push(Matcher::UrlEncoded("last_id".into(), "200".into()));
        let second = server
            .mock("GET", PATH)
            .match_query(Matcher::AllOf(second_query))
            .with_status(200)
            .with_body(serde_json::json!({ "operations": [record(1, "propose")] }).to_string())
            .expect(1)
            .create_async()
            .await;

        let records = client(&server).fetch_all_history().await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        let counters: Vec<i64> = records.iter().map(|r| r.counter).collect();
        assert_eq!(counters, vec![3, 3, 1]);
    }
}
