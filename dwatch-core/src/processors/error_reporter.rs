//! Forwards failures to an optional HTTP error-reporting endpoint.
//!
//! Reporting is best effort: a failed report is logged and otherwise ignored.

use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub service: &'static str,
    pub version: &'static str,
    pub level: &'static str,
    /// Pipeline stage that failed, e.g. `fetch` or `delivery`.
    pub context: String,
    pub message: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone)]
pub struct ErrorReporter {
    endpoint: Option<Url>,
    http_client: reqwest::Client,
}

impl ErrorReporter {
    pub fn new(endpoint: Option<Url>) -> Self {
        Self {
            endpoint,
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// A reporter that only logs.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    pub async fn report(&self, context: &str, error: &(dyn std::error::Error + Send + Sync)) {
        let Some(endpoint) = &self.endpoint else {
            return;
        };

        let report = ErrorReport {
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            level: "error",
            context: context.to_string(),
            message: error.to_string(),
            timestamp: time::OffsetDateTime::now_utc().unix_timestamp(),
        };

        match self
            .http_client
            .post(endpoint.clone())
            .json(&report)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                debug!(context, "Error report delivered");
            }
            Ok(response) => {
                warn!(context, status = %response.status(), "Error report rejected");
            }
            Err(e) => {
                warn!(context, error = %e, "Failed to send error report");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::FetchError;
    use dwatch_sdk::client::ClientError;
    use mockito::{Matcher, Server};

    fn fetch_error() -> FetchError {
        FetchError::Client(ClientError::Api {
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: "upstream down".to_string(),
        })
    }

    #[tokio::test]
    async fn test_report_posts_json() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/report")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "service": "dwatch-core",
                "level": "error",
                "context": "fetch",
            })))
            .with_status(202)
            .expect(1)
            .create_async()
            .await;

        let reporter = ErrorReporter::new(Some(format!("{}/report", server.url()).parse().unwrap()));
        assert!(reporter.is_enabled());
        reporter.report("fetch", &fetch_error()).await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_disabled_reporter_is_silent() {
        let reporter = ErrorReporter::disabled();
        assert!(!reporter.is_enabled());
        // no endpoint, nothing to await on
        reporter.report("fetch", &fetch_error()).await;
    }
}
