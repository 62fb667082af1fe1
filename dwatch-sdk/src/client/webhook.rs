//! Chat webhook delivery client.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::HeaderMap;
use url::Url;

use super::ClientError;
use crate::objects::NotificationPayload;

pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RATE_LIMIT_RESET_AFTER_HEADER: &str = "x-ratelimit-reset-after";

/// Rate-limit window reported by the webhook on a successful delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateLimitStatus {
    /// Requests left in the current window.
    pub remaining: Option<u64>,
    /// Time until the window resets.
    pub reset_after: Option<Duration>,
}

impl RateLimitStatus {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
        };

        Self {
            remaining: header(RATE_LIMIT_REMAINING_HEADER).and_then(|v| v.parse().ok()),
            reset_after: header(RATE_LIMIT_RESET_AFTER_HEADER)
                .and_then(|v| v.parse::<f64>().ok())
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok()),
        }
    }

    /// Whether the window is used up.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

/// Posts [`NotificationPayload`]s to a single webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: Client,
    url: Url,
}

impl WebhookClient {
    pub fn new(url: Url) -> Self {
        Self {
            http: Client::new(),
            url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Deliver one payload. Any non-2xx status is an error; on success the
    /// rate-limit headers are returned for the caller to act on.
    pub async fn send(&self, payload: &NotificationPayload) -> Result<RateLimitStatus, ClientError> {
        let resp = self.http.post(self.url.clone()).json(payload).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, body });
        }

        Ok(RateLimitStatus::from_headers(resp.headers()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client(server: &Server) -> WebhookClient {
        let url = format!("{}/api/webhooks/1/token", server.url());
        WebhookClient::new(url.parse().unwrap())
    }

    #[tokio::test]
    async fn test_send_posts_json_and_reads_rate_limit() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/webhooks/1/token")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({ "content": "hello" })))
            .with_status(204)
            .with_header(RATE_LIMIT_REMAINING_HEADER, "0")
            .with_header(RATE_LIMIT_RESET_AFTER_HEADER, "3")
            .create_async()
            .await;

        let status = client(&server)
            .send(&NotificationPayload::text("hello"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(status.is_exhausted());
        assert_eq!(status.reset_after, Some(Duration::from_secs(3)));
    }

    #[tokio::test]
    async fn test_send_without_rate_limit_headers() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/webhooks/1/token")
            .with_status(200)
            .create_async()
            .await;

        let status = client(&server)
            .send(&NotificationPayload::text("hello"))
            .await
            .unwrap();

        assert_eq!(status, RateLimitStatus::default());
        assert!(!status.is_exhausted());
    }

    #[tokio::test]
    async fn test_send_rejected() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/webhooks/1/token")
            .with_status(429)
            .with_body(r#"{"message": "You are being rate limited."}"#)
            .create_async()
            .await;

        let err = client(&server)
            .send(&NotificationPayload::text("hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Api { status, .. } if status.as_u16() == 429));
    }

    #[test]
    fn test_fractional_reset_after() {
        let mut headers = HeaderMap::new();
        headers.insert(RATE_LIMIT_REMAINING_HEADER, "4".parse().unwrap());
        headers.insert(RATE_LIMIT_RESET_AFTER_HEADER, "0.5".parse().unwrap());

        let status = RateLimitStatus::from_headers(&headers);
        assert_eq!(status.remaining, Some(4));
        assert_eq!(status.reset_after, Some(Duration::from_millis(500)));
        assert!(!status.is_exhausted());
    }
}
