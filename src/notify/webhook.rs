use super::NotificationService;
use crate::models::CallbackPayload;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Posts completion payloads as JSON with a per-request timeout.
pub struct WebhookClient {
    client: Client,
    timeout: Duration,
}

impl WebhookClient {
    pub fn new(timeout: Duration) -> Self {
        Self::new_with_client(timeout, Client::new())
    }

    /// Build on an existing client to share its connection pool.
    pub fn new_with_client(timeout: Duration, client: Client) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl NotificationService for WebhookClient {
    async fn deliver(&self, url: &str, payload: &CallbackPayload) -> Result<()> {
        tracing::debug!("Delivering completion callback to {}", url);

        let response = self
            .client
            .post(url)
            .json(payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Error::Notification(format!("request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::Notification(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProcessingStatus;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_payload() -> CallbackPayload {
        CallbackPayload {
            request_id: "batch-1".to_string(),
            status: ProcessingStatus::Completed,
            total_products: 2,
            processed_products: 2,
            completion_percentage: 100.0,
            timestamp: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_deliver_posts_json_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_partial_json(json!({
                "request_id": "batch-1",
                "status": "completed",
                "total_products": 2,
                "processed_products": 2,
                "completion_percentage": 100.0,
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = WebhookClient::new(Duration::from_secs(10));
        let url = format!("{}/hook", server.uri());

        client.deliver(&url, &sample_payload()).await.unwrap();
    }

    #[tokio::test]
    async fn test_non_success_status_is_notification_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = WebhookClient::new(Duration::from_secs(10));

        let result = client.deliver(&server.uri(), &sample_payload()).await;

        assert!(matches!(result, Err(Error::Notification(_))));
    }

    #[tokio::test]
    async fn test_slow_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client = WebhookClient::new(Duration::from_millis(50));

        let result = client.deliver(&server.uri(), &sample_payload()).await;

        assert!(matches!(result, Err(Error::Notification(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_notification_error() {
        let client = WebhookClient::new(Duration::from_secs(1));

        let result = client
            .deliver("http://127.0.0.1:1/hook", &sample_payload())
            .await;

        assert!(matches!(result, Err(Error::Notification(_))));
    }
}
