use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;

use super::{FlowEngine, FlowOutcome};

/// Delegates each turn to an external service over HTTP.
///
/// Request body: `{"user_id", "session_id", "message"}`.
/// Response body: `{"reply", "stage", "mood"?, "reason"?, "extra"?}`.
#[derive(Clone)]
pub struct RemoteFlowEngine {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Serialize)]
struct FlowRequest<'a> {
    user_id: &'a str,
    session_id: &'a str,
    message: &'a str,
}

impl RemoteFlowEngine {
    /// With no timeout a slow engine holds the chat request open until it answers.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build().context("Failed to build flow engine HTTP client")?,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FlowEngine for RemoteFlowEngine {
    async fn handle(
        &self,
        user_id: &str,
        session_id: &str,
        message: &str,
    ) -> anyhow::Result<FlowOutcome> {
        let response = self
            .client
            .post(&self.url)
            .json(&FlowRequest {
                user_id,
                session_id,
                message,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Flow engine error {}: {}", status, body);
        }

        let outcome = response
            .json::<FlowOutcome>()
            .await
            .context("Flow engine returned an unexpected body")?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(FlowRequest {
            user_id: "user_1",
            session_id: "sess_1",
            message: "hello",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"user_id": "user_1", "session_id": "sess_1", "message": "hello"})
        );
    }

    #[test]
    fn test_new_keeps_url() {
        let engine = RemoteFlowEngine::new("http://flow.local/handle", None).unwrap();
        assert_eq!(engine.url(), "http://flow.local/handle");
    }

    #[tokio::test]
    async fn test_unreachable_engine_is_an_error() {
        // Reserve a free port, then release it so nothing is listening there.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let engine = RemoteFlowEngine::new(
            format!("http://127.0.0.1:{port}/handle"),
            Some(Duration::from_secs(2)),
        )
        .unwrap();
        let result = engine.handle("user_1", "sess_1", "hi").await;
        assert!(result.is_err());
    }
}
