//! HTTP client for the question-answering backend.

use crate::config::ApiConfig;
use async_trait::async_trait;
use colloquy_core::conversation::HistoryRecord;
use colloquy_core::gateway::QaBackend;
use colloquy_core::{ChatError, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode, header};
use serde::Serialize;
use std::time::Duration;

/// Client for the backend's history and ask endpoints.
///
/// All requests carry `Content-Type: application/json`; the `Authorization`
/// header is attached only when a bearer token is available.
#[derive(Clone)]
pub struct QaClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AskRequest<'a> {
    user_id: i64,
    question: &'a str,
    session_id: &'a str,
}

impl QaClient {
    /// Creates a client for the configured backend.
    pub fn new(config: &ApiConfig, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChatError::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_headers(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header(header::CONTENT_TYPE, "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn http_error(response: Response) -> ChatError {
        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or("").to_string();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read error body".to_string());
        ChatError::http(status.as_u16(), status_text, body)
    }
}

#[async_trait]
impl QaBackend for QaClient {
    async fn fetch_history(&self, user_id: i64) -> Result<Vec<HistoryRecord>> {
        let url = self.endpoint(&format!("/api/qa/history/user/{user_id}"));
        tracing::debug!(%url, "fetching conversation history");

        let response = self.with_headers(self.client.get(&url)).send().await?;

        // No stored history yet is a normal state, not an error.
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(user_id, "no history on backend");
            return Ok(Vec::new());
        }

        if !response.status().is_success() {
            return Err(Self::http_error(response).await);
        }

        let body = response.text().await?;
        let records: Vec<HistoryRecord> = serde_json::from_str(&body)?;
        tracing::debug!(count = records.len(), "history fetched");
        Ok(records)
    }

    async fn delete_history(&self, conversation_id: &str) -> Result<()> {
        let url = self.endpoint(&format!("/api/qa/history/{conversation_id}"));
        tracing::debug!(%url, "deleting conversation history");

        let response = self.with_headers(self.client.delete(&url)).send().await?;

        if !response.status().is_success() {
            return Err(Self::http_error(response).await);
        }
        Ok(())
    }

    async fn ask(&self, user_id: i64, question: &str, session_id: &str) -> Result<String> {
        let url = self.endpoint("/api/qa/ask");
        let request = AskRequest {
            user_id,
            question,
            session_id,
        };
        tracing::debug!(%url, session_id, "sending question");

        let response = self
            .with_headers(self.client.post(&url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::http_error(response).await);
        }

        // The answer is the raw body text, not a JSON envelope.
        let answer = response.text().await?;
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> QaClient {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        };
        QaClient::new(&config, None).unwrap()
    }

    #[test]
    fn endpoint_joins_paths() {
        let client = client("http://qa.example.com");
        assert_eq!(
            client.endpoint("/api/qa/ask"),
            "http://qa.example.com/api/qa/ask"
        );
    }

    #[test]
    fn trailing_slash_in_base_url_is_stripped() {
        let client = client("http://qa.example.com/");
        assert_eq!(
            client.endpoint("/api/qa/history/user/7"),
            "http://qa.example.com/api/qa/history/user/7"
        );
    }

    #[test]
    fn ask_request_serializes_camel_case() {
        let request = AskRequest {
            user_id: 42,
            question: "hi",
            session_id: "s-1",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["userId"], 42);
        assert_eq!(json["question"], "hi");
        assert_eq!(json["sessionId"], "s-1");
    }
}
