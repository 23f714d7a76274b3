use serde::{Deserialize, Serialize};

use super::ChatError;

#[derive(Serialize)]
struct ChatRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    reply: String,
}

/// HTTP client for the chat backend.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts one prompt with the bearer token and returns the reply text.
    pub async fn send_prompt(&self, token: &str, prompt: &str) -> Result<String, ChatError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&ChatRequest { prompt })
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "chat request did not reach the server");
                ChatError::network()
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "chat request failed");
            return Err(ChatError::from_status(status.as_u16()));
        }

        let reply: ChatReply = response.json().await.map_err(|err| {
            tracing::warn!(error = %err, "chat reply could not be parsed");
            ChatError::network()
        })?;
        tracing::debug!(chars = reply.reply.len(), "chat reply received");
        Ok(reply.reply)
    }
}
