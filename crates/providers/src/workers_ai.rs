//! HTTP backend speaking the Workers-AI style streaming protocol.
//!
//! One POST per completion: `{base_url}/{model}` with a JSON body of
//! `{"messages": [...], "stream": true}`. The response body is the framed
//! event stream, returned raw — decoding happens downstream.

use {
    futures::StreamExt,
    secrecy::{ExposeSecret, Secret},
    tracing::debug,
};

use crate::{BackendError, BackendMessage, ByteStream, StreamingBackend, shared_http_client};

pub struct WorkersAiBackend {
    model: String,
    base_url: String,
    api_token: Option<Secret<String>>,
    client: reqwest::Client,
}

impl WorkersAiBackend {
    pub fn new(model: String, base_url: String, api_token: Option<Secret<String>>) -> Self {
        Self {
            model,
            base_url,
            api_token,
            client: shared_http_client().clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.model)
    }
}

#[async_trait::async_trait]
impl StreamingBackend for WorkersAiBackend {
    fn id(&self) -> &str {
        &self.model
    }

    async fn open_stream(&self, messages: &[BackendMessage]) -> Result<ByteStream, BackendError> {
        let body = serde_json::json!({
            "messages": messages,
            "stream": true,
        });

        debug!(
            model = %self.model,
            messages_count = messages.len(),
            "opening backend stream"
        );

        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let resp = request.send().await?;
        if let Err(e) = resp.error_for_status_ref() {
            let status = e.status().map(|s| s.as_u16()).unwrap_or(0);
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::Status { status, body });
        }

        Ok(Box::pin(
            resp.bytes_stream().map(|chunk| chunk.map_err(BackendError::from)),
        ))
    }
}
