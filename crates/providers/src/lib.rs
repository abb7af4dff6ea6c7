//! Streaming text-generation backends and the ordered fallback chain.
//!
//! A backend is anything that can turn a message list into a framed byte
//! stream. [`FallbackChain`] picks the first candidate that manages to open
//! one; everything downstream (relay, codec) only ever sees the winning
//! [`ByteStream`].

pub mod error;
pub mod fallback;
pub mod workers_ai;

pub use {
    error::{BackendError, CandidatesExhausted},
    fallback::FallbackChain,
    workers_ai::WorkersAiBackend,
};

use std::pin::Pin;

use {
    async_trait::async_trait,
    bytes::Bytes,
    futures::Stream,
    serde::{Deserialize, Serialize},
    tracing::warn,
};

/// Raw framed byte stream as produced by a backend. Chunk boundaries carry
/// no meaning; the codec reassembles lines downstream.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, BackendError>> + Send>>;

/// Message role on the backend wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One conversation message as sent to a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendMessage {
    pub role: Role,
    pub content: String,
}

impl BackendMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Convert loosely-typed request messages into [`BackendMessage`]s.
///
/// Entries without a recognised `role` or a string `content` are skipped
/// with a warning — a sloppy client must not break the whole conversation.
pub fn values_to_messages(values: &[serde_json::Value]) -> Vec<BackendMessage> {
    let mut messages = Vec::with_capacity(values.len());
    for (i, value) in values.iter().enumerate() {
        let role = match value["role"].as_str() {
            Some("system") => Role::System,
            Some("user") => Role::User,
            Some("assistant") => Role::Assistant,
            other => {
                warn!(index = i, role = ?other, "skipping message with unknown role");
                continue;
            },
        };
        let Some(content) = value["content"].as_str() else {
            warn!(index = i, "skipping message without string content");
            continue;
        };
        messages.push(BackendMessage {
            role,
            content: content.to_string(),
        });
    }
    messages
}

/// Shared HTTP client for backends.
///
/// Backends without custom connection needs reuse this client to share
/// connection pools, DNS cache, and TLS sessions.
pub fn shared_http_client() -> &'static reqwest::Client {
    static CLIENT: std::sync::LazyLock<reqwest::Client> =
        std::sync::LazyLock::new(reqwest::Client::new);
    &CLIENT
}

/// Capability to open a streaming completion for a message list.
///
/// The fallback chain is written only against this trait, so concrete
/// backends can be swapped or stubbed in tests.
#[async_trait]
pub trait StreamingBackend: Send + Sync {
    /// Candidate identifier (the model id).
    fn id(&self) -> &str;

    /// Open a streaming completion for the given conversation.
    ///
    /// Failing here means "this candidate is unavailable" and is recovered
    /// by the chain; errors on the returned stream happen mid-relay and are
    /// the relay's problem.
    async fn open_stream(&self, messages: &[BackendMessage]) -> Result<ByteStream, BackendError>;
}
