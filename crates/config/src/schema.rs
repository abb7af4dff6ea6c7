//! Config schema types.

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PalaverConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
}

/// Gateway server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "127.0.0.1".
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8787,
        }
    }
}

/// Text-generation backend configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the streaming completion endpoint; the model id is
    /// appended as the final path segment.
    pub base_url: String,

    /// Bearer token sent with every backend request.
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_token: Option<Secret<String>>,

    /// Ordered model candidates; priority is list order.
    pub candidates: Vec<String>,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("candidates", &self.candidates)
            .finish()
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8788/run".into(),
            api_token: None,
            candidates: vec![
                "@cf/meta/llama-3.1-8b-instruct".into(),
                "@cf/mistral/mistral-7b-instruct-v0.2".into(),
            ],
        }
    }
}

// ── Serde helper for Secret<String> ─────────────────────────────────────────

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(secret) => serializer.serialize_some(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_two_candidates_in_order() {
        let config = PalaverConfig::default();
        assert_eq!(config.backend.candidates, vec![
            "@cf/meta/llama-3.1-8b-instruct",
            "@cf/mistral/mistral-7b-instruct-v0.2",
        ]);
        assert_eq!(config.server.bind, "127.0.0.1");
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: PalaverConfig = toml::from_str(
            r#"
            [server]
            port = 9000
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.backend.candidates.len(), 2);
    }

    #[test]
    fn candidates_override_replaces_the_list() {
        let config: PalaverConfig = toml::from_str(
            r#"
            [backend]
            base_url = "https://ai.example.net/v1/run"
            api_token = "tok-123"
            candidates = ["primary-model", "fallback-model"]
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.candidates, vec![
            "primary-model",
            "fallback-model"
        ]);
        assert_eq!(
            config.backend.api_token.unwrap().expose_secret(),
            "tok-123"
        );
    }

    #[test]
    fn debug_redacts_the_token() {
        let config: PalaverConfig = toml::from_str(
            r#"
            [backend]
            api_token = "tok-123"
            "#,
        )
        .unwrap();
        let rendered = format!("{:?}", config.backend);
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains("tok-123"));
    }
}
