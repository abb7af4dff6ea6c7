//! Shared gateway state.

use std::sync::Arc;

use dashmap::DashMap;

use {
    palaver_providers::FallbackChain,
    palaver_sessions::{SessionHandle, spawn_session},
};

/// State shared by all request handlers: the candidate chain and the
/// per-session actor registry. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    chain: FallbackChain,
    sessions: DashMap<String, SessionHandle>,
}

impl AppState {
    pub fn new(chain: FallbackChain) -> Self {
        Self {
            inner: Arc::new(Inner {
                chain,
                sessions: DashMap::new(),
            }),
        }
    }

    pub fn chain(&self) -> &FallbackChain {
        &self.inner.chain
    }

    /// Handle for the named session, spawning its actor on first touch.
    ///
    /// The registry keeps one handle per session, so an actor lives for the
    /// lifetime of the gateway once created.
    pub fn session(&self, name: &str) -> SessionHandle {
        self.inner
            .sessions
            .entry(name.to_string())
            .or_insert_with(|| spawn_session(name))
            .clone()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use palaver_sessions::HistoryItem;

    use super::*;

    #[tokio::test]
    async fn same_name_returns_the_same_session() {
        let state = AppState::new(FallbackChain::new(vec![]));
        state
            .session("alice")
            .append(HistoryItem::user("hi"))
            .await
            .unwrap();

        let items = state.session("alice").history().await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let state = AppState::new(FallbackChain::new(vec![]));
        state
            .session("alice")
            .append(HistoryItem::user("hi"))
            .await
            .unwrap();

        assert!(state.session("bob").history().await.unwrap().is_empty());
    }
}
