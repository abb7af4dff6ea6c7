//! Ordered backend fallback.
//!
//! Candidates are tried strictly in list order on every invocation; the
//! first one that opens a stream wins and no further candidates are
//! touched. A candidate failure is never surfaced on its own — only the
//! last failure escapes, once the whole list is exhausted.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    BackendMessage, ByteStream, StreamingBackend,
    error::{BackendError, CandidatesExhausted},
};

/// The ordered candidate list, shared read-only by all sessions.
pub struct FallbackChain {
    backends: Vec<Arc<dyn StreamingBackend>>,
}

impl FallbackChain {
    /// Build a chain from candidates in priority order.
    pub fn new(backends: Vec<Arc<dyn StreamingBackend>>) -> Self {
        Self { backends }
    }

    /// Candidate ids in priority order.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        self.backends.iter().map(|b| b.id())
    }

    /// Open a stream from the first candidate that accepts.
    pub async fn open_stream(
        &self,
        messages: &[BackendMessage],
    ) -> Result<ByteStream, CandidatesExhausted> {
        let mut last: Option<(String, BackendError)> = None;

        for backend in &self.backends {
            debug!(candidate = backend.id(), "trying backend candidate");
            match backend.open_stream(messages).await {
                Ok(stream) => {
                    debug!(candidate = backend.id(), "backend candidate accepted");
                    return Ok(stream);
                },
                Err(e) => {
                    warn!(
                        candidate = backend.id(),
                        error = %e,
                        "backend candidate failed, trying next"
                    );
                    last = Some((backend.id().to_string(), e));
                },
            }
        }

        Err(match last {
            Some((candidate, source)) => CandidatesExhausted { candidate, source },
            None => CandidatesExhausted {
                candidate: "<none>".into(),
                source: BackendError::NoCandidates,
            },
        })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use {async_trait::async_trait, bytes::Bytes, futures::StreamExt};

    use super::*;

    /// A backend that always opens a one-chunk stream, counting attempts.
    struct SuccessBackend {
        id: &'static str,
        calls: AtomicUsize,
    }

    impl SuccessBackend {
        fn new(id: &'static str) -> Self {
            Self {
                id,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl StreamingBackend for SuccessBackend {
        fn id(&self) -> &str {
            self.id
        }

        async fn open_stream(
            &self,
            _messages: &[BackendMessage],
        ) -> Result<ByteStream, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let chunk = Bytes::from(format!("data: {{\"response\":\"{}\"}}\n\n", self.id));
            Ok(Box::pin(futures::stream::once(async move { Ok(chunk) })))
        }
    }

    /// A backend that always refuses, counting attempts.
    struct FailingBackend {
        id: &'static str,
        status: u16,
        calls: AtomicUsize,
    }

    impl FailingBackend {
        fn new(id: &'static str, status: u16) -> Self {
            Self {
                id,
                status,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl StreamingBackend for FailingBackend {
        fn id(&self) -> &str {
            self.id
        }

        async fn open_stream(
            &self,
            _messages: &[BackendMessage],
        ) -> Result<ByteStream, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(BackendError::Status {
                status: self.status,
                body: format!("{} is down", self.id),
            })
        }
    }

    async fn collect(stream: ByteStream) -> Vec<u8> {
        stream
            .fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk.unwrap());
                acc
            })
            .await
    }

    #[tokio::test]
    async fn first_candidate_wins_and_second_is_untouched() {
        let a = Arc::new(SuccessBackend::new("a"));
        let b = Arc::new(SuccessBackend::new("b"));
        let chain = FallbackChain::new(vec![a.clone(), b.clone()]);

        let stream = chain.open_stream(&[]).await.unwrap();
        let bytes = collect(stream).await;
        assert!(String::from_utf8(bytes).unwrap().contains("\"a\""));
        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
        assert_eq!(b.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_candidate_falls_through_to_next() {
        let a = Arc::new(FailingBackend::new("a", 503));
        let b = Arc::new(SuccessBackend::new("b"));
        let chain = FallbackChain::new(vec![a.clone(), b.clone()]);

        let stream = chain.open_stream(&[]).await.unwrap();
        let bytes = collect(stream).await;
        assert!(String::from_utf8(bytes).unwrap().contains("\"b\""));
        // Exactly one failure (a) and one success (b).
        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
        assert_eq!(b.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_chain_surfaces_the_last_failure() {
        let a = Arc::new(FailingBackend::new("a", 429));
        let b = Arc::new(FailingBackend::new("b", 503));
        let chain = FallbackChain::new(vec![a, b]);

        let err = chain.open_stream(&[]).await.err().unwrap();
        assert_eq!(err.candidate, "b");
        assert!(err.to_string().contains("b is down"));
        assert!(!err.to_string().contains("a is down"));
    }

    #[tokio::test]
    async fn chain_retries_from_the_top_on_every_invocation() {
        let a = Arc::new(FailingBackend::new("a", 500));
        let b = Arc::new(SuccessBackend::new("b"));
        let chain = FallbackChain::new(vec![a.clone(), b.clone()]);

        for _ in 0..3 {
            let _ = chain.open_stream(&[]).await.unwrap();
        }
        // No circuit breaker: the failing primary is re-tried each time.
        assert_eq!(a.calls.load(Ordering::SeqCst), 3);
        assert_eq!(b.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn empty_chain_reports_no_candidates() {
        let chain = FallbackChain::new(vec![]);
        let err = chain.open_stream(&[]).await.err().unwrap();
        assert!(matches!(err.source, BackendError::NoCandidates));
    }

    #[test]
    fn candidates_iterates_in_priority_order() {
        let chain = FallbackChain::new(vec![
            Arc::new(SuccessBackend::new("first")) as Arc<dyn StreamingBackend>,
            Arc::new(SuccessBackend::new("second")),
        ]);
        let ids: Vec<&str> = chain.candidates().collect();
        assert_eq!(ids, vec!["first", "second"]);
    }
}
