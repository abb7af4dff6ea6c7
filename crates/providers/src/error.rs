//! Backend error types.

use thiserror::Error;

/// A single backend candidate failed to open (or continue) a stream.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("no backend candidates configured")]
    NoCandidates,
}

/// Every candidate in the chain failed.
///
/// Carries only the last failure — earlier ones are logged context, not
/// part of the surfaced error.
#[derive(Debug, Error)]
#[error("all backend candidates failed; last error from {candidate}: {source}")]
pub struct CandidatesExhausted {
    /// The last candidate tried.
    pub candidate: String,
    #[source]
    pub source: BackendError,
}
