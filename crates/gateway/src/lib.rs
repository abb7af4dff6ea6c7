//! Gateway: HTTP server, session routes, and the relay tee.
//!
//! Request lifecycle for a chat turn:
//! 1. `POST /agents/{name}` lands on the session's actor handle
//! 2. the last user message is appended to the transcript
//! 3. the fallback chain opens a backend byte stream
//! 4. the relay tees that stream: verbatim passthrough to the caller,
//!    decoded text into an accumulator
//! 5. on stream end the accumulated reply is appended as an assistant entry
//!
//! Everything stateful lives in per-session actors ([`palaver_sessions`]);
//! the gateway itself only holds the registry and the candidate chain.

pub mod relay;
pub mod server;
pub mod state;
pub mod time;
