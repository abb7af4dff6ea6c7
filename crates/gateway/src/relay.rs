//! The relay tee: verbatim passthrough plus side-channel accumulation.
//!
//! One backend byte stream in, two things out: an outbound byte stream that
//! is byte-for-byte identical to the inbound one, and — once the stream
//! ends — the decoded reply text appended to the session transcript.
//! Decoding is a read-only observer of the same ordered byte sequence; it
//! can never delay, reorder, or mutate the passthrough.

use std::convert::Infallible;

use {
    bytes::Bytes,
    futures::StreamExt,
    tokio::{sync::mpsc, task::JoinHandle},
    tokio_stream::wrappers::ReceiverStream,
    tracing::{debug, warn},
};

use {
    palaver_codec::FrameDecoder,
    palaver_providers::ByteStream,
    palaver_sessions::{HistoryItem, SessionHandle},
};

/// Outbound half of the tee, usable directly as an HTTP response body.
pub type RelayStream = ReceiverStream<Result<Bytes, Infallible>>;

/// Buffered outbound chunks before backpressure reaches the backend read.
const FORWARD_BUFFER: usize = 16;

/// Spawn the forwarding task for one relay invocation.
///
/// Returns the outbound stream and the task handle. The task runs to
/// completion on its own (the caller may drop the handle); tests await it
/// to observe finalization.
///
/// The task finalizes exactly once — on normal end, upstream error, or
/// caller disconnect — by closing the outbound stream and then appending
/// the trimmed accumulated text (when non-empty) to the session. A failed
/// append is logged, never propagated: the bytes already reached the
/// caller.
pub fn spawn_relay(
    mut upstream: ByteStream,
    session: SessionHandle,
) -> (RelayStream, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel::<Result<Bytes, Infallible>>(FORWARD_BUFFER);

    let task = tokio::spawn(async move {
        let mut decoder = FrameDecoder::new();
        let mut reply = String::new();

        while let Some(chunk) = upstream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!(error = %e, "backend stream failed mid-relay");
                    break;
                },
            };

            // Forward first, decode second. The caller sees every byte as
            // soon as it arrives, whatever the decoder makes of it.
            if tx.send(Ok(chunk.clone())).await.is_err() {
                debug!("caller disconnected, stopping relay");
                break;
            }

            for delta in decoder.push(&chunk) {
                reply.push_str(&delta);
            }
        }

        // Single exit point: every way out of the loop lands here once.
        drop(tx);
        if let Some(delta) = decoder.finish() {
            reply.push_str(&delta);
        }

        let text = reply.trim();
        if !text.is_empty()
            && let Err(e) = session.append(HistoryItem::assistant(text)).await
        {
            warn!(error = %e, "failed to persist assistant reply");
        }
    });

    (ReceiverStream::new(rx), task)
}
