//! Per-session actor task and its mailbox handle.
//!
//! The actor owns its [`SessionLog`] outright and drains commands one at a
//! time, so transcript access is serialized without any locking. Handles
//! are cheap clones of the mailbox sender; the actor stops once every
//! handle is dropped.

use {
    thiserror::Error,
    tokio::sync::{mpsc, oneshot},
    tracing::debug,
};

use crate::log::{HistoryItem, SessionLog};

/// Mailbox depth. Senders briefly backpressure when a session is flooded.
const MAILBOX_CAPACITY: usize = 32;

enum Command {
    History {
        reply: oneshot::Sender<Vec<HistoryItem>>,
    },
    Append {
        item: HistoryItem,
    },
}

/// The actor task is gone (mailbox closed before the command landed).
#[derive(Debug, Error)]
#[error("session actor is no longer running")]
pub struct SessionClosed;

/// Clonable handle to one session actor.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// Snapshot of the transcript, oldest first.
    pub async fn history(&self) -> Result<Vec<HistoryItem>, SessionClosed> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::History { reply })
            .await
            .map_err(|_| SessionClosed)?;
        rx.await.map_err(|_| SessionClosed)
    }

    /// Append one entry. The log itself never rejects; this only fails when
    /// the actor is gone.
    pub async fn append(&self, item: HistoryItem) -> Result<(), SessionClosed> {
        self.tx
            .send(Command::Append { item })
            .await
            .map_err(|_| SessionClosed)
    }
}

/// Spawn an actor owning a fresh, empty transcript.
pub fn spawn_session(name: impl Into<String>) -> SessionHandle {
    let name = name.into();
    let (tx, mut rx) = mpsc::channel(MAILBOX_CAPACITY);

    tokio::spawn(async move {
        let mut log = SessionLog::new();
        debug!(session = %name, "session actor started");
        while let Some(command) = rx.recv().await {
            match command {
                Command::History { reply } => {
                    // A caller that gave up on the reply is fine.
                    let _ = reply.send(log.read());
                },
                Command::Append { item } => log.append(item),
            }
        }
        debug!(session = %name, entries = log.len(), "session actor stopped");
    });

    SessionHandle { tx }
}
