//! In-memory conversation transcripts, one per session actor.
//!
//! A transcript is owned by exactly one actor task; everything else talks
//! to it through a [`SessionHandle`] mailbox. History lives only as long as
//! the actor — there is no durable storage.

pub mod actor;
pub mod log;

pub use {
    actor::{SessionClosed, SessionHandle, spawn_session},
    log::{HISTORY_LIMIT, HistoryItem, Sender, SessionLog},
};
