//! Session reconstruction.
//!
//! Capture events are delivered per session handle. Payload chunks are grouped
//! into responses while the session is open; once it ends the session is
//! deduplicated, reordered and handed to the [`SessionStore`], or released
//! when nothing replayable is left.

mod builder;
mod cleaner;
mod model;

pub use builder::{BuildState, Payload};
pub use model::{Packet, Response, Session, Timestamp};

use crate::store::SessionStore;
use core::hash::Hash;
use std::collections::HashMap;
use tracing::debug;

/// Lifecycle event for one session, as produced by the capture layer.
#[derive(Debug, Clone, Copy)]
pub enum SessionEvent<'a> {
    Start { ts: Timestamp },
    Payload(Payload<'a>),
    End,
    /// Shutdown release of a session that never ended.
    Cleanup,
}

/// What became of a session once it left the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Stored,
    Discarded,
}

/// Build states of all open sessions, keyed by the capture layer's handle.
#[derive(Debug)]
pub struct SessionTable<K> {
    open: HashMap<K, BuildState>,
}

impl<K> Default for SessionTable<K> {
    fn default() -> Self {
        Self {
            open: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq + core::fmt::Debug> SessionTable<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Apply one event. Returns the outcome when the event closed a session.
    pub fn dispatch(
        &mut self,
        key: K,
        event: SessionEvent<'_>,
        store: &mut SessionStore,
    ) -> Option<Outcome> {
        match event {
            SessionEvent::Start { ts } => {
                if self.open.insert(key, BuildState::start(ts)).is_some() {
                    debug!("Session restarted, dropping previous build state");
                }
                None
            }
            SessionEvent::Payload(payload) => {
                match self.open.get_mut(&key) {
                    Some(state) => state.push(&payload),
                    None => debug!(key = ?key, "Payload for unknown session"),
                }
                None
            }
            SessionEvent::End => {
                let Some(state) = self.open.remove(&key) else {
                    debug!(key = ?key, "End for unknown session");
                    return None;
                };
                Some(finish(state, store))
            }
            SessionEvent::Cleanup => self.open.remove(&key).map(|_| Outcome::Discarded),
        }
    }

    /// Release every session that is still open.
    pub fn cleanup_all(&mut self) -> usize {
        let released = self.open.len();
        self.open.clear();
        released
    }
}

fn finish(state: BuildState, store: &mut SessionStore) -> Outcome {
    match state.finish() {
        Some(session) => {
            debug!(
                responses = session.response_count(),
                packets = session.packet_count(),
                "Session build complete"
            );
            store.insert(session);
            Outcome::Stored
        }
        None => Outcome::Discarded,
    }
}
