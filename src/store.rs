//! Growable collection of completed sessions, consumed round-robin.

use crate::replay::ReplayCursor;
use crate::session::Session;
use core::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

const DEFAULT_CAPACITY: usize = 1;

/// Owns every completed session until [`SessionStore::teardown`].
#[derive(Debug)]
pub struct SessionStore {
    sessions: Vec<Session>,
    capacity: usize,
    next: AtomicUsize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self {
            sessions: Vec::with_capacity(DEFAULT_CAPACITY),
            capacity: DEFAULT_CAPACITY,
            next: AtomicUsize::new(0),
        }
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a session, growing the backing storage to `capacity * 2 + 1`
    /// when it is full.
    pub fn insert(&mut self, session: Session) {
        if self.sessions.len() == self.capacity {
            self.capacity = self.capacity * 2 + 1;
            self.sessions
                .reserve_exact(self.capacity - self.sessions.len());
            debug!(capacity = self.capacity, "Session store grown");
        }
        self.sessions.push(session);
    }

    /// Next session in round-robin order, wrapping after the last one.
    ///
    /// Safe to call from several replay drivers at once; the shared position
    /// is advanced atomically.
    ///
    /// # Panics
    ///
    /// Panics if the store is empty.
    #[must_use]
    pub fn next_session(&self) -> &Session {
        let len = self.sessions.len();
        assert!(len > 0, "next_session called on an empty session store");

        let idx = self
            .next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |idx| {
                Some((idx % len + 1) % len)
            })
            .unwrap_or_else(|idx| idx);
        &self.sessions[idx % len]
    }

    #[must_use]
    pub fn open_replay_cursor(&self) -> ReplayCursor<'_> {
        ReplayCursor::new(self)
    }

    #[must_use]
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Slots available before the next growth step.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Release every stored session and reset to an empty store.
    pub fn teardown(&mut self) {
        debug!(sessions = self.sessions.len(), "Tearing down session store");
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Timestamp;

    fn session(start_millis: i64) -> Session {
        Session::new(Timestamp::from_millis(start_millis))
    }

    #[test]
    fn test_capacity_doubles_plus_one() {
        let mut store = SessionStore::new();
        assert_eq!(store.capacity(), 1);

        let mut seen = Vec::new();
        for i in 0..8 {
            store.insert(session(i));
            seen.push(store.capacity());
        }
        assert_eq!(seen, vec![1, 3, 3, 7, 7, 7, 7, 15]);
        assert_eq!(store.len(), 8);
    }

    #[test]
    fn test_next_session_round_robin() {
        let mut store = SessionStore::new();
        for i in 0..3 {
            store.insert(session(i));
        }

        let starts: Vec<_> = (0..7)
            .map(|_| store.next_session().started())
            .collect();
        let expected: Vec<_> = [0, 1, 2, 0, 1, 2, 0]
            .into_iter()
            .map(Timestamp::from_millis)
            .collect();
        assert_eq!(starts, expected);
    }

    #[test]
    fn test_next_session_shared_between_threads() {
        const THREADS: usize = 4;
        const PULLS_PER_THREAD: usize = 250;

        let mut store = SessionStore::new();
        for i in 0..7 {
            store.insert(session(i));
        }

        let pulled: Vec<Timestamp> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    scope.spawn(|| {
                        (0..PULLS_PER_THREAD)
                            .map(|_| store.next_session().started())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| handle.join().unwrap())
                .collect()
        });

        let total = THREADS * PULLS_PER_THREAD;
        let (low, high) = (total / store.len(), total.div_ceil(store.len()));
        for stored in store.sessions() {
            let count = pulled.iter().filter(|&&ts| ts == stored.started()).count();
            assert!(
                (low..=high).contains(&count),
                "session {} returned {count} times",
                stored.started()
            );
        }
    }

    #[test]
    #[should_panic(expected = "empty session store")]
    fn test_next_session_on_empty_store_panics() {
        let store = SessionStore::new();
        let _ = store.next_session();
    }

    #[test]
    fn test_teardown_resets() {
        let mut store = SessionStore::new();
        store.insert(session(0));
        store.insert(session(1));
        let _ = store.next_session();

        store.teardown();
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 1);

        store.insert(session(5));
        assert_eq!(store.next_session().started(), Timestamp::from_millis(5));
    }
}
