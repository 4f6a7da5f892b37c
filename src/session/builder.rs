//! Assembles payload chunks of a single session into responses.

use super::cleaner;
use super::model::{Packet, Response, Session, Timestamp};
use crate::http::is_response_start;
use tracing::debug;

/// One payload chunk delivered by the capture layer.
#[derive(Debug, Clone, Copy)]
pub struct Payload<'a> {
    pub ts: Timestamp,
    pub ack: u32,
    pub seq: u32,
    pub data: &'a [u8],
}

/// Construction state of one in-progress session.
#[derive(Debug)]
pub struct BuildState {
    session: Session,
    current: Option<Response>,
    last_packet_ts: Option<Timestamp>,
    valid: bool,
}

impl BuildState {
    #[must_use]
    pub const fn start(ts: Timestamp) -> Self {
        Self {
            session: Session::new(ts),
            current: None,
            last_packet_ts: None,
            valid: true,
        }
    }

    /// False once the session produced payload that was not an HTTP response.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Feed one payload chunk.
    pub fn push(&mut self, payload: &Payload<'_>) {
        if !self.valid {
            return;
        }

        if is_response_start(payload.data) {
            let created = match self.current.take() {
                Some(previous) => {
                    self.session.push(previous);
                    self.last_packet_ts.unwrap_or(self.session.started())
                }
                None => self.session.started(),
            };
            self.current = Some(Response::new(created));
        }

        let Some(response) = self.current.as_mut() else {
            debug!(
                session_start = %self.session.started(),
                "First payload is not an HTTP response, ignoring session"
            );
            self.valid = false;
            return;
        };

        response.push(Packet::new(
            payload.ts,
            payload.ack,
            payload.seq,
            payload.data,
        ));
        self.session.packet_count += 1;
        self.last_packet_ts = Some(payload.ts);
    }

    /// Close the session and clean it up.
    ///
    /// Returns `None` when nothing worth replaying is left.
    #[must_use]
    pub fn finish(mut self) -> Option<Session> {
        if let Some(response) = self.current.take() {
            self.session.push(response);
        }

        let mut session = self.session;
        cleaner::clean(&mut session);
        if session.is_empty() {
            return None;
        }
        Some(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(millis: i64, seq: u32, data: &[u8]) -> Payload<'_> {
        Payload {
            ts: Timestamp::from_millis(millis),
            ack: 1,
            seq,
            data,
        }
    }

    #[test]
    fn test_responses_split_on_status_line() {
        let mut state = BuildState::start(Timestamp::from_millis(0));
        state.push(&payload(10, 1, b"HTTP/1.1 200 OK\r\n\r\nbody1"));
        state.push(&payload(20, 2, b"more body"));
        state.push(&payload(30, 3, b"HTTP/1.1 200 OK\r\n\r\nbody2"));

        let session = state.finish().unwrap();
        assert_eq!(session.response_count(), 2);
        assert_eq!(session.packet_count(), 3);
        assert_eq!(session.responses()[0].packet_count(), 2);
        assert_eq!(session.responses()[1].packet_count(), 1);
    }

    #[test]
    fn test_response_creation_timestamps() {
        let mut state = BuildState::start(Timestamp::from_millis(5));
        state.push(&payload(10, 1, b"HTTP/1.1 200 OK\r\n\r\n"));
        state.push(&payload(20, 2, b"tail"));
        state.push(&payload(300, 3, b"HTTP/1.0 204 No Content\r\n\r\n"));

        let session = state.finish().unwrap();
        // The first response starts with the session, later ones at the previous packet.
        assert_eq!(session.responses()[0].created(), Timestamp::from_millis(5));
        assert_eq!(session.responses()[1].created(), Timestamp::from_millis(20));
    }

    #[test]
    fn test_non_http_session_is_ignored() {
        let mut state = BuildState::start(Timestamp::from_millis(0));
        state.push(&payload(10, 1, b"\x16\x03\x01 tls hello"));
        assert!(!state.is_valid());

        // Later status lines no longer revive the session.
        state.push(&payload(20, 2, b"HTTP/1.1 200 OK\r\n\r\n"));
        assert!(state.finish().is_none());
    }

    #[test]
    fn test_session_without_payload_is_discarded() {
        let state = BuildState::start(Timestamp::from_millis(0));
        assert!(state.finish().is_none());
    }

    #[test]
    fn test_oversized_line_folds_into_current_response() {
        let mut oversized = b"HTTP/1.1 200 ".to_vec();
        oversized.resize(5000, b'a');
        oversized.extend_from_slice(b"\r\n");

        let mut state = BuildState::start(Timestamp::from_millis(0));
        state.push(&payload(10, 1, b"HTTP/1.1 200 OK\r\n\r\n"));
        state.push(&payload(20, 2, &oversized));

        let session = state.finish().unwrap();
        assert_eq!(session.response_count(), 1);
        assert_eq!(session.responses()[0].packet_count(), 2);
    }
}
