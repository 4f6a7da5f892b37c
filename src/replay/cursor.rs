use crate::session::{Packet, Response, Session};
use crate::store::SessionStore;

/// Per-driver traversal state over a [`SessionStore`].
///
/// The driver contract is strict: advance to a session before asking for
/// responses, and check [`ReplayCursor::is_last_packet`] before advancing past
/// the end of a response. Violations panic instead of replaying garbage.
#[derive(Debug, Clone)]
pub struct ReplayCursor<'a> {
    store: &'a SessionStore,
    session: Option<&'a Session>,
    next_response: usize,
    response: Option<&'a Response>,
    next_packet: usize,
    packet: Option<&'a Packet>,
}

impl<'a> ReplayCursor<'a> {
    pub(crate) const fn new(store: &'a SessionStore) -> Self {
        Self {
            store,
            session: None,
            next_response: 0,
            response: None,
            next_packet: 0,
            packet: None,
        }
    }

    /// Move to the store's next session and rewind to before its first response.
    ///
    /// # Panics
    ///
    /// Panics if the store is empty.
    pub fn advance_session(&mut self) {
        self.session = Some(self.store.next_session());
        self.next_response = 0;
        self.response = None;
        self.next_packet = 0;
        self.packet = None;
    }

    /// Move to the next response of the current session, starting over from the
    /// first one once all have been replayed.
    ///
    /// # Panics
    ///
    /// Panics without a current session or if the session has no responses.
    pub fn advance_response(&mut self) {
        let session = self
            .session
            .expect("advance_response called before advance_session");
        let responses = session.responses();
        assert!(
            !responses.is_empty(),
            "advance_response on a session without responses"
        );

        if self.next_response >= responses.len() {
            self.next_response = 0;
        }
        let response = &responses[self.next_response];
        self.next_response += 1;
        assert!(
            response.packet_count() > 0,
            "advance_response reached a response without packets"
        );

        self.response = Some(response);
        self.next_packet = 0;
        self.packet = None;
    }

    /// Make the next packet of the current response current.
    ///
    /// # Panics
    ///
    /// Panics when the response has no further packet.
    pub fn advance_packet(&mut self) {
        let packet = self.peek_packet().unwrap_or_else(|| {
            panic!(
                "advance_packet past the last packet (response has {} packets)",
                self.response.map_or(0, Response::packet_count)
            )
        });
        self.next_packet += 1;
        self.packet = Some(packet);
    }

    /// True when advancing would find no further packet in this response.
    #[must_use]
    pub fn is_last_packet(&self) -> bool {
        self.peek_packet().is_none()
    }

    #[must_use]
    pub const fn current_session(&self) -> Option<&'a Session> {
        self.session
    }

    #[must_use]
    pub const fn current_response(&self) -> Option<&'a Response> {
        self.response
    }

    /// Current packet, `None` before the first [`advance_packet`](Self::advance_packet)
    /// of a response.
    #[must_use]
    pub const fn current_packet(&self) -> Option<&'a Packet> {
        self.packet
    }

    /// # Panics
    ///
    /// Panics before the first `advance_packet` of the current response.
    #[must_use]
    pub fn current_packet_bytes(&self) -> &'a [u8] {
        self.expect_packet().data()
    }

    /// # Panics
    ///
    /// Panics before the first `advance_packet` of the current response.
    #[must_use]
    pub fn current_packet_length(&self) -> usize {
        self.expect_packet().len()
    }

    /// Milliseconds to wait before sending the next packet, `None` when the
    /// response has no next packet.
    ///
    /// Before the first packet of a response the delay is measured from the
    /// response's creation. For any response but the session's first, that
    /// span covers a full request/response round trip of which only one leg is
    /// replayed, so it is halved.
    #[must_use]
    pub fn next_packet_latency(&self) -> Option<i64> {
        let response = self.response?;
        let next = self.peek_packet()?;

        let Some(current) = self.packet else {
            let delay = response.created().millis_until(&next.ts());
            let opens_session = self
                .session
                .is_some_and(|session| session.started() == response.created());
            return Some(if opens_session { delay } else { delay / 2 });
        };
        Some(current.ts().millis_until(&next.ts()))
    }

    fn peek_packet(&self) -> Option<&'a Packet> {
        self.response?.packets().get(self.next_packet)
    }

    fn expect_packet(&self) -> &'a Packet {
        self.packet
            .expect("packet accessed before advance_packet in this response")
    }
}
