use super::{Frame, LoadReport};
use crate::packet::{FlowKey, TcpFlags, TcpSegment};
use crate::session::{Outcome, Payload, SessionEvent, SessionTable, Timestamp};
use crate::store::SessionStore;
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Default)]
struct FinState {
    client: bool,
    server: bool,
}

/// Turns TCP segments into session events for the server-to-client direction.
///
/// Connections are tracked from their opening SYN, keyed by the client to
/// server direction. Connections whose handshake was not captured are ignored.
#[derive(Debug, Default)]
pub struct FlowTracker {
    flows: HashMap<FlowKey, FinState>,
    table: SessionTable<FlowKey>,
    report: LoadReport,
}

impl FlowTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode and observe one captured frame. Frames that are not TCP are skipped.
    pub fn observe_frame(&mut self, frame: &Frame, store: &mut SessionStore) {
        self.report.frames += 1;
        if let Some(segment) = TcpSegment::from_packet(&frame.data) {
            self.observe(frame.ts, &segment, store);
        }
    }

    /// Observe one decoded segment captured at `ts`.
    pub fn observe(
        &mut self,
        ts: Timestamp,
        segment: &TcpSegment<'_>,
        store: &mut SessionStore,
    ) {
        self.report.tcp_segments += 1;
        let flags = segment.flags;

        if flags.contains(TcpFlags::SYN) && !flags.contains(TcpFlags::ACK) {
            if !self.flows.contains_key(&segment.flow) {
                trace!(flow = ?segment.flow, "Connection opened");
                self.flows.insert(segment.flow, FinState::default());
                self.report.sessions_opened += 1;
                self.table
                    .dispatch(segment.flow, SessionEvent::Start { ts }, store);
            }
            return;
        }

        let (key, from_server) = if self.flows.contains_key(&segment.flow) {
            (segment.flow, false)
        } else if self.flows.contains_key(&segment.flow.reversed()) {
            (segment.flow.reversed(), true)
        } else {
            return;
        };

        if from_server && !segment.payload.is_empty() {
            let payload = Payload {
                ts,
                ack: segment.ack,
                seq: segment.seq,
                data: segment.payload,
            };
            self.table
                .dispatch(key, SessionEvent::Payload(payload), store);
        }

        if flags.contains(TcpFlags::RST) {
            self.close(key, store);
        } else if flags.contains(TcpFlags::FIN) {
            let both_closed = self.flows.get_mut(&key).is_some_and(|fins| {
                if from_server {
                    fins.server = true;
                } else {
                    fins.client = true;
                }
                fins.client && fins.server
            });
            if both_closed {
                self.close(key, store);
            }
        }
    }

    fn close(&mut self, key: FlowKey, store: &mut SessionStore) {
        self.flows.remove(&key);
        trace!(flow = ?key, "Connection closed");
        match self.table.dispatch(key, SessionEvent::End, store) {
            Some(Outcome::Stored) => self.report.sessions_stored += 1,
            Some(Outcome::Discarded) => self.report.sessions_discarded += 1,
            None => {}
        }
    }

    /// Release every connection still open and return the counters.
    pub fn finish(&mut self) -> LoadReport {
        self.flows.clear();
        self.report.sessions_unfinished += self.table.cleanup_all();
        self.report
    }
}
