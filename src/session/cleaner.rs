//! Post-processing of a finished session: retransmission removal and
//! per-response reordering.

use super::model::{Packet, Response, Session};
use std::collections::HashSet;

/// Deduplicate and then reorder `session` in place.
pub(crate) fn clean(session: &mut Session) {
    remove_redundant(session);
    sort_responses(session);
}

/// Drop every packet whose sequence number already appeared earlier in the
/// session, then drop responses left without packets.
pub(crate) fn remove_redundant(session: &mut Session) {
    let mut seen = HashSet::with_capacity(session.packet_count);
    for response in &mut session.responses {
        retain_unseen(response, &mut seen);
    }
    session
        .responses
        .retain(|response| !response.packets.is_empty());
    session.packet_count = seen.len();
}

fn retain_unseen(response: &mut Response, seen: &mut HashSet<u32>) {
    response.packets.retain(|packet| seen.insert(packet.seq()));
}

/// Sort the packets of every response by sequence number.
pub(crate) fn sort_responses(session: &mut Session) {
    for response in &mut session.responses {
        response.packets.sort_by_key(Packet::seq);
    }
}
