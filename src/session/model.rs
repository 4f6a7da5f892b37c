//! Reconstructed traffic: packets grouped into responses grouped into sessions.

use core::fmt;

/// Capture timestamp with microsecond resolution, as recorded by the capture
/// layer (`tv_sec` / `tv_usec`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub secs: i64,
    pub micros: i64,
}

impl Timestamp {
    #[must_use]
    pub const fn new(secs: i64, micros: i64) -> Self {
        Self { secs, micros }
    }

    /// Build a timestamp from a millisecond offset, handy for synthetic traffic.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self {
            secs: millis / 1000,
            micros: (millis % 1000) * 1000,
        }
    }

    /// Milliseconds from `self` to `later`.
    ///
    /// The whole-second term only contributes when `later` is in a later second;
    /// otherwise only the microsecond fields are compared. Replay timing depends
    /// on this exact arithmetic, including the truncating division.
    #[must_use]
    pub const fn millis_until(&self, later: &Self) -> i64 {
        let diff_secs = later.secs - self.secs;
        if diff_secs > 0 {
            (diff_secs * 1_000_000 + later.micros - self.micros) / 1000
        } else {
            (later.micros - self.micros) / 1000
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.secs, self.micros)
    }
}

/// One captured payload chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    ts: Timestamp,
    seq: u32,
    ack: u32,
    data: Vec<u8>,
}

impl Packet {
    #[must_use]
    pub fn new(ts: Timestamp, ack: u32, seq: u32, data: &[u8]) -> Self {
        Self {
            ts,
            seq,
            ack,
            data: data.to_vec(),
        }
    }

    #[must_use]
    pub const fn ts(&self) -> Timestamp {
        self.ts
    }

    #[must_use]
    pub const fn seq(&self) -> u32 {
        self.seq
    }

    #[must_use]
    pub const fn ack(&self) -> u32 {
        self.ack
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One reconstructed HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    created: Timestamp,
    pub(crate) packets: Vec<Packet>,
}

impl Response {
    #[must_use]
    pub const fn new(created: Timestamp) -> Self {
        Self {
            created,
            packets: Vec::new(),
        }
    }

    /// Timestamp of the packet preceding this response, or the session start
    /// for the first response of a session.
    #[must_use]
    pub const fn created(&self) -> Timestamp {
        self.created
    }

    #[must_use]
    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    #[must_use]
    pub fn packet_count(&self) -> usize {
        self.packets.len()
    }

    pub(crate) fn push(&mut self, packet: Packet) {
        self.packets.push(packet);
    }
}

/// One connection's worth of reconstructed responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    started: Timestamp,
    pub(crate) responses: Vec<Response>,
    pub(crate) packet_count: usize,
}

impl Session {
    #[must_use]
    pub const fn new(started: Timestamp) -> Self {
        Self {
            started,
            responses: Vec::new(),
            packet_count: 0,
        }
    }

    #[must_use]
    pub const fn started(&self) -> Timestamp {
        self.started
    }

    #[must_use]
    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    #[must_use]
    pub fn response_count(&self) -> usize {
        self.responses.len()
    }

    /// Total packets across all responses.
    #[must_use]
    pub const fn packet_count(&self) -> usize {
        self.packet_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub(crate) fn push(&mut self, response: Response) {
        self.responses.push(response);
    }
}
