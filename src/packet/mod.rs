//! Packet decoding down to TCP segments.
//!
//! Supports IPv4 and IPv6 carried either in Ethernet frames or as raw IP
//! packets, which covers the common pcap link types.

mod tcp_segment;

pub use tcp_segment::{FlowKey, TcpFlags, TcpSegment};
