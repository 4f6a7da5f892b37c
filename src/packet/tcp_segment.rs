//! TCP segment decoding.
//!
//! `TcpSegment` borrows the payload of a captured frame and exposes the header
//! fields session reconstruction needs: the flow 4-tuple, sequence and
//! acknowledgment numbers, and the control flags.

use core::net::{IpAddr, Ipv4Addr, Ipv6Addr};

const ETHERNET_HEADER_LEN: usize = 14;
const ETHERTYPE_IPV4: u16 = 0x0800;
const ETHERTYPE_IPV6: u16 = 0x86DD;
const IPPROTO_TCP: u8 = 6;
const IPV4_MIN_HEADER_LEN: usize = 20;
const IPV6_HEADER_LEN: usize = 40;
const TCP_MIN_HEADER_LEN: usize = 20;

/// One direction of a TCP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowKey {
    pub src_ip: IpAddr,
    pub dst_ip: IpAddr,
    pub src_port: u16,
    pub dst_port: u16,
}

impl FlowKey {
    /// The opposite direction of the same connection.
    #[must_use]
    pub const fn reversed(&self) -> Self {
        Self {
            src_ip: self.dst_ip,
            dst_ip: self.src_ip,
            src_port: self.dst_port,
            dst_port: self.src_port,
        }
    }
}

/// TCP control bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TcpFlags(u8);

impl TcpFlags {
    pub const FIN: Self = Self(0x01);
    pub const SYN: Self = Self(0x02);
    pub const RST: Self = Self(0x04);
    pub const ACK: Self = Self(0x10);

    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// A decoded TCP segment borrowing its payload from the captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpSegment<'a> {
    pub flow: FlowKey,
    pub seq: u32,
    pub ack: u32,
    pub flags: TcpFlags,
    pub payload: &'a [u8],
}

impl<'a> TcpSegment<'a> {
    /// Decode a captured frame.
    /// Tries an Ethernet frame first, then a raw IP packet.
    #[must_use]
    pub fn from_packet(packet: &'a [u8]) -> Option<Self> {
        Self::from_ethernet_frame(packet).or_else(|| Self::from_ip_packet(packet))
    }

    /// Parse from Ethernet frame (14-byte Ethernet header + IP packet)
    #[must_use]
    pub fn from_ethernet_frame(packet: &'a [u8]) -> Option<Self> {
        if packet.len() < ETHERNET_HEADER_LEN {
            return None;
        }

        let ethertype = u16::from_be_bytes([packet[12], packet[13]]);
        let ip_packet = &packet[ETHERNET_HEADER_LEN..];

        match ethertype {
            ETHERTYPE_IPV4 => Self::from_ipv4_packet(ip_packet),
            ETHERTYPE_IPV6 => Self::from_ipv6_packet(ip_packet),
            _ => None,
        }
    }

    /// Parse from raw IP packet (no link-layer header)
    #[must_use]
    pub fn from_ip_packet(packet: &'a [u8]) -> Option<Self> {
        match packet.first()? >> 4 {
            4 => Self::from_ipv4_packet(packet),
            6 => Self::from_ipv6_packet(packet),
            _ => None,
        }
    }

    fn from_ipv4_packet(packet: &'a [u8]) -> Option<Self> {
        if packet.len() < IPV4_MIN_HEADER_LEN || packet[0] >> 4 != 4 {
            return None;
        }
        if packet[9] != IPPROTO_TCP {
            return None;
        }

        let ihl = usize::from(packet[0] & 0x0F) * 4;
        let total_len = usize::from(u16::from_be_bytes([packet[2], packet[3]]));
        if ihl < IPV4_MIN_HEADER_LEN || total_len < ihl {
            return None;
        }
        // Drop link-layer padding after the datagram; tolerate truncated captures.
        let end = total_len.min(packet.len());
        let tcp = packet.get(ihl..end)?;

        let src_ip = IpAddr::V4(Ipv4Addr::new(
            packet[12], packet[13], packet[14], packet[15],
        ));
        let dst_ip = IpAddr::V4(Ipv4Addr::new(
            packet[16], packet[17], packet[18], packet[19],
        ));
        Self::from_tcp(src_ip, dst_ip, tcp)
    }

    fn from_ipv6_packet(packet: &'a [u8]) -> Option<Self> {
        if packet.len() < IPV6_HEADER_LEN || packet[0] >> 4 != 6 {
            return None;
        }
        // Extension headers are not followed.
        if packet[6] != IPPROTO_TCP {
            return None;
        }

        let payload_len = usize::from(u16::from_be_bytes([packet[4], packet[5]]));
        let end = (IPV6_HEADER_LEN + payload_len).min(packet.len());
        let tcp = &packet[IPV6_HEADER_LEN..end];

        let src: [u8; 16] = packet[8..24].try_into().ok()?;
        let dst: [u8; 16] = packet[24..40].try_into().ok()?;
        Self::from_tcp(
            IpAddr::V6(Ipv6Addr::from(src)),
            IpAddr::V6(Ipv6Addr::from(dst)),
            tcp,
        )
    }

    fn from_tcp(src_ip: IpAddr, dst_ip: IpAddr, tcp: &'a [u8]) -> Option<Self> {
        if tcp.len() < TCP_MIN_HEADER_LEN {
            return None;
        }

        let data_offset = usize::from(tcp[12] >> 4) * 4;
        if data_offset < TCP_MIN_HEADER_LEN {
            return None;
        }

        Some(Self {
            flow: FlowKey {
                src_ip,
                dst_ip,
                src_port: u16::from_be_bytes([tcp[0], tcp[1]]),
                dst_port: u16::from_be_bytes([tcp[2], tcp[3]]),
            },
            seq: u32::from_be_bytes([tcp[4], tcp[5], tcp[6], tcp[7]]),
            ack: u32::from_be_bytes([tcp[8], tcp[9], tcp[10], tcp[11]]),
            flags: TcpFlags::from_bits(tcp[13]),
            payload: tcp.get(data_offset..)?,
        })
    }
}
