#![allow(dead_code)]

use http_replay_ingest_lib::Timestamp;
use http_replay_ingest_lib::capture::Frame;

pub const CLIENT: [u8; 4] = [192, 168, 1, 20];
pub const SERVER: [u8; 4] = [93, 184, 216, 34];
pub const CLIENT_PORT: u16 = 51000;

pub const FIN: u8 = 0x01;
pub const SYN: u8 = 0x02;
pub const RST: u8 = 0x04;
pub const ACK: u8 = 0x10;

/// Ethernet + IPv4 + TCP frame for one connection on port 80.
pub fn frame(client_port: u16, from_server: bool, seq: u32, flags: u8, payload: &[u8]) -> Vec<u8> {
    let (src, dst, sport, dport) = if from_server {
        (SERVER, CLIENT, 80, client_port)
    } else {
        (CLIENT, SERVER, client_port, 80)
    };

    let mut frame = vec![0u8; 14];
    frame[12..14].copy_from_slice(&0x0800u16.to_be_bytes());

    let total_len = u16::try_from(40 + payload.len()).unwrap();
    let mut ip = vec![0u8; 40];
    ip[0] = 0x45;
    ip[2..4].copy_from_slice(&total_len.to_be_bytes());
    ip[8] = 64;
    ip[9] = 6;
    ip[12..16].copy_from_slice(&src);
    ip[16..20].copy_from_slice(&dst);
    ip[20..22].copy_from_slice(&sport.to_be_bytes());
    ip[22..24].copy_from_slice(&dport.to_be_bytes());
    ip[24..28].copy_from_slice(&seq.to_be_bytes());
    ip[28..32].copy_from_slice(&1u32.to_be_bytes());
    ip[32] = 5 << 4;
    ip[33] = flags;
    ip[34..36].copy_from_slice(&65535u16.to_be_bytes());

    frame.extend_from_slice(&ip);
    frame.extend_from_slice(payload);
    frame
}

/// Scripted connection: handshake, the given server segments, then FIN from both sides.
pub struct Conversation {
    pub client_port: u16,
    frames: Vec<Frame>,
}

impl Conversation {
    pub fn open(client_port: u16, start_millis: i64) -> Self {
        let mut conversation = Self {
            client_port,
            frames: Vec::new(),
        };
        conversation.push(start_millis, false, 0, SYN, &[]);
        conversation.push(start_millis, true, 0, SYN | ACK, &[]);
        conversation.push(start_millis, false, 1, ACK, &[]);
        conversation
    }

    pub fn push(&mut self, millis: i64, from_server: bool, seq: u32, flags: u8, payload: &[u8]) {
        self.frames.push(Frame {
            ts: Timestamp::from_millis(millis),
            data: frame(self.client_port, from_server, seq, flags, payload),
        });
    }

    pub fn server(&mut self, millis: i64, seq: u32, payload: &[u8]) {
        self.push(millis, true, seq, ACK, payload);
    }

    pub fn close(mut self, millis: i64) -> Vec<Frame> {
        self.push(millis, true, u32::MAX, FIN | ACK, &[]);
        self.push(millis, false, u32::MAX, FIN | ACK, &[]);
        self.frames
    }
}
