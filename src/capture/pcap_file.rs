use super::{Frame, FrameSource};
use crate::error::Error;
use crate::session::Timestamp;
use pcap::{Capture, Offline};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Offline capture read from a pcap file, narrowed by a BPF filter expression.
#[derive(Debug, Clone)]
pub struct PcapFile {
    path: PathBuf,
    filter: String,
}

impl PcapFile {
    /// An empty `filter` keeps every frame.
    #[must_use]
    pub fn new(path: impl AsRef<Path>, filter: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            filter: filter.trim().to_owned(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Capture<Offline>, Error> {
        if !self.path.is_file() {
            return Err(Error::CaptureNotFound(self.path.clone()));
        }

        let mut cap = Capture::from_file(&self.path)?;
        if !self.filter.is_empty() {
            cap.filter(&self.filter, true)?;
        }
        Ok(cap)
    }
}

impl FrameSource for PcapFile {
    fn frames(&self) -> anyhow::Result<Box<dyn Iterator<Item = anyhow::Result<Frame>>>> {
        let mut cap = self.open()?;

        info!(
            path = %self.path.display(),
            filter = %self.filter,
            "Loading capture"
        );

        // A read error is yielded once and ends the iterator; libpcap cannot
        // resynchronise after a corrupt record header.
        let mut failed = false;
        let iter = core::iter::from_fn(move || {
            if failed {
                return None;
            }
            match cap.next_packet() {
                Ok(packet) => Some(Ok(Frame {
                    ts: Timestamp::new(
                        i64::from(packet.header.ts.tv_sec),
                        i64::from(packet.header.ts.tv_usec),
                    ),
                    data: packet.data.to_vec(),
                })),
                Err(pcap::Error::NoMorePackets) => None,
                Err(e) => {
                    warn!("Error reading packet: {e}");
                    failed = true;
                    Some(Err(anyhow::Error::from(Error::from(e))))
                }
            }
        });

        Ok(Box::new(iter))
    }
}
