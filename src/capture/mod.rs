//! Capture sources and flow demultiplexing.
//!
//! A [`FrameSource`] yields raw link-layer frames. Its provided
//! [`FrameSource::load`] owns the ingest loop: frames are decoded into TCP
//! segments, split into sessions by the [`FlowTracker`], and completed sessions
//! land in the [`SessionStore`].

mod flow;
mod pcap_file;

pub use flow::FlowTracker;
pub use pcap_file::PcapFile;

use crate::session::Timestamp;
use crate::store::SessionStore;
use serde::Serialize;
use tracing::info;

/// One captured link-layer frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub ts: Timestamp,
    pub data: Vec<u8>,
}

/// Counters collected while loading a capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub frames: usize,
    pub tcp_segments: usize,
    pub sessions_opened: usize,
    pub sessions_stored: usize,
    pub sessions_discarded: usize,
    /// Sessions still open when the capture ended, released without storing.
    pub sessions_unfinished: usize,
}

/// Trait that capture backends implement. Implementors only provide the
/// frames; `load()` drives them through session reconstruction.
pub trait FrameSource {
    /// Return an iterator of captured frames.
    /// Implementations may return an error if the capture cannot be opened,
    /// and yield an error for a frame that cannot be read.
    fn frames(&self) -> anyhow::Result<Box<dyn Iterator<Item = anyhow::Result<Frame>>>>;

    /// Ingest every frame into `store`.
    ///
    /// A frame read error fails the whole load: sessions completed before the
    /// error stay in `store`, sessions still open are released.
    fn load(&self, store: &mut SessionStore) -> anyhow::Result<LoadReport> {
        let mut tracker = FlowTracker::new();
        for frame in self.frames()? {
            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    let report = tracker.finish();
                    return Err(e.context(format!(
                        "Capture read failed after {} frames",
                        report.frames
                    )));
                }
            };
            tracker.observe_frame(&frame, store);
        }
        let report = tracker.finish();

        info!(
            sessions = report.sessions_stored,
            discarded = report.sessions_discarded,
            unfinished = report.sessions_unfinished,
            "Session build complete"
        );
        Ok(report)
    }
}
