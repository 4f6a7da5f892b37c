#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]
#![allow(clippy::missing_errors_doc)]

//! Reconstruction of HTTP responses from captured TCP traffic into a
//! replayable corpus.
//!
//! [`load`] reads a capture into a [`SessionStore`]; load drivers then walk it
//! with a [`ReplayCursor`] obtained from [`SessionStore::open_replay_cursor`].

pub mod capture;
mod error;
pub mod http;
pub mod packet;
pub mod replay;
pub mod session;
mod store;

pub use capture::{FrameSource, LoadReport, PcapFile};
pub use error::Error;
pub use replay::ReplayCursor;
pub use session::{Packet, Response, Session, Timestamp};
pub use store::SessionStore;

use std::path::Path;

/// Ingest the capture at `path`, keeping frames matching the BPF `filter`.
///
/// Completed sessions are appended to `store`; the report tells how many.
pub fn load(
    store: &mut SessionStore,
    path: impl AsRef<Path>,
    filter: &str,
) -> anyhow::Result<LoadReport> {
    PcapFile::new(path, filter).load(store)
}
