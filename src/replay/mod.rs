//! Replay-side traversal of the session store.
//!
//! A load driver owns one [`ReplayCursor`] and walks
//! store -> session -> response -> packet, asking for the delay to wait before
//! sending each packet.

mod cursor;

pub use cursor::ReplayCursor;
