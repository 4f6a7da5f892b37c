//! HTTP response boundary detection.
//!
//! Payload chunks are only inspected far enough to decide whether they open a
//! new HTTP response. Header fields and body framing are never decoded.

mod classifier;

pub use classifier::{MAX_LINE_LEN, is_response_start};
