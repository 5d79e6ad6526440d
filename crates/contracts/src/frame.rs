//! FrameContext - Per-cycle frame view
//!
//! The pixel buffer is shared via `Bytes` (zero-copy); the sink holds a
//! shallow clone for at most one cycle and drops it at flush.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Current frame context
///
/// Fed once per cycle by the pipeline driver. Exactly one is live at a time.
#[derive(Debug, Clone)]
pub struct FrameContext {
    /// Frame sequence number (monotonically increasing)
    pub frame_id: u64,

    /// Capture timestamp (seconds, f64) - primary clock
    pub stamp_secs: f64,

    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,

    /// Raw pixel data (zero-copy)
    pub data: Bytes,
}

impl FrameContext {
    /// Derive the outbound message header for this frame.
    ///
    /// Pure derivation, no side effects. Called once per cycle so every
    /// message published in that cycle carries an identical header.
    pub fn header(&self) -> FrameHeader {
        FrameHeader {
            frame_id: self.frame_id,
            stamp_secs: self.stamp_secs,
        }
    }
}

/// Outbound message header
///
/// Stamped onto every message published within one cycle, correlating all
/// categories of one frame for downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameHeader {
    /// Frame sequence number
    pub frame_id: u64,

    /// Capture timestamp (seconds)
    pub stamp_secs: f64,
}
