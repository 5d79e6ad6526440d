//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Uses the frame capture timestamp (seconds, f64) as primary clock
//! - `frame_id` is the per-cycle sequence number, stamped on every message

mod blueprint;
mod category;
mod error;
mod frame;
mod messages;
mod results;
mod sink;

pub use blueprint::*;
pub use category::Category;
pub use error::*;
pub use frame::*;
pub use messages::*;
pub use results::*;
pub use sink::OutputSink;
