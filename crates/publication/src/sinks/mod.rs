//! Sink implementations

mod log;
mod topic;

pub use log::LogOutputSink;
pub use topic::TopicPublicationSink;
