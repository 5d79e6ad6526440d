//! ChannelHandle / ChannelSet - named publication channels per category

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, trace, warn};

use contracts::{Category, ChannelMessage, PublicationBlueprint};

use crate::metrics::{ChannelMetrics, MetricsSnapshot};

/// Handle to one category's publication channel
///
/// Wraps a bounded sender; publication is fire-and-forget and never blocks.
/// Queue backpressure is the consumer's concern.
pub struct ChannelHandle {
    /// Topic name, e.g. "/front_cam/faces"
    topic: String,
    /// Bounded channel to the messaging substrate
    tx: mpsc::Sender<ChannelMessage>,
    /// Shared metrics
    metrics: Arc<ChannelMetrics>,
}

impl ChannelHandle {
    /// Create a channel with the given topic and queue capacity.
    ///
    /// Returns the handle and the receiver end for the messaging substrate.
    pub fn new(
        topic: impl Into<String>,
        queue_capacity: usize,
    ) -> (Self, mpsc::Receiver<ChannelMessage>) {
        let (tx, rx) = mpsc::channel(queue_capacity);
        let handle = Self {
            topic: topic.into(),
            tx,
            metrics: Arc::new(ChannelMetrics::new()),
        };
        (handle, rx)
    }

    /// Get topic name
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<ChannelMetrics> {
        &self.metrics
    }

    /// Publish a message (non-blocking)
    ///
    /// Returns true if handed to the channel, false if dropped.
    pub fn try_publish(&self, message: ChannelMessage) -> bool {
        match self.tx.try_send(message) {
            Ok(()) => {
                self.metrics.inc_published_count();
                // Queue length approximation
                self.metrics.set_queue_len(self.tx.max_capacity() - self.tx.capacity());
                trace!(topic = %self.topic, "message published");
                true
            }
            Err(mpsc::error::TrySendError::Full(m)) => {
                self.metrics.inc_dropped_count();
                warn!(
                    topic = %self.topic,
                    frame_id = m.header.frame_id,
                    "Queue full, message dropped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.metrics.inc_closed_count();
                error!(topic = %self.topic, "Channel receiver gone");
                false
            }
        }
    }
}

/// The set of wired channels for one pipeline
///
/// Categories without an entry are not wired; the sink skips them at flush
/// without error.
pub struct ChannelSet {
    pipeline: String,
    channels: HashMap<Category, ChannelHandle>,
}

impl ChannelSet {
    /// Create an empty set namespaced by pipeline name
    pub fn new(pipeline: impl Into<String>) -> Self {
        Self {
            pipeline: pipeline.into(),
            channels: HashMap::new(),
        }
    }

    /// Build the full set from a blueprint
    ///
    /// Returns the set and one receiver per wired category.
    pub fn from_blueprint(
        blueprint: &PublicationBlueprint,
    ) -> (Self, HashMap<Category, mpsc::Receiver<ChannelMessage>>) {
        let mut set = Self::new(blueprint.pipeline.name.clone());
        let mut receivers = HashMap::with_capacity(blueprint.channels.len());

        for channel in &blueprint.channels {
            let rx = set.wire_topic(
                channel.category,
                blueprint.topic_for(channel),
                channel.queue_capacity,
            );
            receivers.insert(channel.category, rx);
        }

        (set, receivers)
    }

    /// Pipeline namespace
    pub fn pipeline(&self) -> &str {
        &self.pipeline
    }

    /// Wire a category on its default topic
    pub fn wire(
        &mut self,
        category: Category,
        queue_capacity: usize,
    ) -> mpsc::Receiver<ChannelMessage> {
        let topic = format!("/{}/{}", self.pipeline, category.topic_suffix());
        self.wire_topic(category, topic, queue_capacity)
    }

    /// Wire a category on an explicit topic
    ///
    /// Re-wiring a category replaces the previous channel.
    pub fn wire_topic(
        &mut self,
        category: Category,
        topic: impl Into<String>,
        queue_capacity: usize,
    ) -> mpsc::Receiver<ChannelMessage> {
        let (handle, rx) = ChannelHandle::new(topic, queue_capacity);
        self.channels.insert(category, handle);
        rx
    }

    /// Get the channel for a category, if wired
    pub fn get(&self, category: Category) -> Option<&ChannelHandle> {
        self.channels.get(&category)
    }

    /// Whether a category has a channel
    pub fn is_wired(&self, category: Category) -> bool {
        self.channels.contains_key(&category)
    }

    /// Number of wired channels
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Get metrics for all channels
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.channels
            .values()
            .map(|c| (c.topic().to_string(), c.metrics().snapshot()))
            .collect()
    }
}
