//! TopicPublicationSink - per-category staging and channel publication

use std::collections::HashMap;

use tracing::{debug, instrument, trace};

use contracts::{
    Category, ChannelMessage, ContractError, FlushMeta, FrameContext, FrameHeader, MessageBody,
    OutputSink, ResultBatch,
};

use crate::channel::ChannelSet;
use crate::convert::convert_batch;

/// Sink that stages per-category results and publishes them per frame
///
/// Cycle: `feed_frame` caches the header, `accept` converts and stages,
/// `handle_output` publishes every staged record on its wired channel and
/// clears all per-cycle state. Supports every category; categories without
/// a wired channel are skipped at flush.
pub struct TopicPublicationSink {
    name: String,
    channels: ChannelSet,
    /// Current frame, dropped at flush so the driver may reuse the buffer
    frame: Option<FrameContext>,
    /// Header cached once per cycle; identical on every message of the cycle
    header: Option<FrameHeader>,
    /// Staging records, one per category accepted this cycle
    staged: HashMap<Category, MessageBody>,
    /// Malformed records dropped during conversion this cycle
    conversion_dropped: u32,
    /// Diagnostics of the most recent flush
    last_flush: FlushMeta,
}

impl TopicPublicationSink {
    /// Create a sink over a set of wired channels
    pub fn new(channels: ChannelSet) -> Self {
        let name = channels.pipeline().to_string();
        Self {
            name,
            channels,
            frame: None,
            header: None,
            staged: HashMap::new(),
            conversion_dropped: 0,
            last_flush: FlushMeta::default(),
        }
    }

    /// Wired channels
    pub fn channels(&self) -> &ChannelSet {
        &self.channels
    }

    /// Diagnostics of the most recent `handle_output`
    pub fn last_flush(&self) -> &FlushMeta {
        &self.last_flush
    }

    /// Whether a frame is currently loaded
    pub fn has_frame(&self) -> bool {
        self.frame.is_some()
    }
}

impl OutputSink for TopicPublicationSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, _category: Category) -> bool {
        true
    }

    #[instrument(
        name = "topic_sink_feed_frame",
        skip(self, frame),
        fields(sink = %self.name, frame_id = frame.frame_id)
    )]
    fn feed_frame(&mut self, frame: FrameContext) -> Result<(), ContractError> {
        if !self.staged.is_empty() {
            return Err(ContractError::StagingNotFlushed {
                staged: self.staged.len(),
            });
        }

        self.header = Some(frame.header());
        self.frame = Some(frame);
        Ok(())
    }

    #[instrument(
        name = "topic_sink_accept",
        skip(self, results),
        fields(sink = %self.name, category = %results.category(), records = results.len())
    )]
    fn accept(&mut self, results: ResultBatch) -> Result<(), ContractError> {
        let category = results.category();
        let frame = self
            .frame
            .as_ref()
            .ok_or(ContractError::PrecallViolation { category })?;

        let (body, dropped) = convert_batch(results, frame);
        self.conversion_dropped += dropped;

        match self.staged.entry(category) {
            std::collections::hash_map::Entry::Occupied(mut staged) => {
                // Accumulate-by-append: repeated accept for one category
                // before flush extends the staged record in call order
                let appended = staged.get_mut().extend_from(body);
                debug_assert!(appended, "staging is keyed by category");
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(body);
            }
        }

        trace!(category = %category, "results staged");
        Ok(())
    }

    #[instrument(name = "topic_sink_flush", skip(self), fields(sink = %self.name))]
    fn handle_output(&mut self) -> Result<(), ContractError> {
        let header = self.header.take().unwrap_or_default();

        let mut meta = FlushMeta {
            frame_id: header.frame_id,
            stamp_secs: header.stamp_secs,
            conversion_dropped: self.conversion_dropped,
            ..FlushMeta::default()
        };

        let staged = std::mem::take(&mut self.staged);
        for (category, body) in staged {
            meta.categories.push(category);

            let channel = match self.channels.get(category) {
                Some(channel) => channel,
                None => {
                    // Channel absence is a static configuration fact
                    trace!(category = %category, "no channel wired, skipping");
                    meta.unwired += 1;
                    continue;
                }
            };

            let items = body.len() as u32;
            if channel.try_publish(ChannelMessage { header, body }) {
                meta.published += 1;
                meta.items += items;
            } else {
                meta.queue_dropped += 1;
            }
        }

        // Frame buffer must not outlive the cycle
        self.frame = None;
        self.conversion_dropped = 0;

        debug!(
            frame_id = meta.frame_id,
            published = meta.published,
            items = meta.items,
            unwired = meta.unwired,
            "cycle flushed"
        );

        self.last_flush = meta;
        Ok(())
    }
}
