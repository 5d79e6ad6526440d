//! LogOutputSink - logs cycle summaries via tracing

use std::collections::HashMap;

use tracing::{info, instrument};

use contracts::{Category, ContractError, FrameContext, FrameHeader, OutputSink, ResultBatch};

/// Sink that logs per-cycle summaries for debugging
///
/// Supports every category; nothing leaves the process.
pub struct LogOutputSink {
    name: String,
    header: Option<FrameHeader>,
    /// Record counts per category accepted this cycle
    counts: HashMap<Category, usize>,
}

impl LogOutputSink {
    /// Create a new LogOutputSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            header: None,
            counts: HashMap::new(),
        }
    }
}

impl OutputSink for LogOutputSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, _category: Category) -> bool {
        true
    }

    fn feed_frame(&mut self, frame: FrameContext) -> Result<(), ContractError> {
        if !self.counts.is_empty() {
            return Err(ContractError::StagingNotFlushed {
                staged: self.counts.len(),
            });
        }
        self.header = Some(frame.header());
        Ok(())
    }

    fn accept(&mut self, results: ResultBatch) -> Result<(), ContractError> {
        let category = results.category();
        if self.header.is_none() {
            return Err(ContractError::PrecallViolation { category });
        }
        *self.counts.entry(category).or_insert(0) += results.len();
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self), fields(sink = %self.name))]
    fn handle_output(&mut self) -> Result<(), ContractError> {
        if let Some(header) = self.header.take() {
            let total: usize = self.counts.values().sum();
            info!(
                sink = %self.name,
                frame_id = header.frame_id,
                stamp_secs = header.stamp_secs,
                categories = self.counts.len(),
                records = total,
                "cycle summary"
            );
        }
        self.counts.clear();
        Ok(())
    }
}
