//! OutputSink trait - Publication sink interface
//!
//! Defines the per-cycle contract between the pipeline driver and sinks:
//! `feed_frame -> accept* -> handle_output`, repeated once per frame.

use crate::{Category, ContractError, FrameContext, ResultBatch};

/// Publication sink trait
///
/// All methods are synchronous and run to completion; no method may block
/// the inference pipeline beyond in-memory copy/convert. A sink instance
/// must not be invoked from two threads concurrently.
pub trait OutputSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Whether the sink handles this category at all
    ///
    /// Sinks may support a strict subset; `accept` for an unsupported
    /// category is an error, never a silent drop.
    fn supports(&self, category: Category) -> bool;

    /// Load the current frame context and derive the cycle header
    ///
    /// # Errors
    /// `StagingNotFlushed` if results from the previous frame are still
    /// staged (flush is required before the next frame).
    fn feed_frame(&mut self, frame: FrameContext) -> Result<(), ContractError>;

    /// Stage one category's results for the current frame
    ///
    /// Converts records to the category's outbound item shape and appends
    /// them to the staging record. Does not publish.
    ///
    /// # Errors
    /// `PrecallViolation` if no frame is active; `UnsupportedCategory` if
    /// the sink does not handle this category. Staging state is unchanged
    /// on error.
    fn accept(&mut self, results: ResultBatch) -> Result<(), ContractError>;

    /// Publish every staged record and clear all per-cycle state
    ///
    /// The only point at which anything leaves the process boundary.
    /// Idempotent with respect to state: calling it again without an
    /// intervening `accept` publishes nothing.
    fn handle_output(&mut self) -> Result<(), ContractError>;
}
