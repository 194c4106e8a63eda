use std::time::Duration;

/// Fatal conditions surfaced by the simulation and frame loop.
///
/// Every variant aborts the frame loop; nothing here is recovered locally.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Invalid parameters supplied at construction time.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A slot, buffer or descriptor could not be allocated or indexed.
    #[error("resource exhausted: {0}")]
    ResourceExhaustion(String),

    /// The GPU did not retire a fence value within the configured bound.
    #[error("timed out after {waited:?} waiting for fence value {value} (completed: {completed})")]
    SynchronizationTimeout {
        value: u64,
        completed: u64,
        waited: Duration,
    },

    /// A fence value was issued out of order.
    #[error("fence value {value} is not greater than last issued value {last}")]
    FenceOrder { value: u64, last: u64 },

    /// The device reported an error while polling or submitting.
    #[error("gpu device error: {0}")]
    Device(String),
}

impl RenderError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn exhausted(msg: impl Into<String>) -> Self {
        Self::ResourceExhaustion(msg.into())
    }
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;
