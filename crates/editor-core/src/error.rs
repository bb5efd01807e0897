use thiserror::Error;

/// Caller-facing failures of the editor session. All of them leave the
/// session usable; jobs fail, the orchestrator does not.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Admitting the batch would exceed the photo cap; nothing was added.
    #[error("demo limit: max {max} photos")]
    CapacityExceeded { attempted: usize, max: usize },

    #[error("add at least one photo")]
    EmptySubmission,

    #[error("a generation job is already running")]
    JobActive,

    /// At least one photo upload failed; the job is terminal, nothing
    /// partial is kept.
    #[error("photo upload failed: {0}")]
    Upload(anyhow::Error),

    #[error("compose request failed: {0}")]
    Compose(anyhow::Error),
}
