use thiserror::Error;

/// An error reported by a [`Link`].
///
/// [`Link`]: crate::link::Link
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The link is not open.
    #[error("Link is closed")]
    Closed,
    /// The link could not be opened.
    #[error("Failed to open link: {0}")]
    Open(String),
    /// A frame could not be transmitted.
    #[error("Failed to send frame: {0}")]
    Send(String),
}

/// An interface for error handling in autd3-pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The pipeline has no open link.
    #[error("Pipeline is not open")]
    NotOpen,
    /// A background worker could not be started.
    #[error("Failed to spawn worker: {0}")]
    Spawn(#[from] std::io::Error),
    #[allow(missing_docs)]
    #[error("{0}")]
    Link(#[from] LinkError),
    #[allow(missing_docs)]
    #[cfg(feature = "polars")]
    #[error("{0}")]
    Polars(#[from] polars::error::PolarsError),
}
