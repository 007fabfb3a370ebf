//! Error types for replica-renderer.

use thiserror::Error;

/// All errors that can arise while generating artifact contents.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// CSV writer error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the in-memory CSV buffer failed.
    #[error("csv buffer error: {0}")]
    Io(#[from] std::io::Error),

    /// The rendered CSV buffer was not valid UTF-8.
    #[error("csv output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
