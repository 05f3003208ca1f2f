//! Error types for the PDF layer.

use thiserror::Error;

/// Result type for PDF operations.
pub type PdfResult<T> = Result<T, PdfError>;

/// Errors that can occur while reading or rendering a PDF.
#[derive(Debug, Error)]
pub enum PdfError {
    /// The bytes are not a PDF lopdf can parse.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// IO error while reading the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Page number outside `[1, num_pages]`.
    #[error("page {page} is out of range 1..={num_pages}")]
    PageOutOfRange { page: u32, num_pages: u32 },

    /// Page reference that is not part of the page tree.
    #[error("unknown page reference {0}")]
    UnknownPage(String),

    /// Malformed outline or destination structure.
    #[error("malformed document structure: {0}")]
    Malformed(String),

    /// Rendering failed.
    #[error("render failed: {0}")]
    Render(String),

    /// A render observed its cancellation token.
    #[error("render cancelled")]
    Cancelled,

    /// Blocking task panicked or was aborted.
    #[error("background task failed: {0}")]
    Task(String),
}

impl From<lopdf::Error> for PdfError {
    fn from(e: lopdf::Error) -> Self {
        PdfError::Parse(e.to_string())
    }
}
