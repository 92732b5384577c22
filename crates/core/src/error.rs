//! Error types for slide text repair.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing, flattening or exporting slides.
///
/// Out-of-range geometry is never an error: it is clamped where it enters
/// the document.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// A slide index did not refer to a slide in the document.
    #[error("Slide {0} does not exist")]
    SlideNotFound(usize),

    /// An element index did not refer to an element on the slide.
    #[error("Element {element} does not exist on slide {slide}")]
    ElementNotFound { slide: usize, element: usize },

    /// Too many slides failed analysis for the batch to be useful.
    #[error("Slide analysis failed: {0}")]
    AnalysisAborted(String),

    /// A source raster could not be decoded.
    #[error("Failed to decode slide image: {0}")]
    Decode(String),

    /// Flattening a slide failed.
    #[error("Failed to composite slide: {0}")]
    Composite(String),

    /// A raster could not be encoded.
    #[error("Failed to encode image: {0}")]
    Encode(String),

    /// There is nothing to export.
    #[error("The document has no slides to export")]
    EmptyDocument,

    /// ZIP archive error (for PPTX and image archives).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML writing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),

    /// Failure inside one exporter.
    #[error("{exporter} export failed: {message}")]
    Export {
        exporter: &'static str,
        message: String,
    },

    /// The session cannot accept the request right now.
    #[error("Busy: {0}")]
    Busy(String),
}
