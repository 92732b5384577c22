//! Core domain types for repairing text on rendered slides: the percentage
//! geometry model, the slide document, analysis ingest and the interactive
//! edit controller.

pub mod analysis;
pub mod color;
pub mod document;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod types;

pub use analysis::{parse_analysis_response, AnalysisResult, ElementDescriptor};
pub use color::Color;
pub use document::{SlideDocument, SlideDocumentBuilder};
pub use error::{Error, Result};
pub use geometry::{to_absolute, AbsoluteRect, Corner, Geometry};
pub use interaction::{EditState, InteractionController, Key, Point, ViewMode, Viewport};
pub use types::{
    Alignment, Category, Element, ElementPatch, RasterHandle, RasterizedPage, Slide, Style,
};
