//! PPTX (Office Open XML) deck writer.
//!
//! Builds .pptx files, which are ZIP archives of XML parts, from pictures and
//! text boxes already placed in absolute slide units (EMU).

pub mod deck;
mod templates;
pub mod writer;

pub use deck::{DeckOptions, DeckSlide, Picture, PictureFormat, TextBox};
pub use writer::PptxWriter;
