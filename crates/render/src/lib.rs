//! Compositor that bakes edited text regions onto slide rasters.
//!
//! Each element is painted as an opaque "sticker" over the source raster and
//! its text is redrawn on top, so broken source text never shows through.

pub mod compositor;
pub mod config;
pub mod font;
pub mod raster;
pub mod wrap;

pub use compositor::Compositor;
pub use config::RenderConfig;
pub use font::FontBook;
pub use wrap::wrap_text;
