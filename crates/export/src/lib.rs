//! Exporters that turn an edited slide document into downloadable artifacts,
//! and the session that serializes them.

pub mod archive;
pub mod artifact;
pub mod long_image;
pub mod presentation;
pub mod session;

pub use archive::ArchiveExporter;
pub use artifact::{base_name, Artifact, ExportFormat};
pub use long_image::LongImageExporter;
pub use presentation::{PresentationExporter, PresentationMode};
pub use session::{EditorSession, ExportFailure, ExportRequest, PendingExport};
pub use slidefix_pptx::DeckOptions;
