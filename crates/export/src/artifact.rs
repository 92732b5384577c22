//! Export artifacts and their suggested file names.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Base name used when the source file name gives nothing usable.
pub const DEFAULT_BASE_NAME: &str = "output";

/// The kinds of artifact a session can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    Presentation,
    Archive,
    LongImage,
}

impl ExportFormat {
    /// Name used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Presentation => "Presentation",
            Self::Archive => "Image archive",
            Self::LongImage => "Long image",
        }
    }
}

/// A finished export: encoded bytes plus a suggested file name.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime: &'static str,
}

impl Artifact {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>, mime: &'static str) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            mime,
        }
    }
}

/// Derive an artifact base name from a source file name: the file name
/// without directories or its last extension.
pub fn base_name(source: &str) -> String {
    Path::new(source.trim())
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_BASE_NAME)
        .to_string()
}

/// Fall back to the default when a caller-supplied base name is blank.
pub(crate) fn sanitize_base(base: &str) -> String {
    let base = base.trim();
    if base.is_empty() {
        DEFAULT_BASE_NAME.to_string()
    } else {
        base.to_string()
    }
}
