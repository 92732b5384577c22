//! Ingest of text-detection results.
//!
//! The analysis service returns one JSON object per slide, sometimes wrapped
//! in a fenced code block, listing detected text regions with geometry
//! already normalized to percentages.

use crate::geometry::Geometry;
use crate::types::{Alignment, Category, Element, Style};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Regex to pull the body out of a fenced code block.
static CODE_FENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)```").unwrap());

/// Warning attached to a slide on which nothing was detected.
pub const NO_TEXT_WARNING: &str = "No text was found on this slide.";

/// Warning attached to a slide whose response was not valid JSON.
pub const UNPARSEABLE_WARNING: &str = "The analysis response could not be parsed. Please try again.";

/// One detected text region, exactly as the analysis service reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementDescriptor {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub content: Option<String>,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub font_size: Option<f64>,
    pub color: Option<String>,
    pub bg_color: Option<String>,
    pub bold: Option<bool>,
    pub align: Option<String>,
}

impl ElementDescriptor {
    /// Build a document element, clamping geometry into [0, 100].
    pub fn into_element(self) -> Element {
        let raw = Geometry::new(self.x, self.y, self.w, self.h);
        if raw.is_out_of_range() {
            log::debug!("Clamping out-of-range element geometry {:?}", raw);
        }

        let defaults = Style::default();
        let font_size = self
            .font_size
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(defaults.font_size);

        Element {
            category: parse_category(self.kind.as_deref()),
            content: self.content.unwrap_or_default(),
            geometry: raw.clamped(),
            style: Style {
                font_size,
                color: self.color.unwrap_or(defaults.color),
                background_color: self.bg_color.filter(|c| !c.trim().is_empty()),
                bold: self.bold.unwrap_or(false),
                alignment: parse_alignment(self.align.as_deref()),
            },
        }
    }
}

fn parse_category(kind: Option<&str>) -> Category {
    match kind.map(|k| k.trim().to_ascii_lowercase()).as_deref() {
        Some("title") => Category::Title,
        Some("subtitle") => Category::Subtitle,
        Some("caption") => Category::Caption,
        _ => Category::Text,
    }
}

fn parse_alignment(align: Option<&str>) -> Alignment {
    match align.map(|a| a.trim().to_ascii_lowercase()).as_deref() {
        Some("center") | Some("centre") => Alignment::Center,
        Some("right") => Alignment::Right,
        _ => Alignment::Left,
    }
}

/// Analysis output for one slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    pub elements: Vec<ElementDescriptor>,
    pub warning: Option<String>,
}

impl AnalysisResult {
    fn with_warning(warning: &str) -> Self {
        Self {
            elements: Vec::new(),
            warning: Some(warning.to_string()),
        }
    }
}

/// Parse the raw text returned by the analysis service.
///
/// Never fails: an empty or malformed response yields no elements and a
/// warning for the slide.
pub fn parse_analysis_response(text: &str) -> AnalysisResult {
    if text.trim().is_empty() {
        return AnalysisResult::with_warning(NO_TEXT_WARNING);
    }

    let body = CODE_FENCE_REGEX
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text)
        .trim();

    match serde_json::from_str::<AnalysisResult>(body) {
        Ok(result) => result,
        Err(e) => {
            log::warn!("Failed to parse analysis response: {}", e);
            AnalysisResult::with_warning(UNPARSEABLE_WARNING)
        }
    }
}

/// Broad cause of an analysis service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidKey,
    Quota,
    Permission,
    Network,
    Safety,
    Model,
    Unknown,
}

impl FailureKind {
    /// Message shown to the user for this failure.
    pub fn user_message(&self, raw: &str) -> String {
        match self {
            Self::InvalidKey => "The API key is not valid. Check the key and try again.".to_string(),
            Self::Quota => {
                "The API usage limit was reached. Wait a moment and try again.".to_string()
            }
            Self::Permission => "The API key is not allowed to use the analysis model.".to_string(),
            Self::Network => {
                "Check your network connection; the request could not reach the service."
                    .to_string()
            }
            Self::Safety => {
                "The image was blocked by a safety filter. Try a different slide.".to_string()
            }
            Self::Model => {
                "The analysis model is not reachable right now. Try again later.".to_string()
            }
            Self::Unknown => format!("Analysis failed: {}", raw),
        }
    }
}

/// Classify a raw service error message.
pub fn classify_failure(message: &str) -> FailureKind {
    let has = |needle: &str| message.contains(needle);
    if has("API_KEY_INVALID") || has("API key not valid") {
        FailureKind::InvalidKey
    } else if has("RESOURCE_EXHAUSTED") || has("quota") {
        FailureKind::Quota
    } else if has("PERMISSION_DENIED") {
        FailureKind::Permission
    } else if has("Failed to fetch") || has("NetworkError") || has("net::") {
        FailureKind::Network
    } else if has("SAFETY") || has("blocked") {
        FailureKind::Safety
    } else if has("model") && has("not found") {
        FailureKind::Model
    } else {
        FailureKind::Unknown
    }
}
