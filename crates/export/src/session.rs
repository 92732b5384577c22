//! The editing session and its export orchestration.
//!
//! Exports run against a snapshot of the document taken when the export
//! begins. At most one export may be in flight, and none may start while a
//! drag or resize is in progress. The in-flight slot is held by the
//! [`PendingExport`] itself and released when it is finished or dropped.
//! Failures come back as user-facing messages and never touch the document.

use crate::archive::ArchiveExporter;
use crate::artifact::{sanitize_base, Artifact, ExportFormat, DEFAULT_BASE_NAME};
use crate::long_image::LongImageExporter;
use crate::presentation::{PresentationExporter, PresentationMode};
use serde::{Deserialize, Serialize};
use slidefix_core::{Error, InteractionController, Result, SlideDocument, Viewport};
use slidefix_pptx::DeckOptions;
use slidefix_render::Compositor;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// What to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "kebab-case")]
pub enum ExportRequest {
    Presentation { mode: PresentationMode },
    Archive,
    LongImage,
}

impl ExportRequest {
    pub fn format(&self) -> ExportFormat {
        match self {
            Self::Presentation { .. } => ExportFormat::Presentation,
            Self::Archive => ExportFormat::Archive,
            Self::LongImage => ExportFormat::LongImage,
        }
    }
}

/// A failed export as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFailure {
    pub format: ExportFormat,
    pub message: String,
}

impl ExportFailure {
    fn new(format: ExportFormat, error: &Error) -> Self {
        let message = match error {
            Error::EmptyDocument => "There are no slides to export.".to_string(),
            Error::Busy(reason) => reason.clone(),
            Error::Export { message, .. } => {
                format!("{} export failed: {}", format.label(), message)
            }
            other => format!("{} export failed: {}", format.label(), other),
        };
        Self { format, message }
    }
}

impl fmt::Display for ExportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ExportFailure {}

/// Holds a session's in-flight flag; clears it on drop.
#[derive(Debug)]
struct InFlight(Rc<Cell<bool>>);

impl InFlight {
    fn acquire(flag: &Rc<Cell<bool>>) -> Self {
        flag.set(true);
        Self(Rc::clone(flag))
    }

    fn belongs_to(&self, flag: &Rc<Cell<bool>>) -> bool {
        Rc::ptr_eq(&self.0, flag)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// An export that has been admitted and holds its own document snapshot.
///
/// Dropping it without [`EditorSession::finish_export`] abandons the export
/// and frees the session for the next one.
#[derive(Debug)]
pub struct PendingExport {
    slot: InFlight,
    request: ExportRequest,
    snapshot: SlideDocument,
    compositor: Compositor,
    base_name: String,
    deck_options: DeckOptions,
}

impl PendingExport {
    pub fn request(&self) -> ExportRequest {
        self.request
    }

    /// Produce the artifact from the snapshot.
    pub fn run(&self) -> Result<Artifact> {
        let doc = &self.snapshot;
        match self.request {
            ExportRequest::Presentation { mode } => PresentationExporter::new(mode)
                .with_options(self.deck_options.clone())
                .with_base_name(&self.base_name)
                .export(&self.compositor, doc),
            ExportRequest::Archive => {
                ArchiveExporter::new(&self.base_name).export(&self.compositor, doc)
            }
            ExportRequest::LongImage => {
                LongImageExporter::new(&self.base_name).export(&self.compositor, doc)
            }
        }
    }
}

/// Owns the document, the edit controller and the compositor for one
/// editing session.
#[derive(Debug)]
pub struct EditorSession {
    document: SlideDocument,
    controller: InteractionController,
    compositor: Compositor,
    base_name: String,
    deck_options: DeckOptions,
    in_flight: Rc<Cell<bool>>,
}

impl EditorSession {
    pub fn new(document: SlideDocument, compositor: Compositor, viewport: Viewport) -> Self {
        Self {
            document,
            controller: InteractionController::new(viewport),
            compositor,
            base_name: DEFAULT_BASE_NAME.to_string(),
            deck_options: DeckOptions::default(),
            in_flight: Rc::new(Cell::new(false)),
        }
    }

    pub fn with_base_name(mut self, base: &str) -> Self {
        self.base_name = sanitize_base(base);
        self
    }

    pub fn with_deck_options(mut self, options: DeckOptions) -> Self {
        self.deck_options = options;
        self
    }

    pub fn document(&self) -> &SlideDocument {
        &self.document
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn is_exporting(&self) -> bool {
        self.in_flight.get()
    }

    /// Borrow the controller together with the document it edits.
    pub fn edit(&mut self) -> (&mut InteractionController, &mut SlideDocument) {
        (&mut self.controller, &mut self.document)
    }

    /// Admit an export: commit any open text draft, then snapshot the
    /// document. Refused while a gesture is active, while another export is
    /// in flight, or when there is nothing to export.
    pub fn begin_export(&mut self, request: ExportRequest) -> Result<PendingExport> {
        if self.in_flight.get() {
            return Err(Error::Busy(
                "Another export is still running. Please wait for it to finish.".to_string(),
            ));
        }
        if self.controller.is_gesture_active() {
            return Err(Error::Busy(
                "Finish moving or resizing the element before exporting.".to_string(),
            ));
        }
        if self.document.is_empty() {
            return Err(Error::EmptyDocument);
        }
        self.controller.blur(&mut self.document)?;

        log::debug!("Export {:?} started", request);
        Ok(PendingExport {
            slot: InFlight::acquire(&self.in_flight),
            request,
            snapshot: self.document.clone(),
            compositor: self.compositor.clone(),
            base_name: self.base_name.clone(),
            deck_options: self.deck_options.clone(),
        })
    }

    /// Release the in-flight slot and translate the outcome for the user.
    ///
    /// An export begun by another session is refused and this session's
    /// slot is left alone.
    pub fn finish_export(
        &mut self,
        pending: PendingExport,
        outcome: Result<Artifact>,
    ) -> std::result::Result<Artifact, ExportFailure> {
        let format = pending.request.format();
        if !pending.slot.belongs_to(&self.in_flight) {
            log::warn!("Refusing to finish an export begun by another session");
            return Err(ExportFailure::new(
                format,
                &Error::Busy("This export was started in a different session.".to_string()),
            ));
        }
        drop(pending);
        match outcome {
            Ok(artifact) => {
                log::info!(
                    "Exported {} ({} bytes)",
                    artifact.filename,
                    artifact.bytes.len()
                );
                Ok(artifact)
            }
            Err(e) => {
                log::warn!("{} export failed: {}", format.label(), e);
                Err(ExportFailure::new(format, &e))
            }
        }
    }

    /// Run one export start to finish.
    pub fn export(&mut self, request: ExportRequest) -> std::result::Result<Artifact, ExportFailure> {
        let pending = self.begin_export(request).map_err(|e| {
            log::warn!("Export {:?} refused: {}", request, e);
            ExportFailure::new(request.format(), &e)
        })?;
        let outcome = pending.run();
        self.finish_export(pending, outcome)
    }
}
