//! Pointer and keyboard driven editing of the active slide.
//!
//! The controller owns only transient interaction state. Every change to the
//! document goes through [`SlideDocument`] operations, so the document can be
//! snapshotted for export at any point between events.

use crate::document::SlideDocument;
use crate::error::Result;
use crate::geometry::{clamp_extent, to_absolute, to_percent, AbsoluteRect, Corner, Geometry};
use crate::types::{Element, ElementPatch};

/// Radius, in overlay pixels, within which a press grabs a resize handle.
pub const HANDLE_RADIUS: f64 = 8.0;

/// How the active slide is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Flat, non-interactive image; overlays are suppressed.
    #[default]
    Design,
    /// Element overlays accept pointer and keyboard input.
    Edit,
}

/// Size of the on-screen overlay, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn percent(&self, point: Point) -> (f64, f64) {
        (
            to_percent(point.x, self.width),
            to_percent(point.y, self.height),
        )
    }
}

/// A pointer position on the overlay, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Keys the inline text editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter { shift: bool },
    Escape,
}

/// Where a gesture started: pointer position (percent) and element geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub pointer: (f64, f64),
    pub start: Geometry,
}

impl Anchor {
    fn delta(&self, to: (f64, f64)) -> (f64, f64) {
        (to.0 - self.pointer.0, to.1 - self.pointer.1)
    }
}

/// Interaction state of the active slide.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditState {
    #[default]
    Idle,
    Selected(usize),
    Dragging {
        element: usize,
        anchor: Anchor,
    },
    Resizing {
        element: usize,
        corner: Corner,
        anchor: Anchor,
    },
    EditingText {
        element: usize,
        draft: String,
    },
}

impl EditState {
    /// Element the state refers to, if any.
    pub fn element(&self) -> Option<usize> {
        match self {
            EditState::Idle => None,
            EditState::Selected(i) => Some(*i),
            EditState::Dragging { element, .. }
            | EditState::Resizing { element, .. }
            | EditState::EditingText { element, .. } => Some(*element),
        }
    }

    /// Whether pointer move/up observers are attached.
    pub fn is_gesture(&self) -> bool {
        matches!(self, EditState::Dragging { .. } | EditState::Resizing { .. })
    }
}

/// Drives selection, drag, resize and inline text editing on one slide at a
/// time.
#[derive(Debug, Clone)]
pub struct InteractionController {
    state: EditState,
    mode: ViewMode,
    slide: usize,
    viewport: Viewport,
    /// Press on a selected body that has not moved yet.
    press: Option<Anchor>,
}

impl InteractionController {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            state: EditState::Idle,
            mode: ViewMode::default(),
            slide: 0,
            viewport,
            press: None,
        }
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn active_slide(&self) -> usize {
        self.slide
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn selection(&self) -> Option<usize> {
        self.state.element()
    }

    /// Open draft, as (element, text).
    pub fn draft(&self) -> Option<(usize, &str)> {
        match &self.state {
            EditState::EditingText { element, draft } => Some((*element, draft.as_str())),
            _ => None,
        }
    }

    pub fn is_gesture_active(&self) -> bool {
        self.state.is_gesture()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Overlay rectangle of an element, in viewport pixels.
    pub fn overlay_rect(&self, element: &Element) -> AbsoluteRect {
        element
            .geometry
            .to_absolute(self.viewport.width, self.viewport.height)
    }

    /// Switch presentation mode. Leaving edit mode commits any draft and
    /// clears the selection.
    pub fn set_mode(&mut self, doc: &mut SlideDocument, mode: ViewMode) -> Result<()> {
        if mode != self.mode {
            self.reset(doc)?;
            self.mode = mode;
        }
        Ok(())
    }

    /// Show another slide. Selection never carries across slides.
    pub fn navigate(&mut self, doc: &mut SlideDocument, slide: usize) -> Result<()> {
        doc.slide(slide)?;
        self.reset(doc)?;
        self.slide = slide;
        Ok(())
    }

    /// Pointer pressed on the overlay.
    pub fn pointer_down(&mut self, doc: &mut SlideDocument, at: Point) -> Result<()> {
        if self.mode != ViewMode::Edit {
            return Ok(());
        }
        if self.state.is_gesture() {
            log::debug!("Ignoring pointer down while a gesture is attached");
            return Ok(());
        }

        let pointer = self.viewport.percent(at);

        if let EditState::EditingText { element, .. } = self.state {
            let inside = doc
                .element(self.slide, element)
                .map(|e| e.geometry.contains(pointer.0, pointer.1))
                .unwrap_or(false);
            if inside {
                return Ok(());
            }
            self.commit_text(doc)?;
        }

        if let EditState::Selected(selected) = self.state {
            let start = doc.element(self.slide, selected)?.geometry;
            if let Some(corner) = self.handle_at(&start, at) {
                self.press = None;
                self.state = EditState::Resizing {
                    element: selected,
                    corner,
                    anchor: Anchor { pointer, start },
                };
                return Ok(());
            }
        }

        match self.hit_test(doc, pointer)? {
            Some(element) => {
                let start = doc.element(self.slide, element)?.geometry;
                self.state = EditState::Selected(element);
                self.press = Some(Anchor { pointer, start });
            }
            None => {
                self.state = EditState::Idle;
                self.press = None;
            }
        }
        Ok(())
    }

    /// Pointer moved. Updates geometry live during a drag or resize.
    pub fn pointer_move(&mut self, doc: &mut SlideDocument, at: Point) -> Result<()> {
        let pointer = self.viewport.percent(at);

        if let Some(anchor) = self.press {
            if let EditState::Selected(element) = self.state {
                if anchor.pointer != pointer {
                    self.state = EditState::Dragging { element, anchor };
                    self.press = None;
                }
            }
        }

        let (element, geometry) = match &self.state {
            EditState::Dragging { element, anchor } => {
                let (dx, dy) = anchor.delta(pointer);
                (*element, anchor.start.dragged(dx, dy))
            }
            EditState::Resizing {
                element,
                corner,
                anchor,
            } => {
                let (dx, dy) = anchor.delta(pointer);
                (*element, anchor.start.resized(*corner, dx, dy))
            }
            _ => return Ok(()),
        };
        doc.update_element(self.slide, element, &ElementPatch::geometry(geometry))
    }

    /// Pointer released. The last geometry is kept.
    pub fn pointer_up(&mut self) {
        self.press = None;
        self.end_gesture();
    }

    /// Pointer released outside any handle or the window lost the pointer.
    /// Treated exactly like a release.
    pub fn pointer_cancel(&mut self) {
        self.pointer_up();
    }

    /// Double click opens the inline editor on the element under the pointer.
    pub fn double_click(&mut self, doc: &mut SlideDocument, at: Point) -> Result<()> {
        if self.mode != ViewMode::Edit || self.state.is_gesture() {
            return Ok(());
        }
        match self.hit_test(doc, self.viewport.percent(at))? {
            Some(element) => self.begin_text_edit(doc, element),
            None => Ok(()),
        }
    }

    /// Open the inline editor on `element`, committing any other open draft.
    pub fn begin_text_edit(&mut self, doc: &mut SlideDocument, element: usize) -> Result<()> {
        if self.mode != ViewMode::Edit || self.state.is_gesture() {
            return Ok(());
        }
        match &self.state {
            EditState::EditingText { element: open, .. } if *open == element => return Ok(()),
            EditState::EditingText { .. } => self.commit_text(doc)?,
            _ => {}
        }
        let draft = doc.element(self.slide, element)?.content.clone();
        self.press = None;
        self.state = EditState::EditingText { element, draft };
        Ok(())
    }

    /// Replace the draft text.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        if let EditState::EditingText { draft, .. } = &mut self.state {
            *draft = text.into();
        }
    }

    /// Key pressed inside the inline editor.
    pub fn key(&mut self, doc: &mut SlideDocument, key: Key) -> Result<()> {
        let EditState::EditingText { draft, .. } = &mut self.state else {
            return Ok(());
        };
        match key {
            Key::Enter { shift: true } => {
                draft.push('\n');
                Ok(())
            }
            Key::Enter { shift: false } => self.commit_text(doc),
            Key::Escape => {
                self.cancel_text();
                Ok(())
            }
        }
    }

    /// The inline editor lost focus.
    pub fn blur(&mut self, doc: &mut SlideDocument) -> Result<()> {
        self.commit_text(doc)
    }

    /// Write the draft into the element and return to `Selected`.
    pub fn commit_text(&mut self, doc: &mut SlideDocument) -> Result<()> {
        if let EditState::EditingText { element, draft } = &mut self.state {
            let element = *element;
            let draft = std::mem::take(draft);
            self.state = EditState::Selected(element);
            doc.update_element(self.slide, element, &ElementPatch::content(draft))?;
        }
        Ok(())
    }

    /// Drop the draft, leaving the element unchanged.
    pub fn cancel_text(&mut self) {
        if let EditState::EditingText { element, .. } = self.state {
            self.state = EditState::Selected(element);
        }
    }

    /// Insert a placeholder text element on the active slide and select it.
    pub fn add_element(&mut self, doc: &mut SlideDocument) -> Result<Option<usize>> {
        if self.mode != ViewMode::Edit || self.state.is_gesture() {
            return Ok(None);
        }
        self.commit_text(doc)?;
        let index = doc.add_element(self.slide, Element::placeholder())?;
        self.state = EditState::Selected(index);
        Ok(Some(index))
    }

    /// Delete the selected element. Any draft on it is discarded.
    pub fn delete_selected(&mut self, doc: &mut SlideDocument) -> Result<Option<Element>> {
        if self.state.is_gesture() {
            return Ok(None);
        }
        let Some(element) = self.state.element() else {
            return Ok(None);
        };
        let removed = doc.delete_element(self.slide, element)?;
        self.state = EditState::Idle;
        self.press = None;
        Ok(Some(removed))
    }

    /// Apply a property edit to the selected element.
    /// Property edits resize like the handles do: width and height stay at or
    /// above the minimum extent.
    pub fn update_selected(&mut self, doc: &mut SlideDocument, patch: &ElementPatch) -> Result<()> {
        let Some(element) = self.state.element() else {
            return Ok(());
        };
        let patch = ElementPatch {
            w: patch.w.map(clamp_extent),
            h: patch.h.map(clamp_extent),
            ..patch.clone()
        };
        doc.update_element(self.slide, element, &patch)
    }

    /// Back to `Idle`: detach any gesture and commit any draft.
    fn reset(&mut self, doc: &mut SlideDocument) -> Result<()> {
        self.end_gesture();
        self.commit_text(doc)?;
        self.press = None;
        self.state = EditState::Idle;
        Ok(())
    }

    fn end_gesture(&mut self) {
        match self.state {
            EditState::Dragging { element, .. } | EditState::Resizing { element, .. } => {
                self.state = EditState::Selected(element);
            }
            _ => {}
        }
    }

    fn handle_at(&self, geometry: &Geometry, at: Point) -> Option<Corner> {
        Corner::ALL.into_iter().find(|corner| {
            let (cx, cy) = geometry.corner(*corner);
            let hx = to_absolute(cx, self.viewport.width);
            let hy = to_absolute(cy, self.viewport.height);
            (at.x - hx).abs() <= HANDLE_RADIUS && (at.y - hy).abs() <= HANDLE_RADIUS
        })
    }

    /// Topmost element under the pointer. A selected element is raised above
    /// the rest.
    fn hit_test(&self, doc: &SlideDocument, (px, py): (f64, f64)) -> Result<Option<usize>> {
        let elements = &doc.slide(self.slide)?.elements;
        if let Some(selected) = self.state.element() {
            if elements
                .get(selected)
                .is_some_and(|e| e.geometry.contains(px, py))
            {
                return Ok(Some(selected));
            }
        }
        Ok(elements
            .iter()
            .rposition(|e| e.geometry.contains(px, py)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, RasterHandle, RasterizedPage, Slide};

    /// A 1000x1000 viewport so that 10px equals 1%.
    fn controller() -> InteractionController {
        let mut c = InteractionController::new(Viewport::new(1000.0, 1000.0));
        c.mode = ViewMode::Edit;
        c
    }

    fn document() -> SlideDocument {
        let mut slides = Vec::new();
        for n in 1..=2 {
            let mut slide = Slide::new(RasterizedPage {
                page_number: n,
                raster: RasterHandle::from_encoded(vec![0u8]),
                width: 1000,
                height: 1000,
            });
            slide.elements.push(Element::new(
                Category::Title,
                "title",
                Geometry::new(10.0, 10.0, 20.0, 10.0),
            ));
            slide.elements.push(Element::new(
                Category::Text,
                "body",
                Geometry::new(50.0, 50.0, 30.0, 20.0),
            ));
            slides.push(slide);
        }
        SlideDocument::new(slides)
    }

    fn geometry(doc: &SlideDocument, element: usize) -> Geometry {
        doc.element(0, element).unwrap().geometry
    }

    #[test]
    fn test_design_mode_ignores_pointer() {
        let mut doc = document();
        let mut c = InteractionController::new(Viewport::new(1000.0, 1000.0));
        c.pointer_down(&mut doc, Point::new(150.0, 150.0)).unwrap();
        assert_eq!(c.state(), &EditState::Idle);
    }

    #[test]
    fn test_select_and_deselect() {
        let mut doc = document();
        let mut c = controller();
        c.pointer_down(&mut doc, Point::new(150.0, 150.0)).unwrap();
        c.pointer_up();
        assert_eq!(c.state(), &EditState::Selected(0));

        c.pointer_down(&mut doc, Point::new(900.0, 50.0)).unwrap();
        assert_eq!(c.state(), &EditState::Idle);
    }

    #[test]
    fn test_drag_moves_and_clamps() {
        let mut doc = document();
        let mut c = controller();
        c.pointer_down(&mut doc, Point::new(150.0, 150.0)).unwrap();
        c.pointer_move(&mut doc, Point::new(200.0, 250.0)).unwrap();
        assert!(matches!(c.state(), EditState::Dragging { element: 0, .. }));
        assert_eq!(geometry(&doc, 0), Geometry::new(15.0, 20.0, 20.0, 10.0));

        c.pointer_move(&mut doc, Point::new(-900.0, 2000.0)).unwrap();
        assert_eq!(geometry(&doc, 0), Geometry::new(0.0, 100.0, 20.0, 10.0));

        c.pointer_up();
        assert_eq!(c.state(), &EditState::Selected(0));
        assert_eq!(geometry(&doc, 0), Geometry::new(0.0, 100.0, 20.0, 10.0));
    }

    #[test]
    fn test_resize_se_handle() {
        let mut doc = document();
        let mut c = controller();
        c.pointer_down(&mut doc, Point::new(150.0, 150.0)).unwrap();
        c.pointer_up();

        c.pointer_down(&mut doc, Point::new(300.0, 200.0)).unwrap();
        assert!(matches!(
            c.state(),
            EditState::Resizing {
                corner: Corner::Se,
                ..
            }
        ));
        c.pointer_move(&mut doc, Point::new(350.0, 250.0)).unwrap();
        let g = geometry(&doc, 0);
        assert!((g.w - 25.0).abs() < 1e-9 && (g.h - 15.0).abs() < 1e-9);
        assert_eq!((g.x, g.y), (10.0, 10.0));
        c.pointer_cancel();
        assert_eq!(c.state(), &EditState::Selected(0));
    }

    #[test]
    fn test_resize_nw_handle_keeps_far_corner() {
        let mut doc = document();
        let mut c = controller();
        c.pointer_down(&mut doc, Point::new(150.0, 150.0)).unwrap();
        c.pointer_up();
        c.pointer_down(&mut doc, Point::new(100.0, 100.0)).unwrap();
        c.pointer_move(&mut doc, Point::new(50.0, 50.0)).unwrap();
        let g = geometry(&doc, 0);
        assert!((g.x - 5.0).abs() < 1e-9 && (g.y - 5.0).abs() < 1e-9);
        assert!((g.right() - 30.0).abs() < 1e-9 && (g.bottom() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_new_gesture_while_attached() {
        let mut doc = document();
        let mut c = controller();
        c.pointer_down(&mut doc, Point::new(150.0, 150.0)).unwrap();
        c.pointer_move(&mut doc, Point::new(160.0, 160.0)).unwrap();
        c.pointer_down(&mut doc, Point::new(600.0, 600.0)).unwrap();
        assert!(matches!(c.state(), EditState::Dragging { element: 0, .. }));
    }

    #[test]
    fn test_text_edit_commit_and_cancel() {
        let mut doc = document();
        let mut c = controller();
        c.double_click(&mut doc, Point::new(600.0, 600.0)).unwrap();
        assert_eq!(c.draft(), Some((1, "body")));

        c.set_draft("new body");
        c.key(&mut doc, Key::Enter { shift: true }).unwrap();
        assert_eq!(c.draft(), Some((1, "new body\n")));
        c.key(&mut doc, Key::Enter { shift: false }).unwrap();
        assert_eq!(c.state(), &EditState::Selected(1));
        assert_eq!(doc.element(0, 1).unwrap().content, "new body\n");

        c.begin_text_edit(&mut doc, 1).unwrap();
        c.set_draft("discard me");
        c.key(&mut doc, Key::Escape).unwrap();
        assert_eq!(c.state(), &EditState::Selected(1));
        assert_eq!(doc.element(0, 1).unwrap().content, "new body\n");
    }

    #[test]
    fn test_single_draft_across_elements() {
        let mut doc = document();
        let mut c = controller();
        c.begin_text_edit(&mut doc, 0).unwrap();
        c.set_draft("edited title");
        c.begin_text_edit(&mut doc, 1).unwrap();
        assert_eq!(c.draft(), Some((1, "body")));
        assert_eq!(doc.element(0, 0).unwrap().content, "edited title");
    }

    #[test]
    fn test_blur_and_outside_click_commit() {
        let mut doc = document();
        let mut c = controller();
        c.begin_text_edit(&mut doc, 0).unwrap();
        c.set_draft("a");
        c.blur(&mut doc).unwrap();
        assert_eq!(doc.element(0, 0).unwrap().content, "a");

        c.begin_text_edit(&mut doc, 0).unwrap();
        c.set_draft("b");
        c.pointer_down(&mut doc, Point::new(150.0, 150.0)).unwrap();
        assert!(c.draft().is_some());
        c.pointer_down(&mut doc, Point::new(950.0, 950.0)).unwrap();
        assert_eq!(c.state(), &EditState::Idle);
        assert_eq!(doc.element(0, 0).unwrap().content, "b");
    }

    #[test]
    fn test_navigation_clears_selection() {
        let mut doc = document();
        let mut c = controller();
        c.pointer_down(&mut doc, Point::new(150.0, 150.0)).unwrap();
        c.pointer_move(&mut doc, Point::new(170.0, 150.0)).unwrap();
        c.navigate(&mut doc, 1).unwrap();
        assert_eq!(c.state(), &EditState::Idle);
        assert_eq!(c.active_slide(), 1);
        assert_eq!(geometry(&doc, 0).x, 12.0);
        assert!(c.navigate(&mut doc, 5).is_err());
    }

    #[test]
    fn test_switching_to_design_commits() {
        let mut doc = document();
        let mut c = controller();
        c.begin_text_edit(&mut doc, 1).unwrap();
        c.set_draft("kept");
        c.set_mode(&mut doc, ViewMode::Design).unwrap();
        assert_eq!(c.state(), &EditState::Idle);
        assert_eq!(doc.element(0, 1).unwrap().content, "kept");
    }

    #[test]
    fn test_add_and_delete() {
        let mut doc = document();
        let mut c = controller();
        let idx = c.add_element(&mut doc).unwrap();
        assert_eq!(idx, Some(2));
        assert_eq!(c.state(), &EditState::Selected(2));

        c.update_selected(&mut doc, &ElementPatch::content("hi")).unwrap();
        assert_eq!(doc.element(0, 2).unwrap().content, "hi");

        let removed = c.delete_selected(&mut doc).unwrap();
        assert_eq!(removed.map(|e| e.content), Some("hi".to_string()));
        assert_eq!(c.state(), &EditState::Idle);
        assert_eq!(doc.slide(0).unwrap().elements.len(), 2);
    }

    #[test]
    fn test_property_resize_keeps_minimum_extent() {
        let mut doc = document();
        let mut c = controller();
        c.pointer_down(&mut doc, Point::new(150.0, 150.0)).unwrap();
        c.pointer_up();
        assert_eq!(c.selection(), Some(0));

        let patch = ElementPatch {
            w: Some(0.5),
            h: Some(0.0),
            ..ElementPatch::default()
        };
        c.update_selected(&mut doc, &patch).unwrap();
        assert_eq!(geometry(&doc, 0), Geometry::new(10.0, 10.0, 3.0, 3.0));

        let patch = ElementPatch {
            w: Some(f64::NAN),
            h: Some(250.0),
            ..ElementPatch::default()
        };
        c.update_selected(&mut doc, &patch).unwrap();
        assert_eq!(geometry(&doc, 0), Geometry::new(10.0, 10.0, 3.0, 100.0));

        c.update_selected(&mut doc, &ElementPatch::content("moved")).unwrap();
        assert_eq!(geometry(&doc, 0), Geometry::new(10.0, 10.0, 3.0, 100.0));
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut doc = document();
        doc.add_element(
            0,
            Element::new(Category::Caption, "top", Geometry::new(5.0, 5.0, 40.0, 40.0)),
        )
        .unwrap();
        let mut c = controller();
        c.pointer_down(&mut doc, Point::new(150.0, 150.0)).unwrap();
        assert_eq!(c.selection(), Some(2));
    }

    #[test]
    fn test_overlay_rect_uses_viewport() {
        let doc = document();
        let c = InteractionController::new(Viewport::new(800.0, 450.0));
        let rect = c.overlay_rect(doc.element(0, 1).unwrap());
        assert_eq!(rect.x, 400.0);
        assert_eq!(rect.y, 225.0);
        assert_eq!(rect.width, 240.0);
        assert_eq!(rect.height, 90.0);
    }
}
