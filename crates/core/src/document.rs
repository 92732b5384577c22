//! The in-memory slide document and the operations that mutate it.

use crate::analysis::AnalysisResult;
use crate::error::{Error, Result};
use crate::types::{Element, ElementPatch, RasterizedPage, Slide};

/// Consecutive leading failures after which a batch is abandoned.
const EARLY_ABORT_AFTER: usize = 3;

/// All slides of one editing session, in fixed page order.
#[derive(Debug, Clone, Default)]
pub struct SlideDocument {
    slides: Vec<Slide>,
}

impl SlideDocument {
    pub fn new(slides: Vec<Slide>) -> Self {
        Self { slides }
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn into_slides(self) -> Vec<Slide> {
        self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn slide(&self, index: usize) -> Result<&Slide> {
        self.slides.get(index).ok_or(Error::SlideNotFound(index))
    }

    pub fn element(&self, slide: usize, element: usize) -> Result<&Element> {
        self.slide(slide)?
            .elements
            .get(element)
            .ok_or(Error::ElementNotFound { slide, element })
    }

    /// Append an element on top of the slide's stack and return its index.
    pub fn add_element(&mut self, slide: usize, mut element: Element) -> Result<usize> {
        let target = self.slide_mut(slide)?;
        element.geometry = element.geometry.clamped();
        target.elements.push(element);
        Ok(target.elements.len() - 1)
    }

    /// Merge a partial update into one element.
    pub fn update_element(
        &mut self,
        slide: usize,
        element: usize,
        patch: &ElementPatch,
    ) -> Result<()> {
        self.element_mut(slide, element)?.apply(patch);
        Ok(())
    }

    /// Remove an element. Indices above it shift down by one.
    pub fn delete_element(&mut self, slide: usize, element: usize) -> Result<Element> {
        let target = self.slide_mut(slide)?;
        if element >= target.elements.len() {
            return Err(Error::ElementNotFound { slide, element });
        }
        Ok(target.elements.remove(element))
    }

    /// Total element count across all slides.
    pub fn element_count(&self) -> usize {
        self.slides.iter().map(|s| s.elements.len()).sum()
    }

    fn slide_mut(&mut self, index: usize) -> Result<&mut Slide> {
        self.slides.get_mut(index).ok_or(Error::SlideNotFound(index))
    }

    fn element_mut(&mut self, slide: usize, element: usize) -> Result<&mut Element> {
        self.slide_mut(slide)?
            .elements
            .get_mut(element)
            .ok_or(Error::ElementNotFound { slide, element })
    }
}

/// Collects per-slide analysis outcomes into a [`SlideDocument`].
///
/// A slide whose analysis failed is kept, without elements, carrying the
/// failure message. When every slide attempted so far has failed and either
/// the batch is complete or [`EARLY_ABORT_AFTER`] slides were tried, the
/// failure is almost certainly global (bad key, no network) and the batch is
/// abandoned.
#[derive(Debug)]
pub struct SlideDocumentBuilder {
    expected: usize,
    slides: Vec<Slide>,
    failures: usize,
    default_background: Option<String>,
}

impl SlideDocumentBuilder {
    /// Start a batch of `expected` slides.
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            slides: Vec::with_capacity(expected),
            failures: 0,
            default_background: None,
        }
    }

    /// Fill applied to every slide for elements without their own background.
    pub fn with_default_background(mut self, color: impl Into<String>) -> Self {
        self.default_background = Some(color.into());
        self
    }

    /// Record a slide whose analysis returned a result.
    pub fn push_analyzed(&mut self, page: RasterizedPage, result: AnalysisResult) {
        let mut slide = self.slide_for(page);
        slide.elements = result
            .elements
            .into_iter()
            .map(|d| d.into_element())
            .collect();
        slide.warning = result.warning;
        log::debug!(
            "Slide {} analyzed with {} elements",
            slide.page_number,
            slide.elements.len()
        );
        self.slides.push(slide);
    }

    /// Record a slide whose analysis failed.
    ///
    /// Returns [`Error::AnalysisAborted`] when the batch should stop.
    pub fn push_failed(&mut self, page: RasterizedPage, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        let mut slide = self.slide_for(page);
        log::warn!("Analysis failed for slide {}: {}", slide.page_number, message);
        slide.error = Some(message.clone());
        self.slides.push(slide);
        self.failures += 1;

        let attempted = self.slides.len();
        let all_failed = self.failures == attempted;
        if all_failed && (attempted == self.expected || attempted >= EARLY_ABORT_AFTER) {
            return Err(Error::AnalysisAborted(message));
        }
        Ok(())
    }

    pub fn finish(self) -> SlideDocument {
        SlideDocument::new(self.slides)
    }

    fn slide_for(&self, page: RasterizedPage) -> Slide {
        let mut slide = Slide::new(page);
        slide.background_color = self.default_background.clone();
        slide
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ElementDescriptor;
    use crate::geometry::Geometry;
    use crate::types::{Category, RasterHandle};

    fn page(n: usize) -> RasterizedPage {
        RasterizedPage {
            page_number: n,
            raster: RasterHandle::from_encoded(vec![0u8; 4]),
            width: 100,
            height: 50,
        }
    }

    fn document() -> SlideDocument {
        let mut builder = SlideDocumentBuilder::new(1);
        builder.push_analyzed(
            page(1),
            AnalysisResult {
                elements: vec![
                    ElementDescriptor {
                        content: Some("first".into()),
                        w: 10.0,
                        h: 10.0,
                        ..ElementDescriptor::default()
                    },
                    ElementDescriptor {
                        content: Some("second".into()),
                        x: 50.0,
                        w: 10.0,
                        h: 10.0,
                        ..ElementDescriptor::default()
                    },
                ],
                warning: None,
            },
        );
        builder.finish()
    }

    #[test]
    fn test_add_update_delete() {
        let mut doc = document();
        let idx = doc
            .add_element(0, Element::new(Category::Caption, "third", Geometry::new(1.0, 1.0, 5.0, 5.0)))
            .unwrap();
        assert_eq!(idx, 2);

        doc.update_element(0, 0, &ElementPatch::content("changed")).unwrap();
        assert_eq!(doc.element(0, 0).unwrap().content, "changed");

        let removed = doc.delete_element(0, 0).unwrap();
        assert_eq!(removed.content, "changed");
        assert_eq!(doc.element(0, 0).unwrap().content, "second");
        assert_eq!(doc.element(0, 1).unwrap().content, "third");
        assert_eq!(doc.element_count(), 2);
    }

    #[test]
    fn test_bad_indices() {
        let mut doc = document();
        assert!(matches!(doc.slide(3), Err(Error::SlideNotFound(3))));
        assert!(matches!(
            doc.delete_element(0, 9),
            Err(Error::ElementNotFound { slide: 0, element: 9 })
        ));
        assert!(doc.update_element(2, 0, &ElementPatch::default()).is_err());
    }

    #[test]
    fn test_builder_keeps_failed_slide() {
        let mut builder = SlideDocumentBuilder::new(3).with_default_background("#000000");
        builder.push_analyzed(page(1), AnalysisResult::default());
        builder.push_failed(page(2), "quota").unwrap();
        builder.push_analyzed(page(3), AnalysisResult::default());
        let doc = builder.finish();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.slide(1).unwrap().error.as_deref(), Some("quota"));
        assert!(doc.slide(1).unwrap().elements.is_empty());
        assert_eq!(doc.slide(0).unwrap().background_color.as_deref(), Some("#000000"));
    }

    #[test]
    fn test_builder_aborts_when_everything_fails() {
        let mut builder = SlideDocumentBuilder::new(2);
        builder.push_failed(page(1), "bad key").unwrap();
        let err = builder.push_failed(page(2), "bad key").unwrap_err();
        assert!(matches!(err, Error::AnalysisAborted(_)));
    }

    #[test]
    fn test_builder_aborts_early_on_long_batch() {
        let mut builder = SlideDocumentBuilder::new(10);
        builder.push_failed(page(1), "x").unwrap();
        builder.push_failed(page(2), "x").unwrap();
        assert!(builder.push_failed(page(3), "x").is_err());
    }
}
