//! Scroll-to-subject: position an embedded diagram's viewport so the subject
//! box sits near the top-left.
//!
//! The computation runs exactly once, driven by an explicit call from the
//! host once the embedded content is known to be loaded; there is no event
//! wiring and no re-run on resize.

use banyan_core::geom::{Rect, rect};

/// The reserved identifier marking the one element scroll alignment targets.
pub const SUBJECT_ID: &str = "subject";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTarget {
    pub x_px: f64,
    pub y_px: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScrollError {
    #[error("page has no embedded diagram frame")]
    MissingFrame,
    #[error("embedded document has no root graphic element")]
    MissingRoot,
    #[error("no element carries the \"subject\" identifier")]
    MissingSubject,
    #[error("root graphic height is zero or non-finite; scale factor undefined")]
    DegenerateHeight,
}

/// An embedded, independently-scrollable diagram document. This is the seam
/// to the surface that actually owns the document (a browser frame, or a
/// rendered SVG string here).
pub trait DiagramFrame {
    /// Rendered pixel height of the frame's viewport.
    fn viewport_pixel_height(&self) -> f64;
    /// Bounding box of the root graphic element, in unit coordinates.
    fn root_unit_bbox(&self) -> Option<Rect>;
    /// Bounding box of the element with the given identifier, in unit
    /// coordinates.
    fn element_unit_bbox(&self, id: &str) -> Option<Rect>;
    fn scroll(&self) -> (f64, f64);
    fn set_scroll(&mut self, x_px: f64, y_px: f64);
}

/// The embedding page: at most one diagram frame.
pub trait DiagramHost {
    fn diagram_frame(&mut self) -> Option<&mut dyn DiagramFrame>;
}

/// Scrolls the page's diagram frame so the subject element lands at its
/// computed anchor. On any failure the frame's scroll position is left
/// untouched and the page is expected to carry on unscrolled.
pub fn scroll_to_subject(host: &mut dyn DiagramHost) -> Result<ScrollTarget, ScrollError> {
    let frame = host.diagram_frame().ok_or(ScrollError::MissingFrame)?;
    let root = frame.root_unit_bbox().ok_or(ScrollError::MissingRoot)?;
    let subject = frame
        .element_unit_bbox(SUBJECT_ID)
        .ok_or(ScrollError::MissingSubject)?;
    let target = subject_scroll_target(frame.viewport_pixel_height(), root.size.height, subject)?;
    frame.set_scroll(target.x_px, target.y_px);
    Ok(target)
}

/// The coordinate transform itself:
///
/// ```text
/// scale = viewport_px_height / root_unit_height
/// x_px  = scale * subject.x
/// y_px  = scale * (subject.y + root_unit_height)
/// ```
///
/// The `y` term offsets by the full root height before scaling: the diagram's
/// unit space has a bottom-left origin relative to the pixel viewport.
pub fn subject_scroll_target(
    viewport_px_height: f64,
    root_unit_height: f64,
    subject: Rect,
) -> Result<ScrollTarget, ScrollError> {
    if root_unit_height == 0.0
        || !root_unit_height.is_finite()
        || !viewport_px_height.is_finite()
    {
        return Err(ScrollError::DegenerateHeight);
    }
    let scale = viewport_px_height / root_unit_height;
    Ok(ScrollTarget {
        x_px: scale * subject.origin.x,
        y_px: scale * (subject.origin.y + root_unit_height),
    })
}

/// A diagram frame backed by a rendered SVG document. Unit-space geometry is
/// read from the markup: the root `viewBox` and the subject element's
/// `x`/`y`/`width`/`height`.
#[derive(Debug, Clone)]
pub struct SvgFrame {
    svg: String,
    viewport_px_height: f64,
    scroll: (f64, f64),
}

impl SvgFrame {
    pub fn new(svg: impl Into<String>, viewport_px_height: f64) -> Self {
        Self {
            svg: svg.into(),
            viewport_px_height,
            scroll: (0.0, 0.0),
        }
    }
}

impl DiagramFrame for SvgFrame {
    fn viewport_pixel_height(&self) -> f64 {
        self.viewport_px_height
    }

    fn root_unit_bbox(&self) -> Option<Rect> {
        let doc = roxmltree::Document::parse(&self.svg).ok()?;
        let root = doc.root_element();
        if root.tag_name().name() != "svg" {
            return None;
        }
        let viewbox = root.attribute("viewBox")?;
        let mut numbers = viewbox
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(str::parse::<f64>);
        let min_x = numbers.next()?.ok()?;
        let min_y = numbers.next()?.ok()?;
        let width = numbers.next()?.ok()?;
        let height = numbers.next()?.ok()?;
        Some(rect(min_x, min_y, width, height))
    }

    fn element_unit_bbox(&self, id: &str) -> Option<Rect> {
        let doc = roxmltree::Document::parse(&self.svg).ok()?;
        let node = doc
            .descendants()
            .find(|n| n.attribute("id") == Some(id) && n.id() != doc.root_element().id())?;
        let attr = |name: &str| {
            node.attribute(name)
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(0.0)
        };
        Some(rect(attr("x"), attr("y"), attr("width"), attr("height")))
    }

    fn scroll(&self) -> (f64, f64) {
        self.scroll
    }

    fn set_scroll(&mut self, x_px: f64, y_px: f64) {
        self.scroll = (x_px, y_px);
    }
}

/// A host owning at most one frame; `None` models a page with no embedded
/// diagram.
#[derive(Debug, Default)]
pub struct StaticHost<F> {
    frame: Option<F>,
}

impl<F: DiagramFrame> StaticHost<F> {
    pub fn new(frame: F) -> Self {
        Self { frame: Some(frame) }
    }

    pub fn empty() -> Self {
        Self { frame: None }
    }

    pub fn frame(&self) -> Option<&F> {
        self.frame.as_ref()
    }
}

impl<F: DiagramFrame> DiagramHost for StaticHost<F> {
    fn diagram_frame(&mut self) -> Option<&mut dyn DiagramFrame> {
        self.frame.as_mut().map(|f| f as &mut dyn DiagramFrame)
    }
}
