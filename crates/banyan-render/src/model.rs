use banyan_core::{Gender, PersonId};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        (self.max_x - self.min_x).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.max_y - self.min_y).max(0.0)
    }

    pub fn include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }
}

/// One person box.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutNode {
    pub person: PersonId,
    pub label: String,
    /// Second text line (`1887 – 1953`), when any dates are known.
    pub years: Option<String>,
    pub gender: Option<Gender>,
    pub is_subject: bool,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutNode {
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// The join between two partners in a row; solid when married, dashed
/// otherwise.
#[derive(Debug, Clone, Serialize)]
pub struct CoupleJoin {
    pub key: String,
    pub left: PersonId,
    pub right: PersonId,
    pub married: bool,
    /// Join point between the partners, at row mid-height.
    pub x: f64,
    pub y: f64,
}

/// Orthogonal parent-to-children connector: a stem down from the couple join
/// (or single parent), a horizontal bus over the children, and one drop per
/// child.
#[derive(Debug, Clone, Serialize)]
pub struct Connector {
    pub group: String,
    pub stem: [(f64, f64); 2],
    pub bus: [(f64, f64); 2],
    pub drops: Vec<[(f64, f64); 2]>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TreeLayout {
    pub subject: PersonId,
    pub nodes: Vec<LayoutNode>,
    pub couples: Vec<CoupleJoin>,
    pub connectors: Vec<Connector>,
    pub bounds: Bounds,
}

impl TreeLayout {
    pub fn node(&self, person: PersonId) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.person == person)
    }
}
