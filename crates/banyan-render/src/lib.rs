#![forbid(unsafe_code)]

pub mod model;
pub mod page;
pub mod scroll;
pub mod svg;
pub mod text;
pub mod tree;

use crate::text::{DeterministicTextMeasurer, TextMeasurer};
use banyan_core::BanyanConfig;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] banyan_core::Error),
    #[error("invalid layout: {message}")]
    InvalidLayout { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct LayoutOptions {
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
    /// Vertical gap between generation rows.
    pub row_gap: f64,
    /// Horizontal gap between adjacent boxes in a row.
    pub node_gap: f64,
    /// Padding inside a person box around its text.
    pub node_padding: f64,
    pub include_partners: bool,
    pub include_siblings: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
            row_gap: 72.0,
            node_gap: 24.0,
            node_padding: 10.0,
            include_partners: false,
            include_siblings: false,
        }
    }
}

impl LayoutOptions {
    /// Picks spacing from the `layout.*` config section, keeping defaults for
    /// anything unset.
    pub fn from_config(config: &BanyanConfig) -> Self {
        let mut options = Self::default();
        if let Some(v) = config.get_f64("layout.rowGap") {
            options.row_gap = v;
        }
        if let Some(v) = config.get_f64("layout.nodeGap") {
            options.node_gap = v;
        }
        if let Some(v) = config.get_f64("layout.nodePadding") {
            options.node_padding = v;
        }
        options
    }
}
