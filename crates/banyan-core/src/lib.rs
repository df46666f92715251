#![forbid(unsafe_code)]

//! Family-tree semantic model (headless).
//!
//! Design goals:
//! - deterministic, testable outputs (ordered maps wherever iteration order
//!   is semantic)
//! - no I/O beyond the record store seam
//! - views instead of interlinked person objects (no reference cycles)

pub mod config;
pub mod error;
pub mod family;
pub mod geom;
pub mod layers;
pub mod store;

pub use config::BanyanConfig;
pub use error::{Error, Result};
pub use family::{Family, Kinship, LineNode, Person, Relationship};
pub use layers::{Layer, LayerOptions, layers_for};
pub use store::{
    Gender, PersonId, PersonRecord, RelationshipEnd, RelationshipKind, RelationshipRecord, Store,
};

#[cfg(test)]
mod tests;
