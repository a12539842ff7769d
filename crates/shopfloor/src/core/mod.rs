//! Core building blocks for the document model
//!
//! This module holds the pieces that the model, persistence and validation
//! layers all share: integer geometry, the color codec, the attribute tree
//! that documents are serialized into, and the error types.

mod color;
mod error;
mod geometry;
pub mod logging;
mod tree;

pub use color::*;
pub use error::*;
pub use geometry::*;
pub use tree::*;
