//! The editable document model
//!
//! A [`Surface`] owns stations and edges; each station is an [`Element`]
//! carrying a [`ElementKind`] tag plus optional geometry, style and data
//! source blocks. Connectivity is expressed through the capability traits
//! in [`capability`], persistence through the hook chain in [`persist`].

pub mod capability;
pub mod edge;
pub mod element;
pub mod kind;
pub mod persist;
pub mod surface;

pub use capability::{EdgeMultiIn, EdgeMultiOut, EdgeOut};
pub use edge::{Edge, EdgeId, ElementId, LineMode};
pub use element::{BoxStyle, DataSource, DbSettings, Element, RenderContext};
pub use kind::{EdgeArity, ElementKind, Shape};
pub use surface::Surface;
