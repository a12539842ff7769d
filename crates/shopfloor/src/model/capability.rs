//! Optional connectivity capabilities
//!
//! A station's kind decides which of these interfaces it exposes; the
//! `as_*` accessors on [`Element`] return `None` when the capability is
//! absent, and callers simply offer fewer operations in that case. There
//! is no fallback behavior behind a missing capability.
//!
//! The two bulk operations over incoming edges live here as free
//! functions taking the surface, since they rewire edges owned by it.

use tracing::debug;

use crate::model::edge::{EdgeId, ElementId, LineMode};
use crate::model::element::Element;
use crate::model::kind::EdgeArity;
use crate::model::surface::Surface;

/// At most one outgoing edge
pub trait EdgeOut {
    /// Id of the station owning the edge
    fn owner_id(&self) -> ElementId;
    /// The outgoing edge, if one is connected
    fn edge_out(&self) -> Option<EdgeId>;
}

/// Any number of outgoing edges
pub trait EdgeMultiOut {
    fn owner_id(&self) -> ElementId;
    fn edges_out(&self) -> &[EdgeId];
}

/// Any number of incoming edges
pub trait EdgeMultiIn {
    fn owner_id(&self) -> ElementId;
    fn edges_in(&self) -> &[EdgeId];
}

impl EdgeOut for Element {
    fn owner_id(&self) -> ElementId {
        self.id()
    }

    fn edge_out(&self) -> Option<EdgeId> {
        self.outgoing_edges().first().copied()
    }
}

impl EdgeMultiOut for Element {
    fn owner_id(&self) -> ElementId {
        self.id()
    }

    fn edges_out(&self) -> &[EdgeId] {
        self.outgoing_edges()
    }
}

impl EdgeMultiIn for Element {
    fn owner_id(&self) -> ElementId {
        self.id()
    }

    fn edges_in(&self) -> &[EdgeId] {
        self.incoming_edges()
    }
}

impl Element {
    /// Single-outgoing-edge view, when the kind supports it
    pub fn as_edge_out(&self) -> Option<&dyn EdgeOut> {
        (self.kind.outgoing_arity() == EdgeArity::Single).then_some(self as &dyn EdgeOut)
    }

    /// Multi-outgoing-edge view, when the kind supports it
    pub fn as_edge_multi_out(&self) -> Option<&dyn EdgeMultiOut> {
        (self.kind.outgoing_arity() == EdgeArity::Many).then_some(self as &dyn EdgeMultiOut)
    }

    /// Multi-incoming-edge view, when the kind supports it
    pub fn as_edge_multi_in(&self) -> Option<&dyn EdgeMultiIn> {
        (self.kind.incoming_arity() == EdgeArity::Many).then_some(self as &dyn EdgeMultiIn)
    }
}

/// Remove every incoming edge of the station
///
/// Does nothing for stations without the multi-incoming capability.
/// Returns the number of removed edges.
pub fn remove_all_incoming(surface: &mut Surface, element: ElementId) -> usize {
    let edges: Vec<EdgeId> = match surface.element(element).and_then(Element::as_edge_multi_in) {
        Some(multi_in) => multi_in.edges_in().to_vec(),
        None => return 0,
    };
    let count = edges.len();
    for edge in edges {
        surface.disconnect(edge);
    }
    debug!(element, count, "removed all incoming edges");
    count
}

/// Set the line mode of every incoming edge of the station
///
/// Does nothing for stations without the multi-incoming capability.
/// Returns the number of retargeted edges.
pub fn set_incoming_line_mode(surface: &mut Surface, element: ElementId, mode: LineMode) -> usize {
    let edges: Vec<EdgeId> = match surface.element(element).and_then(Element::as_edge_multi_in) {
        Some(multi_in) => multi_in.edges_in().to_vec(),
        None => return 0,
    };
    let mut count = 0;
    for edge in edges {
        if let Some(edge) = surface.edge_mut(edge) {
            edge.line_mode = mode;
            count += 1;
        }
    }
    debug!(element, count, mode = %mode, "retargeted incoming edge line mode");
    count
}
