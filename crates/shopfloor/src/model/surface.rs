//! The drawing surface owning one document's stations and edges
//!
//! The surface is the single owner: stations and edges refer to each
//! other only through ids. Insertion order doubles as z-order, so
//! enumeration is always deterministic. Station and edge ids come from
//! one shared pool of positive integers; the pool hands out the lowest
//! free id, which keeps documents stable under add/remove churn.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::{debug, trace};

use crate::core::Rect;
use crate::model::edge::{Edge, EdgeId, ElementId, LineMode};
use crate::model::element::Element;
use crate::model::kind::EdgeArity;

/// Errors raised by structural surface mutations
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("element {0} does not exist")]
    UnknownElement(ElementId),

    #[error("element {0} does not accept outgoing edges")]
    NoOutgoing(ElementId),

    #[error("element {0} already has an outgoing edge")]
    OutgoingOccupied(ElementId),

    #[error("element {0} does not accept incoming edges")]
    NoIncoming(ElementId),

    #[error("element {0} is delete-protected")]
    DeleteProtected(ElementId),
}

/// One document's station and edge collection
#[derive(Debug, Default)]
pub struct Surface {
    elements: HashMap<ElementId, Element>,
    element_order: Vec<ElementId>,
    edges: HashMap<EdgeId, Edge>,
    edge_order: Vec<EdgeId>,
    used_ids: HashSet<i32>,
    layers: Vec<String>,
    visible_layers: Vec<String>,
    revision: u64,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter bumped on every structural mutation
    ///
    /// Change listeners compare revisions instead of subscribing to
    /// per-element callbacks.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    /// Lowest positive id not currently in use
    pub fn next_free_id(&self) -> i32 {
        let mut id = 1;
        while self.used_ids.contains(&id) {
            id += 1;
        }
        id
    }

    /// Register a station, assigning an id if it has none
    ///
    /// A station arriving with a positive, unused id keeps it; anything
    /// else gets the lowest free id. Edge registrations the station may
    /// carry from a previous surface are discarded; edges are re-created
    /// through `connect`. Returns the id under which the station is now
    /// registered.
    pub fn add_element(&mut self, mut element: Element) -> ElementId {
        let id = if element.id() > 0 && !self.used_ids.contains(&element.id()) {
            element.id()
        } else {
            self.next_free_id()
        };
        element.set_id(id);
        element.incoming.clear();
        element.outgoing.clear();
        self.used_ids.insert(id);
        self.element_order.push(id);
        trace!(id, kind = %element.kind, "element added");
        self.elements.insert(id, element);
        self.bump();
        id
    }

    /// Remove a station together with every edge touching it
    ///
    /// Delete-protected stations are refused.
    pub fn remove_element(&mut self, id: ElementId) -> Result<Element, SurfaceError> {
        let element = self
            .elements
            .get(&id)
            .ok_or(SurfaceError::UnknownElement(id))?;
        if element.delete_protection {
            return Err(SurfaceError::DeleteProtected(id));
        }

        let touching: Vec<EdgeId> = self
            .edge_order
            .iter()
            .copied()
            .filter(|edge_id| {
                self.edges
                    .get(edge_id)
                    .map(|edge| edge.touches(id))
                    .unwrap_or(false)
            })
            .collect();
        for edge_id in touching {
            self.disconnect(edge_id);
        }

        self.element_order.retain(|e| *e != id);
        self.used_ids.remove(&id);
        self.bump();
        debug!(id, "element removed");
        self.elements
            .remove(&id)
            .ok_or(SurfaceError::UnknownElement(id))
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        if self.elements.contains_key(&id) {
            self.bump();
        }
        self.elements.get_mut(&id)
    }

    /// Stations in z-order (insertion order)
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.element_order
            .iter()
            .filter_map(|id| self.elements.get(id))
    }

    pub fn element_count(&self) -> usize {
        self.element_order.len()
    }

    /// Connect two stations with a new edge
    ///
    /// Enforces the kind arity on both sides: a single-outgoing station
    /// may hold at most one edge, sources take no incoming edges.
    pub fn connect(&mut self, from: ElementId, to: ElementId) -> Result<EdgeId, SurfaceError> {
        let from_element = self
            .elements
            .get(&from)
            .ok_or(SurfaceError::UnknownElement(from))?;
        match from_element.kind.outgoing_arity() {
            EdgeArity::None => return Err(SurfaceError::NoOutgoing(from)),
            EdgeArity::Single if !from_element.outgoing_edges().is_empty() => {
                return Err(SurfaceError::OutgoingOccupied(from));
            }
            _ => {}
        }
        let to_element = self
            .elements
            .get(&to)
            .ok_or(SurfaceError::UnknownElement(to))?;
        if to_element.kind.incoming_arity() == EdgeArity::None {
            return Err(SurfaceError::NoIncoming(to));
        }

        let id = self.next_free_id();
        self.used_ids.insert(id);
        self.edge_order.push(id);
        self.edges.insert(id, Edge::new(id, from, to));
        if let Some(element) = self.elements.get_mut(&from) {
            element.outgoing.push(id);
        }
        if let Some(element) = self.elements.get_mut(&to) {
            element.incoming.push(id);
        }
        self.bump();
        debug!(edge = id, from, to, "stations connected");
        Ok(id)
    }

    /// Remove an edge and unregister it from both endpoints
    pub fn disconnect(&mut self, edge_id: EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(&edge_id)?;
        self.edge_order.retain(|e| *e != edge_id);
        self.used_ids.remove(&edge_id);
        if let Some(element) = self.elements.get_mut(&edge.from) {
            element.outgoing.retain(|e| *e != edge_id);
        }
        if let Some(element) = self.elements.get_mut(&edge.to) {
            element.incoming.retain(|e| *e != edge_id);
        }
        self.bump();
        debug!(edge = edge_id, "edge removed");
        Some(edge)
    }

    /// Re-register an edge from a loaded document
    ///
    /// Keeps the stored id when free and skips the arity checks that
    /// `connect` applies to interactive edits; a document may legally
    /// carry more edges than the current arity rules would allow to
    /// create. Returns `false` when either endpoint is missing.
    pub(crate) fn restore_edge(&mut self, mut edge: Edge) -> bool {
        if !self.elements.contains_key(&edge.from) || !self.elements.contains_key(&edge.to) {
            return false;
        }
        let id = if edge.id > 0 && !self.used_ids.contains(&edge.id) {
            edge.id
        } else {
            self.next_free_id()
        };
        edge.id = id;
        self.used_ids.insert(id);
        self.edge_order.push(id);
        if let Some(element) = self.elements.get_mut(&edge.from) {
            element.outgoing.push(id);
        }
        if let Some(element) = self.elements.get_mut(&edge.to) {
            element.incoming.push(id);
        }
        self.edges.insert(id, edge);
        self.bump();
        true
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        if self.edges.contains_key(&id) {
            self.bump();
        }
        self.edges.get_mut(&id)
    }

    /// Edges in creation order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edge_order.iter().filter_map(|id| self.edges.get(id))
    }

    pub fn edge_count(&self) -> usize {
        self.edge_order.len()
    }

    /// Registered edge line mode convenience used by retarget operations
    pub fn set_edge_line_mode(&mut self, id: EdgeId, mode: LineMode) -> bool {
        match self.edges.get_mut(&id) {
            Some(edge) => {
                edge.line_mode = mode;
                self.bump();
                true
            }
            None => false,
        }
    }

    // --- layers ---

    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    pub fn visible_layers(&self) -> &[String] {
        &self.visible_layers
    }

    /// Add a layer; new layers start out visible
    pub fn add_layer(&mut self, name: &str) {
        if self.layers.iter().any(|l| l == name) {
            return;
        }
        self.layers.push(name.to_string());
        self.visible_layers.push(name.to_string());
        self.bump();
    }

    /// Remove a layer and strip it from every station
    pub fn remove_layer(&mut self, name: &str) {
        self.layers.retain(|l| l != name);
        self.visible_layers.retain(|l| l != name);
        for element in self.elements.values_mut() {
            element.remove_layer(name);
        }
        self.bump();
    }

    /// Rename a layer everywhere it is referenced
    pub fn rename_layer(&mut self, old: &str, new: &str) {
        if old == new || self.layers.iter().any(|l| l == new) {
            return;
        }
        for list in [&mut self.layers, &mut self.visible_layers] {
            for layer in list.iter_mut() {
                if layer == old {
                    *layer = new.to_string();
                }
            }
        }
        for element in self.elements.values_mut() {
            if element.layers().iter().any(|l| l == old) {
                element.remove_layer(old);
                element.add_layer(new);
            }
        }
        self.bump();
    }

    pub fn set_layer_visible(&mut self, name: &str, visible: bool) {
        if !self.layers.iter().any(|l| l == name) {
            return;
        }
        let listed = self.visible_layers.iter().any(|l| l == name);
        if visible && !listed {
            self.visible_layers.push(name.to_string());
        }
        if !visible && listed {
            self.visible_layers.retain(|l| l != name);
        }
        self.bump();
    }

    /// Whether the station is visible under the current layer filter
    pub fn is_visible(&self, id: ElementId) -> bool {
        self.elements
            .get(&id)
            .map(|element| element.is_visible_on_layer(&self.layers, &self.visible_layers))
            .unwrap_or(false)
    }

    pub(crate) fn set_layer_lists(&mut self, layers: Vec<String>, visible_layers: Vec<String>) {
        self.layers = layers;
        self.visible_layers = visible_layers;
    }

    // --- selection ---

    /// Area-select every station fully enclosed by `area`
    ///
    /// `None` clears the area selection on all stations.
    pub fn set_selected_area(&mut self, area: Option<&Rect>) {
        for element in self.elements.values_mut() {
            element.set_selected_area(area);
        }
        self.bump();
    }
}
