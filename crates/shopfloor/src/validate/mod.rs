//! Structural validation of a surface
//!
//! Walks the whole element list and reports everything that would stop a
//! simulation run from being built: stations missing their required
//! outgoing edge, edges whose endpoints are gone. Repair proposals for
//! the issues found here live in [`quickfix`].

pub mod quickfix;

use std::fmt;

use tracing::debug;

use crate::model::edge::{EdgeId, ElementId};
use crate::model::surface::Surface;

/// One structural problem found on a surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// The station's kind requires an outgoing edge but none is connected
    NoEdgeOut { element: ElementId },
    /// An edge endpoint refers to a station that no longer exists
    DanglingEdge { edge: EdgeId, endpoint: ElementId },
}

impl Issue {
    /// Station the issue is attached to
    pub fn element(&self) -> ElementId {
        match self {
            Issue::NoEdgeOut { element } => *element,
            Issue::DanglingEdge { endpoint, .. } => *endpoint,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::NoEdgeOut { element } => {
                write!(f, "station {} has no outgoing edge", element)
            }
            Issue::DanglingEdge { edge, endpoint } => {
                write!(f, "edge {} references missing station {}", edge, endpoint)
            }
        }
    }
}

/// Check the whole surface and list every structural issue
///
/// Never mutates; issues come back in z-order of the offending station,
/// edge issues after station issues.
pub fn validate(surface: &Surface) -> Vec<Issue> {
    let mut issues = Vec::new();

    for element in surface.elements() {
        if element.kind.requires_outgoing() && element.outgoing_edges().is_empty() {
            issues.push(Issue::NoEdgeOut {
                element: element.id(),
            });
        }
    }

    for edge in surface.edges() {
        for endpoint in [edge.from, edge.to] {
            if surface.element(endpoint).is_none() {
                issues.push(Issue::DanglingEdge {
                    edge: edge.id,
                    endpoint,
                });
            }
        }
    }

    debug!(count = issues.len(), "surface validated");
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::element::Element;
    use crate::model::kind::ElementKind;

    #[test]
    fn test_empty_surface_is_valid() {
        assert!(validate(&Surface::new()).is_empty());
    }

    #[test]
    fn test_flags_missing_outgoing_edge() {
        let mut surface = Surface::new();
        let a = surface.add_element(Element::new(ElementKind::Source));
        let b = surface.add_element(Element::new(ElementKind::Process));
        let c = surface.add_element(Element::new(ElementKind::Dispose));
        surface.connect(a, b).unwrap();

        let issues = validate(&surface);
        assert_eq!(issues, vec![Issue::NoEdgeOut { element: b }]);
        assert_eq!(issues[0].element(), b);
        let _ = c;
    }

    #[test]
    fn test_terminal_kinds_need_no_outgoing_edge() {
        let mut surface = Surface::new();
        surface.add_element(Element::new(ElementKind::Dispose));
        assert!(validate(&surface)
            .iter()
            .all(|issue| !matches!(issue, Issue::NoEdgeOut { .. })));
    }

    #[test]
    fn test_connected_chain_is_valid() {
        let mut surface = Surface::new();
        let a = surface.add_element(Element::new(ElementKind::Source));
        let b = surface.add_element(Element::new(ElementKind::Process));
        let c = surface.add_element(Element::new(ElementKind::Dispose));
        surface.connect(a, b).unwrap();
        surface.connect(b, c).unwrap();
        assert!(validate(&surface).is_empty());
    }

    #[test]
    fn test_validate_does_not_mutate() {
        let mut surface = Surface::new();
        surface.add_element(Element::new(ElementKind::Source));
        let revision = surface.revision();
        validate(&surface);
        assert_eq!(surface.revision(), revision);
    }
}
