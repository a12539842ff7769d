//! Applyable repair suggestions for validation issues
//!
//! For a station missing its outgoing edge, the fixer scans the surface
//! for stations whose kind appears in the offender's successor
//! allow-list and offers to connect them. The scan is capped; a model
//! with hundreds of possible targets still yields a short menu.
//!
//! Listing suggestions never mutates the surface. `apply` mutates once:
//! a suggestion that has already been applied refuses to run again.

use tracing::{debug, info};

use crate::core::FixError;
use crate::model::edge::{EdgeId, ElementId};
use crate::model::element::RenderContext;
use crate::model::surface::{Surface, SurfaceError};
use crate::validate::Issue;

/// Upper bound on the number of suggestions per issue
pub const MAX_EDGE_FIX_OPTIONS: usize = 10;

/// One proposed graph repair: connect `source` to `target`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixSuggestion {
    pub description: String,
    pub source: ElementId,
    pub target: ElementId,
    applied: bool,
}

impl FixSuggestion {
    fn new(description: String, source: ElementId, target: ElementId) -> Self {
        Self {
            description,
            source,
            target,
            applied: false,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.applied
    }

    /// Create the suggested edge and register it on both endpoints
    ///
    /// Runs at most once; a second call fails with `AlreadyApplied`
    /// instead of silently duplicating the edge.
    pub fn apply(&mut self, surface: &mut Surface) -> Result<EdgeId, FixError> {
        if self.applied {
            return Err(FixError::AlreadyApplied);
        }
        let edge = surface
            .connect(self.source, self.target)
            .map_err(|error| match error {
                SurfaceError::UnknownElement(id) => FixError::MissingElement(id),
                SurfaceError::NoOutgoing(id) | SurfaceError::OutgoingOccupied(id) => {
                    FixError::OutgoingFull(id)
                }
                SurfaceError::NoIncoming(_) | SurfaceError::DeleteProtected(_) => {
                    FixError::NotConnectable(self.source, self.target)
                }
            })?;
        self.applied = true;
        info!(edge, source = self.source, target = self.target, "fix applied");
        Ok(edge)
    }
}

/// Suggestions for a station missing its outgoing edge
///
/// Scans all stations in z-order, keeps those whose kind the offender's
/// allow-list names, and stops at [`MAX_EDGE_FIX_OPTIONS`].
pub fn edge_out_fixes(surface: &Surface, element: ElementId) -> Vec<FixSuggestion> {
    let Some(offender) = surface.element(element) else {
        return Vec::new();
    };
    let allowed = offender.kind.fix_successors();
    let ctx = RenderContext::default();

    let mut suggestions = Vec::new();
    for candidate in surface.elements() {
        if candidate.id() == element {
            continue;
        }
        if !allowed.contains(&candidate.kind) {
            continue;
        }
        suggestions.push(FixSuggestion::new(
            format!(
                "add edge to {} \"{}\"",
                candidate.kind,
                candidate.display_label(&ctx)
            ),
            element,
            candidate.id(),
        ));
        if suggestions.len() >= MAX_EDGE_FIX_OPTIONS {
            break;
        }
    }
    debug!(element, count = suggestions.len(), "edge fixes collected");
    suggestions
}

/// All suggestions for one validation issue
pub fn fixes_for(surface: &Surface, issue: &Issue) -> Vec<FixSuggestion> {
    match issue {
        Issue::NoEdgeOut { element } => edge_out_fixes(surface, *element),
        Issue::DanglingEdge { .. } => Vec::new(),
    }
}

/// Whether any repair is on offer for the issue; never mutates
pub fn has_quick_fix(surface: &Surface, issue: &Issue) -> bool {
    !fixes_for(surface, issue).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::element::Element;
    use crate::model::kind::ElementKind;

    #[test]
    fn test_source_scenario_finds_exactly_allowed_targets() {
        let mut surface = Surface::new();
        let a = surface.add_element(Element::new(ElementKind::Source));
        let b = surface.add_element(Element::new(ElementKind::Decide));
        let c = surface.add_element(Element::new(ElementKind::Process));
        let d = surface.add_element(Element::new(ElementKind::Dispose));

        let fixes = edge_out_fixes(&surface, a);
        let targets: Vec<ElementId> = fixes.iter().map(|f| f.target).collect();
        assert_eq!(targets, vec![b, c]);
        assert!(!targets.contains(&d));
    }

    #[test]
    fn test_apply_adds_exactly_one_outgoing_edge() {
        let mut surface = Surface::new();
        let a = surface.add_element(Element::new(ElementKind::Source));
        surface.add_element(Element::new(ElementKind::Decide));
        surface.add_element(Element::new(ElementKind::Process));

        let mut fixes = edge_out_fixes(&surface, a);
        assert_eq!(fixes.len(), 2);

        let before = surface.element(a).unwrap().outgoing_edges().len();
        let edge = fixes[0].apply(&mut surface).unwrap();
        let after = surface.element(a).unwrap().outgoing_edges().len();
        assert_eq!(after, before + 1);

        let stored = surface.edge(edge).unwrap();
        assert_eq!(stored.from, a);
        assert_eq!(stored.to, fixes[0].target);
    }

    #[test]
    fn test_apply_refuses_to_run_twice() {
        let mut surface = Surface::new();
        let a = surface.add_element(Element::new(ElementKind::Decide));
        surface.add_element(Element::new(ElementKind::Process));

        let mut fixes = edge_out_fixes(&surface, a);
        fixes[0].apply(&mut surface).unwrap();
        assert_eq!(
            fixes[0].apply(&mut surface),
            Err(FixError::AlreadyApplied)
        );
        assert_eq!(surface.element(a).unwrap().outgoing_edges().len(), 1);
    }

    #[test]
    fn test_suggestion_cap() {
        let mut surface = Surface::new();
        let decide = surface.add_element(Element::new(ElementKind::Decide));
        for _ in 0..50 {
            surface.add_element(Element::new(ElementKind::Process));
        }

        let fixes = edge_out_fixes(&surface, decide);
        assert_eq!(fixes.len(), MAX_EDGE_FIX_OPTIONS);
    }

    #[test]
    fn test_queries_never_mutate() {
        let mut surface = Surface::new();
        let a = surface.add_element(Element::new(ElementKind::Source));
        surface.add_element(Element::new(ElementKind::Process));
        let issue = Issue::NoEdgeOut { element: a };

        let revision = surface.revision();
        assert!(has_quick_fix(&surface, &issue));
        let _ = fixes_for(&surface, &issue);
        assert_eq!(surface.revision(), revision);
        assert_eq!(surface.edge_count(), 0);
    }

    #[test]
    fn test_offender_is_never_its_own_target() {
        let mut surface = Surface::new();
        let a = surface.add_element(Element::new(ElementKind::Process));
        surface.add_element(Element::new(ElementKind::Dispose));

        let fixes = edge_out_fixes(&surface, a);
        assert!(fixes.iter().all(|f| f.target != a));
    }

    #[test]
    fn test_no_fixes_for_dangling_edges() {
        let surface = Surface::new();
        let issue = Issue::DanglingEdge {
            edge: 9,
            endpoint: 4,
        };
        assert!(!has_quick_fix(&surface, &issue));
    }

    #[test]
    fn test_apply_on_vanished_target_fails_cleanly() {
        let mut surface = Surface::new();
        let a = surface.add_element(Element::new(ElementKind::Source));
        let b = surface.add_element(Element::new(ElementKind::Process));

        let mut fixes = edge_out_fixes(&surface, a);
        surface.remove_element(b).unwrap();

        assert_eq!(
            fixes[0].apply(&mut surface),
            Err(FixError::MissingElement(b))
        );
        assert!(!fixes[0].is_applied());
    }

    #[test]
    fn test_description_names_the_target() {
        let mut surface = Surface::new();
        let a = surface.add_element(Element::new(ElementKind::Source));
        let b = surface.add_element(Element::new(ElementKind::Process));
        surface.element_mut(b).unwrap().set_name("assembly");

        let fixes = edge_out_fixes(&surface, a);
        assert!(fixes[0].description.contains("assembly"));
        assert!(fixes[0].description.contains("Process"));
    }
}
