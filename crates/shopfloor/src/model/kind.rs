//! The station kind catalog
//!
//! Everything that varies per station type lives here as static data:
//! display names, default colors, shapes, edge arity, document tag
//! aliases and the successor allow-lists used by the quick-fix search.
//! Code elsewhere never branches on runtime type tests, only on these
//! tables.

use std::fmt;

use crate::core::{Color, TagSet};

/// How many edges a station accepts on one side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeArity {
    /// No edges on this side
    None,
    /// At most one edge
    Single,
    /// Any number of edges
    Many,
}

/// Outline shape a station is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Rectangle,
    RectangleDoubleLine,
    ArrowRight,
    ArrowLeft,
    WedgeArrowLeft,
    Octagon,
    Document,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Rectangle => write!(f, "rectangle"),
            Shape::RectangleDoubleLine => write!(f, "rectangle-double"),
            Shape::ArrowRight => write!(f, "arrow-right"),
            Shape::ArrowLeft => write!(f, "arrow-left"),
            Shape::WedgeArrowLeft => write!(f, "wedge-arrow-left"),
            Shape::Octagon => write!(f, "octagon"),
            Shape::Document => write!(f, "document"),
        }
    }
}

/// All station kinds the document model knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Produces clients entering the system
    Source,
    /// Removes clients from the system
    Dispose,
    /// Service station with queue and operators
    Process,
    /// Pure waiting time, no operators
    Delay,
    /// Routes each client to one of several successors
    Decide,
    /// Copies each client to every successor
    Duplicate,
    /// Assigns a client type
    Assign,
    /// Assigns a text value to a client
    AssignString,
    /// Sets numeric variables
    Set,
    /// Sets variables via script
    SetJs,
    /// Holds clients until a condition releases them
    Hold,
    /// Holds clients under script control
    HoldJs,
    /// Releases clients by signal
    Barrier,
    /// Releases clients on downstream demand
    PullBarrier,
    /// Clients may refuse to enter and take a detour
    Balk,
    /// Reads values for clients from a file
    Input,
    /// Reads values for clients from a database
    InputDb,
    /// Reads values for clients via DDE
    InputDde,
}

impl ElementKind {
    /// Every kind, in catalog order
    pub const ALL: &'static [ElementKind] = &[
        ElementKind::Source,
        ElementKind::Dispose,
        ElementKind::Process,
        ElementKind::Delay,
        ElementKind::Decide,
        ElementKind::Duplicate,
        ElementKind::Assign,
        ElementKind::AssignString,
        ElementKind::Set,
        ElementKind::SetJs,
        ElementKind::Hold,
        ElementKind::HoldJs,
        ElementKind::Barrier,
        ElementKind::PullBarrier,
        ElementKind::Balk,
        ElementKind::Input,
        ElementKind::InputDb,
        ElementKind::InputDde,
    ];

    /// Human-readable type name shown in labels and reports
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementKind::Source => "Source",
            ElementKind::Dispose => "Dispose",
            ElementKind::Process => "Process",
            ElementKind::Delay => "Delay",
            ElementKind::Decide => "Decide",
            ElementKind::Duplicate => "Duplicate",
            ElementKind::Assign => "Assign",
            ElementKind::AssignString => "Assign text",
            ElementKind::Set => "Set",
            ElementKind::SetJs => "Set (script)",
            ElementKind::Hold => "Hold",
            ElementKind::HoldJs => "Hold (script)",
            ElementKind::Barrier => "Barrier",
            ElementKind::PullBarrier => "Pull barrier",
            ElementKind::Balk => "Balking",
            ElementKind::Input => "Input",
            ElementKind::InputDb => "Input (DB)",
            ElementKind::InputDde => "Input (DDE)",
        }
    }

    /// Background color used when the user picked none
    pub fn default_background_color(&self) -> Color {
        match self {
            ElementKind::Source => Color::new(180, 255, 180),
            ElementKind::Dispose => Color::new(255, 148, 148),
            ElementKind::Process => Color::new(64, 127, 255),
            ElementKind::Delay => Color::new(180, 225, 255),
            ElementKind::Decide => Color::new(204, 99, 255),
            ElementKind::Duplicate => Color::new(204, 99, 255),
            ElementKind::Hold | ElementKind::HoldJs => Color::new(180, 225, 255),
            ElementKind::Input | ElementKind::InputDb | ElementKind::InputDde => {
                Color::new(230, 230, 230)
            }
            _ => Color::LIGHT_GRAY,
        }
    }

    /// Outline shape for the box renderer
    pub fn shape(&self) -> Shape {
        match self {
            ElementKind::Source => Shape::ArrowRight,
            ElementKind::Dispose => Shape::ArrowLeft,
            ElementKind::Process | ElementKind::Delay => Shape::RectangleDoubleLine,
            ElementKind::Decide => Shape::Octagon,
            ElementKind::Duplicate => Shape::WedgeArrowLeft,
            ElementKind::Input | ElementKind::InputDb | ElementKind::InputDde => Shape::Document,
            _ => Shape::Rectangle,
        }
    }

    /// How many incoming edges this kind accepts
    pub fn incoming_arity(&self) -> EdgeArity {
        match self {
            ElementKind::Source => EdgeArity::None,
            _ => EdgeArity::Many,
        }
    }

    /// How many outgoing edges this kind accepts
    pub fn outgoing_arity(&self) -> EdgeArity {
        match self {
            ElementKind::Dispose => EdgeArity::None,
            ElementKind::Decide | ElementKind::Duplicate => EdgeArity::Many,
            _ => EdgeArity::Single,
        }
    }

    /// True if validation flags a missing outgoing edge for this kind
    pub fn requires_outgoing(&self) -> bool {
        self.outgoing_arity() != EdgeArity::None
    }

    /// Document tag aliases; the first entry is what gets written
    pub fn tags(&self) -> TagSet {
        match self {
            ElementKind::Source => TagSet::new(&["ModelElementSource", "Source"]),
            ElementKind::Dispose => TagSet::new(&["ModelElementDispose", "Dispose"]),
            ElementKind::Process => TagSet::new(&["ModelElementProcessStation", "ModelElementProcess", "Process"]),
            ElementKind::Delay => TagSet::new(&["ModelElementDelay", "Delay"]),
            ElementKind::Decide => TagSet::new(&["ModelElementDecide", "Decide"]),
            ElementKind::Duplicate => TagSet::new(&["ModelElementDuplicate", "Duplicate"]),
            ElementKind::Assign => TagSet::new(&["ModelElementAssign", "Assign"]),
            ElementKind::AssignString => TagSet::new(&["ModelElementAssignString", "AssignString"]),
            ElementKind::Set => TagSet::new(&["ModelElementSet", "Set"]),
            ElementKind::SetJs => TagSet::new(&["ModelElementSetJS", "SetJS"]),
            ElementKind::Hold => TagSet::new(&["ModelElementHold", "Hold"]),
            ElementKind::HoldJs => TagSet::new(&["ModelElementHoldJS", "HoldJS"]),
            ElementKind::Barrier => TagSet::new(&["ModelElementBarrier", "Barrier"]),
            ElementKind::PullBarrier => TagSet::new(&["ModelElementBarrierPull", "PullBarrier"]),
            ElementKind::Balk => TagSet::new(&["ModelElementBalking", "Balk"]),
            ElementKind::Input => TagSet::new(&["ModelElementInput", "Input"]),
            ElementKind::InputDb => TagSet::new(&["ModelElementInputDB", "InputDB"]),
            ElementKind::InputDde => TagSet::new(&["ModelElementInputDDE", "InputDDE"]),
        }
    }

    /// Resolve a document tag (any alias) back to a kind
    pub fn from_tag(tag: &str) -> Option<ElementKind> {
        ElementKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.tags().matches(tag))
    }

    /// Kinds that make sense directly after this one
    ///
    /// Used by the missing-edge quick fix to rank connection targets.
    /// Kinds without outgoing edges have an empty list.
    pub fn fix_successors(&self) -> &'static [ElementKind] {
        use ElementKind::*;
        match self {
            Decide | Duplicate => &[Assign, AssignString, Process, Delay],
            Source => &[
                Decide,
                Duplicate,
                Process,
                Delay,
                Hold,
                HoldJs,
                Barrier,
                PullBarrier,
                Balk,
                Set,
                SetJs,
            ],
            Process | Delay => &[Dispose],
            Balk => &[Process],
            Hold | HoldJs => &[Process, Delay],
            Dispose => &[],
            _ => &[Process, Delay],
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_resolves_primary_and_aliases() {
        assert_eq!(
            ElementKind::from_tag("ModelElementSource"),
            Some(ElementKind::Source)
        );
        assert_eq!(ElementKind::from_tag("source"), Some(ElementKind::Source));
        assert_eq!(
            ElementKind::from_tag("ModelElementProcess"),
            Some(ElementKind::Process)
        );
        assert_eq!(ElementKind::from_tag("NoSuchStation"), None);
    }

    #[test]
    fn test_every_kind_round_trips_through_its_primary_tag() {
        for kind in ElementKind::ALL {
            assert_eq!(ElementKind::from_tag(kind.tags().primary()), Some(*kind));
        }
    }

    #[test]
    fn test_primary_tags_are_unique() {
        for (i, a) in ElementKind::ALL.iter().enumerate() {
            for b in &ElementKind::ALL[i + 1..] {
                assert!(
                    !a.tags().matches(b.tags().primary()),
                    "{a} and {b} share a tag"
                );
            }
        }
    }

    #[test]
    fn test_arity_catalog() {
        assert_eq!(ElementKind::Source.incoming_arity(), EdgeArity::None);
        assert_eq!(ElementKind::Source.outgoing_arity(), EdgeArity::Single);
        assert_eq!(ElementKind::Dispose.outgoing_arity(), EdgeArity::None);
        assert_eq!(ElementKind::Decide.outgoing_arity(), EdgeArity::Many);
        assert_eq!(ElementKind::Process.incoming_arity(), EdgeArity::Many);
        assert!(!ElementKind::Dispose.requires_outgoing());
        assert!(ElementKind::Process.requires_outgoing());
    }

    #[test]
    fn test_successor_lists_never_name_unreachable_targets() {
        for kind in ElementKind::ALL {
            for target in kind.fix_successors() {
                assert_ne!(
                    target.incoming_arity(),
                    EdgeArity::None,
                    "{kind} lists {target} which takes no incoming edges"
                );
            }
        }
    }

    #[test]
    fn test_dispose_has_no_successors() {
        assert!(ElementKind::Dispose.fix_successors().is_empty());
    }

    #[test]
    fn test_source_successors_match_catalog() {
        let successors = ElementKind::Source.fix_successors();
        assert_eq!(successors.len(), 11);
        assert!(successors.contains(&ElementKind::Decide));
        assert!(successors.contains(&ElementKind::Balk));
        assert!(!successors.contains(&ElementKind::Dispose));
        assert!(!successors.contains(&ElementKind::Source));
    }
}
