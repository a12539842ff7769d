//! Connection edges between stations

use std::fmt;

/// Identifier of a station on a surface, positive once registered
pub type ElementId = i32;

/// Identifier of an edge; edges draw from the same id pool as stations
pub type EdgeId = i32;

/// How an edge's line is routed when drawn
///
/// `Inherit` defers to the model-wide default and is not written to the
/// document; the other modes are stored as a text child of the edge node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum LineMode {
    #[default]
    Inherit,
    Direct,
    MultiSegment,
    MultiSegmentRounded,
    CubicCurve,
}

impl LineMode {
    /// Text form stored in documents; `None` for the inherited default
    pub fn document_name(&self) -> Option<&'static str> {
        match self {
            LineMode::Inherit => None,
            LineMode::Direct => Some("Direct"),
            LineMode::MultiSegment => Some("MultiLine"),
            LineMode::MultiSegmentRounded => Some("MultiLineRounded"),
            LineMode::CubicCurve => Some("CubicCurve"),
        }
    }

    /// Parse the stored text form; unknown text falls back to `Inherit`
    pub fn from_document_name(name: &str) -> LineMode {
        match name {
            "Direct" => LineMode::Direct,
            "MultiLine" => LineMode::MultiSegment,
            "MultiLineRounded" => LineMode::MultiSegmentRounded,
            "CubicCurve" => LineMode::CubicCurve,
            _ => LineMode::Inherit,
        }
    }
}

impl fmt::Display for LineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineMode::Inherit => write!(f, "inherit"),
            LineMode::Direct => write!(f, "direct"),
            LineMode::MultiSegment => write!(f, "multi-segment"),
            LineMode::MultiSegmentRounded => write!(f, "multi-segment-rounded"),
            LineMode::CubicCurve => write!(f, "cubic-curve"),
        }
    }
}

/// A directed connection between exactly two stations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: EdgeId,
    pub from: ElementId,
    pub to: ElementId,
    pub line_mode: LineMode,
}

impl Edge {
    pub fn new(id: EdgeId, from: ElementId, to: ElementId) -> Self {
        Self {
            id,
            from,
            to,
            line_mode: LineMode::Inherit,
        }
    }

    /// True if the edge touches the given station on either end
    pub fn touches(&self, element: ElementId) -> bool {
        self.from == element || self.to == element
    }
}
