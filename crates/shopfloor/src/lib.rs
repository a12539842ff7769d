//! Shopfloor - editable document model for simulation flowcharts
//!
//! A library for loading, editing, validating and saving the
//! station-and-edge diagrams a discrete-event simulation editor works
//! on. Stations carry identity, placement and theming; edges connect
//! them; the validator spots structural gaps and proposes applyable
//! repairs.
//!
//! # Quick Start
//!
//! ```rust
//! use shopfloor::prelude::*;
//!
//! let mut surface = Surface::new();
//! let source = surface.add_element(Element::new(ElementKind::Source));
//! let process = surface.add_element(Element::new(ElementKind::Process));
//! let dispose = surface.add_element(Element::new(ElementKind::Dispose));
//! surface.connect(source, process).unwrap();
//! surface.connect(process, dispose).unwrap();
//!
//! assert!(validate(&surface).is_empty());
//!
//! let json = save_model(&surface);
//! let reloaded = load_model(&json).unwrap();
//! assert_eq!(reloaded.element_count(), 3);
//! ```
//!
//! # Validation and repair
//!
//! ```rust
//! use shopfloor::prelude::*;
//!
//! let mut surface = Surface::new();
//! let source = surface.add_element(Element::new(ElementKind::Source));
//! surface.add_element(Element::new(ElementKind::Process));
//!
//! let issues = validate(&surface);
//! assert_eq!(issues.len(), 2);
//!
//! let mut fixes = fixes_for(&surface, &issues[0]);
//! fixes[0].apply(&mut surface).unwrap();
//! assert!(!surface.element(source).unwrap().outgoing_edges().is_empty());
//! ```

pub mod check;
pub mod core;
pub mod model;
pub mod validate;

use anyhow::Context as _;

pub use crate::core::{AttrNode, Color, DecodeError, FixError, Geometry, Point, Rect, Size, TagSet};
pub use crate::model::{
    BoxStyle, DataSource, DbSettings, Edge, EdgeArity, EdgeId, Element, ElementId, ElementKind,
    LineMode, RenderContext, Shape, Surface,
};
pub use crate::validate::{validate, Issue};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::check::{
        check_external_data, CheckStatus, CheckedDataType, Connectors, DataCheckResult,
        DatabaseProbe, DdeConnect,
    };
    pub use crate::core::{Color, DecodeError, FixError, Geometry, Point, Rect, Size};
    pub use crate::model::persist::{surface_from_json, surface_to_json};
    pub use crate::model::{
        BoxStyle, DataSource, DbSettings, Edge, EdgeArity, EdgeId, Element, ElementId,
        ElementKind, LineMode, RenderContext, Shape, Surface,
    };
    pub use crate::validate::quickfix::{
        edge_out_fixes, fixes_for, has_quick_fix, FixSuggestion, MAX_EDGE_FIX_OPTIONS,
    };
    pub use crate::validate::{validate, Issue};
    pub use crate::{load_model, load_model_file, save_model, save_model_file, validate_model};
}

/// Parse a saved model document into a surface
///
/// # Example
/// ```rust
/// use shopfloor::prelude::*;
///
/// let mut surface = Surface::new();
/// surface.add_element(Element::new(ElementKind::Dispose));
/// let reloaded = load_model(&save_model(&surface)).unwrap();
/// assert_eq!(reloaded.element_count(), 1);
/// ```
pub fn load_model(text: &str) -> Result<Surface, DecodeError> {
    model::persist::surface_from_json(text)
}

/// Render a surface as a model document string
pub fn save_model(surface: &Surface) -> String {
    model::persist::surface_to_json(surface)
}

/// Load a model document from a file on disk
pub fn load_model_file(path: impl AsRef<std::path::Path>) -> anyhow::Result<Surface> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read model file '{}'", path.display()))?;
    load_model(&text).with_context(|| format!("failed to load model file '{}'", path.display()))
}

/// Save a model document to a file on disk
pub fn save_model_file(surface: &Surface, path: impl AsRef<std::path::Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    std::fs::write(path, save_model(surface))
        .with_context(|| format!("failed to write model file '{}'", path.display()))
}

/// Validate a surface and pair every issue with its repair suggestions
pub fn validate_model(surface: &Surface) -> Vec<(Issue, Vec<validate::quickfix::FixSuggestion>)> {
    validate(surface)
        .into_iter()
        .map(|issue| {
            let fixes = validate::quickfix::fixes_for(surface, &issue);
            (issue, fixes)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    fn small_model() -> Surface {
        let mut surface = Surface::new();
        let a = surface.add_element(Element::new(ElementKind::Source));
        let b = surface.add_element(Element::new(ElementKind::Process));
        let c = surface.add_element(Element::new(ElementKind::Dispose));
        surface.connect(a, b).unwrap();
        surface.connect(b, c).unwrap();
        surface
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let surface = small_model();
        let reloaded = crate::load_model(&crate::save_model(&surface)).unwrap();
        assert_eq!(reloaded.element_count(), 3);
        assert_eq!(reloaded.edge_count(), 2);
        assert!(crate::validate(&reloaded).is_empty());
    }

    #[test]
    fn test_load_rejects_garbage() {
        assert!(crate::load_model("{broken").is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let surface = small_model();
        crate::save_model_file(&surface, &path).unwrap();
        let reloaded = crate::load_model_file(&path).unwrap();
        assert_eq!(reloaded.element_count(), 3);
    }

    #[test]
    fn test_load_missing_file_names_the_path() {
        let error = crate::load_model_file("/no/such/model.json").unwrap_err();
        assert!(format!("{}", error).contains("/no/such/model.json"));
    }

    #[test]
    fn test_validate_model_pairs_issues_with_fixes() {
        let mut surface = Surface::new();
        surface.add_element(Element::new(ElementKind::Source));
        surface.add_element(Element::new(ElementKind::Process));

        let report = crate::validate_model(&surface);
        assert_eq!(report.len(), 2);
        for (issue, fixes) in &report {
            assert!(matches!(issue, Issue::NoEdgeOut { .. }));
            assert!(!fixes.is_empty());
        }
    }

    #[test]
    fn test_fix_from_report_repairs_the_model() {
        let mut surface = Surface::new();
        surface.add_element(Element::new(ElementKind::Source));
        surface.add_element(Element::new(ElementKind::Process));
        surface.add_element(Element::new(ElementKind::Dispose));

        loop {
            let mut report = crate::validate_model(&surface);
            let Some((_, fixes)) = report.iter_mut().find(|(_, fixes)| !fixes.is_empty()) else {
                break;
            };
            fixes[0].apply(&mut surface).unwrap();
        }
        assert!(crate::validate(&surface).is_empty());
    }
}
