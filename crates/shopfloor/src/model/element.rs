//! The station record
//!
//! One struct covers every station kind; what used to be a deep subclass
//! chain is a `kind` tag plus optional blocks for placement, box styling
//! and external data coordinates. Fields that only exist at runtime
//! (selection, the live annotation slot) are excluded from comparison and
//! from the document format.

use std::fmt;
use std::sync::Mutex;

use tracing::trace;

use crate::core::{Color, Geometry, Rect};
use crate::model::edge::{EdgeId, ElementId};
use crate::model::kind::ElementKind;

/// Maximum stored name length in characters
const MAX_NAME_LEN: usize = 1024;

/// Settings passed into drawing and labelling calls
///
/// Replaces ambient global toggles; every call site states explicitly
/// which presentation settings it works under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    pub high_contrast: bool,
    pub show_ids: bool,
    pub zoom: f64,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            high_contrast: false,
            show_ids: true,
            zoom: 1.0,
        }
    }
}

/// Box presentation settings a user may override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxStyle {
    /// Overrides the kind's default background color
    pub user_background_color: Option<Color>,
    /// Raw PNG bytes drawn instead of the shape fill
    pub user_background_image: Option<Vec<u8>>,
    /// Whether the type and name text is drawn into the box
    pub draw_text: bool,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            user_background_color: None,
            user_background_image: None,
            draw_text: true,
        }
    }
}

/// Database coordinates of an external input
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DbSettings {
    /// Driver name, e.g. "sqlite"
    pub connector: String,
    /// Connection string or file path
    pub connection: String,
    /// Table to read from
    pub table: String,
}

impl fmt::Display for DbSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.connector.is_empty() {
            f.write_str(&self.connection)
        } else {
            write!(f, "{}:{}", self.connector, self.connection)
        }
    }
}

/// External data a station reads at simulation start
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// A file on disk
    File { path: String },
    /// A database table
    Db(DbSettings),
    /// A specific worksheet reached over DDE
    DdeTable { workbook: String, table: String },
    /// Any worksheet of a workbook reached over DDE
    DdeWorkbook { workbook: String },
}

/// One station on a surface
#[derive(Debug)]
pub struct Element {
    id: ElementId,
    name: String,
    description: String,
    pub delete_protection: bool,
    selected: bool,
    selected_area: bool,
    layers: Vec<String>,
    pub kind: ElementKind,
    pub geometry: Option<Geometry>,
    pub style: Option<BoxStyle>,
    pub data_source: Option<DataSource>,
    pub(crate) incoming: Vec<EdgeId>,
    pub(crate) outgoing: Vec<EdgeId>,
    /// Single-slot live text written by the simulation runner and read by
    /// the drawing thread. Replace-on-write, read-latest; stale reads are
    /// fine, torn reads are not.
    annotation: Mutex<Option<String>>,
}

impl Element {
    /// Create an unregistered station of the given kind
    ///
    /// The id stays 0 until the element is added to a surface.
    pub fn new(kind: ElementKind) -> Self {
        use crate::core::Size;
        let data_source = match kind {
            ElementKind::Input => Some(DataSource::File {
                path: String::new(),
            }),
            ElementKind::InputDb => Some(DataSource::Db(DbSettings::default())),
            ElementKind::InputDde => Some(DataSource::DdeTable {
                workbook: String::new(),
                table: String::new(),
            }),
            _ => None,
        };
        Self {
            id: 0,
            name: String::new(),
            description: String::new(),
            delete_protection: false,
            selected: false,
            selected_area: false,
            layers: Vec::new(),
            kind,
            geometry: Some(Geometry::new(Size::new(100, 50))),
            style: Some(BoxStyle::default()),
            data_source,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            annotation: Mutex::new(None),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: ElementId) {
        self.id = id;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the name; input is trimmed and capped at 1024 characters
    pub fn set_name(&mut self, name: &str) {
        let trimmed = name.trim();
        self.name = if trimmed.chars().count() > MAX_NAME_LEN {
            trimmed.chars().take(MAX_NAME_LEN).collect()
        } else {
            trimmed.to_string()
        };
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.trim().to_string();
    }

    /// Whether the element can show up in a selection
    pub fn can_select(&self) -> bool {
        self.geometry.is_some()
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        if selected && !self.can_select() {
            return;
        }
        self.selected = selected;
    }

    pub fn is_selected_area(&self) -> bool {
        self.selected_area
    }

    /// Mark the element as area-selected if it lies fully inside `area`
    ///
    /// `None` clears the area selection. Elements only partially covered
    /// by the area are not selected.
    pub fn set_selected_area(&mut self, area: Option<&Rect>) {
        if !self.can_select() {
            self.selected_area = false;
            return;
        }
        self.selected_area = match (area, &self.geometry) {
            (Some(area), Some(geometry)) => geometry.contained_in(area),
            _ => false,
        };
    }

    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    pub fn add_layer(&mut self, layer: &str) {
        if !self.layers.iter().any(|l| l == layer) {
            self.layers.push(layer.to_string());
        }
    }

    pub fn remove_layer(&mut self, layer: &str) {
        self.layers.retain(|l| l != layer);
    }

    pub(crate) fn set_layers(&mut self, layers: Vec<String>) {
        self.layers = layers;
    }

    /// Decide visibility under the given layer filter
    ///
    /// An element is visible if it declares no layers, if filtering is
    /// effectively off (no layers defined or none hidden), if any of its
    /// layers is visible, or if every layer it declares is unknown to the
    /// surface (an orphaned layer name never hides anything).
    pub fn is_visible_on_layer(&self, all_layers: &[String], visible_layers: &[String]) -> bool {
        if all_layers.is_empty() || self.layers.is_empty() || visible_layers.is_empty() {
            return true;
        }

        let mut on_any_known_layer = false;
        for layer in &self.layers {
            if visible_layers.contains(layer) {
                return true;
            }
            if all_layers.contains(layer) {
                on_any_known_layer = true;
            }
        }
        !on_any_known_layer
    }

    /// Semantic equality, ignoring runtime-only state
    ///
    /// Compares identity, kind, persisted flags and the capability
    /// blocks. Layer membership is compared as a set, so order and
    /// duplicates do not matter.
    pub fn equals_model_element(&self, other: &Element) -> bool {
        if self.id != other.id || self.kind != other.kind {
            return false;
        }
        if self.name != other.name || self.description != other.description {
            return false;
        }
        if self.delete_protection != other.delete_protection {
            return false;
        }
        if !layer_sets_equal(&self.layers, &other.layers) {
            return false;
        }
        self.geometry == other.geometry
            && self.style == other.style
            && self.data_source == other.data_source
    }

    /// Take over all persisted state from `source`
    ///
    /// The id transfers as-is when positive; an unregistered source
    /// (id <= 0) gets a fresh id from the supplied allocator. Edge
    /// registrations and the annotation slot do not transfer.
    pub fn copy_data_from<F>(&mut self, source: &Element, next_free_id: F)
    where
        F: FnOnce() -> ElementId,
    {
        self.id = if source.id > 0 {
            source.id
        } else {
            next_free_id()
        };
        self.kind = source.kind;
        self.name = source.name.clone();
        self.description = source.description.clone();
        self.delete_protection = source.delete_protection;
        self.selected = source.selected;
        self.selected_area = false;
        self.layers = source.layers.clone();
        self.geometry = source.geometry.clone();
        self.style = source.style.clone();
        self.data_source = source.data_source.clone();
        self.incoming.clear();
        self.outgoing.clear();
        trace!(id = self.id, kind = %self.kind, "copied element data");
    }

    /// Clone the element, regenerating the id when the source has none
    pub fn duplicate<F>(&self, next_free_id: F) -> Element
    where
        F: FnOnce() -> ElementId,
    {
        let mut copy = Element::new(self.kind);
        copy.copy_data_from(self, next_free_id);
        copy
    }

    pub fn incoming_edges(&self) -> &[EdgeId] {
        &self.incoming
    }

    pub fn outgoing_edges(&self) -> &[EdgeId] {
        &self.outgoing
    }

    /// Background color to draw the box with
    pub fn draw_background_color(&self, ctx: &RenderContext) -> Color {
        if ctx.high_contrast {
            return Color::HIGH_CONTRAST;
        }
        self.style
            .as_ref()
            .and_then(|style| style.user_background_color)
            .unwrap_or_else(|| self.kind.default_background_color())
    }

    /// Text line identifying the station in labels and reports
    pub fn display_label(&self, ctx: &RenderContext) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        if ctx.show_ids {
            return format!("id={}", self.id);
        }
        self.kind.type_name().to_string()
    }

    /// Replace the live annotation text
    pub fn set_annotation(&self, text: Option<String>) {
        let mut slot = match self.annotation.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = text;
    }

    /// Latest annotation text, if any
    pub fn annotation(&self) -> Option<String> {
        let slot = match self.annotation.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.clone()
    }
}

impl Clone for Element {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            delete_protection: self.delete_protection,
            selected: self.selected,
            selected_area: false,
            layers: self.layers.clone(),
            kind: self.kind,
            geometry: self.geometry.clone(),
            style: self.style.clone(),
            data_source: self.data_source.clone(),
            incoming: self.incoming.clone(),
            outgoing: self.outgoing.clone(),
            annotation: Mutex::new(None),
        }
    }
}

fn layer_sets_equal(a: &[String], b: &[String]) -> bool {
    let mut a: Vec<&str> = a.iter().map(String::as_str).collect();
    let mut b: Vec<&str> = b.iter().map(String::as_str).collect();
    a.sort_unstable();
    a.dedup();
    b.sort_unstable();
    b.dedup();
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Point, Size};

    #[test]
    fn test_name_is_trimmed_and_capped() {
        let mut element = Element::new(ElementKind::Process);
        element.set_name("  Checkout  ");
        assert_eq!(element.name(), "Checkout");

        element.set_name(&"x".repeat(2000));
        assert_eq!(element.name().chars().count(), 1024);
    }

    #[test]
    fn test_description_is_trimmed() {
        let mut element = Element::new(ElementKind::Process);
        element.set_description("  a note \n");
        assert_eq!(element.description(), "a note");
    }

    #[test]
    fn test_selection_requires_geometry() {
        let mut element = Element::new(ElementKind::Process);
        element.geometry = None;
        element.set_selected(true);
        assert!(!element.is_selected());

        element.geometry = Some(Geometry::new(Size::new(100, 50)));
        element.set_selected(true);
        assert!(element.is_selected());
    }

    #[test]
    fn test_area_selection_needs_full_containment() {
        let mut element = Element::new(ElementKind::Process);
        if let Some(g) = element.geometry.as_mut() {
            g.set_position(Point::new(100, 100));
        }

        element.set_selected_area(Some(&Rect::new(50, 50, 200, 200)));
        assert!(element.is_selected_area());

        element.set_selected_area(Some(&Rect::new(150, 50, 200, 200)));
        assert!(!element.is_selected_area());

        element.set_selected_area(Some(&Rect::new(50, 50, 200, 200)));
        element.set_selected_area(None);
        assert!(!element.is_selected_area());
    }

    #[test]
    fn test_layers_deduplicate() {
        let mut element = Element::new(ElementKind::Process);
        element.add_layer("machines");
        element.add_layer("machines");
        element.add_layer("labels");
        assert_eq!(element.layers(), ["machines", "labels"]);

        element.remove_layer("machines");
        assert_eq!(element.layers(), ["labels"]);
    }

    #[test]
    fn test_layer_free_element_is_always_visible() {
        let element = Element::new(ElementKind::Process);
        let all = vec!["a".to_string(), "b".to_string()];
        let none: Vec<String> = Vec::new();

        assert!(element.is_visible_on_layer(&none, &none));
        assert!(element.is_visible_on_layer(&all, &none));
        assert!(element.is_visible_on_layer(&all, &all));
    }

    #[test]
    fn test_visibility_follows_layer_filter() {
        let mut element = Element::new(ElementKind::Process);
        element.add_layer("machines");

        let all = vec!["machines".to_string(), "labels".to_string()];
        let visible = vec!["labels".to_string()];
        assert!(!element.is_visible_on_layer(&all, &visible));

        let visible = vec!["machines".to_string()];
        assert!(element.is_visible_on_layer(&all, &visible));
    }

    #[test]
    fn test_unknown_layers_never_hide() {
        let mut element = Element::new(ElementKind::Process);
        element.add_layer("retired-layer");

        let all = vec!["machines".to_string()];
        let visible = vec!["machines".to_string()];
        assert!(element.is_visible_on_layer(&all, &visible));
    }

    #[test]
    fn test_equality_ignores_layer_order_and_duplicates() {
        let mut a = Element::new(ElementKind::Process);
        a.set_id(5);
        a.add_layer("one");
        a.add_layer("two");

        let mut b = a.clone();
        b.set_layers(vec![
            "two".to_string(),
            "one".to_string(),
            "one".to_string(),
        ]);
        assert!(a.equals_model_element(&b));

        b.set_layers(vec!["two".to_string()]);
        assert!(!a.equals_model_element(&b));
    }

    #[test]
    fn test_equality_ignores_runtime_state() {
        let mut a = Element::new(ElementKind::Process);
        a.set_id(5);
        let mut b = a.clone();
        b.set_selected(true);
        b.set_annotation(Some("WIP=3".to_string()));
        assert!(a.equals_model_element(&b));
    }

    #[test]
    fn test_equality_covers_identity_and_blocks() {
        let mut a = Element::new(ElementKind::Process);
        a.set_id(5);
        let mut b = a.clone();
        assert!(a.equals_model_element(&b));

        b.set_id(6);
        assert!(!a.equals_model_element(&b));

        let mut c = a.clone();
        c.set_name("other");
        assert!(!a.equals_model_element(&c));

        let mut d = a.clone();
        if let Some(g) = d.geometry.as_mut() {
            g.set_position(Point::new(7, 7));
        }
        assert!(!a.equals_model_element(&d));

        let mut e = a.clone();
        if let Some(style) = e.style.as_mut() {
            style.user_background_color = Some(Color::new(1, 2, 3));
        }
        assert!(!a.equals_model_element(&e));
    }

    #[test]
    fn test_copy_keeps_positive_id() {
        let mut source = Element::new(ElementKind::Source);
        source.set_id(42);
        source.set_name("arrivals");

        let copy = source.duplicate(|| 99);
        assert_eq!(copy.id(), 42);
        assert_eq!(copy.name(), "arrivals");
        assert!(copy.equals_model_element(&source));
    }

    #[test]
    fn test_copy_regenerates_nonpositive_id() {
        let source = Element::new(ElementKind::Source);
        assert_eq!(source.id(), 0);

        let copy = source.duplicate(|| 7);
        assert_eq!(copy.id(), 7);
    }

    #[test]
    fn test_copy_resets_edges_and_annotation() {
        let mut source = Element::new(ElementKind::Process);
        source.set_id(3);
        source.outgoing.push(17);
        source.set_annotation(Some("queue=5".to_string()));

        let copy = source.duplicate(|| 0);
        assert!(copy.outgoing_edges().is_empty());
        assert!(copy.annotation().is_none());
    }

    #[test]
    fn test_draw_background_color_precedence() {
        let mut element = Element::new(ElementKind::Source);
        let ctx = RenderContext::default();

        assert_eq!(
            element.draw_background_color(&ctx),
            ElementKind::Source.default_background_color()
        );

        if let Some(style) = element.style.as_mut() {
            style.user_background_color = Some(Color::new(10, 20, 30));
        }
        assert_eq!(element.draw_background_color(&ctx), Color::new(10, 20, 30));

        let high_contrast = RenderContext {
            high_contrast: true,
            ..RenderContext::default()
        };
        assert_eq!(
            element.draw_background_color(&high_contrast),
            Color::HIGH_CONTRAST
        );
    }

    #[test]
    fn test_display_label() {
        let mut element = Element::new(ElementKind::Process);
        element.set_id(12);

        let ctx = RenderContext::default();
        assert_eq!(element.display_label(&ctx), "id=12");

        let no_ids = RenderContext {
            show_ids: false,
            ..RenderContext::default()
        };
        assert_eq!(element.display_label(&no_ids), "Process");

        element.set_name("assembly");
        assert_eq!(element.display_label(&ctx), "assembly");
    }

    #[test]
    fn test_annotation_replace_and_read_latest() {
        let element = Element::new(ElementKind::Process);
        assert_eq!(element.annotation(), None);

        element.set_annotation(Some("first".to_string()));
        element.set_annotation(Some("second".to_string()));
        assert_eq!(element.annotation(), Some("second".to_string()));

        element.set_annotation(None);
        assert_eq!(element.annotation(), None);
    }
}
