//! Document encoding and decoding
//!
//! Elements are written through an ordered chain of hooks, one per
//! concern: identity, geometry, box style, data source. Each hook owns a
//! fixed set of tags and attributes; decoding walks the same chain, so
//! adding a concern means adding one hook, not touching a dispatch tree.
//!
//! Reading is lenient about unknown child tags (forward compatibility)
//! and strict about ids and numeric attributes. A corrupt embedded image
//! is dropped silently; a damaged picture must not block loading the
//! rest of the document.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::{debug, trace, warn};

use crate::core::{AttrNode, Color, DecodeError, Point, Size, TagSet};
use crate::model::edge::{Edge, LineMode};
use crate::model::element::{DataSource, DbSettings, Element};
use crate::model::kind::ElementKind;
use crate::model::surface::Surface;

const ATTR_ID: &str = "id";
const ATTR_DELETE_PROTECTION: &str = "DeleteProtection";
const ATTR_STATISTICS: &str = "StationStatisticsActive";
const ATTR_FLIP: &str = "FlipShape";

const TAG_NAME: TagSet = TagSet::new(&["Name", "ElementName"]);
const TAG_DESCRIPTION: TagSet = TagSet::new(&["Description", "ElementDescription"]);
const TAG_LAYER: TagSet = TagSet::new(&["Layer", "OnLayer"]);
const TAG_SIZE: TagSet = TagSet::new(&["Size"]);
const TAG_BACKGROUND_COLOR: TagSet = TagSet::new(&["BackgroundColor", "Color"]);
const TAG_BACKGROUND_IMAGE: TagSet = TagSet::new(&["BackgroundImage", "Image"]);
const TAG_DRAW_TEXT: TagSet = TagSet::new(&["DrawText"]);
const TAG_INPUT_FILE: TagSet = TagSet::new(&["InputFile", "File"]);
const TAG_DATABASE: TagSet = TagSet::new(&["Database"]);
const TAG_DDE: TagSet = TagSet::new(&["DDE"]);

const TAG_EDGE: TagSet = TagSet::new(&["ModelElementEdge", "Edge"]);
const TAG_CONNECTION: TagSet = TagSet::new(&["Connection"]);
const TAG_LINE_MODE: TagSet = TagSet::new(&["LineMode"]);
const ATTR_EDGE_FROM: &str = "Element1";
const ATTR_EDGE_TO: &str = "Element2";

const TAG_ROOT: TagSet = TagSet::new(&["ModelElements", "Model"]);
const ATTR_LAYER_VISIBLE: &str = "Visible";

/// One persistence concern of an element
struct Hook {
    encode: fn(&Element, &mut AttrNode),
    /// Reads attributes of the element's main node
    decode_main: fn(&mut Element, &AttrNode) -> Result<(), DecodeError>,
    /// Offers one child node; returns true when the hook consumed it
    decode_child: fn(&mut Element, &AttrNode, &str) -> Result<bool, DecodeError>,
}

/// The chain, in write order
const HOOKS: &[Hook] = &[
    Hook {
        encode: encode_identity,
        decode_main: decode_identity_main,
        decode_child: decode_identity_child,
    },
    Hook {
        encode: encode_geometry,
        decode_main: decode_geometry_main,
        decode_child: decode_geometry_child,
    },
    Hook {
        encode: encode_style,
        decode_main: decode_nothing_main,
        decode_child: decode_style_child,
    },
    Hook {
        encode: encode_data_source,
        decode_main: decode_nothing_main,
        decode_child: decode_data_source_child,
    },
];

fn decode_nothing_main(_element: &mut Element, _node: &AttrNode) -> Result<(), DecodeError> {
    Ok(())
}

// --- identity ---

fn encode_identity(element: &Element, node: &mut AttrNode) {
    node.set_attribute(ATTR_ID, element.id().to_string());
    if element.delete_protection {
        node.set_attribute(ATTR_DELETE_PROTECTION, "1");
    }
    if !element.name().is_empty() {
        node.add_child(AttrNode::with_text(TAG_NAME.primary(), element.name()));
    }
    if !element.description().is_empty() {
        node.add_child(AttrNode::with_text(
            TAG_DESCRIPTION.primary(),
            element.description(),
        ));
    }
    for layer in element.layers() {
        node.add_child(AttrNode::with_text(TAG_LAYER.primary(), layer.as_str()));
    }
}

fn decode_identity_main(element: &mut Element, node: &AttrNode) -> Result<(), DecodeError> {
    let id = node
        .attribute(ATTR_ID)
        .and_then(|value| value.trim().parse::<i32>().ok())
        .filter(|id| *id >= 1)
        .ok_or_else(|| DecodeError::invalid_id(&node.tag))?;
    element.set_id(id);

    if let Some(value) = node.attribute(ATTR_DELETE_PROTECTION) {
        if !value.trim().is_empty() && value != "0" {
            element.delete_protection = true;
        }
    }
    Ok(())
}

fn decode_identity_child(
    element: &mut Element,
    child: &AttrNode,
    _parent: &str,
) -> Result<bool, DecodeError> {
    if TAG_NAME.matches(&child.tag) {
        element.set_name(&child.text);
        return Ok(true);
    }
    if TAG_DESCRIPTION.matches(&child.tag) {
        element.set_description(&child.text);
        return Ok(true);
    }
    if TAG_LAYER.matches(&child.tag) {
        if !child.text.trim().is_empty() {
            element.add_layer(&child.text);
        }
        return Ok(true);
    }
    Ok(false)
}

// --- geometry ---

fn encode_geometry(element: &Element, node: &mut AttrNode) {
    let Some(geometry) = element.geometry.as_ref() else {
        return;
    };
    if !geometry.statistics_active {
        node.set_attribute(ATTR_STATISTICS, "0");
    }
    if geometry.flipped {
        node.set_attribute(ATTR_FLIP, "1");
    }
    let mut size = AttrNode::new(TAG_SIZE.primary());
    size.set_attribute("x", geometry.position().x.to_string());
    size.set_attribute("y", geometry.position().y.to_string());
    size.set_attribute("w", geometry.size().width.to_string());
    size.set_attribute("h", geometry.size().height.to_string());
    node.add_child(size);
}

fn decode_geometry_main(element: &mut Element, node: &AttrNode) -> Result<(), DecodeError> {
    let Some(geometry) = element.geometry.as_mut() else {
        return Ok(());
    };
    if node.attribute(ATTR_STATISTICS) == Some("0") {
        geometry.statistics_active = false;
    }
    if node.attribute(ATTR_FLIP) == Some("1") {
        geometry.flipped = true;
    }
    Ok(())
}

fn decode_geometry_child(
    element: &mut Element,
    child: &AttrNode,
    parent: &str,
) -> Result<bool, DecodeError> {
    if !TAG_SIZE.matches(&child.tag) {
        return Ok(false);
    }
    let x = int_attribute(child, "x", parent)?;
    let y = int_attribute(child, "y", parent)?;
    let w = int_attribute(child, "w", parent)?;
    let h = int_attribute(child, "h", parent)?;
    if let Some(geometry) = element.geometry.as_mut() {
        geometry.set_position(Point::new(x, y));
        geometry.set_size(Size::new(w, h));
    }
    Ok(true)
}

// --- box style ---

fn encode_style(element: &Element, node: &mut AttrNode) {
    let Some(style) = element.style.as_ref() else {
        return;
    };
    if let Some(color) = style.user_background_color {
        node.add_child(AttrNode::with_text(
            TAG_BACKGROUND_COLOR.primary(),
            color.encode(),
        ));
    }
    if let Some(image) = style.user_background_image.as_ref() {
        node.add_child(AttrNode::with_text(
            TAG_BACKGROUND_IMAGE.primary(),
            BASE64.encode(image),
        ));
    }
    if !style.draw_text {
        node.add_child(AttrNode::with_text(TAG_DRAW_TEXT.primary(), "0"));
    }
}

fn decode_style_child(
    element: &mut Element,
    child: &AttrNode,
    parent: &str,
) -> Result<bool, DecodeError> {
    if TAG_BACKGROUND_COLOR.matches(&child.tag) {
        if !child.text.trim().is_empty() {
            let color = Color::decode(&child.text).ok_or_else(|| {
                DecodeError::malformed_content(
                    &child.tag,
                    format!("\"{}\" is not a color inside <{}>", child.text, parent),
                )
            })?;
            if let Some(style) = element.style.as_mut() {
                style.user_background_color = Some(color);
            }
        }
        return Ok(true);
    }
    if TAG_BACKGROUND_IMAGE.matches(&child.tag) {
        if !child.text.trim().is_empty() {
            match BASE64.decode(child.text.trim()) {
                Ok(bytes) => {
                    if let Some(style) = element.style.as_mut() {
                        style.user_background_image = Some(bytes);
                    }
                }
                Err(_) => {
                    // damaged picture, keep loading the document
                    debug!(element = element.id(), "dropping corrupt embedded image");
                }
            }
        }
        return Ok(true);
    }
    if TAG_DRAW_TEXT.matches(&child.tag) {
        if child.text.trim() == "0" {
            if let Some(style) = element.style.as_mut() {
                style.draw_text = false;
            }
        }
        return Ok(true);
    }
    Ok(false)
}

// --- external data source ---

fn encode_data_source(element: &Element, node: &mut AttrNode) {
    match element.data_source.as_ref() {
        None => {}
        Some(DataSource::File { path }) => {
            node.add_child(AttrNode::with_text(TAG_INPUT_FILE.primary(), path.as_str()));
        }
        Some(DataSource::Db(settings)) => {
            let mut sub = AttrNode::new(TAG_DATABASE.primary());
            sub.set_attribute("Connector", settings.connector.as_str());
            sub.set_attribute("Connection", settings.connection.as_str());
            sub.set_attribute("Table", settings.table.as_str());
            node.add_child(sub);
        }
        Some(DataSource::DdeTable { workbook, table }) => {
            let mut sub = AttrNode::new(TAG_DDE.primary());
            sub.set_attribute("Workbook", workbook.as_str());
            sub.set_attribute("Table", table.as_str());
            node.add_child(sub);
        }
        Some(DataSource::DdeWorkbook { workbook }) => {
            let mut sub = AttrNode::new(TAG_DDE.primary());
            sub.set_attribute("Workbook", workbook.as_str());
            node.add_child(sub);
        }
    }
}

fn decode_data_source_child(
    element: &mut Element,
    child: &AttrNode,
    _parent: &str,
) -> Result<bool, DecodeError> {
    if TAG_INPUT_FILE.matches(&child.tag) {
        element.data_source = Some(DataSource::File {
            path: child.text.trim().to_string(),
        });
        return Ok(true);
    }
    if TAG_DATABASE.matches(&child.tag) {
        element.data_source = Some(DataSource::Db(DbSettings {
            connector: child.attribute("Connector").unwrap_or_default().to_string(),
            connection: child.attribute("Connection").unwrap_or_default().to_string(),
            table: child.attribute("Table").unwrap_or_default().to_string(),
        }));
        return Ok(true);
    }
    if TAG_DDE.matches(&child.tag) {
        let workbook = child.attribute("Workbook").unwrap_or_default().to_string();
        element.data_source = Some(match child.attribute("Table") {
            Some(table) => DataSource::DdeTable {
                workbook,
                table: table.to_string(),
            },
            None => DataSource::DdeWorkbook { workbook },
        });
        return Ok(true);
    }
    Ok(false)
}

fn int_attribute(node: &AttrNode, name: &str, parent: &str) -> Result<i32, DecodeError> {
    node.attribute(name)
        .and_then(|value| value.trim().parse::<i32>().ok())
        .ok_or_else(|| DecodeError::malformed_attribute(name, &node.tag, parent))
}

/// Write one element as a document node
pub fn encode_element(element: &Element) -> AttrNode {
    let mut node = AttrNode::new(element.kind.tags().primary());
    for hook in HOOKS {
        (hook.encode)(element, &mut node);
    }
    node
}

/// Read one element back from a document node
///
/// Unknown child tags are skipped; a missing or invalid id and malformed
/// numeric attributes are hard errors, and the caller discards the
/// partially decoded element.
pub fn decode_element(node: &AttrNode) -> Result<Element, DecodeError> {
    let kind = ElementKind::from_tag(&node.tag).ok_or_else(|| DecodeError::UnknownTag {
        tag: node.tag.clone(),
    })?;
    let mut element = Element::new(kind);

    for hook in HOOKS {
        (hook.decode_main)(&mut element, node)?;
    }
    for child in &node.children {
        for hook in HOOKS {
            if (hook.decode_child)(&mut element, child, &node.tag)? {
                break;
            }
        }
    }
    trace!(id = element.id(), kind = %element.kind, "element decoded");
    Ok(element)
}

/// Write an edge as a document node
pub fn encode_edge(edge: &Edge) -> AttrNode {
    let mut node = AttrNode::new(TAG_EDGE.primary());
    node.set_attribute(ATTR_ID, edge.id.to_string());
    let mut connection = AttrNode::new(TAG_CONNECTION.primary());
    connection.set_attribute(ATTR_EDGE_FROM, edge.from.to_string());
    connection.set_attribute(ATTR_EDGE_TO, edge.to.to_string());
    node.add_child(connection);
    if let Some(name) = edge.line_mode.document_name() {
        node.add_child(AttrNode::with_text(TAG_LINE_MODE.primary(), name));
    }
    node
}

/// Read an edge back from a document node
///
/// Both endpoint ids are required; whether the referenced stations exist
/// is checked later when the edge is restored onto the surface.
pub fn decode_edge(node: &AttrNode) -> Result<Edge, DecodeError> {
    let id = node
        .attribute(ATTR_ID)
        .and_then(|value| value.trim().parse::<i32>().ok())
        .filter(|id| *id >= 1)
        .ok_or_else(|| DecodeError::invalid_id(&node.tag))?;

    let connection = node.find_child(&TAG_CONNECTION).ok_or_else(|| {
        DecodeError::malformed_content(&node.tag, "edge node without a connection child")
    })?;
    let from = int_attribute(connection, ATTR_EDGE_FROM, &node.tag)?;
    let to = int_attribute(connection, ATTR_EDGE_TO, &node.tag)?;

    let mut edge = Edge::new(id, from, to);
    if let Some(child) = node.find_child(&TAG_LINE_MODE) {
        edge.line_mode = LineMode::from_document_name(child.text.trim());
    }
    Ok(edge)
}

/// Write a whole surface as a document tree
pub fn encode_surface(surface: &Surface) -> AttrNode {
    let mut root = AttrNode::new(TAG_ROOT.primary());
    for layer in surface.layers() {
        let mut node = AttrNode::with_text(TAG_LAYER.primary(), layer.as_str());
        if !surface.visible_layers().iter().any(|l| l == layer) {
            node.set_attribute(ATTR_LAYER_VISIBLE, "0");
        }
        root.add_child(node);
    }
    for element in surface.elements() {
        root.add_child(encode_element(element));
    }
    for edge in surface.edges() {
        root.add_child(encode_edge(edge));
    }
    root
}

/// Read a whole surface back from a document tree
///
/// Stations with unknown tags are skipped with a warning; an edge whose
/// endpoints did not load is dropped with a warning. Decode errors inside
/// a recognized node abort the load.
pub fn decode_surface(root: &AttrNode) -> Result<Surface, DecodeError> {
    if !TAG_ROOT.matches(&root.tag) {
        return Err(DecodeError::UnknownTag {
            tag: root.tag.clone(),
        });
    }

    let mut surface = Surface::new();
    let mut layers = Vec::new();
    let mut visible_layers = Vec::new();
    let mut edge_nodes = Vec::new();

    for child in &root.children {
        if TAG_LAYER.matches(&child.tag) {
            let name = child.text.trim();
            if name.is_empty() {
                continue;
            }
            layers.push(name.to_string());
            if child.attribute(ATTR_LAYER_VISIBLE) != Some("0") {
                visible_layers.push(name.to_string());
            }
            continue;
        }
        if TAG_EDGE.matches(&child.tag) {
            edge_nodes.push(child);
            continue;
        }
        if ElementKind::from_tag(&child.tag).is_some() {
            let element = decode_element(child)?;
            surface.add_element(element);
            continue;
        }
        warn!(tag = %child.tag, "skipping unknown document node");
    }

    surface.set_layer_lists(layers, visible_layers);

    for node in edge_nodes {
        let edge = decode_edge(node)?;
        let (id, from, to) = (edge.id, edge.from, edge.to);
        if !surface.restore_edge(edge) {
            warn!(edge = id, from, to, "dropping edge to missing station");
        }
    }

    debug!(
        elements = surface.element_count(),
        edges = surface.edge_count(),
        "surface decoded"
    );
    Ok(surface)
}

/// Render a surface as a JSON document string
pub fn surface_to_json(surface: &Surface) -> String {
    encode_surface(surface).to_json()
}

/// Parse a JSON document string into a surface
pub fn surface_from_json(text: &str) -> Result<Surface, DecodeError> {
    decode_surface(&AttrNode::from_json(text)?)
}
