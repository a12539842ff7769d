//! Terminal rendering of validation reports
//!
//! Formats issues and their repair suggestions for the terminal, using
//! crossterm ANSI styling when colors are enabled:
//! - Issue markers: Red
//! - Station labels: Cyan
//! - Repair suggestions: Green
//! - Counts and summaries: Default (terminal color)

use crossterm::style::{Color, Stylize};

use shopfloor::prelude::*;

/// Human-readable label for a station, with its kind
fn station_label(surface: &Surface, id: ElementId) -> String {
    let ctx = RenderContext::default();
    match surface.element(id) {
        Some(element) => format!("{} \"{}\"", element.kind, element.display_label(&ctx)),
        None => format!("station {}", id),
    }
}

fn paint(text: &str, color: Color, use_color: bool) -> String {
    if use_color {
        format!("{}", text.with(color))
    } else {
        text.to_string()
    }
}

/// Render one issue line with its marker
pub fn format_issue(surface: &Surface, issue: &Issue, use_color: bool) -> String {
    let marker = paint("✗", Color::Red, use_color);
    let label = paint(&station_label(surface, issue.element()), Color::Cyan, use_color);
    format!("{} {}: {}", marker, label, issue)
}

/// Render one repair suggestion line
pub fn format_fix(fix: &FixSuggestion, use_color: bool) -> String {
    let marker = paint("→", Color::Green, use_color);
    format!("  {} {}", marker, fix.description)
}

/// Render the full validation report
///
/// One block per issue, its suggestions indented below. Ends with a
/// one-line summary either way.
pub fn render_report(
    surface: &Surface,
    report: &[(Issue, Vec<FixSuggestion>)],
    use_color: bool,
) -> String {
    if report.is_empty() {
        let marker = paint("✓", Color::Green, use_color);
        return format!(
            "{} model is structurally valid ({} stations, {} edges)\n",
            marker,
            surface.element_count(),
            surface.edge_count()
        );
    }

    let mut out = String::new();
    for (issue, fixes) in report {
        out.push_str(&format_issue(surface, issue, use_color));
        out.push('\n');
        for fix in fixes {
            out.push_str(&format_fix(fix, use_color));
            out.push('\n');
        }
        if fixes.is_empty() {
            out.push_str("    no automatic repair available\n");
        }
    }
    let noun = if report.len() == 1 { "issue" } else { "issues" };
    out.push_str(&format!("{} {}\n", report.len(), noun));
    out
}

/// Render a short per-kind census of the model
pub fn render_info(surface: &Surface, use_color: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} stations, {} edges, {} layers\n",
        surface.element_count(),
        surface.edge_count(),
        surface.layers().len()
    ));

    for kind in ElementKind::ALL {
        let count = surface
            .elements()
            .filter(|element| element.kind == *kind)
            .count();
        if count == 0 {
            continue;
        }
        let name = paint(kind.type_name(), Color::Cyan, use_color);
        out.push_str(&format!("  {:3}  {}\n", count, name));
    }

    for layer in surface.layers() {
        let state = if surface.visible_layers().contains(layer) {
            "visible"
        } else {
            "hidden"
        };
        out.push_str(&format!("  layer \"{}\" ({})\n", layer, state));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconnected_pair() -> Surface {
        let mut surface = Surface::new();
        surface.add_element(Element::new(ElementKind::Source));
        surface.add_element(Element::new(ElementKind::Process));
        surface
    }

    #[test]
    fn test_report_without_color_has_no_ansi() {
        let surface = unconnected_pair();
        let report = validate_model(&surface);
        let text = render_report(&surface, &report, false);
        assert!(!text.contains("\x1b["));
        assert!(text.contains("has no outgoing edge"));
        assert!(text.contains("2 issues"));
    }

    #[test]
    fn test_report_with_color_has_ansi() {
        let surface = unconnected_pair();
        let report = validate_model(&surface);
        let text = render_report(&surface, &report, true);
        assert!(text.contains("\x1b["));
    }

    #[test]
    fn test_clean_model_report() {
        let mut surface = Surface::new();
        let a = surface.add_element(Element::new(ElementKind::Source));
        let b = surface.add_element(Element::new(ElementKind::Dispose));
        surface.connect(a, b).unwrap();

        let report = validate_model(&surface);
        let text = render_report(&surface, &report, false);
        assert!(text.contains("structurally valid"));
        assert!(text.contains("2 stations"));
    }

    #[test]
    fn test_issue_line_names_the_station() {
        let mut surface = unconnected_pair();
        let id = surface.elements().next().unwrap().id();
        surface.element_mut(id).unwrap().set_name("arrivals");

        let report = validate_model(&surface);
        let text = render_report(&surface, &report, false);
        assert!(text.contains("arrivals"));
    }

    #[test]
    fn test_info_lists_kinds_and_layers() {
        let mut surface = unconnected_pair();
        surface.add_layer("background");
        surface.set_layer_visible("background", false);

        let text = render_info(&surface, false);
        assert!(text.contains("Source"));
        assert!(text.contains("Process"));
        assert!(text.contains("layer \"background\" (hidden)"));
        assert!(!text.contains("Dispose"));
    }
}
