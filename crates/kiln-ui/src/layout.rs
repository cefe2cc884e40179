//! JSON layout documents
//!
//! A layout is a JSON file with a `ui` array of internally tagged nodes:
//!
//! ```json
//! {
//!   "ui": [
//!     { "type": "button", "x": 20, "y": 20, "width": 120, "height": 36,
//!       "label": "Play", "action": "play" },
//!     { "type": "label", "x": 8, "y": 8, "text": "Kiln Viewer" }
//!   ]
//! }
//! ```

use crate::component::{Button, Label, UiComponent};
use crate::draw::Rect;
use kiln_core::{KilnError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct UiDocument {
    ui: Vec<UiNode>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum UiNode {
    Button {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        label: String,
        action: String,
        #[serde(default = "default_visible")]
        visible: bool,
    },
    Label {
        x: f32,
        y: f32,
        text: String,
        #[serde(default = "default_color")]
        color: [f32; 4],
        #[serde(default = "default_scale")]
        scale: f32,
        #[serde(default = "default_visible")]
        visible: bool,
    },
}

fn default_visible() -> bool {
    true
}

fn default_color() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

fn default_scale() -> f32 {
    1.0
}

/// Parse a layout document from JSON text.
pub fn parse_layout(source: &str) -> Result<Vec<UiComponent>> {
    let document: UiDocument = serde_json::from_str(source)?;
    Ok(document.ui.into_iter().map(build_component).collect())
}

/// Load and parse a layout document from disk.
pub fn load_layout<P: AsRef<Path>>(path: P) -> Result<Vec<UiComponent>> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|_| {
        KilnError::ResourceNotFound(format!("could not read layout: {}", path.display()))
    })?;
    parse_layout(&source)
}

fn build_component(node: UiNode) -> UiComponent {
    match node {
        UiNode::Button {
            x,
            y,
            width,
            height,
            label,
            action,
            visible,
        } => {
            let mut button = Button::new(Rect::new(x, y, width, height), label, action);
            button.visible = visible;
            UiComponent::Button(button)
        }
        UiNode::Label {
            x,
            y,
            text,
            color,
            scale,
            visible,
        } => {
            let mut built = Label::new(x, y, text);
            built.color = color;
            built.scale = scale;
            built.visible = visible;
            UiComponent::Label(built)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_buttons_and_labels() {
        let components = parse_layout(
            r#"{
                "ui": [
                    { "type": "button", "x": 20, "y": 20, "width": 120,
                      "height": 36, "label": "Play", "action": "play" },
                    { "type": "label", "x": 8, "y": 8, "text": "hello" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(components.len(), 2);
        let UiComponent::Button(button) = &components[0] else {
            panic!("expected button first");
        };
        assert_eq!(button.action, "play");
        assert_eq!(button.rect, Rect::new(20.0, 20.0, 120.0, 36.0));
        assert!(button.visible);

        let UiComponent::Label(label) = &components[1] else {
            panic!("expected label second");
        };
        assert_eq!(label.text, "hello");
        assert_eq!(label.color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn optional_fields_can_be_overridden() {
        let components = parse_layout(
            r#"{
                "ui": [
                    { "type": "label", "x": 0, "y": 0, "text": "dim",
                      "color": [0.5, 0.5, 0.5, 1.0], "scale": 2.0,
                      "visible": false }
                ]
            }"#,
        )
        .unwrap();

        let UiComponent::Label(label) = &components[0] else {
            panic!("expected label");
        };
        assert_eq!(label.color, [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(label.scale, 2.0);
        assert!(!label.visible);
    }

    #[test]
    fn unknown_node_type_is_an_error() {
        let result = parse_layout(r#"{ "ui": [ { "type": "slider", "x": 0, "y": 0 } ] }"#);
        assert!(matches!(result, Err(KilnError::JsonError(_))));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_layout("{ not json").is_err());
    }

    #[test]
    fn empty_document_yields_no_components() {
        let components = parse_layout(r#"{ "ui": [] }"#).unwrap();
        assert!(components.is_empty());
    }

    #[test]
    fn load_layout_fails_on_missing_file() {
        assert!(matches!(
            load_layout("/nonexistent/layout.json"),
            Err(KilnError::ResourceNotFound(_))
        ));
    }
}
