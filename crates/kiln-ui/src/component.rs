//! Overlay components
//!
//! Components are a closed tagged union rather than a trait-object
//! hierarchy: each frame the app feeds pointer state to `handle_input`,
//! which returns the action string of any clicked button, then calls
//! `build_draw` to rebuild the quad list.

use crate::draw::{DrawList, Rect};
use crate::font::BitmapFont;

const BUTTON_FILL: [f32; 4] = [0.16, 0.17, 0.20, 0.92];
const BUTTON_FILL_HOVERED: [f32; 4] = [0.28, 0.30, 0.36, 0.95];
const BUTTON_TEXT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Pointer snapshot for one frame, in pixel coordinates
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
    pub pressed: bool,
    /// True only on the frame the press began
    pub just_pressed: bool,
}

/// Emitted when a button is activated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiEvent {
    pub action: String,
}

/// A clickable rectangle with a centered text label
#[derive(Debug, Clone)]
pub struct Button {
    pub rect: Rect,
    pub label: String,
    /// Action string reported through [`UiEvent`] on click
    pub action: String,
    pub visible: bool,
    hovered: bool,
}

impl Button {
    pub fn new(rect: Rect, label: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            rect,
            label: label.into(),
            action: action.into(),
            visible: true,
            hovered: false,
        }
    }
}

/// Static text anchored at a pixel position
#[derive(Debug, Clone)]
pub struct Label {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub color: [f32; 4],
    pub scale: f32,
    pub visible: bool,
}

impl Label {
    pub fn new(x: f32, y: f32, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            text: text.into(),
            color: [1.0, 1.0, 1.0, 1.0],
            scale: 1.0,
            visible: true,
        }
    }
}

/// All overlay component kinds
#[derive(Debug, Clone)]
pub enum UiComponent {
    Button(Button),
    Label(Label),
}

impl UiComponent {
    /// Hit-test the pointer. Returns the button's event on the frame the
    /// press begins inside it.
    pub fn handle_input(&mut self, pointer: &PointerState) -> Option<UiEvent> {
        match self {
            UiComponent::Button(button) => {
                if !button.visible {
                    button.hovered = false;
                    return None;
                }
                button.hovered = button.rect.contains(pointer.x, pointer.y);
                if button.hovered && pointer.just_pressed {
                    Some(UiEvent {
                        action: button.action.clone(),
                    })
                } else {
                    None
                }
            }
            UiComponent::Label(_) => None,
        }
    }

    /// Clamp the component back inside the screen after a resize.
    pub fn refresh_layout(&mut self, screen_width: f32, screen_height: f32) {
        match self {
            UiComponent::Button(button) => {
                let max_x = (screen_width - button.rect.width).max(0.0);
                let max_y = (screen_height - button.rect.height).max(0.0);
                button.rect.x = button.rect.x.clamp(0.0, max_x);
                button.rect.y = button.rect.y.clamp(0.0, max_y);
            }
            UiComponent::Label(label) => {
                label.x = label.x.clamp(0.0, screen_width);
                label.y = label.y.clamp(0.0, screen_height);
            }
        }
    }

    /// Append this component's quads to the frame's draw list.
    pub fn build_draw(&self, font: &BitmapFont, list: &mut DrawList) {
        match self {
            UiComponent::Button(button) => {
                if !button.visible {
                    return;
                }
                let fill = if button.hovered {
                    BUTTON_FILL_HOVERED
                } else {
                    BUTTON_FILL
                };
                list.push_fill(button.rect, fill);

                let text_w = font.text_width(&button.label, 1.0);
                let text_x = button.rect.x + (button.rect.width - text_w) / 2.0;
                let text_y = button.rect.y + (button.rect.height - font.glyph_height) / 2.0;
                font.layout_text(&button.label, text_x, text_y, 1.0, BUTTON_TEXT, list);
            }
            UiComponent::Label(label) => {
                if !label.visible {
                    return;
                }
                font.layout_text(
                    &label.text,
                    label.x,
                    label.y,
                    label.scale,
                    label.color,
                    list,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press_at(x: f32, y: f32) -> PointerState {
        PointerState {
            x,
            y,
            pressed: true,
            just_pressed: true,
        }
    }

    #[test]
    fn button_fires_on_press_inside() {
        let mut button =
            UiComponent::Button(Button::new(Rect::new(10.0, 10.0, 80.0, 30.0), "Play", "play"));

        let event = button.handle_input(&press_at(50.0, 25.0));
        assert_eq!(event.unwrap().action, "play");
    }

    #[test]
    fn button_ignores_press_outside() {
        let mut button =
            UiComponent::Button(Button::new(Rect::new(10.0, 10.0, 80.0, 30.0), "Play", "play"));

        assert!(button.handle_input(&press_at(200.0, 25.0)).is_none());
    }

    #[test]
    fn held_press_fires_only_once() {
        let mut button =
            UiComponent::Button(Button::new(Rect::new(0.0, 0.0, 50.0, 50.0), "Go", "go"));

        assert!(button.handle_input(&press_at(25.0, 25.0)).is_some());
        let held = PointerState {
            x: 25.0,
            y: 25.0,
            pressed: true,
            just_pressed: false,
        };
        assert!(button.handle_input(&held).is_none());
    }

    #[test]
    fn hidden_button_never_fires() {
        let mut inner = Button::new(Rect::new(0.0, 0.0, 50.0, 50.0), "Go", "go");
        inner.visible = false;
        let mut button = UiComponent::Button(inner);

        assert!(button.handle_input(&press_at(25.0, 25.0)).is_none());
    }

    #[test]
    fn labels_never_fire() {
        let mut label = UiComponent::Label(Label::new(5.0, 5.0, "fps: 60"));
        assert!(label.handle_input(&press_at(5.0, 5.0)).is_none());
    }

    #[test]
    fn refresh_layout_clamps_into_screen() {
        let mut button =
            UiComponent::Button(Button::new(Rect::new(900.0, -20.0, 100.0, 40.0), "X", "x"));
        button.refresh_layout(800.0, 600.0);

        let UiComponent::Button(b) = &button else {
            unreachable!()
        };
        assert_eq!(b.rect.x, 700.0);
        assert_eq!(b.rect.y, 0.0);
    }

    #[test]
    fn button_draw_emits_fill_then_glyphs() {
        let font = BitmapFont::default();
        let button =
            UiComponent::Button(Button::new(Rect::new(0.0, 0.0, 100.0, 30.0), "Hi", "hi"));

        let mut list = DrawList::new();
        button.build_draw(&font, &mut list);

        assert_eq!(list.quads.len(), 3);
        assert!(list.quads[0].uv.is_none());
        assert!(list.quads[1].uv.is_some());
        assert!(list.quads[2].uv.is_some());
    }

    #[test]
    fn button_label_is_horizontally_centered() {
        let font = BitmapFont::default();
        let button =
            UiComponent::Button(Button::new(Rect::new(0.0, 0.0, 100.0, 30.0), "ab", "ab"));

        let mut list = DrawList::new();
        button.build_draw(&font, &mut list);

        let text_w = font.text_width("ab", 1.0);
        assert_eq!(list.quads[1].rect.x, (100.0 - text_w) / 2.0);
    }

    #[test]
    fn hidden_components_draw_nothing() {
        let font = BitmapFont::default();
        let mut inner = Label::new(0.0, 0.0, "ghost");
        inner.visible = false;

        let mut list = DrawList::new();
        UiComponent::Label(inner).build_draw(&font, &mut list);
        assert!(list.quads.is_empty());
    }
}
