//! Kiln UI - 2D overlay components
//!
//! A small immediate-mode-influenced overlay: components are a tagged union
//! (button, label) that hit-test pointer input and emit a draw list of
//! colored/textured quads each frame. Layouts load from JSON documents and
//! text renders through a fixed-grid bitmap font atlas. This crate is pure
//! CPU; the renderer consumes the draw list.

mod component;
mod draw;
mod font;
mod layout;

pub use component::{Button, Label, PointerState, UiComponent, UiEvent};
pub use draw::{DrawList, DrawQuad, Rect};
pub use font::{load_font, BitmapFont};
pub use layout::{load_layout, parse_layout};
