//! Kiln Viewer - interactive OBJ model viewer
//!
//! Imports a Wavefront OBJ model with its MTL materials, renders it with
//! the Kiln wgpu renderer, and overlays a JSON-defined UI. Runs a small
//! supporting cast: per-frame clock, input state, click sounds, and a
//! background presence updater.

mod audio;
mod clock;
mod input;
mod presence;
mod viewer_app;

pub use audio::AudioPlayer;
pub use clock::FrameClock;
pub use input::InputState;
pub use presence::{LogPresence, PresenceStatus, PresenceTransport, PresenceUpdater};
pub use viewer_app::ViewerApp;
