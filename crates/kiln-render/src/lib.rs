//! Kiln Render - wgpu-based model viewer renderer
//!
//! Renders imported OBJ models with Blinn-Phong shading: one draw group per
//! material range, opaque groups first, transparent groups blended on top.
//! A separate overlay pipeline draws the UI crate's quad list in pixel space.

mod camera;
mod context;
mod model;
mod overlay;
mod pipeline;
mod texture_cache;
mod vertex;

pub use camera::FlyCamera;
pub use context::RenderContext;
pub use model::{interleave_vertices, DrawGroup, GpuModel};
pub use overlay::{tessellate, OverlayPipeline, OverlayVertex, ScreenUniforms};
pub use pipeline::{FrameUniforms, MaterialUniforms, ModelPipeline};
pub use texture_cache::{GpuTexture, TextureCache};
pub use vertex::ModelVertex;

#[cfg(test)]
mod tests {
    #[test]
    fn model_wgsl_parses() {
        let source = include_str!("model.wgsl");
        naga::front::wgsl::parse_str(source).expect("model.wgsl failed to parse");
    }

    #[test]
    fn ui_wgsl_parses() {
        let source = include_str!("ui.wgsl");
        naga::front::wgsl::parse_str(source).expect("ui.wgsl failed to parse");
    }
}
