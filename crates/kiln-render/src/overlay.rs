//! 2D overlay pipeline
//!
//! Draws the UI crate's quad list over the 3D scene. Quads arrive in pixel
//! coordinates and are converted to clip space in the vertex shader using a
//! screen-size uniform. Glyph quads sample the font atlas; fills do not.
//! Vertices are rebuilt each frame with `prepare` before the render pass
//! records `draw`.

use bytemuck::{Pod, Zeroable};
use kiln_ui::DrawList;
use wgpu::util::DeviceExt;

use crate::texture_cache::GpuTexture;

/// Screen size uniform for pixel-to-clip conversion
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ScreenUniforms {
    pub size: [f32; 2],
    pub _pad: [f32; 2],
}

/// One overlay vertex in pixel space. `flags` bit 0 selects atlas sampling.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct OverlayVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
    pub flags: u32,
}

impl OverlayVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32x2,
        2 => Float32x4,
        3 => Uint32,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<OverlayVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// The overlay render pipeline and its per-frame vertex data
pub struct OverlayPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub bind_group_layout: wgpu::BindGroupLayout,
    screen_buffer: wgpu::Buffer,
    vertex_buffer: Option<wgpu::Buffer>,
    vertex_count: u32,
}

impl OverlayPipeline {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Overlay Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("ui.wgsl").into()),
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[
                    // binding 0: ScreenUniforms
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    // binding 1: font atlas
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    // binding 2: atlas sampler
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
                label: Some("Overlay Bind Group Layout"),
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Overlay Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Overlay Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[OverlayVertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            // Shares the pass with 3D geometry; always on top, never writes depth
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let screen_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Screen Uniforms"),
            contents: bytemuck::bytes_of(&ScreenUniforms {
                size: [1.0, 1.0],
                _pad: [0.0, 0.0],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            pipeline,
            bind_group_layout,
            screen_buffer,
            vertex_buffer: None,
            vertex_count: 0,
        }
    }

    /// Create the overlay bind group against a font atlas texture.
    pub fn create_bind_group(&self, device: &wgpu::Device, font: &GpuTexture) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Overlay Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.screen_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&font.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&font.sampler),
                },
            ],
        })
    }

    /// Update the screen-size uniform after a resize.
    pub fn set_screen_size(&self, queue: &wgpu::Queue, width: u32, height: u32) {
        let uniforms = ScreenUniforms {
            size: [width.max(1) as f32, height.max(1) as f32],
            _pad: [0.0, 0.0],
        };
        queue.write_buffer(&self.screen_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Rebuild the vertex buffer from this frame's draw list.
    pub fn prepare(&mut self, device: &wgpu::Device, list: &DrawList) {
        let vertices = tessellate(list);
        self.vertex_count = vertices.len() as u32;

        if vertices.is_empty() {
            self.vertex_buffer = None;
            return;
        }

        self.vertex_buffer = Some(device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("Overlay Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        ));
    }

    /// Record the overlay draw using the vertices from the last `prepare`.
    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, bind_group: &'a wgpu::BindGroup) {
        let Some(vertex_buffer) = &self.vertex_buffer else {
            return;
        };
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}

/// Expand each quad into two triangles (six vertices).
pub fn tessellate(list: &DrawList) -> Vec<OverlayVertex> {
    let mut vertices = Vec::with_capacity(list.quads.len() * 6);

    for quad in &list.quads {
        let (x0, y0) = (quad.rect.x, quad.rect.y);
        let (x1, y1) = (x0 + quad.rect.width, y0 + quad.rect.height);
        let (uv, flags) = match quad.uv {
            Some(uv) => (uv, 1),
            None => ([0.0, 0.0, 0.0, 0.0], 0),
        };

        let corner = |x: f32, y: f32, u: f32, v: f32| OverlayVertex {
            position: [x, y],
            uv: [u, v],
            color: quad.color,
            flags,
        };

        let tl = corner(x0, y0, uv[0], uv[1]);
        let tr = corner(x1, y0, uv[2], uv[1]);
        let bl = corner(x0, y1, uv[0], uv[3]);
        let br = corner(x1, y1, uv[2], uv[3]);

        vertices.extend_from_slice(&[tl, bl, br, tl, br, tr]);
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_ui::Rect;

    #[test]
    fn each_quad_becomes_six_vertices() {
        let mut list = DrawList::new();
        list.push_fill(Rect::new(0.0, 0.0, 10.0, 10.0), [1.0; 4]);
        list.push_glyph(Rect::new(5.0, 5.0, 8.0, 8.0), [0.0, 0.0, 0.5, 0.5], [1.0; 4]);

        let vertices = tessellate(&list);
        assert_eq!(vertices.len(), 12);
        assert_eq!(vertices[0].flags, 0);
        assert_eq!(vertices[6].flags, 1);
    }

    #[test]
    fn quad_corners_span_the_rect() {
        let mut list = DrawList::new();
        list.push_fill(Rect::new(10.0, 20.0, 30.0, 40.0), [1.0; 4]);

        let vertices = tessellate(&list);
        let xs: Vec<f32> = vertices.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = vertices.iter().map(|v| v.position[1]).collect();
        assert!(xs.iter().all(|&x| x == 10.0 || x == 40.0));
        assert!(ys.iter().all(|&y| y == 20.0 || y == 60.0));
    }

    #[test]
    fn glyph_uvs_follow_the_atlas_rect() {
        let mut list = DrawList::new();
        list.push_glyph(
            Rect::new(0.0, 0.0, 8.0, 8.0),
            [0.25, 0.5, 0.375, 0.75],
            [1.0; 4],
        );

        let vertices = tessellate(&list);
        // First vertex is the top-left corner
        assert_eq!(vertices[0].uv, [0.25, 0.5]);
        // Third is the bottom-right
        assert_eq!(vertices[2].uv, [0.375, 0.75]);
    }

    #[test]
    fn empty_list_tessellates_to_nothing() {
        assert!(tessellate(&DrawList::new()).is_empty());
    }
}
