//! Model render pipeline and uniform layouts
//!
//! Two pipeline variants share one shader and layout: opaque geometry
//! writes depth, transparent geometry blends with depth writes off and is
//! drawn after all opaque groups.

use crate::vertex::ModelVertex;
use bytemuck::{Pod, Zeroable};
use kiln_import::MtlMaterial;

/// Per-frame uniform buffer data (bind group 0)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub _pad0: f32,
    pub light_dir: [f32; 3],
    pub _pad1: f32,
}

impl FrameUniforms {
    pub fn new() -> Self {
        let identity = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        Self {
            view_proj: identity,
            model: identity,
            camera_pos: [0.0, 0.0, 0.0],
            _pad0: 0.0,
            light_dir: [0.4, 1.0, 0.6],
            _pad1: 0.0,
        }
    }
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-material uniform buffer data (bind group 1)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MaterialUniforms {
    pub ambient: [f32; 3],
    pub specular_exponent: f32,
    pub diffuse: [f32; 3],
    pub alpha: f32,
    pub specular: [f32; 3],
    pub has_diffuse_map: u32,
    pub has_specular_map: u32,
    pub _pad: [u32; 3],
}

impl MaterialUniforms {
    /// Uniforms for an MTL material, with flags for which maps are bound
    pub fn from_material(
        material: &MtlMaterial,
        has_diffuse_map: bool,
        has_specular_map: bool,
    ) -> Self {
        Self {
            ambient: material.ambient,
            specular_exponent: material.specular_exponent,
            diffuse: material.diffuse,
            alpha: material.alpha,
            specular: material.specular,
            has_diffuse_map: has_diffuse_map as u32,
            has_specular_map: has_specular_map as u32,
            _pad: [0; 3],
        }
    }
}

impl Default for MaterialUniforms {
    fn default() -> Self {
        Self::from_material(&MtlMaterial::new("default"), false, false)
    }
}

/// The model render pipeline (opaque and transparent variants)
pub struct ModelPipeline {
    pub opaque: wgpu::RenderPipeline,
    pub transparent: wgpu::RenderPipeline,
    pub frame_bind_group_layout: wgpu::BindGroupLayout,
    pub material_bind_group_layout: wgpu::BindGroupLayout,
}

impl ModelPipeline {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Model Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("model.wgsl").into()),
        });

        // Bind group 0: frame uniforms (vertex + fragment)
        let frame_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("Frame Bind Group Layout"),
            });

        // Bind group 1: material uniforms + textures (fragment only)
        let material_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[
                    // binding 0: MaterialUniforms
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    // binding 1: diffuse_texture
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
                    // binding 2: diffuse_sampler
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                    // binding 3: specular_texture
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    // binding 4: specular_sampler
                    wgpu::BindGroupLayoutEntry {
                        binding: 4,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
                label: Some("Material Bind Group Layout"),
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Model Pipeline Layout"),
            bind_group_layouts: &[&frame_bind_group_layout, &material_bind_group_layout],
            push_constant_ranges: &[],
        });

        let make_pipeline = |label: &str, depth_write: bool, blend: Option<wgpu::BlendState>| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[ModelVertex::desc()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    // OBJ exports mix winding orders; draw both sides
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: wgpu::TextureFormat::Depth32Float,
                    depth_write_enabled: depth_write,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let opaque = make_pipeline("Opaque Model Pipeline", true, None);
        let transparent = make_pipeline(
            "Transparent Model Pipeline",
            false,
            Some(wgpu::BlendState::ALPHA_BLENDING),
        );

        Self {
            opaque,
            transparent,
            frame_bind_group_layout,
            material_bind_group_layout,
        }
    }
}
