//! GPU model upload and material-group drawing
//!
//! An imported model becomes one vertex/index buffer pair plus a draw group
//! per material range, each with its own uniform buffer and texture bind
//! group. Groups are partitioned at upload time: opaque groups draw first
//! with depth writes, transparent groups after with blending, both keeping
//! their file order within the pass.

use crate::pipeline::{MaterialUniforms, ModelPipeline};
use crate::texture_cache::TextureCache;
use crate::vertex::ModelVertex;
use kiln_import::{MaterialGroup, MtlMaterial, ObjGeometry, ObjImport};
use wgpu::util::DeviceExt;

/// One index-buffer range drawn with one material bind group
pub struct DrawGroup {
    pub material_name: String,
    pub bind_group: wgpu::BindGroup,
    pub start_index: u32,
    pub index_count: u32,
}

/// A model resident on the GPU, ready to draw
pub struct GpuModel {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub opaque_groups: Vec<DrawGroup>,
    pub transparent_groups: Vec<DrawGroup>,
}

impl GpuModel {
    /// Upload an imported model. Textures referenced by its materials load
    /// through the cache; a missing or broken map falls back to white.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline: &ModelPipeline,
        textures: &mut TextureCache,
        import: &ObjImport,
    ) -> Self {
        let vertices = interleave_vertices(&import.geometry);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model Index Buffer"),
            contents: bytemuck::cast_slice(&import.geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let default_material = MtlMaterial::new("default");
        let mut opaque_groups = Vec::new();
        let mut transparent_groups = Vec::new();

        if import.geometry.groups.is_empty() {
            // No usemtl anywhere: draw the whole buffer with the default
            let group = MaterialGroup {
                material: default_material.name.clone(),
                start_index: 0,
                index_count: import.geometry.indices.len() as u32,
            };
            opaque_groups.push(build_draw_group(
                device,
                queue,
                pipeline,
                textures,
                &group,
                &default_material,
            ));
        } else {
            for group in &import.geometry.groups {
                let material = import.material_for(group).unwrap_or(&default_material);
                let draw_group =
                    build_draw_group(device, queue, pipeline, textures, group, material);
                if material.is_transparent() {
                    transparent_groups.push(draw_group);
                } else {
                    opaque_groups.push(draw_group);
                }
            }
        }

        Self {
            vertex_buffer,
            index_buffer,
            index_count: import.geometry.indices.len() as u32,
            opaque_groups,
            transparent_groups,
        }
    }

    /// Record draw calls: all opaque groups, then all transparent groups.
    pub fn draw<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        pipeline: &'a ModelPipeline,
        frame_bind_group: &'a wgpu::BindGroup,
    ) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.set_bind_group(0, frame_bind_group, &[]);

        pass.set_pipeline(&pipeline.opaque);
        for group in &self.opaque_groups {
            pass.set_bind_group(1, &group.bind_group, &[]);
            pass.draw_indexed(
                group.start_index..group.start_index + group.index_count,
                0,
                0..1,
            );
        }

        if !self.transparent_groups.is_empty() {
            pass.set_pipeline(&pipeline.transparent);
            for group in &self.transparent_groups {
                pass.set_bind_group(1, &group.bind_group, &[]);
                pass.draw_indexed(
                    group.start_index..group.start_index + group.index_count,
                    0,
                    0..1,
                );
            }
        }
    }
}

fn build_draw_group(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    pipeline: &ModelPipeline,
    textures: &mut TextureCache,
    group: &MaterialGroup,
    material: &MtlMaterial,
) -> DrawGroup {
    let has_diffuse_map = material
        .diffuse_map
        .as_deref()
        .and_then(|p| textures.get_or_load(device, queue, p, true))
        .is_some();
    let has_specular_map = material
        .specular_map
        .as_deref()
        .and_then(|p| textures.get_or_load(device, queue, p, false))
        .is_some();

    let uniforms = MaterialUniforms::from_material(material, has_diffuse_map, has_specular_map);
    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{} Material Uniforms", material.name)),
        contents: bytemuck::bytes_of(&uniforms),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    let diffuse = material
        .diffuse_map
        .as_deref()
        .and_then(|p| textures.get(p));
    let specular = material
        .specular_map
        .as_deref()
        .and_then(|p| textures.get(p));
    let diffuse = diffuse.unwrap_or(&textures.white);
    let specular = specular.unwrap_or(&textures.white);

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{} Material Bind Group", material.name)),
        layout: &pipeline.material_bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&diffuse.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&diffuse.sampler),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(&specular.view),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::Sampler(&specular.sampler),
            },
        ],
    });

    DrawGroup {
        material_name: group.material.clone(),
        bind_group,
        start_index: group.start_index,
        index_count: group.index_count,
    }
}

/// Interleave the importer's parallel flat arrays into GPU vertices.
pub fn interleave_vertices(geometry: &ObjGeometry) -> Vec<ModelVertex> {
    (0..geometry.vertex_count())
        .map(|i| ModelVertex {
            position: [
                geometry.positions[i * 3],
                geometry.positions[i * 3 + 1],
                geometry.positions[i * 3 + 2],
            ],
            normal: [
                geometry.normals[i * 3],
                geometry.normals[i * 3 + 1],
                geometry.normals[i * 3 + 2],
            ],
            uv: [geometry.texcoords[i * 2], geometry.texcoords[i * 2 + 1]],
        })
        .collect()
}
