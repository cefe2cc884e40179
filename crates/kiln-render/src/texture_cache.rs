//! GPU texture cache keyed by file path
//!
//! Textures load lazily from disk. A failed load is remembered so the file
//! is not retried every frame, and the caller falls back to the built-in
//! 1x1 white texture.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use wgpu::util::DeviceExt;

/// A GPU-resident texture with its view and sampler
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// Cache of GPU textures, keyed by source path
pub struct TextureCache {
    textures: HashMap<PathBuf, GpuTexture>,
    failed: HashSet<PathBuf>,
    /// 1x1 white texture (fallback for unbound maps)
    pub white: GpuTexture,
}

impl TextureCache {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let white = Self::create_1x1(device, queue, [255, 255, 255, 255], "Default White");

        Self {
            textures: HashMap::new(),
            failed: HashSet::new(),
            white,
        }
    }

    fn create_1x1(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color: [u8; 4],
        label: &str,
    ) -> GpuTexture {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: 1,
                    height: 1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &color,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        GpuTexture {
            texture,
            view,
            sampler,
        }
    }

    /// Load a texture from disk, or return the cached copy. `srgb` selects
    /// the color-space format (color maps yes, data maps no). Returns `None`
    /// if the file could not be decoded; the failure is remembered.
    pub fn get_or_load(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        srgb: bool,
    ) -> Option<&GpuTexture> {
        if self.failed.contains(path) {
            return None;
        }

        if !self.textures.contains_key(path) {
            let img = match image::open(path) {
                Ok(img) => img,
                Err(e) => {
                    eprintln!("Failed to load texture '{}': {}", path.display(), e);
                    self.failed.insert(path.to_path_buf());
                    return None;
                }
            };
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();

            let format = if srgb {
                wgpu::TextureFormat::Rgba8UnormSrgb
            } else {
                wgpu::TextureFormat::Rgba8Unorm
            };

            let label = path.display().to_string();
            let texture = device.create_texture_with_data(
                queue,
                &wgpu::TextureDescriptor {
                    label: Some(&label),
                    size: wgpu::Extent3d {
                        width,
                        height,
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                    view_formats: &[],
                },
                wgpu::util::TextureDataOrder::LayerMajor,
                &rgba,
            );

            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some(&format!("{} Sampler", label)),
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::FilterMode::Linear,
                address_mode_u: wgpu::AddressMode::Repeat,
                address_mode_v: wgpu::AddressMode::Repeat,
                ..Default::default()
            });

            self.textures.insert(
                path.to_path_buf(),
                GpuTexture {
                    texture,
                    view,
                    sampler,
                },
            );
        }

        self.textures.get(path)
    }

    /// Get a cached texture without loading
    pub fn get(&self, path: &Path) -> Option<&GpuTexture> {
        self.textures.get(path)
    }
}
