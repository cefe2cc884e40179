//! Import result types

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// A contiguous index-buffer range drawn with one material.
///
/// Ranges never overlap and appear in first-use order. Faces that precede
/// the first `usemtl` directive belong to no group; they stay in the index
/// buffer but a group-iterating renderer will not draw them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialGroup {
    pub material: String,
    pub start_index: u32,
    pub index_count: u32,
}

/// One diagnostic recorded while parsing. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportWarning {
    pub line: usize,
    pub message: String,
}

impl ImportWarning {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Advisory soft limits checked during parsing.
///
/// Crossing a threshold records a warning so callers can tell the user a
/// large model may be slow to load; it never fails the import.
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    pub vertex_warn_threshold: usize,
    pub face_warn_threshold: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            vertex_warn_threshold: 100_000,
            face_warn_threshold: 200_000,
        }
    }
}

/// Flattened, GPU-ready geometry produced from an OBJ document.
///
/// `positions`, `texcoords`, and `normals` are parallel arrays indexed by
/// flat vertex index: `positions.len() / 3 == texcoords.len() / 2 ==
/// normals.len() / 3`. `indices` is a stream of triangles into those arrays.
#[derive(Debug, Default)]
pub struct ObjGeometry {
    /// xyz triples
    pub positions: Vec<f32>,
    /// uv pairs, V flipped to a top-left origin on load
    pub texcoords: Vec<f32>,
    /// xyz triples
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
    pub groups: Vec<MaterialGroup>,
    /// Material library referenced by `mtllib`, if any
    pub mtl_file: Option<String>,
    /// Whether the document carried `vt` / `vn` data (the flattened arrays
    /// are always filled, with neutral defaults where the source had none)
    pub has_texcoords: bool,
    pub has_normals: bool,
    pub warnings: Vec<ImportWarning>,
}

impl ObjGeometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds over the flattened positions
    pub fn bounds(&self) -> Option<MeshBounds> {
        MeshBounds::from_flat_positions(&self.positions)
    }
}

/// A material parsed from an MTL library.
///
/// Texture map fields hold resolved file paths; decoding and GPU upload are
/// the renderer's concern, and a map that fails to load simply stays unbound.
#[derive(Debug, Clone, PartialEq)]
pub struct MtlMaterial {
    pub name: String,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub specular_exponent: f32,
    pub alpha: f32,
    pub diffuse_map: Option<PathBuf>,
    pub normal_map: Option<PathBuf>,
    pub specular_map: Option<PathBuf>,
}

impl MtlMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ambient: [0.2, 0.2, 0.2],
            diffuse: [0.8, 0.8, 0.8],
            specular: [1.0, 1.0, 1.0],
            specular_exponent: 0.0,
            alpha: 1.0,
            diffuse_map: None,
            normal_map: None,
            specular_map: None,
        }
    }

    /// Materials with alpha below 1.0 render in the transparent pass
    pub fn is_transparent(&self) -> bool {
        self.alpha < 1.0
    }
}

/// A parsed MTL library: materials by name plus parse diagnostics
#[derive(Debug, Default)]
pub struct MtlLibrary {
    pub materials: HashMap<String, MtlMaterial>,
    pub warnings: Vec<ImportWarning>,
}

/// The final import artifact: geometry plus its material map
#[derive(Debug)]
pub struct ObjImport {
    pub geometry: ObjGeometry,
    pub materials: HashMap<String, MtlMaterial>,
}

impl ObjImport {
    /// Look up the material for a group, if the library defines it
    pub fn material_for(&self, group: &MaterialGroup) -> Option<&MtlMaterial> {
        self.materials.get(&group.material)
    }
}

/// Axis-aligned bounding box computed from vertex positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshBounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl MeshBounds {
    /// Compute bounds from a flat xyz array
    pub fn from_flat_positions(positions: &[f32]) -> Option<Self> {
        let mut iter = positions.chunks_exact(3);
        let first = iter.next()?;
        let mut min = [first[0], first[1], first[2]];
        let mut max = min;
        for p in iter {
            for i in 0..3 {
                if p[i] < min[i] {
                    min[i] = p[i];
                }
                if p[i] > max[i] {
                    max[i] = p[i];
                }
            }
        }
        Some(Self { min, max })
    }

    pub fn size(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    pub fn center(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
            (self.min[2] + self.max[2]) / 2.0,
        ]
    }

    /// The largest extent along any axis
    pub fn max_extent(&self) -> f32 {
        let s = self.size();
        s[0].max(s[1]).max(s[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_from_flat_positions() {
        let positions = [0.0, 0.0, 0.0, 2.0, -1.0, 3.0, -2.0, 4.0, 1.0];
        let bounds = MeshBounds::from_flat_positions(&positions).unwrap();
        assert_eq!(bounds.min, [-2.0, -1.0, 0.0]);
        assert_eq!(bounds.max, [2.0, 4.0, 3.0]);
        assert_eq!(bounds.size(), [4.0, 5.0, 3.0]);
        assert_eq!(bounds.center(), [0.0, 1.5, 1.5]);
        assert_eq!(bounds.max_extent(), 5.0);
    }

    #[test]
    fn bounds_of_empty_positions_is_none() {
        assert!(MeshBounds::from_flat_positions(&[]).is_none());
    }

    #[test]
    fn material_defaults_match_obj_conventions() {
        let m = MtlMaterial::new("stone");
        assert_eq!(m.ambient, [0.2, 0.2, 0.2]);
        assert_eq!(m.diffuse, [0.8, 0.8, 0.8]);
        assert_eq!(m.specular, [1.0, 1.0, 1.0]);
        assert_eq!(m.alpha, 1.0);
        assert!(!m.is_transparent());
        assert!(m.diffuse_map.is_none());
    }
}
