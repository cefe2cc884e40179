//! Wavefront OBJ document parser
//!
//! Line-oriented parse of `v`/`vt`/`vn`/`f`/`mtllib`/`usemtl` directives into
//! flattened vertex arrays and a triangle index buffer. Unknown directives
//! are ignored. Lines with unparsable numeric fields are skipped with a
//! recorded warning so partial exports degrade instead of failing, while an
//! index reference pointing outside its attribute pool aborts the whole load:
//! a wrong index silently resolving to a different vertex would corrupt the
//! mesh without any visible error.

use crate::mtl::parse_mtl;
use crate::types::{ImportOptions, ImportWarning, MaterialGroup, ObjGeometry, ObjImport};
use kiln_core::{KilnError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One face vertex reference: 1-based position index plus optional
/// texcoord/normal indices. Two references with the same key share one
/// flattened vertex; keys differing in any component get distinct vertices.
type FaceRef = (i64, Option<i64>, Option<i64>);

/// Import an OBJ file and its `mtllib` companion with default options.
pub fn import_obj<P: AsRef<Path>>(path: P) -> Result<ObjImport> {
    import_obj_with_options(path, ImportOptions::default())
}

/// Import an OBJ file and its `mtllib` companion.
///
/// A missing OBJ or MTL file is fatal. Texture maps named by the MTL are
/// not touched here; the renderer loads them and tolerates failures.
pub fn import_obj_with_options<P: AsRef<Path>>(
    path: P,
    options: ImportOptions,
) -> Result<ObjImport> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|_| {
        KilnError::ResourceNotFound(format!("could not read OBJ file: {}", path.display()))
    })?;

    let mut geometry = parse_obj(&source, options)?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let materials = match &geometry.mtl_file {
        Some(name) => {
            let mtl_path = base_dir.join(name);
            let mtl_source = fs::read_to_string(&mtl_path).map_err(|_| {
                KilnError::ResourceNotFound(format!(
                    "could not read MTL file: {}",
                    mtl_path.display()
                ))
            })?;
            // Texture paths resolve against the MTL's own directory
            let tex_base = mtl_path.parent().unwrap_or(base_dir);
            let library = parse_mtl(&mtl_source, tex_base)?;
            geometry.warnings.extend(
                library
                    .warnings
                    .into_iter()
                    .map(|w| ImportWarning::new(w.line, format!("{}: {}", name, w.message))),
            );
            library.materials
        }
        None => HashMap::new(),
    };

    Ok(ObjImport {
        geometry,
        materials,
    })
}

/// Parse OBJ text into flattened geometry.
pub fn parse_obj(source: &str, options: ImportOptions) -> Result<ObjGeometry> {
    let mut pools = AttributePools::default();
    let mut flat = Flattener::default();
    let mut warnings: Vec<ImportWarning> = Vec::new();
    let mut groups: Vec<MaterialGroup> = Vec::new();
    let mut mtl_file: Option<String> = None;

    let mut current_material: Option<String> = None;
    let mut group_start = 0usize;

    let mut face_count = 0usize;
    let mut warned_vertices = false;
    let mut warned_faces = false;

    for (line_no, raw) in source.lines().enumerate() {
        let line_no = line_no + 1;
        let parts: Vec<&str> = raw.split_whitespace().collect();
        let Some(&directive) = parts.first() else {
            continue;
        };

        match directive {
            "v" => match parse_floats::<3>(&parts[1..]) {
                Some(v) => {
                    pools.positions.push(v);
                    if !warned_vertices && pools.positions.len() > options.vertex_warn_threshold {
                        warned_vertices = true;
                        warnings.push(ImportWarning::new(
                            line_no,
                            format!(
                                "large model: more than {} vertices, loading may be slow",
                                options.vertex_warn_threshold
                            ),
                        ));
                    }
                }
                None => warnings.push(ImportWarning::new(
                    line_no,
                    format!("invalid vertex position: '{}'", raw.trim()),
                )),
            },
            "vt" => match parse_floats::<2>(&parts[1..]) {
                // V is flipped to match the top-left texture origin
                Some([u, v]) => pools.texcoords.push([u, 1.0 - v]),
                None => warnings.push(ImportWarning::new(
                    line_no,
                    format!("invalid texture coordinate: '{}'", raw.trim()),
                )),
            },
            "vn" => match parse_floats::<3>(&parts[1..]) {
                Some(n) => pools.normals.push(n),
                None => warnings.push(ImportWarning::new(
                    line_no,
                    format!("invalid normal: '{}'", raw.trim()),
                )),
            },
            "mtllib" => {
                if parts.len() > 1 {
                    mtl_file = Some(parts[1..].join(" "));
                }
            }
            "usemtl" => {
                if parts.len() > 1 {
                    seal_group(&mut groups, &current_material, group_start, flat.indices.len());
                    current_material = Some(parts[1].to_string());
                    group_start = flat.indices.len();
                }
            }
            "f" => {
                if parts.len() < 4 {
                    warnings.push(ImportWarning::new(
                        line_no,
                        format!("face needs at least 3 vertex references: '{}'", raw.trim()),
                    ));
                    continue;
                }

                let mut refs: Vec<FaceRef> = Vec::with_capacity(parts.len() - 1);
                let mut malformed = false;
                for token in &parts[1..] {
                    match parse_face_ref(token) {
                        Some(r) => refs.push(r),
                        None => {
                            warnings.push(ImportWarning::new(
                                line_no,
                                format!("unparsable vertex reference '{}'", token),
                            ));
                            malformed = true;
                            break;
                        }
                    }
                }
                if malformed {
                    continue;
                }

                face_count += 1;
                if !warned_faces && face_count > options.face_warn_threshold {
                    warned_faces = true;
                    warnings.push(ImportWarning::new(
                        line_no,
                        format!(
                            "large model: more than {} faces, loading may be slow",
                            options.face_warn_threshold
                        ),
                    ));
                }

                let mut face_indices = Vec::with_capacity(refs.len());
                for r in refs {
                    face_indices.push(flat.resolve(&pools, r, line_no)?);
                }

                if face_indices.len() == 3 {
                    flat.indices.extend_from_slice(&face_indices);
                } else {
                    // Fan triangulation: exact for convex polygons
                    for i in 1..face_indices.len() - 1 {
                        flat.indices.push(face_indices[0]);
                        flat.indices.push(face_indices[i]);
                        flat.indices.push(face_indices[i + 1]);
                    }
                }
            }
            _ => {}
        }
    }

    seal_group(&mut groups, &current_material, group_start, flat.indices.len());

    Ok(ObjGeometry {
        positions: flat.positions,
        texcoords: flat.texcoords,
        normals: flat.normals,
        indices: flat.indices,
        groups,
        mtl_file,
        has_texcoords: !pools.texcoords.is_empty(),
        has_normals: !pools.normals.is_empty(),
        warnings,
    })
}

/// Close the open material group if any indices were emitted since it opened.
fn seal_group(
    groups: &mut Vec<MaterialGroup>,
    current: &Option<String>,
    start: usize,
    end: usize,
) {
    if let Some(name) = current {
        if end > start {
            groups.push(MaterialGroup {
                material: name.clone(),
                start_index: start as u32,
                index_count: (end - start) as u32,
            });
        }
    }
}

/// Raw 1-based attribute records in document order
#[derive(Default)]
struct AttributePools {
    positions: Vec<[f32; 3]>,
    texcoords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
}

/// Builds the deduplicated output arrays, assigning dense flat indices in
/// first-seen order.
#[derive(Default)]
struct Flattener {
    positions: Vec<f32>,
    texcoords: Vec<f32>,
    normals: Vec<f32>,
    indices: Vec<u32>,
    seen: HashMap<FaceRef, u32>,
}

impl Flattener {
    /// Map a face reference to its flat index, appending one aligned entry
    /// to each output array on first encounter. Sub-indices absent from the
    /// reference get neutral defaults so the arrays stay index-aligned.
    fn resolve(&mut self, pools: &AttributePools, key: FaceRef, line: usize) -> Result<u32> {
        if let Some(&idx) = self.seen.get(&key) {
            return Ok(idx);
        }

        let (pi, ti, ni) = key;

        let position = lookup(&pools.positions, pi, "position", line)?;
        self.positions.extend_from_slice(&position);

        match ti {
            Some(t) => {
                let uv = lookup(&pools.texcoords, t, "texture coordinate", line)?;
                self.texcoords.extend_from_slice(&uv);
            }
            None => self.texcoords.extend_from_slice(&[0.0, 0.0]),
        }

        match ni {
            Some(n) => {
                let normal = lookup(&pools.normals, n, "normal", line)?;
                self.normals.extend_from_slice(&normal);
            }
            None => self.normals.extend_from_slice(&[0.0, 1.0, 0.0]),
        }

        let idx = (self.positions.len() / 3 - 1) as u32;
        self.seen.insert(key, idx);
        Ok(idx)
    }
}

/// Bounds-checked 1-based pool lookup.
fn lookup<const N: usize>(
    pool: &[[f32; N]],
    index: i64,
    what: &str,
    line: usize,
) -> Result<[f32; N]> {
    if index < 1 || index as usize > pool.len() {
        return Err(KilnError::MalformedGeometry(format!(
            "{} index {} out of bounds at line {} (pool holds {})",
            what,
            index,
            line,
            pool.len()
        )));
    }
    Ok(pool[(index - 1) as usize])
}

/// Parse a `p`, `p/t`, `p//n`, or `p/t/n` face token. Fields beyond the
/// third are ignored.
fn parse_face_ref(token: &str) -> Option<FaceRef> {
    let mut fields = token.split('/');

    let position = fields.next()?.parse::<i64>().ok()?;

    let texcoord = match fields.next() {
        Some("") | None => None,
        Some(t) => Some(t.parse::<i64>().ok()?),
    };

    let normal = match fields.next() {
        Some("") | None => None,
        Some(n) => Some(n.parse::<i64>().ok()?),
    };

    Some((position, texcoord, normal))
}

fn parse_floats<const N: usize>(parts: &[&str]) -> Option<[f32; N]> {
    if parts.len() < N {
        return None;
    }
    let mut out = [0.0f32; N];
    for i in 0..N {
        out[i] = parts[i].parse().ok()?;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImportOptions;

    fn parse(source: &str) -> ObjGeometry {
        parse_obj(source, ImportOptions::default()).expect("parse failed")
    }

    #[test]
    fn quad_face_fan_triangulates_into_two_triangles() {
        let geometry = parse(
            "v 0 0 0\n\
             v 1 0 0\n\
             v 1 1 0\n\
             v 0 1 0\n\
             f 1 2 3 4\n",
        );

        assert_eq!(geometry.vertex_count(), 4);
        assert_eq!(geometry.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn triangle_face_emits_one_triangle_in_order() {
        let geometry = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        assert_eq!(geometry.indices, vec![0, 1, 2]);
        assert_eq!(geometry.triangle_count(), 1);
    }

    #[test]
    fn ngon_fan_shares_first_reference() {
        let mut source = String::new();
        for i in 0..6 {
            source.push_str(&format!("v {} 0 0\n", i));
        }
        source.push_str("f 1 2 3 4 5 6\n");

        let geometry = parse(&source);
        // n - 2 triangles, every one anchored at the first vertex
        assert_eq!(geometry.triangle_count(), 4);
        for triangle in geometry.indices.chunks_exact(3) {
            assert_eq!(triangle[0], 0);
        }
        assert_eq!(geometry.indices, vec![0, 1, 2, 0, 2, 3, 0, 3, 4, 0, 4, 5]);
    }

    #[test]
    fn identical_keys_reuse_one_flattened_vertex() {
        let geometry = parse(
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
             vn 0 0 1\n\
             f 1/1/1 2/2/1 3/3/1\n\
             f 1/1/1 3/3/1 4/4/1\n",
        );

        assert_eq!(geometry.vertex_count(), 4);
        assert_eq!(geometry.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn distinct_keys_sharing_a_position_get_distinct_vertices() {
        let geometry = parse(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\n\
             vt 0 0\nvt 1 1\n\
             f 1/1 2/1 3/1\n\
             f 1/2 2/2 3/2\n",
        );

        // Same positions, different texcoord indices: six flattened vertices
        assert_eq!(geometry.vertex_count(), 6);
        assert_eq!(geometry.indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn flat_indices_assigned_in_first_seen_order() {
        let geometry = parse(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\n\
             f 3 1 2\n\
             f 2 4 3\n",
        );

        // First face sees pool entries 3, 1, 2 -> flat 0, 1, 2
        assert_eq!(geometry.indices, vec![0, 1, 2, 2, 3, 0]);
        assert_eq!(&geometry.positions[0..3], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn flattened_arrays_stay_index_aligned() {
        let geometry = parse(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\n\
             vt 0.5 0.5\n\
             vn 0 0 1\n\
             f 1/1/1 2 3//1\n",
        );

        let n = geometry.vertex_count();
        assert_eq!(geometry.texcoords.len(), n * 2);
        assert_eq!(geometry.normals.len(), n * 3);

        // Second reference had no texcoord/normal: neutral defaults
        assert_eq!(&geometry.texcoords[2..4], &[0.0, 0.0]);
        assert_eq!(&geometry.normals[3..6], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn texture_v_coordinate_is_flipped() {
        let geometry = parse(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\n\
             vt 0.2 0.3\n\
             f 1/1 2/1 3/1\n",
        );
        assert_eq!(&geometry.texcoords[0..2], &[0.2, 0.7]);
    }

    #[test]
    fn malformed_position_line_is_skipped_and_recorded() {
        let geometry = parse(
            "v 0 0 0\n\
             v 1.0 abc 3.0\n\
             v 1 0 0\n\
             v 0 1 0\n\
             f 1 2 3\n",
        );

        // The bad line contributes nothing to the pool
        assert_eq!(geometry.vertex_count(), 3);
        assert_eq!(geometry.warnings.len(), 1);
        assert_eq!(geometry.warnings[0].line, 2);
    }

    #[test]
    fn malformed_face_reference_skips_the_face() {
        let geometry = parse(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\n\
             f 1 2 x\n\
             f 1 2 3\n",
        );

        assert_eq!(geometry.triangle_count(), 1);
        assert_eq!(geometry.warnings.len(), 1);
    }

    #[test]
    fn face_with_too_few_references_is_skipped() {
        let geometry = parse("v 0 0 0\nv 1 0 0\nf 1 2\n");
        assert!(geometry.indices.is_empty());
        assert_eq!(geometry.warnings.len(), 1);
    }

    #[test]
    fn position_index_out_of_bounds_aborts_the_load() {
        let result = parse_obj("v 0 0 0\nf 1 2 3\n", ImportOptions::default());
        assert!(matches!(result, Err(KilnError::MalformedGeometry(_))));
    }

    #[test]
    fn negative_position_index_aborts_the_load() {
        let result = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -1 2 3\n", ImportOptions::default());
        assert!(matches!(result, Err(KilnError::MalformedGeometry(_))));
    }

    #[test]
    fn texcoord_index_out_of_bounds_aborts_the_load() {
        let result = parse_obj(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1/1 2/9 3/1\n",
            ImportOptions::default(),
        );
        assert!(matches!(result, Err(KilnError::MalformedGeometry(_))));
    }

    #[test]
    fn normal_index_out_of_bounds_aborts_the_load() {
        let result = parse_obj(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 1 0\nf 1//1 2//9 3//1\n",
            ImportOptions::default(),
        );
        assert!(matches!(result, Err(KilnError::MalformedGeometry(_))));
    }

    #[test]
    fn two_usemtl_boundaries_partition_the_index_buffer() {
        let geometry = parse(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\n\
             usemtl stone\n\
             f 1 2 3 4\n\
             usemtl glass\n\
             f 1 2 3\n",
        );

        assert_eq!(geometry.groups.len(), 2);
        assert_eq!(geometry.groups[0].material, "stone");
        assert_eq!(geometry.groups[0].start_index, 0);
        assert_eq!(geometry.groups[0].index_count, 6);
        assert_eq!(geometry.groups[1].material, "glass");
        assert_eq!(geometry.groups[1].start_index, 6);
        assert_eq!(geometry.groups[1].index_count, 3);
        assert_eq!(geometry.indices.len(), 9);
    }

    #[test]
    fn usemtl_without_faces_produces_no_group() {
        let geometry = parse(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\n\
             usemtl unused\n\
             usemtl stone\n\
             f 1 2 3\n",
        );

        assert_eq!(geometry.groups.len(), 1);
        assert_eq!(geometry.groups[0].material, "stone");
    }

    #[test]
    fn faces_before_first_usemtl_stay_ungrouped() {
        let geometry = parse(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\n\
             f 1 2 3\n\
             usemtl stone\n\
             f 1 2 3\n",
        );

        // Both faces are in the index buffer, only one is grouped
        assert_eq!(geometry.indices.len(), 6);
        assert_eq!(geometry.groups.len(), 1);
        assert_eq!(geometry.groups[0].start_index, 3);
        let grouped: u32 = geometry.groups.iter().map(|g| g.index_count).sum();
        assert!(grouped as usize <= geometry.indices.len());
    }

    #[test]
    fn groups_never_overlap() {
        let geometry = parse(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\n\
             usemtl a\nf 1 2 3\n\
             usemtl b\nf 1 2 3\n\
             usemtl c\nf 1 2 3\n",
        );

        let mut end = 0;
        for group in &geometry.groups {
            assert!(group.start_index >= end);
            end = group.start_index + group.index_count;
        }
        assert_eq!(end as usize, geometry.indices.len());
    }

    #[test]
    fn unknown_directives_and_blank_lines_are_ignored() {
        let geometry = parse(
            "# exported by hand\n\
             o cube\n\
             s off\n\
             \n\
             v 0 0 0\nv 1 0 0\nv 0 1 0\n\
             f 1 2 3\n",
        );

        assert!(geometry.warnings.is_empty());
        assert_eq!(geometry.triangle_count(), 1);
    }

    #[test]
    fn mtllib_reference_is_captured() {
        let geometry = parse("mtllib my model.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        assert_eq!(geometry.mtl_file.as_deref(), Some("my model.mtl"));
    }

    #[test]
    fn soft_vertex_threshold_warns_once() {
        let options = ImportOptions {
            vertex_warn_threshold: 2,
            face_warn_threshold: 200_000,
        };
        let geometry =
            parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf 1 2 3\n", options).unwrap();

        let large: Vec<_> = geometry
            .warnings
            .iter()
            .filter(|w| w.message.contains("large model"))
            .collect();
        assert_eq!(large.len(), 1);
        assert_eq!(geometry.vertex_count(), 3);
    }

    #[test]
    fn attribute_presence_flags_reflect_the_document() {
        let with_all = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 2/1/1 3/1/1\n");
        assert!(with_all.has_texcoords);
        assert!(with_all.has_normals);

        let bare = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        assert!(!bare.has_texcoords);
        assert!(!bare.has_normals);
    }

    #[test]
    fn import_resolves_mtllib_next_to_the_obj() {
        let dir = std::env::temp_dir().join(format!(
            "kiln-import-test-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .subsec_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();

        std::fs::write(
            dir.join("cube.obj"),
            "mtllib cube.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl stone\nf 1 2 3\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("cube.mtl"),
            "newmtl stone\nKd 0.5 0.5 0.5\nmap_Kd stone diffuse.png\n",
        )
        .unwrap();

        let import = import_obj(dir.join("cube.obj")).unwrap();
        assert_eq!(import.geometry.groups.len(), 1);
        let stone = import.materials.get("stone").unwrap();
        assert_eq!(stone.diffuse, [0.5, 0.5, 0.5]);
        assert_eq!(
            stone.diffuse_map.as_deref(),
            Some(dir.join("stone diffuse.png").as_path())
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn import_fails_on_missing_obj() {
        let result = import_obj("/nonexistent/model.obj");
        assert!(matches!(result, Err(KilnError::ResourceNotFound(_))));
    }

    #[test]
    fn import_fails_on_missing_mtl() {
        let dir = std::env::temp_dir().join(format!(
            "kiln-import-missing-mtl-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("model.obj"),
            "mtllib gone.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        )
        .unwrap();

        let result = import_obj(dir.join("model.obj"));
        assert!(matches!(result, Err(KilnError::ResourceNotFound(_))));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
