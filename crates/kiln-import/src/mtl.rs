//! MTL material library parser
//!
//! Recognizes `newmtl`, `Ka`/`Kd`/`Ks`, `Ns`, `d`/`Tr`, and the texture map
//! directives `map_Kd`, `map_Bump`/`bump`, `map_Ks`. Texture paths may
//! contain spaces (the remaining tokens are rejoined) and are resolved
//! against the library's own directory. Directives appearing before any
//! `newmtl` are ignored, and lines with unparsable numbers are skipped with
//! a warning, matching the OBJ parser's resilience policy.

use crate::types::{ImportWarning, MtlLibrary, MtlMaterial};
use kiln_core::Result;
use std::path::Path;

/// Parse MTL text. `base_dir` is the directory texture paths resolve against.
pub fn parse_mtl(source: &str, base_dir: &Path) -> Result<MtlLibrary> {
    let mut library = MtlLibrary::default();
    let mut current: Option<MtlMaterial> = None;

    for (line_no, raw) in source.lines().enumerate() {
        let line_no = line_no + 1;
        let parts: Vec<&str> = raw.split_whitespace().collect();
        let Some(&directive) = parts.first() else {
            continue;
        };

        match directive {
            "newmtl" => {
                if parts.len() > 1 {
                    if let Some(finished) = current.take() {
                        library.materials.insert(finished.name.clone(), finished);
                    }
                    current = Some(MtlMaterial::new(parts[1]));
                }
            }
            "Ka" | "Kd" | "Ks" => {
                let Some(material) = current.as_mut() else {
                    continue;
                };
                match parse_color(&parts[1..]) {
                    Some(color) => match directive {
                        "Ka" => material.ambient = color,
                        "Kd" => material.diffuse = color,
                        _ => material.specular = color,
                    },
                    None => library.warnings.push(ImportWarning::new(
                        line_no,
                        format!("invalid color: '{}'", raw.trim()),
                    )),
                }
            }
            "Ns" => {
                let Some(material) = current.as_mut() else {
                    continue;
                };
                match parts.get(1).and_then(|t| t.parse::<f32>().ok()) {
                    Some(exponent) => material.specular_exponent = exponent,
                    None => library.warnings.push(ImportWarning::new(
                        line_no,
                        format!("invalid specular exponent: '{}'", raw.trim()),
                    )),
                }
            }
            // `d` is opacity directly; `Tr` is transmittance, stored inverted
            "d" | "Tr" => {
                let Some(material) = current.as_mut() else {
                    continue;
                };
                match parts.get(1).and_then(|t| t.parse::<f32>().ok()) {
                    Some(value) => {
                        material.alpha = if directive == "Tr" { 1.0 - value } else { value };
                    }
                    None => library.warnings.push(ImportWarning::new(
                        line_no,
                        format!("invalid alpha: '{}'", raw.trim()),
                    )),
                }
            }
            "map_Kd" => {
                if let (Some(material), Some(path)) =
                    (current.as_mut(), join_path(&parts[1..], base_dir))
                {
                    material.diffuse_map = Some(path);
                }
            }
            "map_Bump" | "bump" => {
                if let (Some(material), Some(path)) =
                    (current.as_mut(), join_path(&parts[1..], base_dir))
                {
                    material.normal_map = Some(path);
                }
            }
            "map_Ks" => {
                if let (Some(material), Some(path)) =
                    (current.as_mut(), join_path(&parts[1..], base_dir))
                {
                    material.specular_map = Some(path);
                }
            }
            _ => {}
        }
    }

    if let Some(finished) = current.take() {
        library.materials.insert(finished.name.clone(), finished);
    }

    Ok(library)
}

fn parse_color(parts: &[&str]) -> Option<[f32; 3]> {
    if parts.len() < 3 {
        return None;
    }
    Some([
        parts[0].parse().ok()?,
        parts[1].parse().ok()?,
        parts[2].parse().ok()?,
    ])
}

/// Rejoin a possibly space-containing filename and resolve it.
fn join_path(parts: &[&str], base_dir: &Path) -> Option<std::path::PathBuf> {
    if parts.is_empty() {
        return None;
    }
    Some(base_dir.join(parts.join(" ")))
}
