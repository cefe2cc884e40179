//! Kiln Import - Wavefront OBJ/MTL model importer
//!
//! Parses OBJ geometry into flattened, deduplicated vertex arrays with a
//! triangle index buffer and per-material draw ranges, plus the companion
//! MTL material library. The importer is pure CPU: texture map directives
//! resolve to file paths, and GPU upload is the renderer's job.

mod mtl;
mod obj;
mod types;

pub use mtl::parse_mtl;
pub use obj::{import_obj, import_obj_with_options, parse_obj};
pub use types::{
    ImportOptions, ImportWarning, MaterialGroup, MeshBounds, MtlLibrary, MtlMaterial, ObjGeometry,
    ObjImport,
};
