use std::path::Path;
use std::sync::Arc;

use crate::error::{RenderError, Result};
use crate::material::Material;
use crate::math::Point3;
use crate::primitive::{Face, TriangleMesh};

/// Loads every shape in an OBJ file as a `TriangleMesh`, one mesh per
/// shape, all sharing the file's material. Shapes are never triangulated
/// on load — a shape containing any non-triangular face is skipped and
/// logged rather than rejecting the whole file.
pub fn load_meshes(path: &Path, material: Material) -> Result<Vec<TriangleMesh>> {
    let load_options = tobj::LoadOptions {
        triangulate: false,
        single_index: true,
        ..Default::default()
    };

    let (models, _materials) =
        tobj::load_obj(path, &load_options).map_err(|source| RenderError::MeshLoad {
            path: path.to_path_buf(),
            source,
        })?;

    let mut meshes = Vec::new();
    for model in models {
        let mesh = &model.mesh;

        if !mesh.face_arities.is_empty() && mesh.face_arities.iter().any(|&n| n != 3) {
            log::warn!(
                "skipping shape '{}' in {}: contains non-triangular faces",
                model.name,
                path.display()
            );
            continue;
        }

        if mesh.indices.len() % 3 != 0 {
            log::warn!(
                "skipping shape '{}' in {}: index count {} is not a multiple of 3",
                model.name,
                path.display(),
                mesh.indices.len()
            );
            continue;
        }

        let vertices: Vec<Point3> = mesh
            .positions
            .chunks_exact(3)
            .map(|p| Point3::new(p[0] as f64, p[1] as f64, p[2] as f64))
            .collect();

        let faces: Vec<Face> = mesh
            .indices
            .chunks_exact(3)
            .map(|tri| Face {
                indices: [tri[0], tri[1], tri[2]],
            })
            .collect();

        log::info!(
            "loaded shape '{}' from {}: {} vertices, {} faces",
            model.name,
            path.display(),
            vertices.len(),
            faces.len()
        );

        meshes.push(TriangleMesh::new(Arc::new(vertices), faces, material.clone()));
    }

    Ok(meshes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Color;
    use std::io::Write;

    #[test]
    fn loads_a_single_triangle() {
        let dir = std::env::temp_dir();
        let path = dir.join("octant_trace_test_triangle.obj");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "v 0 0 0").unwrap();
        writeln!(file, "v 1 0 0").unwrap();
        writeln!(file, "v 0 1 0").unwrap();
        writeln!(file, "f 1 2 3").unwrap();
        drop(file);

        let material = Material::lambert(Color::new(0.5, 0.5, 0.5));
        let meshes = load_meshes(&path, material).expect("loads obj");
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].faces.len(), 1);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn skips_shape_with_non_triangular_face() {
        let dir = std::env::temp_dir();
        let path = dir.join("octant_trace_test_quad.obj");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "v 0 0 0").unwrap();
        writeln!(file, "v 1 0 0").unwrap();
        writeln!(file, "v 1 1 0").unwrap();
        writeln!(file, "v 0 1 0").unwrap();
        writeln!(file, "f 1 2 3 4").unwrap();
        drop(file);

        let material = Material::lambert(Color::new(0.5, 0.5, 0.5));
        let meshes = load_meshes(&path, material).expect("load succeeds, shape skipped");
        assert!(meshes.is_empty());

        std::fs::remove_file(&path).ok();
    }
}
