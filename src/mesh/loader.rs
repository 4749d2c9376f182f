// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;

use glam::Vec3;

use crate::aabb::Aabb;
use crate::element::Element;
use crate::error::LbvhError;

/// Load a triangle mesh from an OBJ file, producing one [`Element`] per
/// face and the overall scene extent. Faces that are not triangles, or that
/// carry non-finite coordinates, are rejected — the LBVH kernels assume one
/// finite AABB per primitive index and have no notion of a polygon with more
/// than three vertices.
pub fn load(path: &Path) -> Result<(Vec<Element>, Aabb<f32>), LbvhError> {
    // `GPU_LOAD_OPTIONS` triangulates on load, at which point tobj no longer
    // records each face's original arity. Load once untriangulated purely to
    // check for non-triangular input, then reload triangulated for real use.
    let arity_check_options = tobj::LoadOptions {
        triangulate: false,
        ..tobj::GPU_LOAD_OPTIONS
    };
    let (untriangulated, _) = tobj::load_obj(path, &arity_check_options).map_err(|e| {
        LbvhError::InputInvalid(format!("failed to load mesh '{}': {e}", path.display()))
    })?;
    for model in &untriangulated {
        for &arity in &model.mesh.face_arities {
            if arity != 3 {
                return Err(LbvhError::InputInvalid(format!(
                    "non-triangular face (arity {arity}) in '{}'; only triangulated meshes are supported",
                    path.display()
                )));
            }
        }
    }

    let (models, _materials) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|e| {
        LbvhError::InputInvalid(format!("failed to load mesh '{}': {e}", path.display()))
    })?;

    let mut elements = Vec::new();
    let mut scene_extent = Aabb::empty();
    let mut next_primitive_id: u32 = 0;

    for model in &models {
        let mesh = &model.mesh;

        for tri in mesh.indices.chunks_exact(3) {
            let v0 = read_vertex(&mesh.positions, tri[0] as usize, path)?;
            let v1 = read_vertex(&mesh.positions, tri[1] as usize, path)?;
            let v2 = read_vertex(&mesh.positions, tri[2] as usize, path)?;

            let aabb_min = v0.min(v1).min(v2);
            let aabb_max = v0.max(v1).max(v2);

            elements.push(Element {
                primitive_id: next_primitive_id,
                aabb_min: aabb_min.into(),
                aabb_max: aabb_max.into(),
            });
            next_primitive_id += 1;

            scene_extent = scene_extent.expand(aabb_min.into()).expand(aabb_max.into());
        }
    }

    if elements.is_empty() {
        return Err(LbvhError::InputInvalid(format!(
            "mesh '{}' contains no triangles",
            path.display()
        )));
    }

    log::info!(
        "Loaded mesh '{}': {} triangles",
        path.display(),
        elements.len()
    );

    Ok((elements, scene_extent))
}

fn read_vertex(positions: &[f32], index: usize, path: &Path) -> Result<Vec3, LbvhError> {
    let v = Vec3::new(
        positions[index * 3],
        positions[index * 3 + 1],
        positions[index * 3 + 2],
    );
    if !v.is_finite() {
        return Err(LbvhError::InputInvalid(format!(
            "non-finite vertex coordinate {v} in '{}'",
            path.display()
        )));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_extent_grows_with_each_triangle() {
        let mut extent = Aabb::<f32>::empty();
        extent = extent.expand([0.0, 0.0, 0.0]).expand([1.0, 1.0, 1.0]);
        extent = extent.expand([-2.0, 0.0, 0.0]);
        assert_eq!(extent.min, [-2.0, 0.0, 0.0]);
        assert_eq!(extent.max, [1.0, 1.0, 1.0]);
    }

    fn write_temp_obj(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn rejects_non_triangular_face() {
        let path = write_temp_obj(
            "lbvh_loader_test_quad.obj",
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n",
        );
        let err = load(&path).unwrap_err();
        assert!(matches!(err, LbvhError::InputInvalid(_)));
    }

    #[test]
    fn rejects_non_finite_coordinate() {
        let path = write_temp_obj(
            "lbvh_loader_test_nonfinite.obj",
            "v 1e40 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        );
        let err = load(&path).unwrap_err();
        assert!(matches!(err, LbvhError::InputInvalid(_)));
    }

    #[test]
    fn accepts_well_formed_triangle() {
        let path = write_temp_obj(
            "lbvh_loader_test_triangle.obj",
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        );
        let (elements, extent) = load(&path).unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(extent.min, [0.0, 0.0, 0.0]);
        assert_eq!(extent.max, [1.0, 1.0, 0.0]);
    }
}
