// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::HashSet;
use std::time::Instant;

use crate::aabb::Aabb;
use crate::config::BuildConfig;
use crate::element::{Element, LbvhConstructionInfo, LbvhNode, MortonCodeElement};
use crate::error::LbvhError;
use crate::gpu::buffers::create_empty_storage_buffer;
use crate::gpu::context::GpuContext;
use crate::mesh;
use crate::shaders::composer::ShaderComposer;

use super::pass::{LbvhBuffers, LbvhPass};
use super::verify;

/// A build is rejected above this element count: the radix-sort stage is a
/// single 256-thread workgroup and its shared-memory histogram does not
/// scale past a few hundred thousand keys. Undocumented upstream; kept here
/// as an explicit, named guard rather than an implicit failure mode.
pub const MAX_ELEMENTS: usize = 500_000;

/// Reject empty and oversized inputs before any GPU resource is touched.
/// Pulled out of [`Lbvh::execute`] so the guard can be exercised directly in
/// tests without a real [`GpuContext`].
fn validate_element_count(num_elements: usize) -> Result<(), LbvhError> {
    if num_elements == 0 {
        return Err(LbvhError::InputInvalid("mesh has no elements".to_string()));
    }
    if num_elements > MAX_ELEMENTS {
        return Err(LbvhError::InputInvalid(format!(
            "{num_elements} elements exceeds the single-workgroup radix sort's capacity of {MAX_ELEMENTS}"
        )));
    }
    Ok(())
}

/// Top-level LBVH build orchestrator. Owns nothing between calls to
/// [`Lbvh::execute`] beyond its configuration; every GPU resource is
/// allocated, used, and released within a single call.
pub struct Lbvh {
    config: BuildConfig,
}

impl Lbvh {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self, gpu: &GpuContext) -> Result<Vec<LbvhNode>, LbvhError> {
        let (elements, scene_extent) = mesh::loader::load(&self.config.mesh_path)?;

        let num_elements = elements.len();
        validate_element_count(num_elements)?;
        let num_nodes = 2 * num_elements - 1;

        let shader_dir = self
            .config
            .shader_dir
            .clone()
            .unwrap_or_else(ShaderComposer::shader_dir);
        let composer = ShaderComposer::from_directory(&shader_dir)
            .map_err(|e| LbvhError::ShaderBuildFailed(e.to_string()))?;
        let pass = LbvhPass::new(gpu, &composer)?;

        let padded_bounds = pad_scene_bounds(&scene_extent, self.config.scene_bounds_padding);

        let buffers = self.allocate_buffers(gpu, &elements, num_elements, num_nodes);

        let compute_pass = pass.bind(
            gpu,
            &buffers,
            num_elements as u32,
            self.config.absolute_pointers,
            &padded_bounds,
        );

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lbvh build encoder"),
            });
        compute_pass.record(&mut encoder)?;

        let start = Instant::now();
        gpu.submit_and_wait(encoder)
            .map_err(|_| LbvhError::DeviceSubmitFailed("queue submit failed".to_string()))?;
        log::info!(
            "LBVH build for {num_elements} elements finished in {:?}",
            start.elapsed()
        );

        let nodes: Vec<LbvhNode> = gpu.download_via_staging(&buffers.nodes, num_nodes)?;

        if self.config.verify {
            let expected_primitive_ids: HashSet<u32> =
                elements.iter().map(|e| e.primitive_id).collect();
            verify::verify(
                &nodes,
                num_elements,
                self.config.absolute_pointers,
                &expected_primitive_ids,
            )?;
            log::info!("LBVH verification passed for {num_elements} elements");
        }

        verify::export_csv(&self.config.output_csv, &nodes)?;

        Ok(nodes)
    }

    fn allocate_buffers(
        &self,
        gpu: &GpuContext,
        elements: &[Element],
        num_elements: usize,
        num_nodes: usize,
    ) -> LbvhBuffers {
        let elements_buffer = gpu.upload_via_staging(elements, "elements");

        let morton_a = create_empty_storage_buffer(
            &gpu.device,
            (num_elements * std::mem::size_of::<MortonCodeElement>()) as u64,
            "morton codes (a)",
        );
        let morton_b = create_empty_storage_buffer(
            &gpu.device,
            (num_elements * std::mem::size_of::<MortonCodeElement>()) as u64,
            "morton codes (b)",
        );

        let nodes = create_empty_storage_buffer(
            &gpu.device,
            (num_nodes * std::mem::size_of::<LbvhNode>()) as u64,
            "lbvh nodes",
        );

        let construction_info_zeros = vec![
            LbvhConstructionInfo {
                parent: 0,
                visitation_count: 0,
            };
            num_nodes
        ];
        let construction_info =
            gpu.upload_via_staging(&construction_info_zeros, "construction info");

        LbvhBuffers {
            elements: elements_buffer,
            morton_a,
            morton_b,
            nodes,
            construction_info,
        }
    }
}

/// Scale the scene's true extent by `padding` around its center before
/// quantization. Carried forward from the reference implementation without
/// a documented rationale for the factor itself.
fn pad_scene_bounds(extent: &Aabb<f32>, padding: f32) -> Aabb<f32> {
    Aabb::new(
        [
            extent.min[0] * padding,
            extent.min[1] * padding,
            extent.min[2] * padding,
        ],
        [
            extent.max[0] * padding,
            extent.max[1] * padding,
            extent.max[2] * padding,
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_scales_both_bounds() {
        let extent = Aabb::<f32>::new([-1.0, -2.0, -3.0], [1.0, 2.0, 3.0]);
        let padded = pad_scene_bounds(&extent, 8.0);
        assert_eq!(padded.min, [-8.0, -16.0, -24.0]);
        assert_eq!(padded.max, [8.0, 16.0, 24.0]);
    }

    #[test]
    fn rejects_oversized_input() {
        let err = validate_element_count(MAX_ELEMENTS + 1).unwrap_err();
        assert!(matches!(err, LbvhError::InputInvalid(_)));
    }

    #[test]
    fn rejects_empty_input() {
        let err = validate_element_count(0).unwrap_err();
        assert!(matches!(err, LbvhError::InputInvalid(_)));
    }

    #[test]
    fn accepts_in_range_input() {
        assert!(validate_element_count(MAX_ELEMENTS).is_ok());
        assert!(validate_element_count(1).is_ok());
    }
}
