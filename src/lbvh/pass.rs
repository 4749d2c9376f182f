// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::aabb::Aabb;
use crate::compute_pass::{build_stage, BoundStage, ComputePass, ComputeStage};
use crate::error::LbvhError;
use crate::gpu::context::GpuContext;
use crate::shaders::composer::ShaderComposer;

use super::push_constants::{
    AabbFitPushConstants, HierarchyPushConstants, MortonPushConstants, PushConstants,
    RadixSortPushConstants,
};

/// Every stage gets its own pipeline layout with a single bind group, so
/// every kernel declares `@group(0)` and every dispatch binds at index 0 —
/// there is no shared pipeline layout across stages to assign distinct
/// group indices against.
const STAGE_BIND_GROUP: u32 = 0;

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Cross-check a composed kernel's reflected `@group`/`@binding` count
/// against the bind group layout we are about to build for it, catching a
/// drifted `.wgsl` file (added/removed binding) before it reaches the GPU as
/// an opaque pipeline-creation error.
fn check_reflection(group: u32, stage: &Stage) -> Result<(), LbvhError> {
    let info = crate::shaders::reflection::reflect(&stage.source)?;
    let bindings = info.descriptor_sets.get(&group).ok_or_else(|| {
        LbvhError::ShaderBuildFailed(format!(
            "{}: no bindings reflected for @group({group})",
            stage.label
        ))
    })?;
    if bindings.len() != stage.entries.len() {
        return Err(LbvhError::ShaderBuildFailed(format!(
            "{}: bind group layout declares {} entries but the shader reflects {} bindings in @group({group})",
            stage.label,
            stage.entries.len(),
            bindings.len()
        )));
    }
    Ok(())
}

/// One `ComputeStage` declaration per kernel: shader source plus the layout
/// and push-constant size `compute_pass::build_stage` needs to derive a
/// pipeline. Holds no buffers — those are wired per-build in `LbvhPass::bind`.
struct Stage {
    label: &'static str,
    source: String,
    entries: Vec<wgpu::BindGroupLayoutEntry>,
    push_constant_size: u32,
}

impl ComputeStage for Stage {
    fn label(&self) -> &str {
        self.label
    }

    fn shader_source(&self) -> &str {
        &self.source
    }

    fn bind_group_layout_entries(&self) -> &[wgpu::BindGroupLayoutEntry] {
        &self.entries
    }

    fn push_constant_size(&self) -> u32 {
        self.push_constant_size
    }
}

/// The set of device buffers one build owns, from allocation to release.
/// Dropping this struct releases every GPU resource it holds, so an early
/// `?` return from `Lbvh::execute` cleans up without explicit bookkeeping.
pub struct LbvhBuffers {
    pub elements: wgpu::Buffer,
    pub morton_a: wgpu::Buffer,
    pub morton_b: wgpu::Buffer,
    pub nodes: wgpu::Buffer,
    pub construction_info: wgpu::Buffer,
}

/// The four-stage LBVH compute pipeline: Morton coding, radix sort,
/// hierarchy emission, and bottom-up AABB fit. Pipelines and bind group
/// layouts are created once in [`LbvhPass::new`]; [`LbvhPass::bind`] wires
/// a concrete [`LbvhBuffers`] set into a ready-to-record [`ComputePass`].
pub struct LbvhPass {
    morton_pipeline: wgpu::ComputePipeline,
    morton_layout: wgpu::BindGroupLayout,
    radix_sort_pipeline: wgpu::ComputePipeline,
    radix_sort_layout: wgpu::BindGroupLayout,
    hierarchy_pipeline: wgpu::ComputePipeline,
    hierarchy_layout: wgpu::BindGroupLayout,
    aabb_fit_pipeline: wgpu::ComputePipeline,
    aabb_fit_layout: wgpu::BindGroupLayout,
}

impl LbvhPass {
    pub fn new(gpu: &GpuContext, composer: &ShaderComposer) -> Result<Self, LbvhError> {
        let compose = |entry: &str| -> Result<String, LbvhError> {
            composer
                .compose(entry)
                .map_err(|e| LbvhError::ShaderBuildFailed(format!("{entry}: {e}")))
        };

        let morton_stage = Stage {
            label: "morton",
            source: compose("morton")?,
            entries: vec![storage_entry(0, false), storage_entry(1, true)],
            push_constant_size: std::mem::size_of::<MortonPushConstants>() as u32,
        };
        check_reflection(STAGE_BIND_GROUP, &morton_stage)?;
        let (morton_layout, morton_pipeline) = build_stage(&gpu.device, &morton_stage)?;

        let radix_sort_stage = Stage {
            label: "radix sort",
            source: compose("radix_sort")?,
            entries: vec![storage_entry(0, false), storage_entry(1, false)],
            push_constant_size: std::mem::size_of::<RadixSortPushConstants>() as u32,
        };
        check_reflection(STAGE_BIND_GROUP, &radix_sort_stage)?;
        let (radix_sort_layout, radix_sort_pipeline) = build_stage(&gpu.device, &radix_sort_stage)?;

        let hierarchy_stage = Stage {
            label: "hierarchy",
            source: compose("hierarchy")?,
            entries: vec![
                storage_entry(0, true),
                storage_entry(1, true),
                storage_entry(2, false),
                storage_entry(3, false),
            ],
            push_constant_size: std::mem::size_of::<HierarchyPushConstants>() as u32,
        };
        check_reflection(STAGE_BIND_GROUP, &hierarchy_stage)?;
        let (hierarchy_layout, hierarchy_pipeline) = build_stage(&gpu.device, &hierarchy_stage)?;

        let aabb_fit_stage = Stage {
            label: "aabb fit",
            source: compose("bounding_boxes")?,
            entries: vec![storage_entry(0, false), storage_entry(1, false)],
            push_constant_size: std::mem::size_of::<AabbFitPushConstants>() as u32,
        };
        check_reflection(STAGE_BIND_GROUP, &aabb_fit_stage)?;
        let (aabb_fit_layout, aabb_fit_pipeline) = build_stage(&gpu.device, &aabb_fit_stage)?;

        Ok(Self {
            morton_pipeline,
            morton_layout,
            radix_sort_pipeline,
            radix_sort_layout,
            hierarchy_pipeline,
            hierarchy_layout,
            aabb_fit_pipeline,
            aabb_fit_layout,
        })
    }

    /// Bind a concrete set of buffers and push-constant values to the four
    /// stages, producing a `ComputePass` ready to record.
    #[allow(clippy::too_many_arguments)]
    pub fn bind(
        &self,
        gpu: &GpuContext,
        buffers: &LbvhBuffers,
        num_elements: u32,
        absolute_pointers: bool,
        padded_scene_bounds: &Aabb<f32>,
    ) -> ComputePass {
        let mut pass = ComputePass::new();
        let absolute_pointers_flag = u32::from(absolute_pointers);

        let morton_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("morton bind group"),
            layout: &self.morton_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffers.morton_a.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffers.elements.as_entire_binding(),
                },
            ],
        });
        let morton_pc = PushConstants::Morton(MortonPushConstants {
            num_elements,
            min_x: padded_scene_bounds.min[0],
            min_y: padded_scene_bounds.min[1],
            min_z: padded_scene_bounds.min[2],
            max_x: padded_scene_bounds.max[0],
            max_y: padded_scene_bounds.max[1],
            max_z: padded_scene_bounds.max[2],
        });
        pass.push(BoundStage {
            label: "morton".to_string(),
            pipeline: self.morton_pipeline.clone(),
            bind_group: morton_bind_group,
            bind_group_index: STAGE_BIND_GROUP,
            push_constants: morton_pc.bytes(),
            dispatch: (crate::gpu::buffers::dispatch_size(num_elements, 256), 1, 1),
        });

        let radix_sort_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("radix sort bind group"),
            layout: &self.radix_sort_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffers.morton_a.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffers.morton_b.as_entire_binding(),
                },
            ],
        });
        let radix_sort_pc = PushConstants::RadixSort(RadixSortPushConstants { num_elements });
        pass.push(BoundStage {
            label: "radix sort".to_string(),
            pipeline: self.radix_sort_pipeline.clone(),
            bind_group: radix_sort_bind_group,
            bind_group_index: STAGE_BIND_GROUP,
            push_constants: radix_sort_pc.bytes(),
            dispatch: (1, 1, 1),
        });

        let hierarchy_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("hierarchy bind group"),
            layout: &self.hierarchy_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffers.morton_a.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffers.elements.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffers.nodes.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: buffers.construction_info.as_entire_binding(),
                },
            ],
        });
        let hierarchy_pc = PushConstants::Hierarchy(HierarchyPushConstants {
            num_elements,
            absolute_pointers: absolute_pointers_flag,
        });
        pass.push(BoundStage {
            label: "hierarchy".to_string(),
            pipeline: self.hierarchy_pipeline.clone(),
            bind_group: hierarchy_bind_group,
            bind_group_index: STAGE_BIND_GROUP,
            push_constants: hierarchy_pc.bytes(),
            dispatch: (crate::gpu::buffers::dispatch_size(num_elements, 256), 1, 1),
        });

        let aabb_fit_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("aabb fit bind group"),
            layout: &self.aabb_fit_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffers.nodes.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffers.construction_info.as_entire_binding(),
                },
            ],
        });
        let aabb_fit_pc = PushConstants::Aabb(AabbFitPushConstants {
            num_elements,
            absolute_pointers: absolute_pointers_flag,
        });
        pass.push(BoundStage {
            label: "aabb fit".to_string(),
            pipeline: self.aabb_fit_pipeline.clone(),
            bind_group: aabb_fit_bind_group,
            bind_group_index: STAGE_BIND_GROUP,
            push_constants: aabb_fit_pc.bytes(),
            dispatch: (crate::gpu::buffers::dispatch_size(num_elements, 256), 1, 1),
        });

        pass
    }
}
