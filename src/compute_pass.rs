// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Generic multi-stage compute dispatcher.
//!
//! `ComputeStage` is the capability interface a pipeline stage implements
//! (shader source, descriptor layout, push-constant size) instead of an
//! inheritance hierarchy; `ComputePass` drives a sequence of already-bound
//! stages and records them onto one command encoder.

use crate::error::LbvhError;

/// What a stage needs to declare about itself before it can be turned into
/// a `wgpu` pipeline.
pub trait ComputeStage {
    fn label(&self) -> &str;
    fn shader_source(&self) -> &str;
    fn bind_group_layout_entries(&self) -> &[wgpu::BindGroupLayoutEntry];
    fn push_constant_size(&self) -> u32;
}

/// One stage, already bound to concrete buffers and ready to dispatch.
pub struct BoundStage {
    pub label: String,
    pub pipeline: wgpu::ComputePipeline,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_index: u32,
    pub push_constants: Vec<u8>,
    pub dispatch: (u32, u32, u32),
}

/// Build a stage's bind group layout and pipeline from its `ComputeStage`
/// declaration. Every concrete stage in `lbvh::pass` goes through this one
/// path instead of repeating the layout/pipeline boilerplate per stage.
pub fn build_stage(
    device: &wgpu::Device,
    stage: &dyn ComputeStage,
) -> Result<(wgpu::BindGroupLayout, wgpu::ComputePipeline), LbvhError> {
    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(stage.label()),
        entries: stage.bind_group_layout_entries(),
    });

    let pipeline = crate::gpu::pipeline::create_compute_pipeline(
        device,
        stage.shader_source(),
        &[&layout],
        &[wgpu::PushConstantRange {
            stages: wgpu::ShaderStages::COMPUTE,
            range: 0..stage.push_constant_size(),
        }],
        stage.label(),
    )
    .map_err(|e| LbvhError::ShaderBuildFailed(e.to_string()))?;

    Ok((layout, pipeline))
}

/// A sequence of bound stages. Each is recorded in its own
/// `wgpu::ComputePass` scope on a shared `CommandEncoder`; ending a compute
/// pass before the next begins orders that stage's storage-buffer writes
/// ahead of the next stage's reads — the `wgpu` equivalent of the explicit
/// memory barrier a Vulkan-based implementation inserts between dispatches.
#[derive(Default)]
pub struct ComputePass {
    stages: Vec<BoundStage>,
}

impl ComputePass {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn push(&mut self, stage: BoundStage) {
        self.stages.push(stage);
    }

    pub fn record(&self, encoder: &mut wgpu::CommandEncoder) -> Result<(), LbvhError> {
        for stage in &self.stages {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(&stage.label),
                timestamp_writes: None,
            });
            pass.set_pipeline(&stage.pipeline);
            pass.set_bind_group(stage.bind_group_index, &stage.bind_group, &[]);
            if !stage.push_constants.is_empty() {
                pass.set_push_constants(0, &stage.push_constants);
            }
            pass.dispatch_workgroups(stage.dispatch.0, stage.dispatch.1, stage.dispatch.2);
        }
        Ok(())
    }
}
