use crate::error::EngineResult;
use crate::render::preset::PipelineStatePreset;
use crate::render::program::Program;

use super::common::{texture_entry, FULLSCREEN_VERTICES};

/// Pass 3: adds the diffuse slot onto the ambient slot where the stencil
/// count is zero.
pub struct CompositeStage {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
}

impl CompositeStage {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        diffuse: &wgpu::TextureView,
    ) -> EngineResult<Self> {
        let program = Program::new(
            device,
            "umbra composite shader",
            include_str!("shaders/composite.wgsl"),
        )?;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("umbra composite bgl"),
            entries: &[texture_entry(0, false)],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("umbra composite pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = PipelineStatePreset::COMPOSITE.build(
            device,
            &layout,
            &program,
            &[],
            &[color_format],
            Some(depth_format),
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("umbra composite bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(diffuse),
            }],
        });

        Ok(Self {
            pipeline,
            bind_group,
        })
    }

    pub fn record(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_stencil_reference(PipelineStatePreset::COMPOSITE_REFERENCE);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(FULLSCREEN_VERTICES, 0..1);
    }
}
