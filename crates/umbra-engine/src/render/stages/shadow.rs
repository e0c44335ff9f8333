use crate::error::EngineResult;
use crate::render::call::DrawCall;
use crate::render::mesh::Vertex;
use crate::render::preset::PipelineStatePreset;
use crate::render::program::Program;
use crate::resource::Assets;
use crate::world::World;

use super::common::{DynamicUniform, ObjectUniform};

/// Pass 2: stencil counting over each entity's shadow-volume shape.
pub struct ShadowStage {
    pipeline: wgpu::RenderPipeline,
}

impl ShadowStage {
    pub fn new(
        device: &wgpu::Device,
        objects: &wgpu::BindGroupLayout,
        depth_format: wgpu::TextureFormat,
    ) -> EngineResult<Self> {
        let program = Program::new(
            device,
            "umbra shadow shader",
            include_str!("shaders/shadow.wgsl"),
        )?;

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("umbra shadow pipeline layout"),
            bind_group_layouts: &[objects],
            immediate_size: 0,
        });

        let pipeline = PipelineStatePreset::SHADOW_VOLUME.build(
            device,
            &layout,
            &program,
            &[Vertex::layout()],
            &[],
            Some(depth_format),
        );

        Ok(Self { pipeline })
    }

    pub fn record(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        objects: &DynamicUniform<ObjectUniform>,
        world: &World,
        assets: &Assets,
    ) {
        pass.set_pipeline(&self.pipeline);

        for (i, entity) in world.iter().enumerate().take(objects.len()) {
            pass.set_bind_group(0, objects.bind_group(), &[objects.offset(i)]);
            let mut call = DrawCall::new(pass, assets, false);
            entity.shape(&mut call);
        }
    }
}
