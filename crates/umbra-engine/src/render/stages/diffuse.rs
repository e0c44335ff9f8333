use bytemuck::{Pod, Zeroable};

use crate::error::EngineResult;
use crate::render::call::DrawCall;
use crate::render::light::DirectionalLight;
use crate::render::mesh::Vertex;
use crate::render::preset::PipelineStatePreset;
use crate::render::program::Program;
use crate::render::texture::material_layout;
use crate::resource::Assets;
use crate::world::World;

use super::common::{binding_size, DynamicUniform, ObjectUniform};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct LightingUniform {
    ambient: [f32; 4],
    diffuse: [f32; 4],
}

/// Pass 1: shaded geometry into the ambient and diffuse slots.
pub struct DiffuseStage {
    pipeline: wgpu::RenderPipeline,
    lighting_ubo: wgpu::Buffer,
    lighting_bind_group: wgpu::BindGroup,
}

impl DiffuseStage {
    pub fn new(
        device: &wgpu::Device,
        objects: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> EngineResult<Self> {
        let program = Program::new(
            device,
            "umbra diffuse shader",
            include_str!("shaders/diffuse.wgsl"),
        )?;

        let lighting_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("umbra lighting bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: binding_size::<LightingUniform>(),
                },
                count: None,
            }],
        });
        let material = material_layout(device);

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("umbra diffuse pipeline layout"),
            bind_group_layouts: &[&lighting_layout, objects, &material],
            immediate_size: 0,
        });

        // One color target per G-buffer slot: ambient, diffuse.
        let pipeline = PipelineStatePreset::DIFFUSE.build(
            device,
            &layout,
            &program,
            &[Vertex::layout()],
            &[color_format, color_format],
            Some(depth_format),
        );

        let lighting_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("umbra lighting ubo"),
            size: std::mem::size_of::<LightingUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let lighting_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("umbra lighting bind group"),
            layout: &lighting_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: lighting_ubo.as_entire_binding(),
            }],
        });

        Ok(Self {
            pipeline,
            lighting_ubo,
            lighting_bind_group,
        })
    }

    pub fn set_light(&self, queue: &wgpu::Queue, light: &DirectionalLight) {
        let uniform = LightingUniform {
            ambient: light.ambient.to_array(),
            diffuse: light.diffuse.to_array(),
        };
        queue.write_buffer(&self.lighting_ubo, 0, bytemuck::bytes_of(&uniform));
    }

    /// Draws every live entity; `objects` holds one slot per entity in `world` order.
    pub fn record(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        objects: &DynamicUniform<ObjectUniform>,
        world: &World,
        assets: &Assets,
    ) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.lighting_bind_group, &[]);

        for (i, entity) in world.iter().enumerate().take(objects.len()) {
            pass.set_bind_group(1, objects.bind_group(), &[objects.offset(i)]);
            let mut call = DrawCall::new(pass, assets, true);
            entity.draw(&mut call);
        }
    }
}
