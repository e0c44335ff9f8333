use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::error::EngineResult;
use crate::render::preset::PipelineStatePreset;
use crate::render::program::Program;
use crate::render::Color;

use super::common::{binding_size, linear_clamp_sampler, texture_entry, FULLSCREEN_VERTICES};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct EdgeAaParams {
    texel: [f32; 2],
    _pad: [f32; 2], // 16-byte alignment
}

/// Pass 4: the full-screen edge filter into the presentation surface.
///
/// Built by a scene and staged on its `DrawCtx`; the runtime records it once
/// the surface texture is acquired.
#[derive(Debug)]
pub struct FinalPass {
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
}

impl FinalPass {
    /// Filters `source` (of `source_size` pixels) into targets of `format`.
    pub fn edge_aa(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        source: &wgpu::TextureView,
        source_size: (u32, u32),
    ) -> EngineResult<Self> {
        let program = Program::new(
            device,
            "umbra edge aa shader",
            include_str!("shaders/edge_aa.wgsl"),
        )?;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("umbra edge aa bgl"),
            entries: &[
                texture_entry(0, true),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: binding_size::<EdgeAaParams>(),
                    },
                    count: None,
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("umbra edge aa pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline =
            PipelineStatePreset::EDGE_AA.build(device, &layout, &program, &[], &[format], None);

        let (w, h) = source_size;
        let params = EdgeAaParams {
            texel: [1.0 / w.max(1) as f32, 1.0 / h.max(1) as f32],
            _pad: [0.0; 2],
        };
        let params_ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("umbra edge aa params"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let sampler = linear_clamp_sampler(device, "umbra edge aa sampler");

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("umbra edge aa bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_ubo.as_entire_binding(),
                },
            ],
        });

        Ok(Self {
            format,
            pipeline,
            bind_group,
        })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn record(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("umbra edge aa pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(FULLSCREEN_VERTICES, 0..1);
    }
}

/// Records the last pass of a frame into the surface: `staged` if the scene
/// staged one with a matching format, otherwise a clear to `background`.
pub fn finish_surface(
    encoder: &mut wgpu::CommandEncoder,
    target: &wgpu::TextureView,
    target_format: wgpu::TextureFormat,
    staged: Option<&FinalPass>,
    background: Color,
) {
    match staged {
        Some(pass) if pass.format() == target_format => pass.record(encoder, target),
        staged => {
            if staged.is_some() {
                log::warn!("final pass format does not match the surface; clearing instead");
            }
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("umbra background clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(background.into()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }
    }
}
