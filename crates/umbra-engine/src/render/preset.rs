//! Immutable pipeline state bundles, one per pipeline stage.
//!
//! A preset fixes rasterizer, depth/stencil and blend state together; a stage
//! turns it into exactly one `wgpu::RenderPipeline` and never changes state
//! mid-pass.

use super::program::Program;

/// Depth and stencil configuration of a preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthStencilMode {
    pub depth_compare: wgpu::CompareFunction,
    pub depth_write: bool,
    pub stencil: wgpu::StencilState,
}

impl DepthStencilMode {
    pub fn state(&self, format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format,
            depth_write_enabled: self.depth_write,
            depth_compare: self.depth_compare,
            stencil: self.stencil.clone(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStatePreset {
    pub label: &'static str,
    pub primitive: wgpu::PrimitiveState,
    pub depth_stencil: Option<DepthStencilMode>,
    pub blend: Option<wgpu::BlendState>,
}

const fn primitive(cull_mode: Option<wgpu::Face>) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

const fn face(
    compare: wgpu::CompareFunction,
    pass_op: wgpu::StencilOperation,
) -> wgpu::StencilFaceState {
    wgpu::StencilFaceState {
        compare,
        fail_op: wgpu::StencilOperation::Keep,
        depth_fail_op: wgpu::StencilOperation::Keep,
        pass_op,
    }
}

const ADDITIVE: wgpu::BlendComponent = wgpu::BlendComponent {
    src_factor: wgpu::BlendFactor::One,
    dst_factor: wgpu::BlendFactor::One,
    operation: wgpu::BlendOperation::Add,
};

impl PipelineStatePreset {
    /// Opaque lit geometry into every G-buffer slot.
    pub const DIFFUSE: Self = Self {
        label: "umbra diffuse",
        primitive: primitive(Some(wgpu::Face::Back)),
        depth_stencil: Some(DepthStencilMode {
            depth_compare: wgpu::CompareFunction::Less,
            depth_write: true,
            stencil: wgpu::StencilState {
                front: wgpu::StencilFaceState::IGNORE,
                back: wgpu::StencilFaceState::IGNORE,
                read_mask: 0,
                write_mask: 0,
            },
        }),
        blend: None,
    };

    /// Depth-pass stencil counting: front faces increment, back faces decrement.
    pub const SHADOW_VOLUME: Self = Self {
        label: "umbra shadow volume",
        primitive: primitive(None),
        depth_stencil: Some(DepthStencilMode {
            depth_compare: wgpu::CompareFunction::Less,
            depth_write: false,
            stencil: wgpu::StencilState {
                front: face(
                    wgpu::CompareFunction::Always,
                    wgpu::StencilOperation::IncrementWrap,
                ),
                back: face(
                    wgpu::CompareFunction::Always,
                    wgpu::StencilOperation::DecrementWrap,
                ),
                read_mask: 0xff,
                write_mask: 0xff,
            },
        }),
        blend: None,
    };

    /// Full-screen additive pass limited to texels with a zero stencil count.
    pub const COMPOSITE: Self = Self {
        label: "umbra composite",
        primitive: primitive(None),
        depth_stencil: Some(DepthStencilMode {
            depth_compare: wgpu::CompareFunction::Always,
            depth_write: false,
            stencil: wgpu::StencilState {
                front: face(wgpu::CompareFunction::Equal, wgpu::StencilOperation::Keep),
                back: face(wgpu::CompareFunction::Equal, wgpu::StencilOperation::Keep),
                read_mask: 0xff,
                write_mask: 0,
            },
        }),
        blend: Some(wgpu::BlendState {
            color: ADDITIVE,
            alpha: ADDITIVE,
        }),
    };

    /// Full-screen filter into the surface.
    pub const EDGE_AA: Self = Self {
        label: "umbra edge aa",
        primitive: primitive(None),
        depth_stencil: None,
        blend: None,
    };

    /// Stencil reference the composite pass compares against.
    pub const COMPOSITE_REFERENCE: u32 = 0;

    /// Builds the one pipeline object for this preset.
    ///
    /// Without a fragment entry in `program` the pipeline writes no color and
    /// `color_formats` is ignored.
    pub fn build(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        program: &Program,
        buffers: &[wgpu::VertexBufferLayout<'_>],
        color_formats: &[wgpu::TextureFormat],
        depth_format: Option<wgpu::TextureFormat>,
    ) -> wgpu::RenderPipeline {
        let targets: Vec<Option<wgpu::ColorTargetState>> = color_formats
            .iter()
            .map(|&format| {
                Some(wgpu::ColorTargetState {
                    format,
                    blend: self.blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })
            })
            .collect();

        let fragment = program
            .fragment_entry()
            .map(|entry| wgpu::FragmentState {
                module: program.module(),
                entry_point: Some(entry),
                compilation_options: Default::default(),
                targets: &targets,
            });

        let depth_stencil = match (self.depth_stencil.as_ref(), depth_format) {
            (Some(mode), Some(format)) => Some(mode.state(format)),
            _ => None,
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(self.label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: program.module(),
                entry_point: Some(program.vertex_entry()),
                compilation_options: Default::default(),
                buffers,
            },
            fragment,
            primitive: self.primitive,
            depth_stencil,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    // ── CPU stencil model ─────────────────────────────────────────────────

    /// Whether a fragment passes this preset's stencil test.
    ///
    /// Presets without depth/stencil state always pass.
    pub fn stencil_test(&self, front_facing: bool, reference: u32, stored: u8) -> bool {
        let Some(mode) = self.depth_stencil.as_ref() else {
            return true;
        };
        let face = if front_facing {
            mode.stencil.front
        } else {
            mode.stencil.back
        };
        let mask = mode.stencil.read_mask;
        compare(face.compare, reference & mask, u32::from(stored) & mask)
    }

    /// Stencil value after a fragment that passed stencil and depth tests.
    pub fn stencil_after_pass(&self, front_facing: bool, reference: u32, stored: u8) -> u8 {
        let Some(mode) = self.depth_stencil.as_ref() else {
            return stored;
        };
        let face = if front_facing {
            mode.stencil.front
        } else {
            mode.stencil.back
        };
        let written = apply(face.pass_op, reference, stored);
        let mask = mode.stencil.write_mask as u8;
        (stored & !mask) | (written & mask)
    }
}

/// `reference <op> stored`, as the stencil test evaluates it.
pub fn compare(function: wgpu::CompareFunction, reference: u32, stored: u32) -> bool {
    use wgpu::CompareFunction as F;
    match function {
        F::Never => false,
        F::Less => reference < stored,
        F::Equal => reference == stored,
        F::LessEqual => reference <= stored,
        F::Greater => reference > stored,
        F::NotEqual => reference != stored,
        F::GreaterEqual => reference >= stored,
        F::Always => true,
    }
}

pub fn apply(op: wgpu::StencilOperation, reference: u32, stored: u8) -> u8 {
    use wgpu::StencilOperation as Op;
    match op {
        Op::Keep => stored,
        Op::Zero => 0,
        Op::Replace => reference as u8,
        Op::Invert => !stored,
        Op::IncrementClamp => stored.saturating_add(1),
        Op::DecrementClamp => stored.saturating_sub(1),
        Op::IncrementWrap => stored.wrapping_add(1),
        Op::DecrementWrap => stored.wrapping_sub(1),
    }
}
