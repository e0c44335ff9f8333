//! The deferred stencil-shadow pipeline.
//!
//! Per frame, in order:
//! 1. diffuse: shaded geometry into every G-buffer slot,
//! 2. shadow volume: stencil counting, depth/stencil only,
//! 3. composite: diffuse added onto ambient where the count is zero,
//! 4. edge AA: staged for the runtime to run into the surface.

mod common;
mod composite;
mod diffuse;
mod edge_aa;
mod shadow;

use std::sync::Arc;

use glam::Mat4;

use crate::core::DrawCtx;
use crate::error::EngineResult;
use crate::world::World;

use super::light::DirectionalLight;
use super::targets::{RenderTargetSet, TargetBinding, TargetSetDesc};
use super::Color;

pub use common::{DynamicUniform, ObjectUniform};
pub use composite::CompositeStage;
pub use diffuse::DiffuseStage;
pub use edge_aa::{finish_surface, FinalPass};
pub use shadow::ShadowStage;

/// Slot holding ambient light, and after compositing, the lit image.
pub const AMBIENT_SLOT: usize = 0;
/// Slot holding the diffuse contribution.
pub const DIFFUSE_SLOT: usize = 1;
const GBUFFER_SLOTS: usize = 2;

struct Built {
    surface_format: wgpu::TextureFormat,
    targets: RenderTargetSet<wgpu::Device>,
    objects: DynamicUniform<ObjectUniform>,
    diffuse: DiffuseStage,
    shadow: ShadowStage,
    composite: CompositeStage,
    final_pass: Arc<FinalPass>,
}

impl Built {
    fn new(ctx: &DrawCtx<'_>) -> EngineResult<Self> {
        let device = ctx.device;
        let settings = ctx.settings;

        if settings.target_slots != GBUFFER_SLOTS {
            log::warn!(
                "deferred pipeline uses {GBUFFER_SLOTS} target slots, settings ask for {}",
                settings.target_slots
            );
        }
        let desc = TargetSetDesc {
            slots: GBUFFER_SLOTS,
            ..TargetSetDesc::from_settings(settings)
        };

        let mut targets = RenderTargetSet::new(device, desc);
        targets.fill_all(device);

        let objects = DynamicUniform::new(
            device,
            "umbra object uniforms",
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        );

        let diffuse = DiffuseStage::new(
            device,
            objects.layout(),
            desc.color_format,
            desc.depth_stencil_format,
        )?;
        let shadow = ShadowStage::new(device, objects.layout(), desc.depth_stencil_format)?;

        let (Some(ambient_view), Some(diffuse_view)) =
            (targets.view(AMBIENT_SLOT), targets.view(DIFFUSE_SLOT))
        else {
            return Err(crate::error::EngineError::shader(
                "umbra composite shader",
                "G-buffer slots are missing",
            ));
        };

        let composite = CompositeStage::new(
            device,
            desc.color_format,
            desc.depth_stencil_format,
            diffuse_view,
        )?;
        let final_pass = FinalPass::edge_aa(
            device,
            ctx.surface_format,
            ambient_view,
            (desc.width, desc.height),
        )?;

        log::debug!(
            "deferred pipeline built for {:?} at {}x{}",
            ctx.surface_format,
            desc.width,
            desc.height
        );

        Ok(Self {
            surface_format: ctx.surface_format,
            targets,
            objects,
            diffuse,
            shadow,
            composite,
            final_pass: Arc::new(final_pass),
        })
    }
}

/// Owns the G-buffer and every stage. GPU objects are created on the first
/// `render` and rebuilt if the surface format changes.
pub struct DeferredPipeline {
    ambient_clear: Color,
    built: Option<Built>,
}

impl Default for DeferredPipeline {
    fn default() -> Self {
        Self {
            ambient_clear: Color::gray(0.2),
            built: None,
        }
    }
}

impl DeferredPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear value of the ambient slot, visible wherever nothing is drawn.
    pub fn with_ambient_clear(mut self, color: Color) -> Self {
        self.ambient_clear = color;
        self
    }

    pub fn is_built(&self) -> bool {
        self.built.is_some()
    }

    /// Records passes 1 to 3 for `world` and stages pass 4 on `ctx`.
    pub fn render(
        &mut self,
        ctx: &mut DrawCtx<'_>,
        view_proj: Mat4,
        light: &DirectionalLight,
        world: &World,
    ) -> EngineResult<()> {
        if self
            .built
            .as_ref()
            .is_none_or(|b| b.surface_format != ctx.surface_format)
        {
            self.built = Some(Built::new(ctx)?);
        }
        let Some(built) = self.built.as_mut() else {
            return Ok(());
        };

        let device = ctx.device;

        let items: Vec<ObjectUniform> = world
            .iter()
            .map(|entity| {
                let model = entity.world();
                ObjectUniform::new(view_proj, model, light.local_direction(model))
            })
            .collect();
        built.objects.write(device, ctx.queue, &items);
        built.diffuse.set_light(ctx.queue, light);

        let targets = &built.targets;
        targets.clear_depth_stencil(device, ctx.encoder, 1.0, 0);
        targets.clear_color(device, ctx.encoder, AMBIENT_SLOT, self.ambient_clear);
        targets.clear_color(device, ctx.encoder, DIFFUSE_SLOT, Color::BLACK);

        if let Some(mut pass) =
            targets.begin_pass(ctx.encoder, "umbra diffuse pass", TargetBinding::All)
        {
            built.diffuse.record(&mut pass, &built.objects, world, ctx.assets);
        }

        if let Some(mut pass) =
            targets.begin_pass(ctx.encoder, "umbra shadow pass", TargetBinding::DepthStencil)
        {
            built.shadow.record(&mut pass, &built.objects, world, ctx.assets);
        }

        if let Some(mut pass) = targets.begin_pass(
            ctx.encoder,
            "umbra composite pass",
            TargetBinding::Slot(AMBIENT_SLOT),
        ) {
            built.composite.record(&mut pass);
        }

        ctx.stage_final_pass(Arc::clone(&built.final_pass));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::render::program::{entry_points, EntryPoints};

    fn scan(label: &str, source: &str) -> EntryPoints {
        entry_points(label, source).unwrap()
    }

    #[test]
    fn stage_shaders_expose_expected_entries() {
        let diffuse = scan("diffuse", include_str!("shaders/diffuse.wgsl"));
        assert_eq!(diffuse.vertex.as_deref(), Some("vs_diffuse"));
        assert_eq!(diffuse.fragment.as_deref(), Some("fs_diffuse"));

        let composite = scan("composite", include_str!("shaders/composite.wgsl"));
        assert_eq!(composite.fragment.as_deref(), Some("fs_composite"));

        let edge = scan("edge_aa", include_str!("shaders/edge_aa.wgsl"));
        assert_eq!(edge.vertex.as_deref(), Some("vs_fullscreen"));
        assert_eq!(edge.fragment.as_deref(), Some("fs_edge_aa"));
    }

    #[test]
    fn shadow_shader_has_no_fragment_stage() {
        let shadow = scan("shadow", include_str!("shaders/shadow.wgsl"));
        assert_eq!(shadow.vertex.as_deref(), Some("vs_shadow"));
        assert!(shadow.fragment.is_none());
    }
}
