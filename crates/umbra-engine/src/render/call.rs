use crate::resource::Assets;

use super::mesh::{GpuMesh, Model};
use super::texture::GpuTexture;

/// Bind group index of the material (texture + sampler) in shaded passes.
pub const MATERIAL_GROUP: u32 = 2;

/// What an entity's `draw` or `shape` receives: the open pass with its
/// per-entity transform already bound, plus the asset store.
pub struct DrawCall<'a, 'p> {
    pass: &'a mut wgpu::RenderPass<'p>,
    assets: &'a Assets,
    materials: bool,
    draws: u32,
}

impl<'a, 'p> DrawCall<'a, 'p> {
    /// `materials` is false for passes whose pipeline has no material group.
    pub(crate) fn new(pass: &'a mut wgpu::RenderPass<'p>, assets: &'a Assets, materials: bool) -> Self {
        Self {
            pass,
            assets,
            materials,
            draws: 0,
        }
    }

    pub fn pass(&mut self) -> &mut wgpu::RenderPass<'p> {
        self.pass
    }

    pub fn assets(&self) -> &'a Assets {
        self.assets
    }

    /// Binds `texture` as the material. Ignored in passes without materials.
    pub fn texture(&mut self, texture: &GpuTexture) {
        if self.materials {
            self.pass
                .set_bind_group(MATERIAL_GROUP, texture.bind_group(), &[]);
        }
    }

    pub fn mesh(&mut self, mesh: &GpuMesh) {
        mesh.draw(self.pass);
        self.draws += 1;
    }

    /// Draws the shaded mesh of the [`Model`] stored under `K`.
    ///
    /// Returns `false` (drawing nothing) while `K` is not uploaded yet.
    pub fn model<K: 'static>(&mut self) -> bool {
        let assets = self.assets;
        let Some(model) = assets.get::<K, Model>() else {
            return false;
        };
        self.texture(&model.texture);
        self.mesh(&model.mesh);
        true
    }

    /// Draws the shadow-volume shape of the [`Model`] stored under `K`.
    pub fn shape<K: 'static>(&mut self) -> bool {
        let assets = self.assets;
        let Some(model) = assets.get::<K, Model>() else {
            return false;
        };
        self.mesh(&model.shape);
        true
    }

    /// Meshes drawn through this call so far.
    pub fn draws(&self) -> u32 {
        self.draws
    }
}
