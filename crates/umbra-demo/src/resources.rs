use umbra_engine::render::{checker_rgba8, volume, GpuMesh, GpuTexture, MeshData, Model};
use umbra_engine::resource::{LoadCtx, Resource, UploadCtx};

const TEXTURE_SIZE: u32 = 64;

/// CPU half of a model, built wherever `load` runs.
struct ModelData {
    mesh: MeshData,
    shape: MeshData,
    pixels: Vec<u8>,
}

impl ModelData {
    fn new(mesh: MeshData, cells: u32, a: [u8; 4], b: [u8; 4]) -> Self {
        let shape = volume::edge_quads(&mesh);
        Self {
            mesh,
            shape,
            pixels: checker_rgba8(TEXTURE_SIZE, cells, a, b),
        }
    }

    fn upload(&self, upload: &mut UploadCtx<'_>, label: &str) -> anyhow::Result<Model> {
        anyhow::ensure!(self.mesh.triangle_count() > 0, "`{label}` has no triangles");

        let texture = GpuTexture::from_rgba8(
            upload.device,
            upload.queue,
            label,
            TEXTURE_SIZE,
            TEXTURE_SIZE,
            &self.pixels,
        )?;

        Ok(Model {
            mesh: GpuMesh::upload(upload.device, label, &self.mesh),
            shape: GpuMesh::upload(upload.device, label, &self.shape),
            texture,
        })
    }
}

/// Unit cube with a fine checker; casts the scene's shadow.
#[derive(Default)]
pub struct CubeModel;

impl Resource for CubeModel {
    fn load(&mut self, ctx: &mut LoadCtx) -> anyhow::Result<()> {
        let data = ModelData::new(MeshData::cube(1.0), 8, [220, 90, 60, 255], [240, 240, 240, 255]);
        ctx.gpu("cube model", move |upload| {
            let model = data.upload(upload, "cube model")?;
            upload.assets.insert::<CubeModel, Model>(model);
            Ok(())
        });
        Ok(())
    }

    fn unload(&mut self, ctx: &mut LoadCtx) {
        ctx.gpu("cube model unload", |upload| {
            upload.assets.remove::<CubeModel, Model>();
            Ok(())
        });
    }
}

/// Ground plane, tiled ten times across its width.
#[derive(Default)]
pub struct TerrainModel;

impl Resource for TerrainModel {
    fn load(&mut self, ctx: &mut LoadCtx) -> anyhow::Result<()> {
        let data = ModelData::new(MeshData::plane(1.0, 10.0), 2, [90, 140, 80, 255], [70, 110, 60, 255]);
        ctx.gpu("terrain model", move |upload| {
            let model = data.upload(upload, "terrain model")?;
            upload.assets.insert::<TerrainModel, Model>(model);
            Ok(())
        });
        Ok(())
    }

    fn unload(&mut self, ctx: &mut LoadCtx) {
        ctx.gpu("terrain model unload", |upload| {
            upload.assets.remove::<TerrainModel, Model>();
            Ok(())
        });
    }
}
