mod camera;
mod entities;
mod resources;
mod world_scene;

use umbra_engine::core::Scheduler;
use umbra_engine::logging::{init_logging, LoggingConfig};
use umbra_engine::resource::{LoadingScene, ResourceManifest};
use umbra_engine::window::Runtime;
use umbra_engine::EngineConfig;

use resources::{CubeModel, TerrainModel};
use world_scene::WorldScene;

fn main() {
    init_logging(LoggingConfig::default());

    let config = EngineConfig::new()
        .with_title("umbra")
        .with_window_size(1280.0, 720.0);

    // The cube is needed first; the terrain streams in on the loader thread.
    let manifest = ResourceManifest::new()
        .priority::<CubeModel>()
        .bulk::<TerrainModel>();

    let scheduler = Scheduler::new()
        .with_scene(LoadingScene::<WorldScene>::new(manifest))
        .with_scene(WorldScene::default());

    if let Err(err) = Runtime::run(config, scheduler) {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}
