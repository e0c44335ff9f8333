//! GPU rendering subsystem.
//!
//! Scenes own a [`DeferredPipeline`] and call it from `Scene::draw`. The
//! pipeline renders into a [`RenderTargetSet`] (the G-buffer) and stages an
//! edge-AA [`FinalPass`] that the runtime records into the surface.
//!
//! Convention:
//! - World space is right-handed with +Z up.
//! - Matrices are column-major and multiply column vectors.
//! - Shadow-volume shapes are built with [`volume::edge_quads`].

mod call;
mod color;
mod light;
mod mesh;
pub mod preset;
pub mod program;
pub mod stages;
pub mod targets;
mod texture;
pub mod volume;

pub use call::{DrawCall, MATERIAL_GROUP};
pub use color::Color;
pub use light::DirectionalLight;
pub use mesh::{GpuMesh, MeshData, Model, Vertex};
pub use preset::{DepthStencilMode, PipelineStatePreset};
pub use program::Program;
pub use stages::{finish_surface, DeferredPipeline, FinalPass};
pub use targets::{RenderTargetSet, TargetBinding, TargetSetDesc};
pub use texture::{checker_rgba8, material_layout, GpuTexture};
