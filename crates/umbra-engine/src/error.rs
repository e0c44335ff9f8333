//! Engine error taxonomy.
//!
//! Setup and platform failures end the run. Shader and resource build
//! failures are reported and end the run too; nothing here is retried.
//! A missing optional shader stage is not an error at all (see
//! `render::Program::fragment_entry`).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Event loop, window, adapter, device or surface creation failed.
    #[error("setup failed: {0:#}")]
    Setup(#[source] anyhow::Error),

    /// A shader program could not be built.
    #[error("shader `{label}`: {reason}")]
    Shader { label: String, reason: String },

    /// A resource load reported failure.
    #[error("resource `{name}` failed to load: {source:#}")]
    Resource {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// The platform event loop failed while running.
    #[error("platform event loop failed: {0}")]
    Platform(#[from] winit::error::EventLoopError),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub fn shader(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Shader {
            label: label.into(),
            reason: reason.into(),
        }
    }
}
