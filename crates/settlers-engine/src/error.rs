use thiserror::Error;
use crate::renderer::backend::ShaderStage;

/// Failures while setting up GPU state. All of them are fatal for
/// initialization; there is no degraded rendering mode.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("shader program failed to link: {log}")]
    ProgramLink { log: String },

    #[error("failed to create {0}")]
    ResourceCreation(&'static str),

    #[error("sprite program expects {found} floats per vertex, batch writes {expected}")]
    VertexLayout { expected: usize, found: usize },

    #[error("rendering context unavailable: {0}")]
    Context(String),
}
