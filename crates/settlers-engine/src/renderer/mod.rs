pub mod backend;
pub mod camera;
pub mod headless;
pub mod instance;
pub mod shader;
pub mod surface;

// Re-export key types for convenient access
pub use backend::{ActiveInfo, GlBackend, ShaderStage, TextureFilter, TextureParams, TextureWrap};
pub use headless::HeadlessGl;
pub use shader::{Attribute, ShaderProgram, UniformKind, UniformValue};
pub use surface::GpuSurface;
