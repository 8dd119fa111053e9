//! The seam between the engine and a concrete GL context.
//!
//! The engine never talks to a graphics API directly. Everything it needs
//! (shader compilation, program introspection, buffer and texture uploads,
//! point draws) goes through [`GlBackend`]. The WebGL implementation lives in
//! the web crate; [`HeadlessGl`](super::headless::HeadlessGl) records calls in
//! memory for tests and offscreen runs.
//!
//! Method names follow the GL entry points they wrap so a backend is a thin
//! forwarding layer.

use std::fmt;

/// GL type enums reported by `getActiveAttrib` / `getActiveUniform`.
pub mod gl_type {
    pub const INT: u32 = 0x1404;
    pub const FLOAT: u32 = 0x1406;
    pub const FLOAT_VEC2: u32 = 0x8B50;
    pub const FLOAT_VEC3: u32 = 0x8B51;
    pub const FLOAT_VEC4: u32 = 0x8B52;
    pub const BOOL: u32 = 0x8B56;
    pub const FLOAT_MAT2: u32 = 0x8B5A;
    pub const FLOAT_MAT3: u32 = 0x8B5B;
    pub const FLOAT_MAT4: u32 = 0x8B5C;
    pub const SAMPLER_2D: u32 = 0x8B5E;
}

/// Pipeline stage of a shader object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// One entry of a linked program's active attribute or uniform list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveInfo {
    pub name: String,
    /// GL type enum, see [`gl_type`].
    pub gl_type: u32,
}

/// Texture wrap mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureWrap {
    ClampToEdge,
    Repeat,
}

/// Texture min/mag filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

/// Sampling state applied to the bound texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureParams {
    pub wrap: TextureWrap,
    pub filter: TextureFilter,
}

impl TextureParams {
    /// Pixel-art sampling: no wrap bleeding, no smoothing.
    pub const PIXEL_ART: TextureParams = TextureParams {
        wrap: TextureWrap::ClampToEdge,
        filter: TextureFilter::Nearest,
    };
}

/// GL operations the renderer relies on.
///
/// Handles are associated types so each backend keeps its native objects.
/// Methods take `&self`: GL contexts are stateful handles, and implementations
/// use interior mutability where they need it.
pub trait GlBackend {
    type Shader;
    type Program;
    type Buffer;
    type Texture;
    type UniformLocation;

    /// Backend identifier (e.g. "webgl", "headless").
    fn backend(&self) -> &'static str;

    /// Compile one stage. `Err` carries the driver's info log.
    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<Self::Shader, String>;

    /// Link a vertex and fragment shader. `Err` carries the info log.
    fn link_program(
        &self,
        vertex: &Self::Shader,
        fragment: &Self::Shader,
    ) -> Result<Self::Program, String>;

    /// Active attributes of a linked program, in driver order.
    fn active_attributes(&self, program: &Self::Program) -> Vec<ActiveInfo>;

    /// Active uniforms of a linked program, in driver order.
    fn active_uniforms(&self, program: &Self::Program) -> Vec<ActiveInfo>;

    fn attribute_location(&self, program: &Self::Program, name: &str) -> Option<u32>;

    fn uniform_location(
        &self,
        program: &Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation>;

    fn use_program(&self, program: &Self::Program);

    /// Enable `location` and point it at float data in the bound array buffer.
    fn vertex_attrib_pointer(&self, location: u32, components: i32, stride: i32, offset: i32);

    fn uniform1f(&self, location: &Self::UniformLocation, value: f32);
    fn uniform2fv(&self, location: &Self::UniformLocation, value: &[f32; 2]);
    fn uniform3fv(&self, location: &Self::UniformLocation, value: &[f32; 3]);
    fn uniform4fv(&self, location: &Self::UniformLocation, value: &[f32; 4]);
    fn uniform_matrix2fv(&self, location: &Self::UniformLocation, value: &[f32; 4]);
    fn uniform_matrix3fv(&self, location: &Self::UniformLocation, value: &[f32; 9]);
    fn uniform_matrix4fv(&self, location: &Self::UniformLocation, value: &[f32; 16]);

    fn create_buffer(&self) -> Option<Self::Buffer>;

    fn bind_array_buffer(&self, buffer: &Self::Buffer);

    /// Replace the whole contents of the bound array buffer.
    fn array_buffer_data(&self, data: &[f32]);

    fn create_texture(&self) -> Option<Self::Texture>;

    fn bind_texture(&self, texture: &Self::Texture);

    /// Upload tightly packed RGBA8 pixels into the bound texture.
    fn tex_image_rgba(&self, width: u32, height: u32, pixels: &[u8]);

    /// Apply wrap and filter state to the bound texture.
    fn tex_params(&self, params: TextureParams);

    /// Start decoding the image at `path`. When decoding finishes the backend
    /// uploads it into `texture` and reapplies `params`. May complete any
    /// number of frames later.
    fn load_texture_image(&self, texture: &Self::Texture, path: &str, params: TextureParams);

    fn clear_color(&self, rgba: [f32; 4]);

    /// Clear the colour buffer.
    fn clear(&self);

    /// Draw `count` point primitives from the bound array buffer.
    fn draw_points(&self, count: i32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_display_is_lowercase() {
        assert_eq!(ShaderStage::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStage::Fragment.to_string(), "fragment");
    }

    #[test]
    fn pixel_art_params() {
        assert_eq!(TextureParams::PIXEL_ART.wrap, TextureWrap::ClampToEdge);
        assert_eq!(TextureParams::PIXEL_ART.filter, TextureFilter::Nearest);
    }
}
