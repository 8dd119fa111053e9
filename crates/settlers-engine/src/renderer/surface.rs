use glam::Vec2;

use crate::error::RenderError;
use crate::renderer::backend::{GlBackend, TextureParams};
use crate::renderer::camera::Camera2D;
use crate::renderer::shader::{ShaderProgram, UniformValue};

/// Opaque blue, shown until the atlas image has decoded.
pub const PLACEHOLDER_TEXEL: [u8; 4] = [0, 0, 255, 255];
pub const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// A fixed-size drawing surface bound to one GL context and the built-in
/// point-sprite program.
pub struct GpuSurface<B: GlBackend> {
    gl: B,
    camera: Camera2D,
    shader: ShaderProgram<B>,
}

impl<B: GlBackend> GpuSurface<B> {
    /// Take ownership of the context, set the clear colour and compile the
    /// sprite program. Shader failures are fatal.
    pub fn new(gl: B, width: u32, height: u32) -> Result<Self, RenderError> {
        gl.clear_color(CLEAR_COLOR);
        let shader = ShaderProgram::sprite(&gl)?;
        log::info!("surface: {}x{} on {}", width, height, gl.backend());
        Ok(Self {
            gl,
            camera: Camera2D::new(width as f32, height as f32),
            shader,
        })
    }

    pub fn gl(&self) -> &B {
        &self.gl
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn width(&self) -> f32 {
        self.camera.width
    }

    pub fn height(&self) -> f32 {
        self.camera.height
    }

    pub fn shader(&self) -> &ShaderProgram<B> {
        &self.shader
    }

    pub fn clear(&self) {
        self.gl.clear();
    }

    /// Allocate a vertex buffer and upload its initial contents.
    pub fn create_vertex_buffer(&self, data: &[f32]) -> Result<B::Buffer, RenderError> {
        let buffer = self
            .gl
            .create_buffer()
            .ok_or(RenderError::ResourceCreation("vertex buffer"))?;
        self.update_vertex_buffer(&buffer, data);
        Ok(buffer)
    }

    /// Replace the whole buffer. There is no sub-range update.
    pub fn update_vertex_buffer(&self, buffer: &B::Buffer, data: &[f32]) {
        self.gl.bind_array_buffer(buffer);
        self.gl.array_buffer_data(data);
    }

    /// Create a texture showing a 1x1 placeholder and start decoding the
    /// image at `path` into it. The image replaces the placeholder whenever
    /// the backend finishes loading it.
    pub fn load_texture(&self, path: &str) -> Result<B::Texture, RenderError> {
        let texture = self
            .gl
            .create_texture()
            .ok_or(RenderError::ResourceCreation("texture"))?;
        self.gl.bind_texture(&texture);
        self.gl.tex_image_rgba(1, 1, &PLACEHOLDER_TEXEL);
        self.gl.tex_params(TextureParams::PIXEL_ART);
        self.gl.load_texture_image(&texture, path, TextureParams::PIXEL_ART);
        log::debug!("surface: loading texture '{}'", path);
        Ok(texture)
    }

    /// Bind `texture` for the next draw.
    pub fn apply_texture(&self, texture: &B::Texture) {
        self.gl.bind_texture(texture);
    }

    /// Atlas size for the fragment stage's texel normalisation.
    pub fn set_texture_bounds(&mut self, bounds: Vec2) {
        self.shader.set_uniform("texBounds", UniformValue::Vec2(bounds));
    }

    /// Draw `count` point sprites from `buffer` with the sprite program.
    pub fn draw(&mut self, buffer: &B::Buffer, count: usize) {
        self.gl.bind_array_buffer(buffer);
        self.shader
            .set_uniform("projection", UniformValue::Mat4(self.camera.projection_matrix()));
        self.shader
            .set_uniform("view", UniformValue::Mat4(self.camera.view_matrix()));
        self.shader.bind(&self.gl);
        self.gl.draw_points(count as i32);
    }
}
