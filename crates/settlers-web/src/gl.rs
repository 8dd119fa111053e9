use settlers_engine::renderer::backend::{
    ActiveInfo, GlBackend, ShaderStage, TextureFilter, TextureParams, TextureWrap,
};
use settlers_engine::RenderError;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, HtmlImageElement, WebGlBuffer, WebGlContextAttributes, WebGlProgram,
    WebGlRenderingContext as Gl, WebGlShader, WebGlTexture, WebGlUniformLocation,
};

/// [`GlBackend`] over a browser WebGL 1 context.
pub struct WebGl {
    gl: Gl,
}

impl WebGl {
    pub fn new(gl: Gl) -> Self {
        Self { gl }
    }

    /// Acquire a WebGL context from `canvas` with antialiasing off, so point
    /// sprites stay pixel-exact.
    pub fn from_canvas(canvas: &HtmlCanvasElement) -> Result<Self, RenderError> {
        let attributes = WebGlContextAttributes::new();
        attributes.set_antialias(false);

        let context = canvas
            .get_context_with_context_options("webgl", &attributes)
            .map_err(|e| RenderError::Context(format!("{:?}", e)))?
            .ok_or_else(|| RenderError::Context("webgl not supported".to_string()))?;
        let gl = context
            .dyn_into::<Gl>()
            .map_err(|_| {
                RenderError::Context("context is not a WebGlRenderingContext".to_string())
            })?;
        Ok(Self::new(gl))
    }
}

fn apply_params(gl: &Gl, params: TextureParams) {
    let wrap = match params.wrap {
        TextureWrap::ClampToEdge => Gl::CLAMP_TO_EDGE,
        TextureWrap::Repeat => Gl::REPEAT,
    } as i32;
    let filter = match params.filter {
        TextureFilter::Nearest => Gl::NEAREST,
        TextureFilter::Linear => Gl::LINEAR,
    } as i32;
    gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_S, wrap);
    gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_T, wrap);
    gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MIN_FILTER, filter);
    gl.tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MAG_FILTER, filter);
}

fn active_count(gl: &Gl, program: &WebGlProgram, pname: u32) -> u32 {
    gl.get_program_parameter(program, pname).as_f64().unwrap_or(0.0) as u32
}

impl GlBackend for WebGl {
    type Shader = WebGlShader;
    type Program = WebGlProgram;
    type Buffer = WebGlBuffer;
    type Texture = WebGlTexture;
    type UniformLocation = WebGlUniformLocation;

    fn backend(&self) -> &'static str {
        "webgl"
    }

    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<WebGlShader, String> {
        let kind = match stage {
            ShaderStage::Vertex => Gl::VERTEX_SHADER,
            ShaderStage::Fragment => Gl::FRAGMENT_SHADER,
        };
        let shader = self
            .gl
            .create_shader(kind)
            .ok_or_else(|| format!("unable to create {} shader", stage))?;
        self.gl.shader_source(&shader, source);
        self.gl.compile_shader(&shader);

        let compiled = self
            .gl
            .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false);
        if compiled {
            Ok(shader)
        } else {
            let log = self.gl.get_shader_info_log(&shader).unwrap_or_default();
            self.gl.delete_shader(Some(&shader));
            Err(log)
        }
    }

    fn link_program(
        &self,
        vertex: &WebGlShader,
        fragment: &WebGlShader,
    ) -> Result<WebGlProgram, String> {
        let program = self
            .gl
            .create_program()
            .ok_or_else(|| "unable to create program".to_string())?;
        self.gl.attach_shader(&program, vertex);
        self.gl.attach_shader(&program, fragment);
        self.gl.link_program(&program);

        let linked = self
            .gl
            .get_program_parameter(&program, Gl::LINK_STATUS)
            .as_bool()
            .unwrap_or(false);
        if linked {
            Ok(program)
        } else {
            let log = self.gl.get_program_info_log(&program).unwrap_or_default();
            self.gl.delete_program(Some(&program));
            Err(log)
        }
    }

    fn active_attributes(&self, program: &WebGlProgram) -> Vec<ActiveInfo> {
        (0..active_count(&self.gl, program, Gl::ACTIVE_ATTRIBUTES))
            .filter_map(|i| self.gl.get_active_attrib(program, i))
            .map(|info| ActiveInfo { name: info.name(), gl_type: info.type_() })
            .collect()
    }

    fn active_uniforms(&self, program: &WebGlProgram) -> Vec<ActiveInfo> {
        (0..active_count(&self.gl, program, Gl::ACTIVE_UNIFORMS))
            .filter_map(|i| self.gl.get_active_uniform(program, i))
            .map(|info| ActiveInfo { name: info.name(), gl_type: info.type_() })
            .collect()
    }

    fn attribute_location(&self, program: &WebGlProgram, name: &str) -> Option<u32> {
        u32::try_from(self.gl.get_attrib_location(program, name)).ok()
    }

    fn uniform_location(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        self.gl.get_uniform_location(program, name)
    }

    fn use_program(&self, program: &WebGlProgram) {
        self.gl.use_program(Some(program));
    }

    fn vertex_attrib_pointer(&self, location: u32, components: i32, stride: i32, offset: i32) {
        self.gl.enable_vertex_attrib_array(location);
        self.gl
            .vertex_attrib_pointer_with_i32(location, components, Gl::FLOAT, false, stride, offset);
    }

    fn uniform1f(&self, location: &WebGlUniformLocation, value: f32) {
        self.gl.uniform1f(Some(location), value);
    }

    fn uniform2fv(&self, location: &WebGlUniformLocation, value: &[f32; 2]) {
        self.gl.uniform2fv_with_f32_array(Some(location), value);
    }

    fn uniform3fv(&self, location: &WebGlUniformLocation, value: &[f32; 3]) {
        self.gl.uniform3fv_with_f32_array(Some(location), value);
    }

    fn uniform4fv(&self, location: &WebGlUniformLocation, value: &[f32; 4]) {
        self.gl.uniform4fv_with_f32_array(Some(location), value);
    }

    fn uniform_matrix2fv(&self, location: &WebGlUniformLocation, value: &[f32; 4]) {
        self.gl.uniform_matrix2fv_with_f32_array(Some(location), false, value);
    }

    fn uniform_matrix3fv(&self, location: &WebGlUniformLocation, value: &[f32; 9]) {
        self.gl.uniform_matrix3fv_with_f32_array(Some(location), false, value);
    }

    fn uniform_matrix4fv(&self, location: &WebGlUniformLocation, value: &[f32; 16]) {
        self.gl.uniform_matrix4fv_with_f32_array(Some(location), false, value);
    }

    fn create_buffer(&self) -> Option<WebGlBuffer> {
        self.gl.create_buffer()
    }

    fn bind_array_buffer(&self, buffer: &WebGlBuffer) {
        self.gl.bind_buffer(Gl::ARRAY_BUFFER, Some(buffer));
    }

    fn array_buffer_data(&self, data: &[f32]) {
        let array = js_sys::Float32Array::from(data);
        self.gl
            .buffer_data_with_array_buffer_view(Gl::ARRAY_BUFFER, &array, Gl::DYNAMIC_DRAW);
    }

    fn create_texture(&self) -> Option<WebGlTexture> {
        self.gl.create_texture()
    }

    fn bind_texture(&self, texture: &WebGlTexture) {
        self.gl.bind_texture(Gl::TEXTURE_2D, Some(texture));
    }

    fn tex_image_rgba(&self, width: u32, height: u32, pixels: &[u8]) {
        let result = self
            .gl
            .tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
                Gl::TEXTURE_2D,
                0,
                Gl::RGBA as i32,
                width as i32,
                height as i32,
                0,
                Gl::RGBA,
                Gl::UNSIGNED_BYTE,
                Some(pixels),
            );
        if let Err(e) = result {
            log::error!("webgl: texImage2D failed: {:?}", e);
        }
    }

    fn tex_params(&self, params: TextureParams) {
        apply_params(&self.gl, params);
    }

    fn load_texture_image(&self, texture: &WebGlTexture, path: &str, params: TextureParams) {
        let image = match HtmlImageElement::new() {
            Ok(image) => image,
            Err(e) => {
                log::error!("webgl: cannot create image for '{}': {:?}", path, e);
                return;
            }
        };

        let gl = self.gl.clone();
        let texture = texture.clone();
        let loaded = image.clone();
        let source = path.to_string();
        let onload = Closure::once_into_js(move || {
            gl.bind_texture(Gl::TEXTURE_2D, Some(&texture));
            let result = gl.tex_image_2d_with_u32_and_u32_and_image(
                Gl::TEXTURE_2D,
                0,
                Gl::RGBA as i32,
                Gl::RGBA,
                Gl::UNSIGNED_BYTE,
                &loaded,
            );
            match result {
                Ok(()) => {
                    apply_params(&gl, params);
                    log::info!(
                        "webgl: loaded '{}' ({}x{})",
                        source,
                        loaded.natural_width(),
                        loaded.natural_height()
                    );
                }
                Err(e) => log::error!("webgl: uploading '{}' failed: {:?}", source, e),
            }
        });

        let failed = path.to_string();
        let onerror = Closure::once_into_js(move || {
            log::warn!("webgl: could not load '{}', keeping placeholder", failed);
        });

        image.set_onload(Some(onload.unchecked_ref()));
        image.set_onerror(Some(onerror.unchecked_ref()));
        // Anonymous CORS so a cross-origin atlas does not taint the upload
        image.set_cross_origin(Some(""));
        image.set_src(path);
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        self.gl.clear_color(rgba[0], rgba[1], rgba[2], rgba[3]);
    }

    fn clear(&self) {
        self.gl.clear(Gl::COLOR_BUFFER_BIT);
    }

    fn draw_points(&self, count: i32) {
        self.gl.draw_arrays(Gl::POINTS, 0, count);
    }
}
