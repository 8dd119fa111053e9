//! In-memory [`GlBackend`] for tests and offscreen runs.
//!
//! Shaders are "compiled" by scanning their top-level `attribute`, `uniform`
//! and `varying` declarations, which is enough to introspect a linked program
//! the way a real driver would. Every state-changing call is appended to a
//! call log, and buffer, texture and uniform contents are kept so tests can
//! inspect what would have reached the GPU.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::renderer::backend::{gl_type, ActiveInfo, GlBackend, ShaderStage, TextureParams};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    UseProgram(u32),
    VertexAttribPointer { location: u32, components: i32, stride: i32, offset: i32 },
    Uniform { name: String, data: Vec<f32> },
    BindArrayBuffer(u32),
    ArrayBufferData { len: usize },
    BindTexture(u32),
    TexImage { width: u32, height: u32 },
    TexParams(TextureParams),
    LoadImage { path: String },
    ClearColor([f32; 4]),
    Clear,
    DrawPoints(i32),
}

#[derive(Debug, Clone)]
struct Declaration {
    qualifier: Qualifier,
    gl_type: u32,
    type_name: String,
    name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Qualifier {
    Attribute,
    Uniform,
    Varying,
}

struct ShaderRecord {
    stage: ShaderStage,
    declarations: Vec<Declaration>,
}

struct ProgramRecord {
    attributes: Vec<ActiveInfo>,
    uniforms: Vec<ActiveInfo>,
}

/// Texture object contents.
#[derive(Debug, Clone, Default)]
pub struct TextureState {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub params: Option<TextureParams>,
    /// Image path once an asynchronous load has completed.
    pub source: Option<String>,
}

struct PendingLoad {
    texture: u32,
    path: String,
    params: TextureParams,
}

#[derive(Default)]
struct State {
    next_handle: u32,
    fail_allocations: bool,
    shaders: HashMap<u32, ShaderRecord>,
    programs: HashMap<u32, ProgramRecord>,
    current_program: Option<u32>,
    buffers: HashMap<u32, Vec<f32>>,
    bound_buffer: Option<u32>,
    textures: HashMap<u32, TextureState>,
    bound_texture: Option<u32>,
    pending_loads: Vec<PendingLoad>,
    uniforms: HashMap<String, Vec<f32>>,
    clear_color: [f32; 4],
    calls: Vec<GlCall>,
}

impl State {
    fn handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

/// Recording GL backend. Handles are plain integers.
#[derive(Default)]
pub struct HeadlessGl {
    state: RefCell<State>,
}

impl HeadlessGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `create_buffer` / `create_texture` fail, as a lost context would.
    pub fn set_fail_allocations(&self, fail: bool) {
        self.state.borrow_mut().fail_allocations = fail;
    }

    /// Return and clear the call log.
    pub fn take_calls(&self) -> Vec<GlCall> {
        std::mem::take(&mut self.state.borrow_mut().calls)
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.state.borrow().calls.clone()
    }

    /// Point counts of every draw issued so far.
    pub fn draw_counts(&self) -> Vec<i32> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                GlCall::DrawPoints(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    /// Last data uploaded to the named uniform.
    pub fn uniform_data(&self, name: &str) -> Option<Vec<f32>> {
        self.state.borrow().uniforms.get(name).cloned()
    }

    /// Current contents of a buffer object.
    pub fn buffer_data(&self, buffer: u32) -> Option<Vec<f32>> {
        self.state.borrow().buffers.get(&buffer).cloned()
    }

    pub fn texture(&self, texture: u32) -> Option<TextureState> {
        self.state.borrow().textures.get(&texture).cloned()
    }

    pub fn bound_texture(&self) -> Option<u32> {
        self.state.borrow().bound_texture
    }

    pub fn clear_color_value(&self) -> [f32; 4] {
        self.state.borrow().clear_color
    }

    /// Paths of image loads that have not completed yet.
    pub fn pending_image_loads(&self) -> Vec<String> {
        self.state.borrow().pending_loads.iter().map(|l| l.path.clone()).collect()
    }

    /// Complete every pending image load with a white `width`×`height` image.
    /// Returns the number of loads completed.
    pub fn finish_image_loads(&self, width: u32, height: u32) -> usize {
        let mut state = self.state.borrow_mut();
        let loads = std::mem::take(&mut state.pending_loads);
        let count = loads.len();
        for load in loads {
            state.bound_texture = Some(load.texture);
            state.calls.push(GlCall::BindTexture(load.texture));
            state.calls.push(GlCall::TexImage { width, height });
            state.calls.push(GlCall::TexParams(load.params));
            let texture = state.textures.entry(load.texture).or_default();
            texture.width = width;
            texture.height = height;
            texture.pixels = vec![255; (width * height * 4) as usize];
            texture.params = Some(load.params);
            texture.source = Some(load.path);
        }
        count
    }

    fn record_uniform(&self, name: &str, data: Vec<f32>) {
        let mut state = self.state.borrow_mut();
        state.uniforms.insert(name.to_string(), data.clone());
        state.calls.push(GlCall::Uniform { name: name.to_string(), data });
    }
}

impl GlBackend for HeadlessGl {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type Texture = u32;
    type UniformLocation = String;

    fn backend(&self) -> &'static str {
        "headless"
    }

    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<u32, String> {
        if !source.contains("void main") {
            return Err(format!("ERROR: 0:1: {} shader has no entry point 'main'", stage));
        }
        let declarations = parse_declarations(source);
        if stage == ShaderStage::Fragment
            && declarations.iter().any(|d| d.qualifier == Qualifier::Attribute)
        {
            return Err("ERROR: 0:1: 'attribute' : supported in vertex shaders only".to_string());
        }
        let mut state = self.state.borrow_mut();
        let handle = state.handle();
        state.shaders.insert(handle, ShaderRecord { stage, declarations });
        Ok(handle)
    }

    fn link_program(&self, vertex: &u32, fragment: &u32) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let (attributes, uniforms) = {
            let (Some(vs), Some(fs)) = (state.shaders.get(vertex), state.shaders.get(fragment))
            else {
                return Err("invalid shader handle".to_string());
            };
            if vs.stage != ShaderStage::Vertex || fs.stage != ShaderStage::Fragment {
                return Err("shader stages attached in the wrong slots".to_string());
            }

            for varying in fs.declarations.iter().filter(|d| d.qualifier == Qualifier::Varying) {
                let written = vs.declarations.iter().any(|d| {
                    d.qualifier == Qualifier::Varying
                        && d.name == varying.name
                        && d.type_name == varying.type_name
                });
                if !written {
                    return Err(format!(
                        "Varying '{}' is read by the fragment shader \
                         but not declared in the vertex shader",
                        varying.name
                    ));
                }
            }

            let attributes: Vec<ActiveInfo> = vs
                .declarations
                .iter()
                .filter(|d| d.qualifier == Qualifier::Attribute)
                .map(|d| ActiveInfo { name: d.name.clone(), gl_type: d.gl_type })
                .collect();

            let mut uniforms: Vec<ActiveInfo> = Vec::new();
            for d in vs.declarations.iter().chain(fs.declarations.iter()) {
                if d.qualifier == Qualifier::Uniform && !uniforms.iter().any(|u| u.name == d.name) {
                    uniforms.push(ActiveInfo { name: d.name.clone(), gl_type: d.gl_type });
                }
            }
            (attributes, uniforms)
        };

        let handle = state.handle();
        state.programs.insert(handle, ProgramRecord { attributes, uniforms });
        Ok(handle)
    }

    fn active_attributes(&self, program: &u32) -> Vec<ActiveInfo> {
        self.state
            .borrow()
            .programs
            .get(program)
            .map(|p| p.attributes.clone())
            .unwrap_or_default()
    }

    fn active_uniforms(&self, program: &u32) -> Vec<ActiveInfo> {
        self.state
            .borrow()
            .programs
            .get(program)
            .map(|p| p.uniforms.clone())
            .unwrap_or_default()
    }

    fn attribute_location(&self, program: &u32, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        let program = state.programs.get(program)?;
        program
            .attributes
            .iter()
            .position(|a| a.name == name)
            .map(|i| i as u32)
    }

    fn uniform_location(&self, program: &u32, name: &str) -> Option<String> {
        let state = self.state.borrow();
        let program = state.programs.get(program)?;
        program
            .uniforms
            .iter()
            .any(|u| u.name == name)
            .then(|| name.to_string())
    }

    fn use_program(&self, program: &u32) {
        let mut state = self.state.borrow_mut();
        state.current_program = Some(*program);
        state.calls.push(GlCall::UseProgram(*program));
    }

    fn vertex_attrib_pointer(&self, location: u32, components: i32, stride: i32, offset: i32) {
        self.state
            .borrow_mut()
            .calls
            .push(GlCall::VertexAttribPointer { location, components, stride, offset });
    }

    fn uniform1f(&self, location: &String, value: f32) {
        self.record_uniform(location, vec![value]);
    }

    fn uniform2fv(&self, location: &String, value: &[f32; 2]) {
        self.record_uniform(location, value.to_vec());
    }

    fn uniform3fv(&self, location: &String, value: &[f32; 3]) {
        self.record_uniform(location, value.to_vec());
    }

    fn uniform4fv(&self, location: &String, value: &[f32; 4]) {
        self.record_uniform(location, value.to_vec());
    }

    fn uniform_matrix2fv(&self, location: &String, value: &[f32; 4]) {
        self.record_uniform(location, value.to_vec());
    }

    fn uniform_matrix3fv(&self, location: &String, value: &[f32; 9]) {
        self.record_uniform(location, value.to_vec());
    }

    fn uniform_matrix4fv(&self, location: &String, value: &[f32; 16]) {
        self.record_uniform(location, value.to_vec());
    }

    fn create_buffer(&self) -> Option<u32> {
        let mut state = self.state.borrow_mut();
        if state.fail_allocations {
            return None;
        }
        let handle = state.handle();
        state.buffers.insert(handle, Vec::new());
        Some(handle)
    }

    fn bind_array_buffer(&self, buffer: &u32) {
        let mut state = self.state.borrow_mut();
        state.bound_buffer = Some(*buffer);
        state.calls.push(GlCall::BindArrayBuffer(*buffer));
    }

    fn array_buffer_data(&self, data: &[f32]) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::ArrayBufferData { len: data.len() });
        if let Some(bound) = state.bound_buffer {
            state.buffers.insert(bound, data.to_vec());
        }
    }

    fn create_texture(&self) -> Option<u32> {
        let mut state = self.state.borrow_mut();
        if state.fail_allocations {
            return None;
        }
        let handle = state.handle();
        state.textures.insert(handle, TextureState::default());
        Some(handle)
    }

    fn bind_texture(&self, texture: &u32) {
        let mut state = self.state.borrow_mut();
        state.bound_texture = Some(*texture);
        state.calls.push(GlCall::BindTexture(*texture));
    }

    fn tex_image_rgba(&self, width: u32, height: u32, pixels: &[u8]) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::TexImage { width, height });
        if let Some(bound) = state.bound_texture {
            let texture = state.textures.entry(bound).or_default();
            texture.width = width;
            texture.height = height;
            texture.pixels = pixels.to_vec();
        }
    }

    fn tex_params(&self, params: TextureParams) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::TexParams(params));
        if let Some(bound) = state.bound_texture {
            state.textures.entry(bound).or_default().params = Some(params);
        }
    }

    fn load_texture_image(&self, texture: &u32, path: &str, params: TextureParams) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::LoadImage { path: path.to_string() });
        state.pending_loads.push(PendingLoad { texture: *texture, path: path.to_string(), params });
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        let mut state = self.state.borrow_mut();
        state.clear_color = rgba;
        state.calls.push(GlCall::ClearColor(rgba));
    }

    fn clear(&self) {
        self.state.borrow_mut().calls.push(GlCall::Clear);
    }

    fn draw_points(&self, count: i32) {
        self.state.borrow_mut().calls.push(GlCall::DrawPoints(count));
    }
}

/// Scan top-level storage-qualified declarations out of GLSL ES 1.00 source.
fn parse_declarations(source: &str) -> Vec<Declaration> {
    let stripped: String = source
        .lines()
        .map(|line| line.split("//").next().unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n");

    stripped
        .split(|c| c == ';' || c == '{' || c == '}')
        .filter_map(|statement| {
            let mut tokens = statement
                .split_whitespace()
                .filter(|t| !matches!(*t, "lowp" | "mediump" | "highp"));
            let qualifier = match tokens.next()? {
                "attribute" => Qualifier::Attribute,
                "uniform" => Qualifier::Uniform,
                "varying" => Qualifier::Varying,
                _ => return None,
            };
            let type_name = tokens.next()?.to_string();
            let name = tokens.next()?.to_string();
            Some(Declaration { qualifier, gl_type: type_enum(&type_name), type_name, name })
        })
        .collect()
}

fn type_enum(type_name: &str) -> u32 {
    match type_name {
        "float" => gl_type::FLOAT,
        "vec2" => gl_type::FLOAT_VEC2,
        "vec3" => gl_type::FLOAT_VEC3,
        "vec4" => gl_type::FLOAT_VEC4,
        "mat2" => gl_type::FLOAT_MAT2,
        "mat3" => gl_type::FLOAT_MAT3,
        "mat4" => gl_type::FLOAT_MAT4,
        "sampler2D" => gl_type::SAMPLER_2D,
        "bool" => gl_type::BOOL,
        _ => gl_type::INT,
    }
}
