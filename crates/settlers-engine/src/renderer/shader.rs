//! Linked shader programs with introspected attribute and uniform tables.
//!
//! The attribute layout is read back from the linked program rather than the
//! source, then sorted by name so byte offsets do not depend on the order the
//! driver happens to report. Each attribute contributes its component count
//! of contiguous floats to one interleaved vertex record.

use crate::error::RenderError;
use crate::renderer::backend::{gl_type, GlBackend, ShaderStage};
use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

/// Point-sprite vertex stage: position, size and atlas rect per vertex.
pub const SPRITE_VERTEX_SHADER: &str = include_str!("../../shaders/sprite.vert");
/// Point-sprite fragment stage: aspect-corrected atlas lookup.
pub const SPRITE_FRAGMENT_SHADER: &str = include_str!("../../shaders/sprite.frag");

const FLOAT_BYTES: i32 = 4;

/// A value destined for a uniform slot, tagged with its GLSL shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat2(Mat2),
    Mat3(Mat3),
    Mat4(Mat4),
}

/// Uniform type as reported by the linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
    /// Samplers, ints, bools... never uploaded by [`ShaderProgram::bind`].
    Unsupported(u32),
}

impl UniformKind {
    pub fn from_gl(ty: u32) -> Self {
        match ty {
            gl_type::FLOAT => UniformKind::Float,
            gl_type::FLOAT_VEC2 => UniformKind::Vec2,
            gl_type::FLOAT_VEC3 => UniformKind::Vec3,
            gl_type::FLOAT_VEC4 => UniformKind::Vec4,
            gl_type::FLOAT_MAT2 => UniformKind::Mat2,
            gl_type::FLOAT_MAT3 => UniformKind::Mat3,
            gl_type::FLOAT_MAT4 => UniformKind::Mat4,
            other => UniformKind::Unsupported(other),
        }
    }
}

/// Number of floats an attribute of the given GL type occupies.
/// Unknown types occupy nothing.
pub fn attribute_components(ty: u32) -> i32 {
    match ty {
        gl_type::FLOAT => 1,
        gl_type::FLOAT_VEC2 => 2,
        gl_type::FLOAT_VEC3 => 3,
        gl_type::FLOAT_VEC4 => 4,
        gl_type::FLOAT_MAT2 => 4,
        gl_type::FLOAT_MAT3 => 9,
        gl_type::FLOAT_MAT4 => 16,
        _ => 0,
    }
}

/// One vertex attribute and where it sits inside the interleaved record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub location: u32,
    pub components: i32,
    /// Byte offset from the start of the vertex record.
    pub offset: i32,
}

/// One active uniform plus the value to push on the next bind.
struct Uniform<L> {
    name: String,
    kind: UniformKind,
    location: Option<L>,
    value: Option<UniformValue>,
}

/// A compiled + linked vertex/fragment pair.
pub struct ShaderProgram<B: GlBackend> {
    program: B::Program,
    attributes: Vec<Attribute>,
    uniforms: Vec<Uniform<B::UniformLocation>>,
    stride: i32,
}

impl<B: GlBackend> ShaderProgram<B> {
    /// Compile, link and introspect. Any compile or link failure is returned
    /// as an error; no partially built program escapes.
    pub fn new(gl: &B, vertex_src: &str, fragment_src: &str) -> Result<Self, RenderError> {
        let vertex = gl
            .compile_shader(ShaderStage::Vertex, vertex_src)
            .map_err(|log| RenderError::ShaderCompile { stage: ShaderStage::Vertex, log })?;
        let fragment = gl
            .compile_shader(ShaderStage::Fragment, fragment_src)
            .map_err(|log| RenderError::ShaderCompile { stage: ShaderStage::Fragment, log })?;
        let program = gl
            .link_program(&vertex, &fragment)
            .map_err(|log| RenderError::ProgramLink { log })?;

        let (attributes, stride) = load_attributes(gl, &program);
        let uniforms = load_uniforms(gl, &program);

        log::debug!(
            "shader: linked on {} with {} attributes ({} bytes/vertex), {} uniforms",
            gl.backend(),
            attributes.len(),
            stride,
            uniforms.len()
        );

        Ok(Self { program, attributes, uniforms, stride })
    }

    /// The built-in point-sprite program.
    pub fn sprite(gl: &B) -> Result<Self, RenderError> {
        Self::new(gl, SPRITE_VERTEX_SHADER, SPRITE_FRAGMENT_SHADER)
    }

    /// Attributes in packing order (sorted by name).
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Active uniform names with their reported kinds.
    pub fn uniforms(&self) -> impl Iterator<Item = (&str, UniformKind)> {
        self.uniforms.iter().map(|u| (u.name.as_str(), u.kind))
    }

    /// Bytes per vertex record.
    pub fn stride(&self) -> i32 {
        self.stride
    }

    /// Floats per vertex record.
    pub fn floats_per_vertex(&self) -> usize {
        (self.stride / FLOAT_BYTES) as usize
    }

    /// Store a value for the named uniform, pushed on the next [`bind`](Self::bind).
    /// Returns `false` if the program has no active uniform by that name.
    pub fn set_uniform(&mut self, name: &str, value: UniformValue) -> bool {
        match self.uniforms.iter_mut().find(|u| u.name == name) {
            Some(uniform) => {
                uniform.value = Some(value);
                true
            }
            None => {
                log::debug!("shader: no active uniform '{}'", name);
                false
            }
        }
    }

    pub fn uniform_value(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms
            .iter()
            .find(|u| u.name == name)
            .and_then(|u| u.value.as_ref())
    }

    /// Make this program current: bind it, point every attribute into the
    /// bound vertex buffer, and upload every uniform that has a value.
    ///
    /// Uniforms are uploaded according to the type the program reported.
    /// Unsupported types (samplers included) are skipped, as are unset slots
    /// and values whose shape does not match the reported type.
    pub fn bind(&self, gl: &B) {
        gl.use_program(&self.program);

        // Zero-width attributes have no slot in the record
        for attribute in self.attributes.iter().filter(|a| a.components > 0) {
            gl.vertex_attrib_pointer(
                attribute.location,
                attribute.components,
                self.stride,
                attribute.offset,
            );
        }

        for uniform in &self.uniforms {
            let (Some(location), Some(value)) = (&uniform.location, &uniform.value) else {
                continue;
            };
            match (uniform.kind, value) {
                (UniformKind::Float, UniformValue::Float(v)) => gl.uniform1f(location, *v),
                (UniformKind::Vec2, UniformValue::Vec2(v)) => {
                    gl.uniform2fv(location, &v.to_array())
                }
                (UniformKind::Vec3, UniformValue::Vec3(v)) => {
                    gl.uniform3fv(location, &v.to_array())
                }
                (UniformKind::Vec4, UniformValue::Vec4(v)) => {
                    gl.uniform4fv(location, &v.to_array())
                }
                (UniformKind::Mat2, UniformValue::Mat2(m)) => {
                    gl.uniform_matrix2fv(location, &m.to_cols_array())
                }
                (UniformKind::Mat3, UniformValue::Mat3(m)) => {
                    gl.uniform_matrix3fv(location, &m.to_cols_array())
                }
                (UniformKind::Mat4, UniformValue::Mat4(m)) => {
                    gl.uniform_matrix4fv(location, &m.to_cols_array())
                }
                (UniformKind::Unsupported(_), _) => {}
                (kind, value) => {
                    log::trace!("shader: '{}' is {:?}, skipping {:?}", uniform.name, kind, value);
                }
            }
        }
    }
}

fn load_attributes<B: GlBackend>(gl: &B, program: &B::Program) -> (Vec<Attribute>, i32) {
    let mut attributes: Vec<Attribute> = gl
        .active_attributes(program)
        .into_iter()
        .filter_map(|info| {
            let Some(location) = gl.attribute_location(program, &info.name) else {
                log::warn!("shader: attribute '{}' has no location", info.name);
                return None;
            };
            let components = attribute_components(info.gl_type);
            if components == 0 {
                log::warn!(
                    "shader: attribute '{}' has unsupported type {:#x}",
                    info.name,
                    info.gl_type
                );
            }
            Some(Attribute { name: info.name, location, components, offset: 0 })
        })
        .collect();

    attributes.sort_by(|a, b| a.name.cmp(&b.name));

    let mut offset = 0;
    for attribute in &mut attributes {
        attribute.offset = offset;
        offset += attribute.components * FLOAT_BYTES;
    }

    (attributes, offset)
}

fn load_uniforms<B: GlBackend>(gl: &B, program: &B::Program) -> Vec<Uniform<B::UniformLocation>> {
    gl.active_uniforms(program)
        .into_iter()
        .map(|info| Uniform {
            location: gl.uniform_location(program, &info.name),
            kind: UniformKind::from_gl(info.gl_type),
            name: info.name,
            value: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::headless::{GlCall, HeadlessGl};

    const UNSORTED_VERT: &str = "
        uniform float scale;
        uniform vec3 tint;
        attribute vec4 color;
        attribute vec2 anchor;
        attribute float weight;
        void main() { gl_Position = vec4(anchor * scale, weight, 1.0); }
    ";
    const PLAIN_FRAG: &str = "
        precision mediump float;
        void main() { gl_FragColor = vec4(1.0); }
    ";

    #[test]
    fn sprite_program_sorts_attributes_and_sums_stride() {
        let gl = HeadlessGl::new();
        let shader = ShaderProgram::sprite(&gl).unwrap();

        let names: Vec<&str> = shader.attributes().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["vertex0Position", "vertex1Size", "vertex2TexCoord"]);

        let offsets: Vec<i32> = shader.attributes().iter().map(|a| a.offset).collect();
        assert_eq!(offsets, [0, 12, 20]);
        assert_eq!(shader.stride(), (3 + 2 + 4) * 4);
        assert_eq!(shader.floats_per_vertex(), 9);
    }

    #[test]
    fn sprite_program_reports_uniform_kinds() {
        let gl = HeadlessGl::new();
        let shader = ShaderProgram::sprite(&gl).unwrap();
        let kinds: Vec<(&str, UniformKind)> = shader.uniforms().collect();
        assert!(kinds.contains(&("projection", UniformKind::Mat4)));
        assert!(kinds.contains(&("view", UniformKind::Mat4)));
        assert!(kinds.contains(&("texBounds", UniformKind::Vec2)));
        assert!(kinds.contains(&("tex", UniformKind::Unsupported(gl_type::SAMPLER_2D))));
    }

    #[test]
    fn packing_order_ignores_declaration_order() {
        let gl = HeadlessGl::new();
        let shader = ShaderProgram::new(&gl, UNSORTED_VERT, PLAIN_FRAG).unwrap();
        let layout: Vec<(&str, i32, i32)> = shader
            .attributes()
            .iter()
            .map(|a| (a.name.as_str(), a.components, a.offset))
            .collect();
        assert_eq!(layout, [("anchor", 2, 0), ("color", 4, 8), ("weight", 1, 24)]);
        assert_eq!(shader.stride(), 28);
    }

    #[test]
    fn compile_failure_is_reported_with_stage() {
        let gl = HeadlessGl::new();
        let err = ShaderProgram::new(&gl, "attribute vec2 p;", PLAIN_FRAG).err().unwrap();
        assert!(matches!(err, RenderError::ShaderCompile { stage: ShaderStage::Vertex, .. }));

        let err = ShaderProgram::new(&gl, UNSORTED_VERT, "precision mediump float;").err().unwrap();
        assert!(matches!(err, RenderError::ShaderCompile { stage: ShaderStage::Fragment, .. }));
    }

    #[test]
    fn link_failure_is_fatal() {
        let gl = HeadlessGl::new();
        let frag = "varying vec2 missing; void main() { gl_FragColor = vec4(missing, 0.0, 1.0); }";
        let err = ShaderProgram::new(&gl, UNSORTED_VERT, frag).err().unwrap();
        assert!(matches!(err, RenderError::ProgramLink { .. }));
    }

    #[test]
    fn set_uniform_only_accepts_active_names() {
        let gl = HeadlessGl::new();
        let mut shader = ShaderProgram::sprite(&gl).unwrap();
        assert!(shader.set_uniform("texBounds", UniformValue::Vec2(Vec2::new(128.0, 128.0))));
        assert!(!shader.set_uniform("nope", UniformValue::Float(1.0)));
        assert_eq!(
            shader.uniform_value("texBounds"),
            Some(&UniformValue::Vec2(Vec2::new(128.0, 128.0)))
        );
    }

    #[test]
    fn bind_points_attributes_at_offsets() {
        let gl = HeadlessGl::new();
        let shader = ShaderProgram::sprite(&gl).unwrap();
        gl.take_calls();
        shader.bind(&gl);

        let pointers: Vec<(i32, i32, i32)> = gl
            .take_calls()
            .into_iter()
            .filter_map(|c| match c {
                GlCall::VertexAttribPointer { components, stride, offset, .. } => {
                    Some((components, stride, offset))
                }
                _ => None,
            })
            .collect();
        assert_eq!(pointers, [(3, 36, 0), (2, 36, 12), (4, 36, 20)]);
    }

    #[test]
    fn bind_never_points_zero_width_attributes() {
        let gl = HeadlessGl::new();
        let vert = "
            attribute vec2 anchor;
            attribute int slot;
            void main() { gl_Position = vec4(anchor, 0.0, 1.0); }
        ";
        let shader = ShaderProgram::new(&gl, vert, PLAIN_FRAG).unwrap();
        assert_eq!(shader.attributes().len(), 2);
        assert_eq!(shader.stride(), 8);
        gl.take_calls();
        shader.bind(&gl);

        let components: Vec<i32> = gl
            .take_calls()
            .into_iter()
            .filter_map(|c| match c {
                GlCall::VertexAttribPointer { components, .. } => Some(components),
                _ => None,
            })
            .collect();
        assert_eq!(components, [2]);
    }

    #[test]
    fn bind_uploads_by_reported_type_and_skips_the_rest() {
        let gl = HeadlessGl::new();
        let mut shader = ShaderProgram::new(&gl, UNSORTED_VERT, PLAIN_FRAG).unwrap();
        shader.set_uniform("scale", UniformValue::Float(2.5));
        // Wrong shape for a vec3: skipped rather than uploaded
        shader.set_uniform("tint", UniformValue::Vec2(Vec2::ONE));
        shader.bind(&gl);

        assert_eq!(gl.uniform_data("scale"), Some(vec![2.5]));
        assert_eq!(gl.uniform_data("tint"), None);

        shader.set_uniform("tint", UniformValue::Vec3(Vec3::new(1.0, 0.5, 0.25)));
        shader.bind(&gl);
        assert_eq!(gl.uniform_data("tint"), Some(vec![1.0, 0.5, 0.25]));
    }

    #[test]
    fn sampler_uniforms_are_never_uploaded() {
        let gl = HeadlessGl::new();
        let mut shader = ShaderProgram::sprite(&gl).unwrap();
        shader.set_uniform("tex", UniformValue::Float(0.0));
        shader.bind(&gl);
        assert_eq!(gl.uniform_data("tex"), None);
    }

    #[test]
    fn matrix_uniforms_upload_column_major() {
        let gl = HeadlessGl::new();
        let mut shader = ShaderProgram::sprite(&gl).unwrap();
        let m = Mat4::from_translation(glam::Vec3::new(3.0, 4.0, 5.0));
        shader.set_uniform("view", UniformValue::Mat4(m));
        shader.bind(&gl);
        let data = gl.uniform_data("view").unwrap();
        assert_eq!(&data[12..15], &[3.0, 4.0, 5.0]);
    }

    #[test]
    fn component_table() {
        assert_eq!(attribute_components(gl_type::FLOAT), 1);
        assert_eq!(attribute_components(gl_type::FLOAT_MAT3), 9);
        assert_eq!(attribute_components(gl_type::SAMPLER_2D), 0);
    }
}
