use glam::Mat4;

/// Fixed 2D camera over a pixel surface.
/// Origin at the top-left corner, Y down, one world unit per pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    /// Surface width in pixels.
    pub width: f32,
    /// Surface height in pixels.
    pub height: f32,
}

impl Camera2D {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Orthographic projection from surface pixels to clip space.
    /// (0, 0) maps to the top-left corner of the viewport, (w, h) to the
    /// bottom-right; Z in [-1, 1].
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::orthographic_rh_gl(0.0, self.width, self.height, 0.0, -1.0, 1.0)
    }

    /// The view transform. The surface never scrolls.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::IDENTITY
    }
}
