use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::components::sprite::AtlasRect;

/// Glyph names the simulation looks up.
pub const GLYPH_GROUND: &str = "ground";
pub const GLYPH_WATER: &str = "water";
pub const GLYPH_SETTLER: &str = "settler";
pub const GLYPH_CURSOR: &str = "cursor";

/// Describes the single texture atlas: where the image lives, its logical
/// bounds, and the hand-assigned texel rectangle for each glyph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasManifest {
    /// Path or URL of the atlas image.
    pub path: String,
    /// Logical width used to normalise texel coordinates.
    pub width: f32,
    /// Logical height used to normalise texel coordinates.
    pub height: f32,
    /// Named glyph lookup: name → texel rect.
    pub glyphs: HashMap<String, AtlasRect>,
}

impl Default for AtlasManifest {
    fn default() -> Self {
        let mut glyphs = HashMap::with_capacity(4);
        glyphs.insert(GLYPH_GROUND.to_string(), AtlasRect::new(0.0, 0.0, 24.0, 24.0));
        glyphs.insert(GLYPH_WATER.to_string(), AtlasRect::new(50.0, 0.0, 74.0, 24.0));
        glyphs.insert(GLYPH_SETTLER.to_string(), AtlasRect::new(25.0, 0.0, 49.0, 24.0));
        glyphs.insert(GLYPH_CURSOR.to_string(), AtlasRect::new(25.0, 0.0, 49.0, 24.0));
        Self {
            path: "assets/sprites.png".to_string(),
            width: 128.0,
            height: 128.0,
            glyphs,
        }
    }
}

impl AtlasManifest {
    /// Parse a manifest from a JSON string. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Look up a glyph by name. Unknown names fall back to the full atlas so
    /// something still shows up on screen.
    pub fn glyph(&self, name: &str) -> AtlasRect {
        match self.glyphs.get(name) {
            Some(rect) => *rect,
            None => {
                log::warn!("atlas: unknown glyph '{}'", name);
                AtlasRect::new(0.0, 0.0, self.width, self.height)
            }
        }
    }

    /// Atlas bounds as the `texBounds` uniform expects them.
    pub fn bounds(&self) -> [f32; 2] {
        [self.width, self.height]
    }
}
