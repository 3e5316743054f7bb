//! Scene-side inputs to program binding

mod drawable;
mod properties;

pub use drawable::Drawable;
pub use properties::{
    AlphaProperty, DrawMode, EffectMaterial, Falloff, LightingMaterial, MaterialBlend,
    MaterialProperty, Parallax, PropertyList, ShaderFamily, ShaderProperty, SpecularProperty,
    StencilProperty, TexSlot, TextureEntry, TextureProperty, TexturingProperty,
    VertexColorProperty, VertexColorSource, WireframeProperty, ZBufferProperty,
};

use bitflags::bitflags;

bitflags! {
    /// Render toggles chosen by the user
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SceneOptions: u32 {
        const LIGHTING = 1 << 0;
        const TEXTURING = 1 << 1;
        const BLENDING = 1 << 2;
        const GLOW = 1 << 3;
        const SPECULAR = 1 << 4;
        const CUBE_MAPPING = 1 << 5;
        /// Show missing base textures in magenta
        const ERROR_COLOR = 1 << 6;
        /// Force fixed-function for every draw
        const DISABLE_SHADERS = 1 << 7;
        const VERTEX_COLORS = 1 << 8;
    }
}

impl Default for SceneOptions {
    fn default() -> Self {
        SceneOptions::LIGHTING
            | SceneOptions::TEXTURING
            | SceneOptions::BLENDING
            | SceneOptions::GLOW
            | SceneOptions::SPECULAR
            | SceneOptions::CUBE_MAPPING
            | SceneOptions::ERROR_COLOR
            | SceneOptions::VERTEX_COLORS
    }
}

bitflags! {
    /// Debug visualization overrides
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VisMode: u32 {
        const NORMALS_ONLY = 1 << 0;
        const SILHOUETTE = 1 << 1;
    }
}

/// Scene state the binder reads for every draw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneContext {
    pub options: SceneOptions,
    pub vis_mode: VisMode,
}

impl SceneContext {
    pub fn new(options: SceneOptions, vis_mode: VisMode) -> Self {
        Self { options, vis_mode }
    }

    pub fn has(&self, option: SceneOptions) -> bool {
        self.options.contains(option)
    }

    pub fn has_vis(&self, mode: VisMode) -> bool {
        self.vis_mode.contains(mode)
    }
}
