//! Decoded render properties attached to a drawable

use crate::attributes::BlockId;
use crate::gpu::{BlendFactor, CompareFunction, CullFace, StencilOp, StencilState, TextureClamp};
use glam::{Vec2, Vec3, Vec4};

/// Texture slots of the legacy multi-texture property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TexSlot {
    Base = 0,
    Dark = 1,
    Detail = 2,
    Gloss = 3,
    Glow = 4,
    BumpMap = 5,
    Decal0 = 6,
    Decal1 = 7,
    Decal2 = 8,
    Decal3 = 9,
}

impl TexSlot {
    pub const COUNT: usize = 10;

    /// Slot named in a `texcoords` directive
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "base" => TexSlot::Base,
            "dark" => TexSlot::Dark,
            "detail" => TexSlot::Detail,
            "gloss" => TexSlot::Gloss,
            "glow" => TexSlot::Glow,
            "bumpmap" => TexSlot::BumpMap,
            "decal0" => TexSlot::Decal0,
            "decal1" => TexSlot::Decal1,
            "decal2" => TexSlot::Decal2,
            "decal3" => TexSlot::Decal3,
            _ => return None,
        })
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Alpha blending and testing flags
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaProperty {
    pub block: BlockId,
    pub blend: bool,
    pub src: BlendFactor,
    pub dst: BlendFactor,
    pub test: bool,
    pub test_func: CompareFunction,
    /// Normalized to `0.0..=1.0`
    pub threshold: f32,
}

impl AlphaProperty {
    /// Decode the packed 16-bit flag word
    ///
    /// Factor indices past the blend table decode as `One`.
    pub fn from_flags(block: BlockId, flags: u16, threshold: u8, bs_version: u32) -> Self {
        let factor = |index: u16| BlendFactor::from_index(u32::from(index)).unwrap_or(BlendFactor::One);
        let mut test = flags & (1 << 9) != 0;
        // weapon blood decals ship without the test bit
        if bs_version >= 130 && flags == 20547 {
            test = true;
        }
        Self {
            block,
            blend: flags & 1 != 0,
            src: factor((flags >> 1) & 0x0f),
            dst: factor((flags >> 5) & 0x0f),
            test,
            test_func: CompareFunction::from_index(u32::from(flags >> 10)),
            threshold: f32::from(threshold) / 255.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZBufferProperty {
    pub block: BlockId,
    pub test: bool,
    pub write: bool,
    pub func: CompareFunction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireframeProperty {
    pub block: BlockId,
    pub wire: bool,
}

/// Legacy material colors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialProperty {
    pub block: BlockId,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub emissive: Vec3,
    pub glossiness: f32,
    pub alpha: f32,
}

impl MaterialProperty {
    pub fn new(block: BlockId) -> Self {
        Self {
            block,
            ambient: Vec3::ONE,
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
            emissive: Vec3::ZERO,
            glossiness: 10.0,
            alpha: 1.0,
        }
    }
}

/// Turns material specular on or off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecularProperty {
    pub block: BlockId,
    pub enabled: bool,
}

impl SpecularProperty {
    pub fn from_flags(block: BlockId, flags: u16) -> Self {
        Self {
            block,
            enabled: flags != 0,
        }
    }
}

/// Material color the vertex colors stand in for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertexColorSource {
    Ignore,
    Emissive,
    #[default]
    AmbientDiffuse,
}

impl VertexColorSource {
    pub fn from_index(index: u32) -> Self {
        match index {
            0 => VertexColorSource::Ignore,
            1 => VertexColorSource::Emissive,
            _ => VertexColorSource::AmbientDiffuse,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexColorProperty {
    pub block: BlockId,
    pub source: VertexColorSource,
}

impl VertexColorProperty {
    /// Decode the source from the flag word of older files
    pub fn from_flags(block: BlockId, flags: u16) -> Self {
        Self {
            block,
            source: VertexColorSource::from_index(u32::from((flags & 0x0030) >> 4)),
        }
    }
}

/// Faces a stencil property draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    #[default]
    CcwOrBoth,
    Ccw,
    Cw,
    Both,
}

impl DrawMode {
    pub fn from_index(index: u32) -> Self {
        match index {
            1 => DrawMode::Ccw,
            2 => DrawMode::Cw,
            3 => DrawMode::Both,
            _ => DrawMode::CcwOrBoth,
        }
    }

    /// Face culled for this mode, `None` when both sides are drawn
    pub fn cull(self) -> Option<CullFace> {
        match self {
            DrawMode::Cw => Some(CullFace::Front),
            DrawMode::Both => None,
            DrawMode::CcwOrBoth | DrawMode::Ccw => Some(CullFace::Back),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilProperty {
    pub block: BlockId,
    pub enabled: bool,
    pub draw_mode: DrawMode,
    pub test: StencilState,
}

impl StencilProperty {
    /// Decode the packed flag word of older files
    ///
    /// Bit 0 enables the test, bits 1-3, 4-6 and 7-9 hold the fail, depth
    /// fail and pass actions, bits 10-11 the draw mode, bits 12-14 the test.
    pub fn from_flags(block: BlockId, flags: u16, reference: u32, mask: u32) -> Self {
        let field = |shift: u16, bits: u16| u32::from((flags >> shift) & bits);
        Self {
            block,
            enabled: flags & 1 != 0,
            draw_mode: DrawMode::from_index(field(10, 0x3)),
            test: StencilState {
                func: CompareFunction::from_stencil_index(field(12, 0x7)),
                reference,
                mask,
                fail: StencilOp::from_index(field(1, 0x7)),
                depth_fail: StencilOp::from_index(field(4, 0x7)),
                pass: StencilOp::from_index(field(7, 0x7)),
            },
        }
    }
}

/// One populated slot of the multi-texture property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureEntry {
    pub file: String,
    pub coord_set: i32,
    pub clamp: TextureClamp,
}

impl TextureEntry {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            coord_set: 0,
            clamp: TextureClamp::WrapSWrapT,
        }
    }
}

/// Legacy multi-texture property
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TexturingProperty {
    pub block: Option<BlockId>,
    pub textures: [Option<TextureEntry>; TexSlot::COUNT],
}

impl TexturingProperty {
    pub fn new(block: BlockId) -> Self {
        Self {
            block: Some(block),
            ..Default::default()
        }
    }

    pub fn with(mut self, slot: TexSlot, entry: TextureEntry) -> Self {
        self.textures[slot.index()] = Some(entry);
        self
    }

    pub fn entry(&self, slot: TexSlot) -> Option<&TextureEntry> {
        self.textures[slot.index()].as_ref()
    }

    /// File name of the slot, empty when unset
    pub fn file_name(&self, slot: TexSlot) -> &str {
        self.entry(slot).map(|e| e.file.as_str()).unwrap_or("")
    }

    /// Coordinate set of the slot, `-1` when unset
    pub fn coord_set(&self, slot: TexSlot) -> i32 {
        self.entry(slot).map(|e| e.coord_set).unwrap_or(-1)
    }
}

/// Old single-texture property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureProperty {
    pub block: BlockId,
    pub file: String,
}

/// Blend settings carried by a resolved material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaterialBlend {
    pub alpha_blend: bool,
    /// Index into the blend factor table
    pub src: u32,
    pub dst: u32,
    pub alpha_test: bool,
    pub alpha_test_ref: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Parallax {
    pub inner_scale: Vec2,
    pub inner_thickness: f32,
    pub outer_refraction: f32,
    pub outer_reflection: f32,
}

/// Parameters of the lit-material shader family
#[derive(Debug, Clone, PartialEq)]
pub struct LightingMaterial {
    pub lighting_effect_1: f32,
    pub lighting_effect_2: f32,
    pub alpha: f32,
    pub uv_scale: Vec2,
    pub uv_offset: Vec2,
    pub greyscale_color: bool,
    pub tint_color: Option<Vec3>,
    pub has_detail_mask: bool,
    pub has_tint_mask: bool,
    pub has_softlight: bool,
    pub has_rimlight: bool,
    pub has_backlight: bool,
    pub has_emittance: bool,
    pub emissive_mult: f32,
    pub emissive_color: Vec3,
    pub has_glow_map: bool,
    pub specular_strength: f32,
    pub specular_gloss: f32,
    pub specular_color: Vec3,
    pub has_specular_map: bool,
    pub double_sided: bool,
    pub palette_scale: f32,
    pub fresnel_power: f32,
    pub rim_power: f32,
    pub backlight_power: f32,
    pub parallax: Option<Parallax>,
    pub has_environment_map: bool,
    pub use_environment_mask: bool,
    pub environment_reflection: f32,
    pub has_height_map: bool,
}

impl Default for LightingMaterial {
    fn default() -> Self {
        Self {
            lighting_effect_1: 0.0,
            lighting_effect_2: 0.0,
            alpha: 1.0,
            uv_scale: Vec2::ONE,
            uv_offset: Vec2::ZERO,
            greyscale_color: false,
            tint_color: None,
            has_detail_mask: false,
            has_tint_mask: false,
            has_softlight: false,
            has_rimlight: false,
            has_backlight: false,
            has_emittance: false,
            emissive_mult: 1.0,
            emissive_color: Vec3::ZERO,
            has_glow_map: false,
            specular_strength: 1.0,
            specular_gloss: 80.0,
            specular_color: Vec3::ONE,
            has_specular_map: false,
            double_sided: false,
            palette_scale: 1.0,
            fresnel_power: 5.0,
            rim_power: 2.0,
            backlight_power: 0.0,
            parallax: None,
            has_environment_map: false,
            use_environment_mask: false,
            environment_reflection: 0.0,
            has_height_map: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Falloff {
    pub start_angle: f32,
    pub stop_angle: f32,
    pub start_opacity: f32,
    pub stop_opacity: f32,
    pub soft_depth: f32,
}

/// Parameters of the effect shader family
#[derive(Debug, Clone, PartialEq)]
pub struct EffectMaterial {
    pub double_sided: bool,
    pub uv_scale: Vec2,
    pub uv_offset: Vec2,
    pub has_source_texture: bool,
    pub has_greyscale_map: bool,
    pub greyscale_alpha: bool,
    pub greyscale_color: bool,
    pub use_falloff: bool,
    pub has_rgb_falloff: bool,
    pub has_weapon_blood: bool,
    pub emissive_color: Vec4,
    pub emissive_mult: f32,
    pub falloff: Falloff,
    pub lighting_influence: f32,
    pub has_normal_map: bool,
    pub has_environment_map: bool,
    pub has_environment_mask: bool,
    pub environment_reflection: f32,
    pub lum_emittance: f32,
}

impl Default for EffectMaterial {
    fn default() -> Self {
        Self {
            double_sided: false,
            uv_scale: Vec2::ONE,
            uv_offset: Vec2::ZERO,
            has_source_texture: false,
            has_greyscale_map: false,
            greyscale_alpha: false,
            greyscale_color: false,
            use_falloff: false,
            has_rgb_falloff: false,
            has_weapon_blood: false,
            emissive_color: Vec4::ONE,
            emissive_mult: 1.0,
            falloff: Falloff::default(),
            lighting_influence: 0.0,
            has_normal_map: false,
            has_environment_map: false,
            has_environment_mask: false,
            environment_reflection: 0.0,
            lum_emittance: 0.0,
        }
    }
}

/// Which family of programs a shader property feeds
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ShaderFamily {
    Lighting(Box<LightingMaterial>),
    Effect(Box<EffectMaterial>),
    #[default]
    Other,
}

/// Shader property with its texture set
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShaderProperty {
    pub block: Option<BlockId>,
    /// Texture file names indexed by slot
    pub textures: Vec<String>,
    pub clamp: TextureClamp,
    /// Blend settings of the resolved material, if one was resolved
    pub material: Option<MaterialBlend>,
    pub family: ShaderFamily,
}

impl ShaderProperty {
    pub fn new(block: BlockId, family: ShaderFamily) -> Self {
        Self {
            block: Some(block),
            family,
            ..Default::default()
        }
    }

    pub fn with_texture(mut self, slot: usize, file: &str) -> Self {
        if self.textures.len() <= slot {
            self.textures.resize(slot + 1, String::new());
        }
        self.textures[slot] = file.to_string();
        self
    }

    /// File name of the slot, empty when unset
    pub fn file_name(&self, slot: usize) -> &str {
        self.textures.get(slot).map(String::as_str).unwrap_or("")
    }

    pub fn lighting(&self) -> Option<&LightingMaterial> {
        match &self.family {
            ShaderFamily::Lighting(m) => Some(m),
            _ => None,
        }
    }

    pub fn effect(&self) -> Option<&EffectMaterial> {
        match &self.family {
            ShaderFamily::Effect(m) => Some(m),
            _ => None,
        }
    }
}

/// Properties active on a drawable
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyList {
    pub alpha: Option<AlphaProperty>,
    pub zbuffer: Option<ZBufferProperty>,
    pub wireframe: Option<WireframeProperty>,
    pub texturing: Option<TexturingProperty>,
    pub texture: Option<TextureProperty>,
    pub shader: Option<ShaderProperty>,
    pub material: Option<MaterialProperty>,
    pub specular: Option<SpecularProperty>,
    pub vertex_color: Option<VertexColorProperty>,
    pub stencil: Option<StencilProperty>,
}

impl PropertyList {
    /// Block ids of every attached property
    pub fn blocks(&self) -> Vec<BlockId> {
        [
            self.alpha.map(|p| p.block),
            self.zbuffer.map(|p| p.block),
            self.wireframe.map(|p| p.block),
            self.texturing.as_ref().and_then(|p| p.block),
            self.texture.as_ref().map(|p| p.block),
            self.shader.as_ref().and_then(|p| p.block),
            self.material.map(|p| p.block),
            self.specular.map(|p| p.block),
            self.vertex_color.map(|p| p.block),
            self.stencil.map(|p| p.block),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tex_slot_names() {
        assert_eq!(TexSlot::from_name("base"), Some(TexSlot::Base));
        assert_eq!(TexSlot::from_name("decal3"), Some(TexSlot::Decal3));
        assert_eq!(TexSlot::from_name("bumpmap").map(TexSlot::index), Some(5));
        assert_eq!(TexSlot::from_name("Base"), None);
    }

    #[test]
    fn test_alpha_flags_decode() {
        // blend on, src alpha, one minus src alpha, test on, greater
        let flags: u16 = 1 | (6 << 1) | (7 << 5) | (1 << 9) | (4 << 10);
        let alpha = AlphaProperty::from_flags(BlockId(0), flags, 128, 100);
        assert!(alpha.blend);
        assert_eq!(alpha.src, BlendFactor::SrcAlpha);
        assert_eq!(alpha.dst, BlendFactor::OneMinusSrcAlpha);
        assert!(alpha.test);
        assert_eq!(alpha.test_func, CompareFunction::Greater);
        assert!((alpha.threshold - 128.0 / 255.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_stencil_flags_decode() {
        // enabled, replace on pass, draw both, test not-equal
        let flags: u16 = 1 | (2 << 7) | (3 << 10) | (2 << 12);
        let stencil = StencilProperty::from_flags(BlockId(0), flags, 1, 0xff);
        assert!(stencil.enabled);
        assert_eq!(stencil.draw_mode, DrawMode::Both);
        assert_eq!(stencil.draw_mode.cull(), None);
        assert_eq!(stencil.test.func, CompareFunction::NotEqual);
        assert_eq!(stencil.test.fail, StencilOp::Keep);
        assert_eq!(stencil.test.pass, StencilOp::Replace);
        assert_eq!((stencil.test.reference, stencil.test.mask), (1, 0xff));
    }

    #[test]
    fn test_vertex_color_flags_decode() {
        let emissive = VertexColorProperty::from_flags(BlockId(0), 1 << 4);
        let fallback = VertexColorProperty::from_flags(BlockId(0), 3 << 4);
        assert_eq!(emissive.source, VertexColorSource::Emissive);
        assert_eq!(fallback.source, VertexColorSource::AmbientDiffuse);
        assert_eq!(DrawMode::from_index(2).cull(), Some(CullFace::Front));
    }

    #[test]
    fn test_alpha_weapon_blood_forces_test() {
        let legacy = AlphaProperty::from_flags(BlockId(0), 20547, 0, 100);
        let modern = AlphaProperty::from_flags(BlockId(0), 20547, 0, 130);
        assert!(!legacy.test);
        assert!(modern.test);
    }

    #[test]
    fn test_texturing_property_lookup() {
        let prop = TexturingProperty::new(BlockId(3)).with(
            TexSlot::Detail,
            TextureEntry {
                file: "textures/detail.dds".into(),
                coord_set: 1,
                clamp: TextureClamp::WrapSWrapT,
            },
        );
        assert_eq!(prop.file_name(TexSlot::Detail), "textures/detail.dds");
        assert_eq!(prop.coord_set(TexSlot::Detail), 1);
        assert_eq!(prop.coord_set(TexSlot::Base), -1);
        assert_eq!(prop.file_name(TexSlot::Base), "");
    }

    #[test]
    fn test_shader_property_family_access() {
        let prop = ShaderProperty::new(BlockId(1), ShaderFamily::Effect(Box::default()))
            .with_texture(2, "env.dds");
        assert!(prop.effect().is_some());
        assert!(prop.lighting().is_none());
        assert_eq!(prop.file_name(2), "env.dds");
        assert_eq!(prop.file_name(0), "");
        assert_eq!(prop.file_name(9), "");
    }

    #[test]
    fn test_property_blocks() {
        let list = PropertyList {
            wireframe: Some(WireframeProperty {
                block: BlockId(7),
                wire: true,
            }),
            shader: Some(ShaderProperty::new(BlockId(4), ShaderFamily::Other)),
            specular: Some(SpecularProperty::from_flags(BlockId(9), 1)),
            ..Default::default()
        };
        assert_eq!(list.blocks(), vec![BlockId(7), BlockId(4), BlockId(9)]);
    }
}
