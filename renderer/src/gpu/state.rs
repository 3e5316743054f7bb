//! Per-draw render state and texture unit cursor

use super::GpuDevice;
use glam::Vec4;

/// Source or destination blend factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    One,
    Zero,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    SrcAlphaSaturate,
}

impl BlendFactor {
    /// The eleven factors in the order materials and alpha flags index them
    pub const TABLE: [BlendFactor; 11] = [
        BlendFactor::One,
        BlendFactor::Zero,
        BlendFactor::SrcColor,
        BlendFactor::OneMinusSrcColor,
        BlendFactor::DstColor,
        BlendFactor::OneMinusDstColor,
        BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha,
        BlendFactor::DstAlpha,
        BlendFactor::OneMinusDstAlpha,
        BlendFactor::SrcAlphaSaturate,
    ];

    pub fn from_index(index: u32) -> Option<Self> {
        Self::TABLE.get(index as usize).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendFunc {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

impl BlendFunc {
    pub const ALPHA: BlendFunc = BlendFunc {
        src: BlendFactor::SrcAlpha,
        dst: BlendFactor::OneMinusSrcAlpha,
    };
}

/// Depth or alpha comparison function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareFunction {
    Always,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Never,
}

impl CompareFunction {
    /// Decode the 3-bit function index used by alpha and z-buffer flags
    pub fn from_index(index: u32) -> Self {
        match index & 0x7 {
            0 => CompareFunction::Always,
            1 => CompareFunction::Less,
            2 => CompareFunction::Equal,
            3 => CompareFunction::LessEqual,
            4 => CompareFunction::Greater,
            5 => CompareFunction::NotEqual,
            6 => CompareFunction::GreaterEqual,
            _ => CompareFunction::Never,
        }
    }

    /// Decode a stencil test index, which orders the functions differently;
    /// out of range indices clamp to `Always`
    pub fn from_stencil_index(index: u32) -> Self {
        match index {
            0 => CompareFunction::Never,
            1 => CompareFunction::GreaterEqual,
            2 => CompareFunction::NotEqual,
            3 => CompareFunction::Greater,
            4 => CompareFunction::LessEqual,
            5 => CompareFunction::Equal,
            6 => CompareFunction::Less,
            _ => CompareFunction::Always,
        }
    }
}

/// Stencil buffer update on fail, depth fail and pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StencilOp {
    #[default]
    Keep,
    Zero,
    Replace,
    Increment,
    Decrement,
    Invert,
}

impl StencilOp {
    /// Out of range indices clamp to `Invert`
    pub fn from_index(index: u32) -> Self {
        match index {
            0 => StencilOp::Keep,
            1 => StencilOp::Zero,
            2 => StencilOp::Replace,
            3 => StencilOp::Increment,
            4 => StencilOp::Decrement,
            _ => StencilOp::Invert,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilState {
    pub func: CompareFunction,
    pub reference: u32,
    pub mask: u32,
    pub fail: StencilOp,
    pub depth_fail: StencilOp,
    pub pass: StencilOp,
}

/// Which material colors follow the vertex colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMaterial {
    #[default]
    Off,
    Emission,
    AmbientDiffuse,
}

/// Fixed-function material colors, alpha already folded in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialState {
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    /// `None` leaves the emission color as it was
    pub emissive: Option<Vec4>,
    pub shininess: f32,
}

impl Default for MaterialState {
    /// Used when a draw has no material property
    fn default() -> Self {
        Self {
            ambient: Vec4::new(0.4, 0.4, 0.4, 1.0),
            diffuse: Vec4::new(0.8, 0.8, 0.8, 1.0),
            specular: Vec4::ONE,
            emissive: None,
            shininess: 33.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaTest {
    pub enabled: bool,
    pub func: CompareFunction,
    pub threshold: f32,
}

impl Default for AlphaTest {
    fn default() -> Self {
        Self {
            enabled: false,
            func: CompareFunction::Always,
            threshold: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthState {
    pub test: bool,
    pub write: bool,
    pub func: CompareFunction,
}

impl Default for DepthState {
    fn default() -> Self {
        Self {
            test: true,
            write: true,
            func: CompareFunction::LessEqual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullFace {
    Back,
    Front,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
}

/// Global pipeline state for one draw
///
/// The binder starts every draw from `RenderState::default()` and applies the
/// finished value once, so nothing leaks from the previous draw.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderState {
    pub lighting: bool,
    pub texturing: bool,
    pub blend: Option<BlendFunc>,
    pub alpha_test: AlphaTest,
    pub depth: DepthState,
    pub cull: Option<CullFace>,
    pub polygon_mode: PolygonMode,
    /// `None` leaves the material untouched
    pub material: Option<MaterialState>,
    pub color_material: ColorMaterial,
    /// Light specular forced to black
    pub specular_light_off: bool,
    pub stencil: Option<StencilState>,
    pub normalize: bool,
}

/// Monotonic texture unit cursor for one draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureUnits {
    next: u32,
    max: u32,
}

impl TextureUnits {
    pub fn new(max: u32) -> Self {
        Self { next: 0, max }
    }

    /// The unit the next sampler will use
    pub fn current(&self) -> u32 {
        self.next
    }

    /// Hand out the current unit and advance
    pub fn advance(&mut self) -> u32 {
        let unit = self.next;
        self.next += 1;
        unit
    }

    /// Select `unit` on the device if it exists
    pub fn activate(&self, device: &mut dyn GpuDevice, unit: u32) -> bool {
        if unit >= self.max {
            return false;
        }
        device.active_texture(unit);
        true
    }
}
