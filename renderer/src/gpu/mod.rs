//! GPU device seam
//!
//! Everything the registry and binder do to the graphics context goes through
//! [`GpuDevice`]. The real context implements it on top of the immediate-mode
//! API; [`recording::RecordingDevice`] records calls for tests and offline
//! validation.

pub mod recording;
pub mod state;

pub use state::{
    AlphaTest, BlendFactor, BlendFunc, ColorMaterial, CompareFunction, CullFace, DepthState,
    MaterialState, PolygonMode, RenderState, StencilOp, StencilState, TextureUnits,
};

use crate::shading::ShaderStage;
use glam::{Mat4, Vec2, Vec3, Vec4};

pub type ShaderHandle = u32;
pub type ProgramHandle = u32;

/// Location of a uniform inside a linked program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

/// A value written to a uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl From<bool> for UniformValue {
    fn from(v: bool) -> Self {
        UniformValue::Int(v as i32)
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(v: Mat4) -> Self {
        UniformValue::Mat4(v)
    }
}

/// Texture wrap mode for the S and T axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureClamp {
    ClampSClampT,
    ClampSWrapT,
    WrapSClampT,
    #[default]
    WrapSWrapT,
    MirrorSMirrorT,
}

impl TextureClamp {
    /// Decode the clamp mode stored in shader properties
    pub fn from_index(index: u32) -> Self {
        match index {
            0 => TextureClamp::ClampSClampT,
            1 => TextureClamp::ClampSWrapT,
            2 => TextureClamp::WrapSClampT,
            4 => TextureClamp::MirrorSMirrorT,
            _ => TextureClamp::WrapSWrapT,
        }
    }
}

/// A per-vertex array bound to the active texture unit's coordinate pointer
#[derive(Debug, Clone, Copy)]
pub enum TexCoordStream<'a> {
    Tangents(&'a [Vec3]),
    Bitangents(&'a [Vec3]),
    Coords(&'a [Vec2]),
}

impl TexCoordStream<'_> {
    pub fn len(&self) -> usize {
        match self {
            TexCoordStream::Tangents(v) | TexCoordStream::Bitangents(v) => v.len(),
            TexCoordStream::Coords(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fixed-function texture environment of one stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextureCombine {
    /// Previous result times this texture, scaled
    Modulate { rgb_scale: f32 },
    /// Blend previous and this texture by this texture's alpha
    Interpolate,
    /// Previous result plus this texture
    Add,
}

/// The graphics context as seen by the shading engine
pub trait GpuDevice {
    /// Whether the context can compile and link programs at all
    fn supports_shaders(&self) -> bool;

    /// Number of texture units usable by a single draw
    fn max_texture_units(&self) -> u32;

    fn create_shader(&mut self, stage: ShaderStage) -> Option<ShaderHandle>;

    /// Compile source into the shader object, returning the info log on failure
    fn compile_shader(&mut self, shader: ShaderHandle, source: &str) -> Result<(), String>;

    fn delete_shader(&mut self, shader: ShaderHandle);

    fn create_program(&mut self) -> Option<ProgramHandle>;

    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle);

    /// Link the program, returning the info log on failure
    fn link_program(&mut self, program: ProgramHandle) -> Result<(), String>;

    fn delete_program(&mut self, program: ProgramHandle);

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Make a program current, or return to fixed-function with `None`
    fn use_program(&mut self, program: Option<ProgramHandle>);

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    /// Select the texture unit subsequent texture calls apply to
    fn active_texture(&mut self, unit: u32);

    /// Bind a 2D texture by path on the active unit
    fn bind_texture(&mut self, path: &str, clamp: TextureClamp) -> bool;

    /// Bind a cube map by path on the active unit
    fn bind_cube_map(&mut self, path: &str) -> bool;

    /// Bind the null texture on the active unit
    fn unbind_texture(&mut self);

    /// Point the active unit's coordinate array at a vertex stream
    fn set_texcoord_stream(&mut self, stream: TexCoordStream<'_>);

    /// Set the fixed-function combine mode of the active unit
    fn set_texture_combine(&mut self, combine: TextureCombine);

    /// Disable texturing and coordinate arrays on every unit
    fn reset_texture_units(&mut self);

    /// Apply the global pipeline state computed for a draw
    fn apply_render_state(&mut self, state: &RenderState);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_from_index() {
        assert_eq!(TextureClamp::from_index(0), TextureClamp::ClampSClampT);
        assert_eq!(TextureClamp::from_index(3), TextureClamp::WrapSWrapT);
        assert_eq!(TextureClamp::from_index(4), TextureClamp::MirrorSMirrorT);
        assert_eq!(TextureClamp::from_index(99), TextureClamp::WrapSWrapT);
    }

    #[test]
    fn test_uniform_value_conversions() {
        assert_eq!(UniformValue::from(true), UniformValue::Int(1));
        assert_eq!(UniformValue::from(false), UniformValue::Int(0));
        assert_eq!(UniformValue::from(0.5), UniformValue::Float(0.5));
    }
}
