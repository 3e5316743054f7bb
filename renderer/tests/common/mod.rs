//! Shared fixtures for the integration tests
#![allow(dead_code)]

use glam::Vec2;
use renderer::attributes::{BlockId, MemoryModel};
use renderer::config::ShaderConfig;
use renderer::gpu::recording::RecordingDevice;
use renderer::scene::{
    Drawable, EffectMaterial, LightingMaterial, ShaderFamily, ShaderProperty,
};
use renderer::shading::{ProgramRegistry, RegistryState};
use std::fs;
use tempfile::TempDir;

pub const BASE_VERT: &str = "uniform mat4 viewMatrix;\nvoid main() {}\n";

pub const PLAIN_FRAG: &str = "uniform sampler2D BaseMap;\nuniform vec2 uvScale;\nvoid main() {}\n";

pub const LIT_FRAG: &str = "\
uniform sampler2D BaseMap;
uniform sampler2D NormalMap;
uniform samplerCube CubeMap;
uniform float glowMult;
uniform float specStrength;
uniform float envReflection;
uniform vec2 uvScale;
uniform mat4 worldMatrix;
void main() {}
";

pub const EFFECT_FRAG: &str = "\
uniform sampler2D BaseMap;
uniform sampler2D GreyscaleMap;
uniform samplerCube CubeMap;
uniform vec4 glowColor;
uniform vec4 falloffParams;
uniform bool hasNormalMap;
uniform float lumEmittance;
void main() {}
";

/// A shader directory on disk
pub struct ShaderDir {
    dir: TempDir,
}

impl ShaderDir {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let shader_dir = Self { dir };
        shader_dir
            .write("base.vert", BASE_VERT)
            .write("plain.frag", PLAIN_FRAG)
            .write("lit.frag", LIT_FRAG)
            .write("effect.frag", EFFECT_FRAG);
        shader_dir
    }

    pub fn write(&self, name: &str, contents: &str) -> &Self {
        fs::write(self.dir.path().join(name), contents).unwrap();
        self
    }

    pub fn remove(&self, name: &str) {
        fs::remove_file(self.dir.path().join(name)).unwrap();
    }

    pub fn config(&self) -> ShaderConfig {
        ShaderConfig::with_shader_dir(self.dir.path())
    }

    /// A registry loaded from this directory
    pub fn registry(&self, device: &mut RecordingDevice) -> ProgramRegistry {
        let mut registry = ProgramRegistry::new();
        assert_eq!(
            registry.apply_settings(&self.config(), device),
            RegistryState::Ready
        );
        registry
    }
}

/// A shape with two coordinate sets and no properties
pub fn shape(model: &mut MemoryModel) -> Drawable {
    let block = model.add_block("NiTriShape", &["NiTriBasedGeom", "NiAVObject"]);
    let mut drawable = Drawable::new(block);
    drawable.coords = vec![vec![Vec2::ZERO; 3], vec![Vec2::ONE; 3]];
    drawable
}

fn shader_property(model: &mut MemoryModel, type_name: &str, family: ShaderFamily) -> ShaderProperty {
    let block: BlockId = model.add_block(type_name, &["BSShaderProperty", "NiProperty"]);
    ShaderProperty::new(block, family)
}

/// A shape carrying a lit-material shader property
pub fn lit_shape(model: &mut MemoryModel, material: LightingMaterial) -> Drawable {
    let mut drawable = shape(model);
    let property = shader_property(
        model,
        "BSLightingShaderProperty",
        ShaderFamily::Lighting(Box::new(material)),
    )
    .with_texture(0, "textures/rock_d.dds")
    .with_texture(1, "textures/rock_n.dds");
    drawable.properties.shader = Some(property);
    drawable
}

/// A shape carrying an effect shader property
pub fn effect_shape(model: &mut MemoryModel, material: EffectMaterial) -> Drawable {
    let mut drawable = shape(model);
    let property = shader_property(
        model,
        "BSEffectShaderProperty",
        ShaderFamily::Effect(Box::new(material)),
    )
    .with_texture(0, "textures/fx_d.dds");
    drawable.properties.shader = Some(property);
    drawable
}
