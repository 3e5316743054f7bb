//! Uniform names known to the binder

use crate::gpu::{GpuDevice, ProgramHandle, UniformLocation};

/// Every uniform a program may declare
///
/// A program does not need to declare all of them; missing ones resolve to
/// an absent location and binding code skips them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformSlot {
    // samplers
    BaseMap,
    NormalMap,
    GlowMap,
    GreyscaleMap,
    DetailMask,
    TintMask,
    LightMask,
    BacklightMap,
    SpecularMap,
    InnerMap,
    CubeMap,
    EnvironmentMask,
    ReflectivityMap,
    LightingMap,
    HeightMap,
    // transforms and texture placement
    ViewMatrix,
    WorldMatrix,
    UvScale,
    UvOffset,
    // lit material
    Alpha,
    LightingEffect1,
    LightingEffect2,
    GreyscaleColor,
    HasTintColor,
    TintColor,
    HasDetailMask,
    HasTintMask,
    HasSoftlight,
    HasRimlight,
    HasBacklight,
    GlowMult,
    HasEmit,
    HasGlowMap,
    GlowColor,
    SpecStrength,
    SpecGlossiness,
    SpecColor,
    HasSpecularMap,
    DoubleSided,
    PaletteScale,
    SubsurfaceRolloff,
    FresnelPower,
    RimPower,
    BacklightPower,
    InnerScale,
    InnerThickness,
    OuterRefraction,
    OuterReflection,
    HasCubeMap,
    HasEnvMask,
    EnvReflection,
    HasHeightMap,
    // effect
    HasSourceTexture,
    HasGreyscaleMap,
    GreyscaleAlpha,
    UseFalloff,
    HasRgbFalloff,
    HasWeaponBlood,
    FalloffParams,
    FalloffDepth,
    LightingInfluence,
    HasNormalMap,
    LumEmittance,
}

impl UniformSlot {
    pub const ALL: [UniformSlot; 63] = [
        UniformSlot::BaseMap,
        UniformSlot::NormalMap,
        UniformSlot::GlowMap,
        UniformSlot::GreyscaleMap,
        UniformSlot::DetailMask,
        UniformSlot::TintMask,
        UniformSlot::LightMask,
        UniformSlot::BacklightMap,
        UniformSlot::SpecularMap,
        UniformSlot::InnerMap,
        UniformSlot::CubeMap,
        UniformSlot::EnvironmentMask,
        UniformSlot::ReflectivityMap,
        UniformSlot::LightingMap,
        UniformSlot::HeightMap,
        UniformSlot::ViewMatrix,
        UniformSlot::WorldMatrix,
        UniformSlot::UvScale,
        UniformSlot::UvOffset,
        UniformSlot::Alpha,
        UniformSlot::LightingEffect1,
        UniformSlot::LightingEffect2,
        UniformSlot::GreyscaleColor,
        UniformSlot::HasTintColor,
        UniformSlot::TintColor,
        UniformSlot::HasDetailMask,
        UniformSlot::HasTintMask,
        UniformSlot::HasSoftlight,
        UniformSlot::HasRimlight,
        UniformSlot::HasBacklight,
        UniformSlot::GlowMult,
        UniformSlot::HasEmit,
        UniformSlot::HasGlowMap,
        UniformSlot::GlowColor,
        UniformSlot::SpecStrength,
        UniformSlot::SpecGlossiness,
        UniformSlot::SpecColor,
        UniformSlot::HasSpecularMap,
        UniformSlot::DoubleSided,
        UniformSlot::PaletteScale,
        UniformSlot::SubsurfaceRolloff,
        UniformSlot::FresnelPower,
        UniformSlot::RimPower,
        UniformSlot::BacklightPower,
        UniformSlot::InnerScale,
        UniformSlot::InnerThickness,
        UniformSlot::OuterRefraction,
        UniformSlot::OuterReflection,
        UniformSlot::HasCubeMap,
        UniformSlot::HasEnvMask,
        UniformSlot::EnvReflection,
        UniformSlot::HasHeightMap,
        UniformSlot::HasSourceTexture,
        UniformSlot::HasGreyscaleMap,
        UniformSlot::GreyscaleAlpha,
        UniformSlot::UseFalloff,
        UniformSlot::HasRgbFalloff,
        UniformSlot::HasWeaponBlood,
        UniformSlot::FalloffParams,
        UniformSlot::FalloffDepth,
        UniformSlot::LightingInfluence,
        UniformSlot::HasNormalMap,
        UniformSlot::LumEmittance,
    ];

    /// Name of the uniform in shader source
    pub fn name(self) -> &'static str {
        match self {
            UniformSlot::BaseMap => "BaseMap",
            UniformSlot::NormalMap => "NormalMap",
            UniformSlot::GlowMap => "GlowMap",
            UniformSlot::GreyscaleMap => "GreyscaleMap",
            UniformSlot::DetailMask => "DetailMask",
            UniformSlot::TintMask => "TintMask",
            UniformSlot::LightMask => "LightMask",
            UniformSlot::BacklightMap => "BacklightMap",
            UniformSlot::SpecularMap => "SpecularMap",
            UniformSlot::InnerMap => "InnerMap",
            UniformSlot::CubeMap => "CubeMap",
            UniformSlot::EnvironmentMask => "EnvironmentMap",
            UniformSlot::ReflectivityMap => "ReflMap",
            UniformSlot::LightingMap => "LightingMap",
            UniformSlot::HeightMap => "HeightMap",
            UniformSlot::ViewMatrix => "viewMatrix",
            UniformSlot::WorldMatrix => "worldMatrix",
            UniformSlot::UvScale => "uvScale",
            UniformSlot::UvOffset => "uvOffset",
            UniformSlot::Alpha => "alpha",
            UniformSlot::LightingEffect1 => "lightingEffect1",
            UniformSlot::LightingEffect2 => "lightingEffect2",
            UniformSlot::GreyscaleColor => "greyscaleColor",
            UniformSlot::HasTintColor => "hasTintColor",
            UniformSlot::TintColor => "tintColor",
            UniformSlot::HasDetailMask => "hasDetailMask",
            UniformSlot::HasTintMask => "hasTintMask",
            UniformSlot::HasSoftlight => "hasSoftlight",
            UniformSlot::HasRimlight => "hasRimlight",
            UniformSlot::HasBacklight => "hasBacklight",
            UniformSlot::GlowMult => "glowMult",
            UniformSlot::HasEmit => "hasEmit",
            UniformSlot::HasGlowMap => "hasGlowMap",
            UniformSlot::GlowColor => "glowColor",
            UniformSlot::SpecStrength => "specStrength",
            UniformSlot::SpecGlossiness => "specGlossiness",
            UniformSlot::SpecColor => "specColor",
            UniformSlot::HasSpecularMap => "hasSpecularMap",
            UniformSlot::DoubleSided => "doubleSided",
            UniformSlot::PaletteScale => "paletteScale",
            UniformSlot::SubsurfaceRolloff => "subsurfaceRolloff",
            UniformSlot::FresnelPower => "fresnelPower",
            UniformSlot::RimPower => "rimPower",
            UniformSlot::BacklightPower => "backlightPower",
            UniformSlot::InnerScale => "innerScale",
            UniformSlot::InnerThickness => "innerThickness",
            UniformSlot::OuterRefraction => "outerRefraction",
            UniformSlot::OuterReflection => "outerReflection",
            UniformSlot::HasCubeMap => "hasCubeMap",
            UniformSlot::HasEnvMask => "hasEnvMask",
            UniformSlot::EnvReflection => "envReflection",
            UniformSlot::HasHeightMap => "hasHeightMap",
            UniformSlot::HasSourceTexture => "hasSourceTexture",
            UniformSlot::HasGreyscaleMap => "hasGreyscaleMap",
            UniformSlot::GreyscaleAlpha => "greyscaleAlpha",
            UniformSlot::UseFalloff => "useFalloff",
            UniformSlot::HasRgbFalloff => "hasRGBFalloff",
            UniformSlot::HasWeaponBlood => "hasWeaponBlood",
            UniformSlot::FalloffParams => "falloffParams",
            UniformSlot::FalloffDepth => "falloffDepth",
            UniformSlot::LightingInfluence => "lightingInfluence",
            UniformSlot::HasNormalMap => "hasNormalMap",
            UniformSlot::LumEmittance => "lumEmittance",
        }
    }
}

/// Uniform locations of one linked program
#[derive(Debug, Clone, Default)]
pub struct UniformTable {
    locations: Vec<Option<UniformLocation>>,
}

impl UniformTable {
    /// Query every known uniform on a freshly linked program
    pub fn query(device: &mut dyn GpuDevice, program: ProgramHandle) -> Self {
        let locations = UniformSlot::ALL
            .iter()
            .map(|slot| device.uniform_location(program, slot.name()))
            .collect();
        Self { locations }
    }

    /// Location of the slot, `None` when the program does not declare it
    pub fn get(&self, slot: UniformSlot) -> Option<UniformLocation> {
        self.locations.get(slot as usize).copied().flatten()
    }

    pub fn declared(&self) -> usize {
        self.locations.iter().filter(|l| l.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_declaration_order() {
        for (index, slot) in UniformSlot::ALL.iter().enumerate() {
            assert_eq!(*slot as usize, index, "{slot:?} out of order");
        }
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = UniformSlot::ALL.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), UniformSlot::ALL.len());
    }

    #[test]
    fn test_empty_table_reports_absent() {
        let table = UniformTable::default();
        assert_eq!(table.get(UniformSlot::BaseMap), None);
        assert_eq!(table.declared(), 0);
    }
}
