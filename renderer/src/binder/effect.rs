//! Effect family uniforms

use super::shared::PALETTE_CLAMP;
use super::DrawContext;
use crate::scene::{EffectMaterial, SceneOptions};
use crate::shading::UniformSlot;
use glam::Vec4;

/// Feed an effect program; `false` when the cube map cannot be bound
///
/// Rebinds the base sampler on a fresh unit with a white fallback, replacing
/// the error-color binding made by the shared samplers.
pub(super) fn bind(ctx: &mut DrawContext<'_>, m: &EffectMaterial) -> bool {
    let placeholders = ctx.placeholders;
    let default_normal = placeholders.default_normal_for(ctx.version);
    let clamp = ctx.shader.map(|s| s.clamp).unwrap_or_default();
    let version = ctx.version;
    let lighting = ctx.has(SceneOptions::LIGHTING);

    ctx.set(UniformSlot::WorldMatrix, ctx.drawable.world);
    ctx.sampler(UniformSlot::BaseMap, 0, &placeholders.white, clamp, None);
    ctx.set(UniformSlot::DoubleSided, m.double_sided);
    ctx.set(UniformSlot::UvScale, m.uv_scale);
    ctx.set(UniformSlot::UvOffset, m.uv_offset);

    ctx.set(UniformSlot::HasSourceTexture, m.has_source_texture);
    ctx.set(UniformSlot::HasGreyscaleMap, m.has_greyscale_map);
    ctx.set(UniformSlot::GreyscaleAlpha, m.greyscale_alpha);
    ctx.set(UniformSlot::GreyscaleColor, m.greyscale_color);
    ctx.set(UniformSlot::UseFalloff, m.use_falloff);
    ctx.set(UniformSlot::HasRgbFalloff, m.has_rgb_falloff);
    ctx.set(UniformSlot::HasWeaponBlood, m.has_weapon_blood);

    ctx.set(UniformSlot::GlowColor, m.emissive_color);
    ctx.set(UniformSlot::GlowMult, m.emissive_mult);

    let falloff = m.falloff;
    ctx.set(
        UniformSlot::FalloffParams,
        Vec4::new(
            falloff.start_angle,
            falloff.stop_angle,
            falloff.start_opacity,
            falloff.stop_opacity,
        ),
    );
    ctx.set(UniformSlot::FalloffDepth, falloff.soft_depth);

    ctx.sampler(UniformSlot::GreyscaleMap, 1, "", PALETTE_CLAMP, None);

    if version < 130 {
        return true;
    }

    ctx.set(UniformSlot::LightingInfluence, m.lighting_influence);
    ctx.set(UniformSlot::HasNormalMap, m.has_normal_map && lighting);
    ctx.sampler(UniformSlot::NormalMap, 3, default_normal, clamp, None);

    ctx.set(UniformSlot::HasCubeMap, m.has_environment_map);
    ctx.set(UniformSlot::HasEnvMask, m.has_environment_mask);
    let reflect = m.has_environment_map && ctx.has(SceneOptions::CUBE_MAPPING) && lighting;
    ctx.set(
        UniformSlot::EnvReflection,
        if reflect { m.environment_reflection } else { 0.0 },
    );

    if !ctx.cube_sampler(2) {
        return false;
    }
    ctx.sampler(UniformSlot::SpecularMap, 4, &placeholders.white, clamp, None);

    if version >= 151 {
        ctx.sampler(UniformSlot::ReflectivityMap, 6, &placeholders.black, clamp, None);
        ctx.sampler(UniformSlot::LightingMap, 7, &placeholders.lighting, clamp, None);
    }

    ctx.set(UniformSlot::LumEmittance, m.lum_emittance);
    true
}
