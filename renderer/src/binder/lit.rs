//! Lit-material family uniforms

use super::shared::PALETTE_CLAMP;
use super::DrawContext;
use crate::scene::{LightingMaterial, SceneOptions};
use crate::shading::UniformSlot;

/// Feed a lit-material program; `false` when the cube map cannot be bound
pub(super) fn bind(ctx: &mut DrawContext<'_>, m: &LightingMaterial) -> bool {
    let placeholders = ctx.placeholders;
    let default_normal = placeholders.default_normal_for(ctx.version);
    let clamp = ctx.shader.map(|s| s.clamp).unwrap_or_default();
    let version = ctx.version;
    let lighting = ctx.has(SceneOptions::LIGHTING);

    ctx.set(UniformSlot::LightingEffect1, m.lighting_effect_1);
    ctx.set(UniformSlot::LightingEffect2, m.lighting_effect_2);
    ctx.set(UniformSlot::Alpha, m.alpha);
    ctx.set(UniformSlot::UvScale, m.uv_scale);
    ctx.set(UniformSlot::UvOffset, m.uv_offset);
    ctx.set(UniformSlot::ViewMatrix, ctx.drawable.view);
    ctx.set(UniformSlot::WorldMatrix, ctx.drawable.world);

    ctx.set(UniformSlot::GreyscaleColor, m.greyscale_color);
    ctx.sampler(UniformSlot::GreyscaleMap, 3, "", PALETTE_CLAMP, None);

    ctx.set(UniformSlot::HasTintColor, m.tint_color.is_some());
    if let Some(tint) = m.tint_color {
        ctx.set(UniformSlot::TintColor, tint);
    }

    ctx.set(UniformSlot::HasDetailMask, m.has_detail_mask);
    ctx.sampler(UniformSlot::DetailMask, 3, &placeholders.blank_detail, clamp, None);

    ctx.set(UniformSlot::HasTintMask, m.has_tint_mask);
    ctx.sampler(UniformSlot::TintMask, 6, &placeholders.gray, clamp, None);

    ctx.set(UniformSlot::HasSoftlight, m.has_softlight);
    ctx.set(UniformSlot::HasRimlight, m.has_rimlight);
    ctx.sampler(UniformSlot::LightMask, 2, default_normal, clamp, None);

    ctx.set(UniformSlot::HasBacklight, m.has_backlight);
    ctx.sampler(UniformSlot::BacklightMap, 7, default_normal, clamp, None);

    let glow = ctx.has(SceneOptions::GLOW) && lighting && (m.has_emittance || version >= 151);
    ctx.set(UniformSlot::GlowMult, if glow { m.emissive_mult } else { 0.0 });
    ctx.set(UniformSlot::HasEmit, m.has_emittance);
    ctx.set(UniformSlot::HasGlowMap, m.has_glow_map);
    ctx.set(UniformSlot::GlowColor, m.emissive_color);

    let specular = ctx.has(SceneOptions::SPECULAR) && lighting;
    ctx.set(
        UniformSlot::SpecStrength,
        if specular { m.specular_strength } else { 0.0 },
    );
    ctx.set(UniformSlot::SpecGlossiness, m.specular_gloss);
    ctx.set(UniformSlot::SpecColor, m.specular_color);
    ctx.set(UniformSlot::HasSpecularMap, m.has_specular_map);

    if version <= 130 {
        let alternate = if version == 130 || (m.has_specular_map && !m.has_backlight) {
            &placeholders.white
        } else {
            &placeholders.black
        };
        ctx.sampler(UniformSlot::SpecularMap, 7, alternate, clamp, None);
    }

    if version >= 130 {
        ctx.set(UniformSlot::DoubleSided, m.double_sided);
        ctx.set(UniformSlot::PaletteScale, m.palette_scale);
        ctx.set(UniformSlot::SubsurfaceRolloff, m.lighting_effect_1);
        ctx.set(UniformSlot::FresnelPower, m.fresnel_power);
        ctx.set(UniformSlot::RimPower, m.rim_power);
        ctx.set(UniformSlot::BacklightPower, m.backlight_power);
    }

    ctx.sampler(UniformSlot::InnerMap, 6, default_normal, clamp, None);
    if let Some(parallax) = m.parallax {
        ctx.set(UniformSlot::InnerScale, parallax.inner_scale);
        ctx.set(UniformSlot::InnerThickness, parallax.inner_thickness);
        ctx.set(UniformSlot::OuterRefraction, parallax.outer_refraction);
        ctx.set(UniformSlot::OuterReflection, parallax.outer_reflection);
    }

    ctx.set(UniformSlot::HasCubeMap, m.has_environment_map);
    ctx.set(UniformSlot::HasEnvMask, m.use_environment_mask);
    let reflect = m.has_environment_map && ctx.has(SceneOptions::CUBE_MAPPING) && lighting;
    ctx.set(
        UniformSlot::EnvReflection,
        if reflect { m.environment_reflection } else { 0.0 },
    );

    // the cube is bound whatever the material says
    if !ctx.cube_sampler(4) {
        return false;
    }
    ctx.sampler(UniformSlot::EnvironmentMask, 5, &placeholders.white, clamp, None);

    if version >= 151 {
        ctx.sampler(UniformSlot::ReflectivityMap, 8, &placeholders.black, clamp, None);
        ctx.sampler(UniformSlot::LightingMap, 9, &placeholders.lighting, clamp, None);
    }

    ctx.set(UniformSlot::HasHeightMap, m.has_height_map);
    ctx.sampler(UniformSlot::HeightMap, 3, &placeholders.gray, clamp, None);

    true
}
