//! Binding steps common to every program

use super::DrawContext;
use crate::gpu::{
    AlphaTest, BlendFactor, BlendFunc, ColorMaterial, CompareFunction, CullFace, DepthState,
    MaterialState, PolygonMode, RenderState, TexCoordStream, TextureClamp, UniformValue,
};
use crate::scene::{
    AlphaProperty, MaterialProperty, SceneContext, SceneOptions, ShaderFamily, SpecularProperty,
    StencilProperty, TexSlot, VertexColorProperty, VertexColorSource, VisMode, WireframeProperty,
    ZBufferProperty,
};
use glam::Vec4;
use crate::shading::{CoordKind, UniformSlot};
use tracing::{debug, trace};

/// Depth defaults for recent documents whose material was not resolved
pub(super) fn apply_unresolved_material_depth(ctx: &mut DrawContext<'_>) {
    let Some(shader) = ctx.shader else {
        return;
    };
    if shader.material.is_some() || ctx.version < 172 {
        return;
    }
    match shader.family {
        ShaderFamily::Lighting(_) => {
            ctx.depth_test = true;
            ctx.depth_write = true;
        }
        ShaderFamily::Effect(_) => {
            ctx.depth_test = false;
            ctx.depth_write = false;
        }
        ShaderFamily::Other => {}
    }
}

/// Base, normal and glow samplers
///
/// With a shader property they come from its slots 0, 1 and 2 (normal and
/// glow only outside the effect family). Without one, they are derived from
/// the base texture of the legacy multi-texture property.
pub(super) fn bind_base_normal_glow(ctx: &mut DrawContext<'_>) {
    let placeholders = ctx.placeholders;
    let default_normal = placeholders.default_normal_for(ctx.version);

    match ctx.shader {
        Some(shader) => {
            let clamp = shader.clamp;
            let forced = (ctx.has(SceneOptions::LIGHTING)
                && ctx.scene.has_vis(VisMode::NORMALS_ONLY))
            .then_some(placeholders.white.as_str());
            let alternate = if ctx.has(SceneOptions::ERROR_COLOR) && ctx.version < 172 {
                placeholders.magenta.as_str()
            } else {
                placeholders.white.as_str()
            };
            ctx.sampler(UniformSlot::BaseMap, 0, alternate, clamp, forced);

            if !matches!(shader.family, ShaderFamily::Effect(_)) {
                let forced = (!ctx.has(SceneOptions::LIGHTING)).then_some(default_normal);
                ctx.sampler(UniformSlot::NormalMap, 1, default_normal, clamp, forced);
                ctx.sampler(UniformSlot::GlowMap, 2, &placeholders.black, clamp, None);
            }
        }
        None => bind_legacy_base_normal_glow(ctx),
    }
}

fn bind_legacy_base_normal_glow(ctx: &mut DrawContext<'_>) {
    let drawable = ctx.drawable;
    let Some(texturing) = drawable.properties.texturing.as_ref() else {
        return;
    };
    let base = texturing.entry(TexSlot::Base);
    let base_file = texturing.file_name(TexSlot::Base);
    let clamp = base.map(|e| e.clamp).unwrap_or_default();

    let samplers = [
        (UniformSlot::BaseMap, base_file.to_string()),
        (UniformSlot::NormalMap, derived_texture_name(base_file, "_n")),
        (UniformSlot::GlowMap, derived_texture_name(base_file, "_g")),
    ];

    for (slot, path) in samplers {
        let Some(location) = ctx.program.uniform(slot) else {
            continue;
        };
        let unit = ctx.units.current();
        if !path.is_empty()
            && ctx.units.activate(ctx.device, unit)
            && ctx.device.bind_texture(&path, clamp)
        {
            ctx.device.set_uniform(location, UniformValue::Int(unit as i32));
            ctx.units.advance();
        } else {
            ctx.sampler_blank(location);
        }
    }
}

/// Companion texture name: `rock_d.dds` -> `rock_n.dds`, `rock.dds` -> `rock_n.dds`
pub(super) fn derived_texture_name(base: &str, suffix: &str) -> String {
    if base.is_empty() {
        return String::new();
    }
    if let Some(pos) = base.rfind('_') {
        format!("{}{suffix}.dds", &base[..pos])
    } else if let Some(pos) = base.rfind('.') {
        format!("{}{suffix}{}", &base[..pos], &base[pos..])
    } else {
        base.to_string()
    }
}

/// Route vertex streams to the units named by the program's `texcoords`
pub(super) fn bind_texcoords(ctx: &mut DrawContext<'_>) -> bool {
    let drawable = ctx.drawable;
    let program = ctx.program;
    let texturing = drawable.properties.texturing.as_ref();

    for (&unit, &kind) in program.texcoords() {
        if !ctx.units.activate(ctx.device, unit) {
            trace!(unit, "Texture unit unavailable for texcoords");
            return false;
        }

        let stream = match kind {
            CoordKind::Tangent => {
                let tangents = [&drawable.transformed_tangents, &drawable.tangents]
                    .into_iter()
                    .find(|t| !t.is_empty());
                match tangents {
                    Some(t) => TexCoordStream::Tangents(t),
                    None => return false,
                }
            }
            CoordKind::Bitangent => {
                let bitangents = [&drawable.transformed_bitangents, &drawable.bitangents]
                    .into_iter()
                    .find(|t| !t.is_empty());
                match bitangents {
                    Some(t) => TexCoordStream::Bitangents(t),
                    None => return false,
                }
            }
            kind => {
                let set = match (texturing, ctx.shader, kind) {
                    (Some(texturing), _, CoordKind::Texture(slot)) => texturing.coord_set(slot),
                    (None, Some(_), CoordKind::Texture(_)) => 0,
                    // skinning channels have no texture slot to take coordinates from
                    (Some(_), _, _) | (None, Some(_), _) => return false,
                    (None, None, _) => continue,
                };
                match drawable.coord_set(set) {
                    Some(coords) => TexCoordStream::Coords(coords),
                    None => return false,
                }
            }
        };
        ctx.device.set_texcoord_stream(stream);
    }
    true
}

/// Blend and alpha test from the alpha property
pub(super) fn apply_alpha_property(
    state: &mut RenderState,
    alpha: Option<&AlphaProperty>,
    scene: &SceneContext,
) {
    let blending = scene.has(SceneOptions::BLENDING);
    state.blend = match alpha {
        Some(p) if p.blend && blending => Some(BlendFunc {
            src: p.src,
            dst: p.dst,
        }),
        _ => None,
    };
    state.alpha_test = match alpha {
        Some(p) if p.test && blending => AlphaTest {
            enabled: true,
            func: p.test_func,
            threshold: p.threshold,
        },
        _ => AlphaTest {
            enabled: false,
            ..state.alpha_test
        },
    };
}

pub(super) fn apply_zbuffer(state: &mut RenderState, zbuffer: Option<&ZBufferProperty>) {
    state.depth = match zbuffer {
        Some(p) => DepthState {
            test: p.test,
            write: p.write,
            func: p.func,
        },
        None => DepthState::default(),
    };
}

pub(super) fn apply_wireframe(state: &mut RenderState, wireframe: Option<&WireframeProperty>) {
    state.polygon_mode = match wireframe {
        Some(p) if p.wire => PolygonMode::Line,
        _ => PolygonMode::Fill,
    };
}

/// Material colors; a disabled specular property zeroes specular and shininess
pub(super) fn apply_material(
    state: &mut RenderState,
    material: Option<&MaterialProperty>,
    specular: Option<&SpecularProperty>,
) {
    let Some(p) = material else {
        state.material = Some(MaterialState::default());
        return;
    };
    let alpha = p.alpha.clamp(0.0, 1.0);
    let specular_on = specular.is_none_or(|s| s.enabled);
    state.material = Some(MaterialState {
        ambient: p.ambient.extend(alpha),
        diffuse: p.diffuse.extend(alpha),
        specular: if specular_on {
            p.specular.extend(alpha)
        } else {
            Vec4::new(0.0, 0.0, 0.0, alpha)
        },
        emissive: Some(p.emissive.extend(alpha)),
        shininess: if specular_on {
            p.glossiness.clamp(0.0, 128.0)
        } else {
            0.0
        },
    });
}

/// Color material mode; vertex colors drive ambient and diffuse by default
pub(super) fn apply_vertex_colors(
    state: &mut RenderState,
    vertex_color: Option<&VertexColorProperty>,
    has_colors: bool,
) {
    if !has_colors {
        state.color_material = ColorMaterial::Off;
        return;
    }
    let source = vertex_color.map_or(VertexColorSource::AmbientDiffuse, |p| p.source);
    state.color_material = match source {
        VertexColorSource::Ignore => ColorMaterial::Off,
        VertexColorSource::Emissive => ColorMaterial::Emission,
        VertexColorSource::AmbientDiffuse => ColorMaterial::AmbientDiffuse,
    };
}

/// Stencil test and the culling implied by its draw mode
pub(super) fn apply_stencil(state: &mut RenderState, stencil: Option<&StencilProperty>) {
    match stencil {
        Some(p) => {
            state.cull = p.draw_mode.cull();
            state.stencil = p.enabled.then_some(p.test);
        }
        None => {
            state.cull = Some(CullFace::Back);
            state.stencil = None;
        }
    }
}

/// Alpha property, then material blend settings, then the translucency default
pub(super) fn apply_blending(ctx: &mut DrawContext<'_>) {
    apply_alpha_property(
        &mut ctx.state,
        ctx.drawable.properties.alpha.as_ref(),
        ctx.scene,
    );

    let material = ctx.shader.and_then(|s| s.material);
    match material {
        Some(material) if ctx.has(SceneOptions::BLENDING) => {
            ctx.state.blend = if material.alpha_blend {
                match (
                    BlendFactor::from_index(material.src),
                    BlendFactor::from_index(material.dst),
                ) {
                    (Some(src), Some(dst)) => Some(BlendFunc { src, dst }),
                    _ => {
                        debug!(
                            src = material.src,
                            dst = material.dst,
                            "Material blend factor out of range, blending disabled"
                        );
                        None
                    }
                }
            } else {
                None
            };
            ctx.state.alpha_test = if material.alpha_test {
                AlphaTest {
                    enabled: true,
                    func: CompareFunction::Greater,
                    threshold: f32::from(material.alpha_test_ref) / 255.0,
                }
            } else {
                AlphaTest {
                    enabled: false,
                    ..ctx.state.alpha_test
                }
            };
        }
        Some(_) => {}
        None if ctx.drawable.translucent => {
            ctx.state.blend = Some(BlendFunc::ALPHA);
            ctx.state.alpha_test.func = CompareFunction::Greater;
            ctx.state.alpha_test.threshold = 0.1;
        }
        None => {}
    }
}

/// Depth, culling and polygon mode, plus material and stencil on old documents
pub(super) fn apply_depth(ctx: &mut DrawContext<'_>) {
    if ctx.version < 83 {
        let drawable = ctx.drawable;
        let properties = &drawable.properties;
        apply_material(
            &mut ctx.state,
            properties.material.as_ref(),
            properties.specular.as_ref(),
        );
        apply_zbuffer(&mut ctx.state, properties.zbuffer.as_ref());
        apply_stencil(&mut ctx.state, properties.stencil.as_ref());
        apply_wireframe(&mut ctx.state, properties.wireframe.as_ref());
    } else {
        ctx.state.depth = DepthState::default();
        ctx.state.cull = Some(CullFace::Back);
        ctx.state.polygon_mode = PolygonMode::Fill;
    }

    if !ctx.depth_test {
        ctx.state.depth.test = false;
    }
    if !ctx.depth_write || ctx.drawable.translucent {
        ctx.state.depth.write = false;
    }
}

/// Clamp mode for greyscale palettes
pub(super) const PALETTE_CLAMP: TextureClamp = TextureClamp::MirrorSMirrorT;
