//! Fixed-function fallback
//!
//! Computes the render state for a draw with no program bound and chains
//! texture-combine stages for whichever texture property the drawable has.

use super::shared::{
    apply_alpha_property, apply_material, apply_stencil, apply_vertex_colors, apply_wireframe,
    apply_zbuffer,
};
use crate::gpu::{
    BlendFunc, CompareFunction, GpuDevice, RenderState, TexCoordStream, TextureClamp,
    TextureCombine,
};
use crate::scene::{Drawable, SceneContext, SceneOptions, TexSlot};
use tracing::trace;

/// Legacy multi-texture stages in combine order
const STAGES: [(TexSlot, TextureCombine); 8] = [
    (TexSlot::Dark, TextureCombine::Modulate { rgb_scale: 1.0 }),
    (TexSlot::Base, TextureCombine::Modulate { rgb_scale: 1.0 }),
    (TexSlot::Detail, TextureCombine::Modulate { rgb_scale: 2.0 }),
    (TexSlot::Decal0, TextureCombine::Interpolate),
    (TexSlot::Decal1, TextureCombine::Interpolate),
    (TexSlot::Decal2, TextureCombine::Interpolate),
    (TexSlot::Decal3, TextureCombine::Interpolate),
    (TexSlot::Glow, TextureCombine::Add),
];

/// Render state and texture stages for a fixed-function draw
pub(super) fn setup(
    device: &mut dyn GpuDevice,
    scene: &SceneContext,
    drawable: &Drawable,
) -> RenderState {
    let properties = &drawable.properties;
    let mut state = RenderState {
        lighting: true,
        specular_light_off: true,
        normalize: !drawable.normals.is_empty(),
        ..RenderState::default()
    };

    apply_alpha_property(&mut state, properties.alpha.as_ref(), scene);
    let has_colors = !drawable.colors.is_empty() && scene.has(SceneOptions::VERTEX_COLORS);
    apply_vertex_colors(&mut state, properties.vertex_color.as_ref(), has_colors);
    apply_material(&mut state, properties.material.as_ref(), properties.specular.as_ref());
    apply_zbuffer(&mut state, properties.zbuffer.as_ref());
    if !drawable.depth_test {
        state.depth.test = false;
    }
    if !drawable.depth_write {
        state.depth.write = false;
    }
    apply_stencil(&mut state, properties.stencil.as_ref());
    apply_wireframe(&mut state, properties.wireframe.as_ref());

    if !scene.has(SceneOptions::TEXTURING) {
        return state;
    }

    if let Some(texturing) = &properties.texturing {
        let mut stage = 0;
        for (slot, combine) in STAGES {
            let Some(entry) = texturing.entry(slot) else {
                continue;
            };
            let Some(coords) = drawable.coord_set(entry.coord_set) else {
                continue;
            };
            if stage >= device.max_texture_units() {
                break;
            }
            device.active_texture(stage);
            if !device.bind_texture(&entry.file, entry.clamp) {
                trace!(file = %entry.file, ?slot, "Skipping texture stage");
                continue;
            }
            device.set_texcoord_stream(TexCoordStream::Coords(coords));
            device.set_texture_combine(combine);
            stage += 1;
        }
        state.texturing = stage > 0;
    } else if let Some(texture) = &properties.texture {
        state.texturing = bind_single_stage(device, drawable, &texture.file, TextureClamp::WrapSWrapT);
    } else if let Some(shader) = &properties.shader {
        state.texturing = bind_single_stage(device, drawable, shader.file_name(0), shader.clamp);
        if state.texturing {
            device.set_texture_combine(TextureCombine::Modulate { rgb_scale: 1.0 });
            if drawable.translucent {
                state.blend = Some(BlendFunc::ALPHA);
                state.alpha_test.func = CompareFunction::Greater;
                state.alpha_test.threshold = 0.1;
            }
        }
    } else {
        state.texturing = false;
    }

    state
}

/// Bind one texture on unit 0 with the first coordinate set
fn bind_single_stage(
    device: &mut dyn GpuDevice,
    drawable: &Drawable,
    file: &str,
    clamp: TextureClamp,
) -> bool {
    let Some(coords) = drawable.coord_set(0) else {
        return false;
    };
    if device.max_texture_units() == 0 {
        return false;
    }
    device.active_texture(0);
    if !device.bind_texture(file, clamp) {
        return false;
    }
    device.set_texcoord_stream(TexCoordStream::Coords(coords));
    true
}
