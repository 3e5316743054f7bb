//! Sampler uniforms
//!
//! Each sampler takes the next free texture unit. A texture that cannot be
//! bound falls back to the alternate image, then to an empty unit, so the
//! program always samples something deterministic.

use super::DrawContext;
use crate::gpu::{TextureClamp, UniformLocation, UniformValue};
use crate::shading::UniformSlot;
use tracing::trace;

impl DrawContext<'_> {
    /// Bind a shader-property texture slot to a sampler uniform
    ///
    /// The path is `forced` if given, else the material's file for
    /// `texture_slot`, else `alternate`.
    pub fn sampler(
        &mut self,
        slot: UniformSlot,
        texture_slot: usize,
        alternate: &str,
        clamp: TextureClamp,
        forced: Option<&str>,
    ) {
        let Some(location) = self.program.uniform(slot) else {
            return;
        };

        let material = self.shader.map(|s| s.file_name(texture_slot)).unwrap_or("");
        let path = match forced {
            Some(forced) if !forced.is_empty() => forced,
            _ if !material.is_empty() => material,
            _ => alternate,
        };

        if path.is_empty() {
            self.sampler_blank(location);
            return;
        }

        let unit = self.units.current();
        let bound = self.units.activate(self.device, unit)
            && (self.device.bind_texture(path, clamp)
                || self.device.bind_texture(alternate, TextureClamp::WrapSWrapT));

        if bound {
            self.device.set_uniform(location, UniformValue::Int(unit as i32));
            self.units.advance();
        } else {
            trace!(sampler = slot.name(), path, "Texture unavailable, binding blank unit");
            self.sampler_blank(location);
        }
    }

    /// Give the sampler an empty unit
    pub fn sampler_blank(&mut self, location: UniformLocation) {
        let unit = self.units.current();
        if self.units.activate(self.device, unit) {
            self.device.unbind_texture();
            self.device.set_uniform(location, UniformValue::Int(unit as i32));
            self.units.advance();
        }
    }

    /// Bind the environment cube map from `texture_slot`
    ///
    /// Returns `false` when no unit is left or neither the material cube nor
    /// the placeholder cube can be bound; the program cannot draw then.
    pub fn cube_sampler(&mut self, texture_slot: usize) -> bool {
        let Some(location) = self.program.uniform(UniformSlot::CubeMap) else {
            return true;
        };

        let placeholders = self.placeholders;
        let placeholder = placeholders.cube.as_str();
        let material = self.shader.map(|s| s.file_name(texture_slot)).unwrap_or("");
        let path = if material.is_empty() { placeholder } else { material };

        let unit = self.units.current();
        if !self.units.activate(self.device, unit) {
            return false;
        }
        if !self.device.bind_cube_map(path) && !self.device.bind_cube_map(placeholder) {
            return false;
        }
        self.device.set_uniform(location, UniformValue::Int(unit as i32));
        self.units.advance();
        true
    }
}
