//! Per-draw program selection and binding
//!
//! [`Binder::setup_program`] walks the registry in order and binds the first
//! program whose conditions hold and whose binding succeeds. When nothing
//! binds, or shaders are unavailable, the draw goes through the
//! fixed-function path instead.

mod effect;
mod fixed;
mod lit;
mod sampler;
mod shared;

use crate::attributes::AttributeSource;
use crate::config::{PlaceholderTextures, ShaderConfig};
use crate::gpu::{GpuDevice, RenderState, TextureUnits, UniformValue};
use crate::scene::{Drawable, SceneContext, SceneOptions, ShaderFamily, ShaderProperty, VisMode};
use crate::shading::{Program, ProgramRegistry, UniformSlot};
use tracing::{debug, trace};

/// Everything one binding attempt reads and writes
pub(crate) struct DrawContext<'a> {
    pub device: &'a mut dyn GpuDevice,
    pub program: &'a Program,
    pub drawable: &'a Drawable,
    pub shader: Option<&'a ShaderProperty>,
    pub scene: &'a SceneContext,
    pub placeholders: &'a PlaceholderTextures,
    pub version: u32,
    pub units: TextureUnits,
    pub state: RenderState,
    pub depth_test: bool,
    pub depth_write: bool,
}

impl DrawContext<'_> {
    /// Write a uniform if the program declares it
    pub fn set(&mut self, slot: UniformSlot, value: impl Into<UniformValue>) {
        if let Some(location) = self.program.uniform(slot) {
            self.device.set_uniform(location, value.into());
        }
    }

    pub fn has(&self, option: SceneOptions) -> bool {
        self.scene.has(option)
    }
}

/// Chooses and binds programs for drawables
#[derive(Debug, Clone, Default)]
pub struct Binder {
    placeholders: PlaceholderTextures,
}

impl Binder {
    pub fn new(placeholders: PlaceholderTextures) -> Self {
        Self { placeholders }
    }

    pub fn from_config(config: &ShaderConfig) -> Self {
        Self::new(config.placeholders.clone())
    }

    pub fn placeholders(&self) -> &PlaceholderTextures {
        &self.placeholders
    }

    /// Bind a program for the drawable, or fall back to fixed-function
    ///
    /// `hint` is the program used for this drawable last time. `None` forces
    /// fixed-function; an empty string means no preference. Returns the name
    /// of the bound program, to be passed back as the next hint.
    pub fn setup_program(
        &self,
        registry: &ProgramRegistry,
        device: &mut dyn GpuDevice,
        source: &dyn AttributeSource,
        scene: &SceneContext,
        drawable: &Drawable,
        hint: Option<&str>,
    ) -> Option<String> {
        let version = source.bs_version();
        let usable = registry.is_ready()
            && !scene.has(SceneOptions::DISABLE_SHADERS)
            && !scene.has_vis(VisMode::SILHOUETTE)
            && version != 0;

        let hint = match hint {
            Some(hint) if usable => hint,
            _ => {
                self.stop_program(registry, device);
                self.setup_fixed_function(device, scene, drawable);
                return None;
            }
        };

        let blocks = drawable.active_blocks();

        if !hint.is_empty() {
            if let Some(program) = registry.program(hint) {
                if program.matches(source, &blocks)
                    && self.bind(program, device, scene, drawable, version)
                {
                    trace!(program = %program.name, "Reused hinted program");
                    return Some(program.name.clone());
                }
            }
        }

        for program in registry.linked_programs() {
            if program.name == hint || !program.matches(source, &blocks) {
                continue;
            }
            if self.bind(program, device, scene, drawable, version) {
                debug!(program = %program.name, block = drawable.block.0, "Selected program");
                return Some(program.name.clone());
            }
            trace!(program = %program.name, "Program matched but failed to bind");
        }

        self.stop_program(registry, device);
        self.setup_fixed_function(device, scene, drawable);
        None
    }

    /// Unbind any program and reset every texture unit
    pub fn stop_program(&self, registry: &ProgramRegistry, device: &mut dyn GpuDevice) {
        if registry.is_ready() {
            device.use_program(None);
        }
        device.reset_texture_units();
    }

    /// Activate and feed one program; `false` when the draw cannot use it
    fn bind(
        &self,
        program: &Program,
        device: &mut dyn GpuDevice,
        scene: &SceneContext,
        drawable: &Drawable,
        version: u32,
    ) -> bool {
        device.use_program(program.handle());

        let max_units = device.max_texture_units();
        let shader = drawable.properties.shader.as_ref();
        let mut ctx = DrawContext {
            device,
            program,
            drawable,
            shader,
            scene,
            placeholders: &self.placeholders,
            version,
            units: TextureUnits::new(max_units),
            state: RenderState::default(),
            depth_test: drawable.depth_test,
            depth_write: drawable.depth_write,
        };

        shared::apply_unresolved_material_depth(&mut ctx);
        shared::bind_base_normal_glow(&mut ctx);

        let family_bound = match shader.map(|s| &s.family) {
            Some(ShaderFamily::Lighting(material)) => lit::bind(&mut ctx, material),
            Some(ShaderFamily::Effect(material)) => effect::bind(&mut ctx, material),
            _ => {
                ctx.set(UniformSlot::UvScale, glam::Vec2::ONE);
                ctx.set(UniformSlot::UvOffset, glam::Vec2::ZERO);
                true
            }
        };
        if !family_bound || !shared::bind_texcoords(&mut ctx) {
            return false;
        }

        shared::apply_blending(&mut ctx);
        shared::apply_depth(&mut ctx);

        let state = ctx.state;
        ctx.device.apply_render_state(&state);
        true
    }

    /// Configure the fixed-function pipeline; never fails
    pub fn setup_fixed_function(
        &self,
        device: &mut dyn GpuDevice,
        scene: &SceneContext,
        drawable: &Drawable,
    ) {
        let state = fixed::setup(device, scene, drawable);
        device.apply_render_state(&state);
    }
}
