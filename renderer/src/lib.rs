//! Shader program matching and binding
//!
//! This crate loads GLSL shader units and `.prog` program definitions from a
//! directory, picks the first program whose conditions hold for a drawable,
//! and feeds its uniforms and texture units. Draws no program can serve go
//! through a fixed-function fallback.

pub mod attributes;
pub mod binder;
pub mod config;
pub mod error;
pub mod gpu;
pub mod io;
pub mod scene;
pub mod shading;

// Re-export commonly used types
pub mod prelude {
    pub use crate::attributes::{AttributeSource, BlockId, FieldValue, MemoryModel, Resolved};

    pub use crate::binder::Binder;

    pub use crate::config::{PlaceholderTextures, ShaderConfig};

    pub use crate::error::{ConfigError, ProgramError, ShaderError};

    pub use crate::gpu::recording::RecordingDevice;
    pub use crate::gpu::{GpuDevice, RenderState, TextureClamp};

    pub use crate::io::ShaderWatcher;

    pub use crate::scene::{
        Drawable, PropertyList, SceneContext, SceneOptions, ShaderFamily, ShaderProperty, VisMode,
    };

    pub use crate::shading::{Program, ProgramRegistry, RegistryState};

    pub use glam::{Mat4, Vec2, Vec3, Vec4};
}

/// Initialize logging for the renderer
///
/// `RUST_LOG` wins over `filter`; with neither set, `info` is used.
pub fn init_logging(filter: Option<&str>) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let default_filter = filter.unwrap_or("info").to_string();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
