//! Shader directory watching

pub mod hot_reload;

pub use hot_reload::{is_shader_file, ShaderWatcher, WatcherConfig};
