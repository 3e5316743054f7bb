//! Renderer settings

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Fallback images bound when a material texture is missing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderTextures {
    pub white: String,
    pub black: String,
    pub gray: String,
    pub magenta: String,
    pub lighting: String,
    pub default_normal: String,
    /// Default normal map for documents with version 151 and later
    pub default_normal_specular: String,
    pub cube: String,
    pub blank_detail: String,
}

impl Default for PlaceholderTextures {
    fn default() -> Self {
        Self {
            white: "shaders/white.dds".to_string(),
            black: "shaders/black.dds".to_string(),
            gray: "shaders/gray.dds".to_string(),
            magenta: "shaders/magenta.dds".to_string(),
            lighting: "shaders/lighting.dds".to_string(),
            default_normal: "shaders/default_n.dds".to_string(),
            default_normal_specular: "shaders/default_ns.dds".to_string(),
            cube: "shaders/cubemap.dds".to_string(),
            blank_detail: "shaders/blankdetailmap.dds".to_string(),
        }
    }
}

impl PlaceholderTextures {
    /// Default normal map for a document version
    pub fn default_normal_for(&self, bs_version: u32) -> &str {
        if bs_version >= 151 {
            &self.default_normal_specular
        } else {
            &self.default_normal
        }
    }
}

/// Settings that drive the shader registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    /// User toggle for programmable shading
    pub use_shaders: bool,
    /// Explicit shader directory, tried before the search paths
    pub shader_dir: Option<PathBuf>,
    pub search_paths: Vec<PathBuf>,
    /// `tracing` filter directive, overridden by `RUST_LOG`
    pub log_filter: Option<String>,
    pub placeholders: PlaceholderTextures,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            use_shaders: true,
            shader_dir: None,
            search_paths: default_search_paths(),
            log_filter: None,
            placeholders: PlaceholderTextures::default(),
        }
    }
}

/// `shaders` next to the executable, then the system data directory on Linux
fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.push(exe_dir.join("shaders"));
    }
    if cfg!(target_os = "linux") {
        paths.push(PathBuf::from("/usr/share/nifskope/shaders"));
    }
    paths
}

impl ShaderConfig {
    /// Settings for a single known shader directory
    pub fn with_shader_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            shader_dir: Some(dir.into()),
            ..Default::default()
        }
    }

    /// First existing directory among the explicit one and the search paths
    pub fn resolve_shader_dir(&self) -> Option<PathBuf> {
        let found = self
            .shader_dir
            .iter()
            .chain(self.search_paths.iter())
            .find(|dir| dir.is_dir())
            .cloned();
        debug!(found = ?found, "Resolved shader directory");
        found
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = ?path, "Loading renderer settings");
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        info!(path = ?path, "Saving renderer settings");
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ShaderConfig::default();
        assert!(config.use_shaders);
        assert!(config.shader_dir.is_none());
        assert_eq!(config.placeholders.cube, "shaders/cubemap.dds");
    }

    #[test]
    fn test_default_normal_by_version() {
        let placeholders = PlaceholderTextures::default();
        assert_eq!(placeholders.default_normal_for(130), "shaders/default_n.dds");
        assert_eq!(placeholders.default_normal_for(151), "shaders/default_ns.dds");
    }

    #[test]
    fn test_resolve_prefers_explicit_dir() {
        let explicit = tempfile::tempdir().unwrap();
        let fallback = tempfile::tempdir().unwrap();
        let config = ShaderConfig {
            shader_dir: Some(explicit.path().to_path_buf()),
            search_paths: vec![fallback.path().to_path_buf()],
            ..Default::default()
        };
        assert_eq!(config.resolve_shader_dir(), Some(explicit.path().to_path_buf()));
    }

    #[test]
    fn test_resolve_skips_missing_dirs() {
        let fallback = tempfile::tempdir().unwrap();
        let config = ShaderConfig {
            shader_dir: Some(PathBuf::from("/nonexistent/shaders")),
            search_paths: vec![fallback.path().to_path_buf()],
            ..Default::default()
        };
        assert_eq!(config.resolve_shader_dir(), Some(fallback.path().to_path_buf()));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.json");
        let config = ShaderConfig {
            use_shaders: false,
            log_filter: Some("renderer=debug".to_string()),
            ..ShaderConfig::with_shader_dir("/opt/shaders")
        };
        config.save_to_file(&path).unwrap();
        assert_eq!(ShaderConfig::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: ShaderConfig = serde_json::from_str(r#"{ "use_shaders": false }"#).unwrap();
        assert!(!config.use_shaders);
        assert_eq!(config.placeholders, PlaceholderTextures::default());
    }

    #[test]
    fn test_load_missing_file_errors() {
        let err = ShaderConfig::load_from_file("/nonexistent/render.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
