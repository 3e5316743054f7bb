//! Process-wide registry of shader units and programs
//!
//! The registry owns every GPU shader and program object. It is populated as
//! a whole from a shader directory and torn down as a whole; there is no
//! partial reload. Readiness follows the context:
//!
//! ```text
//! Uninitialized -> Probing -> Ready
//!                          -> Unsupported(reason)
//! ```
//!
//! Probing runs again on every settings change while unsupported. A ready
//! registry is never re-probed, only reloaded.

use super::program::{Program, ProgramDefinition};
use super::shader::{ShaderStage, ShaderUnit};
use crate::config::ShaderConfig;
use crate::error::ProgramError;
use crate::gpu::GpuDevice;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Why programmable shading is unavailable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedReason {
    DisabledBySettings,
    NoHardwareSupport,
}

impl fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedReason::DisabledBySettings => write!(f, "shaders disabled in settings"),
            UnsupportedReason::NoHardwareSupport => {
                write!(f, "OpenGL shader support unavailable")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    Uninitialized,
    Probing,
    Ready,
    Unsupported(UnsupportedReason),
}

/// A user-facing message about one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.message)
    }
}

#[derive(Debug)]
pub struct ProgramRegistry {
    state: RegistryState,
    shader_dir: Option<PathBuf>,
    shaders: HashMap<String, ShaderUnit>,
    /// Shader names in load order
    shader_order: Vec<String>,
    /// Programs in selection order
    programs: Vec<Program>,
    program_index: HashMap<String, usize>,
    diagnostics: Vec<Diagnostic>,
}

impl Default for ProgramRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramRegistry {
    pub fn new() -> Self {
        Self {
            state: RegistryState::Uninitialized,
            shader_dir: None,
            shaders: HashMap::new(),
            shader_order: Vec::new(),
            programs: Vec::new(),
            program_index: HashMap::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == RegistryState::Ready
    }

    /// Directory the current contents were loaded from
    pub fn shader_dir(&self) -> Option<&Path> {
        self.shader_dir.as_deref()
    }

    /// Apply (or re-apply) renderer settings
    pub fn apply_settings(
        &mut self,
        config: &ShaderConfig,
        device: &mut dyn GpuDevice,
    ) -> RegistryState {
        let previous = self.state;

        match self.state {
            RegistryState::Ready => {
                if config.use_shaders {
                    self.shader_dir = config.resolve_shader_dir();
                    self.reload(device);
                } else {
                    self.release(device);
                    self.state = RegistryState::Unsupported(UnsupportedReason::DisabledBySettings);
                }
            }
            RegistryState::Uninitialized
            | RegistryState::Probing
            | RegistryState::Unsupported(_) => {
                self.state = RegistryState::Probing;
                self.state = self.probe(config, device);
                if self.state == RegistryState::Ready {
                    self.shader_dir = config.resolve_shader_dir();
                    self.reload(device);
                }
            }
        }

        if self.state != previous {
            match self.state {
                RegistryState::Unsupported(reason) => {
                    info!(reason = %reason, "Shader programs unavailable, using fixed-function")
                }
                state => info!(state = ?state, "Shader registry state changed"),
            }
        }
        self.state
    }

    fn probe(&self, config: &ShaderConfig, device: &dyn GpuDevice) -> RegistryState {
        if !config.use_shaders {
            RegistryState::Unsupported(UnsupportedReason::DisabledBySettings)
        } else if !device.supports_shaders() {
            RegistryState::Unsupported(UnsupportedReason::NoHardwareSupport)
        } else {
            RegistryState::Ready
        }
    }

    /// Release everything and start over from `Uninitialized`
    ///
    /// Used after the graphics context has been recreated.
    pub fn reinitialize(
        &mut self,
        config: &ShaderConfig,
        device: &mut dyn GpuDevice,
    ) -> RegistryState {
        self.release(device);
        self.state = RegistryState::Uninitialized;
        self.apply_settings(config, device)
    }

    /// Unload everything and load the shader directory again
    pub fn reload(&mut self, device: &mut dyn GpuDevice) {
        self.release(device);
        self.diagnostics.clear();

        if !self.is_ready() {
            return;
        }

        match self.shader_dir.clone() {
            Some(dir) => self.load_directory(&dir, device),
            None => {
                warn!("No shader directory found");
                self.report("shaders", "shader directory not found".to_string());
            }
        }
    }

    fn load_directory(&mut self, dir: &Path, device: &mut dyn GpuDevice) {
        info!(path = ?dir, "Loading shader programs");

        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            for (name, path) in self.scan(dir, stage.extension()) {
                let mut unit = ShaderUnit::new(name.clone(), stage);
                if let Err(e) = unit.load(&path, device) {
                    self.report(&name, e.to_string());
                }
                self.shader_order.push(name.clone());
                self.shaders.insert(name, unit);
            }
        }

        for (name, path) in self.scan(dir, "prog") {
            let program = fs::read_to_string(&path)
                .map_err(|source| ProgramError::Io {
                    path: path.clone(),
                    source,
                })
                .and_then(|text| ProgramDefinition::parse(&text))
                .and_then(|def| Program::build(name.clone(), def, &self.shaders, device));

            let program = match program {
                Ok(program) => program,
                Err(e) => {
                    warn!(program = %name, error = %e, "Program unusable");
                    self.report(&name, e.to_string());
                    Program::failed(name.clone(), &e)
                }
            };
            self.insert_program(program);
        }

        info!(
            shaders = self.shaders.len(),
            programs = self.programs.len(),
            linked = self.linked_count(),
            "Shader programs loaded"
        );
    }

    /// Files with the given extension, sorted by file name
    fn scan(&mut self, dir: &Path, extension: &str) -> Vec<(String, PathBuf)> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                self.report(&dir.display().to_string(), e.to_string());
                return Vec::new();
            }
        };

        let mut files: Vec<(String, PathBuf)> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| path.extension().is_some_and(|ext| ext == extension))
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?.to_string();
                Some((name, path))
            })
            .collect();
        files.sort_by(|a, b| a.0.cmp(&b.0));
        files
    }

    fn insert_program(&mut self, program: Program) {
        match self.program_index.get(&program.name) {
            Some(&index) => self.programs[index] = program,
            None => {
                self.program_index
                    .insert(program.name.clone(), self.programs.len());
                self.programs.push(program);
            }
        }
    }

    fn report(&mut self, file: &str, message: String) {
        self.diagnostics.push(Diagnostic {
            file: file.to_string(),
            message,
        });
    }

    /// Delete every program, then every shader unit
    pub fn release(&mut self, device: &mut dyn GpuDevice) {
        if self.programs.is_empty() && self.shaders.is_empty() {
            return;
        }
        debug!(
            programs = self.programs.len(),
            shaders = self.shaders.len(),
            "Releasing shader programs"
        );

        for program in &mut self.programs {
            program.release(device);
        }
        self.programs.clear();
        self.program_index.clear();

        for name in self.shader_order.drain(..) {
            if let Some(mut unit) = self.shaders.remove(&name) {
                unit.release(device);
            }
        }
        self.shaders.clear();
    }

    pub fn program(&self, name: &str) -> Option<&Program> {
        self.program_index.get(name).map(|&i| &self.programs[i])
    }

    /// All programs in selection order, including unusable ones
    pub fn programs(&self) -> impl Iterator<Item = &Program> {
        self.programs.iter()
    }

    /// Programs eligible for selection, in order
    pub fn linked_programs(&self) -> impl Iterator<Item = &Program> {
        self.programs.iter().filter(|p| p.is_linked())
    }

    pub fn linked_count(&self) -> usize {
        self.linked_programs().count()
    }

    pub fn shader(&self, name: &str) -> Option<&ShaderUnit> {
        self.shaders.get(name)
    }

    /// Shader units in load order
    pub fn shaders(&self) -> impl Iterator<Item = &ShaderUnit> {
        self.shader_order.iter().filter_map(|n| self.shaders.get(n))
    }

    /// Messages collected during the last load
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::recording::RecordingDevice;
    use std::fs;
    use tempfile::TempDir;

    fn shader_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in files {
            fs::write(dir.path().join(name), contents).unwrap();
        }
        dir
    }

    fn config_for(dir: &TempDir) -> ShaderConfig {
        ShaderConfig {
            shader_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        }
    }

    #[test]
    fn test_starts_uninitialized() {
        let registry = ProgramRegistry::new();
        assert_eq!(registry.state(), RegistryState::Uninitialized);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_probe_without_hardware_support() {
        let dir = shader_dir(&[]);
        let mut device = RecordingDevice::new().without_shaders();
        let mut registry = ProgramRegistry::new();
        let state = registry.apply_settings(&config_for(&dir), &mut device);
        assert_eq!(
            state,
            RegistryState::Unsupported(UnsupportedReason::NoHardwareSupport)
        );
    }

    #[test]
    fn test_unsupported_reprobes_on_settings_change() {
        let dir = shader_dir(&[("a.vert", "void main() {}")]);
        let mut device = RecordingDevice::new().without_shaders();
        let mut registry = ProgramRegistry::new();
        registry.apply_settings(&config_for(&dir), &mut device);
        assert!(!registry.is_ready());

        device.set_supports_shaders(true);
        assert_eq!(
            registry.apply_settings(&config_for(&dir), &mut device),
            RegistryState::Ready
        );
        assert!(registry.shader("a.vert").is_some());
    }

    #[test]
    fn test_disabled_by_settings() {
        let dir = shader_dir(&[]);
        let mut device = RecordingDevice::new();
        let mut registry = ProgramRegistry::new();
        let config = ShaderConfig {
            use_shaders: false,
            ..config_for(&dir)
        };
        assert_eq!(
            registry.apply_settings(&config, &mut device),
            RegistryState::Unsupported(UnsupportedReason::DisabledBySettings)
        );
    }

    #[test]
    fn test_toggle_off_while_ready_releases_everything() {
        let dir = shader_dir(&[
            ("a.vert", "void main() {}"),
            ("a.prog", "shaders a.vert\n"),
        ]);
        let mut device = RecordingDevice::new();
        let mut registry = ProgramRegistry::new();
        registry.apply_settings(&config_for(&dir), &mut device);
        assert_eq!(registry.linked_count(), 1);

        let off = ShaderConfig {
            use_shaders: false,
            ..config_for(&dir)
        };
        registry.apply_settings(&off, &mut device);
        assert!(registry.is_empty());
        assert_eq!(device.live_objects(), 0);
    }

    #[test]
    fn test_programs_follow_file_name_order() {
        let dir = shader_dir(&[
            ("x.vert", "void main() {}"),
            ("b.prog", "shaders x.vert\n"),
            ("a.prog", "shaders x.vert\n"),
            ("c.prog", "shaders x.vert\n"),
        ]);
        let mut device = RecordingDevice::new();
        let mut registry = ProgramRegistry::new();
        registry.apply_settings(&config_for(&dir), &mut device);

        let names: Vec<_> = registry.programs().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a.prog", "b.prog", "c.prog"]);
    }

    #[test]
    fn test_failures_are_isolated_and_reported() {
        let dir = shader_dir(&[
            ("good.vert", "void main() {}"),
            ("bad.frag", "#error broken"),
            ("ok.prog", "shaders good.vert\n"),
            ("uses_bad.prog", "shaders good.vert bad.frag\n"),
            ("dup.prog", "shaders good.vert\ntexcoords 3 base\ntexcoords 3 tangents\n"),
        ]);
        let mut device = RecordingDevice::new();
        let mut registry = ProgramRegistry::new();
        registry.apply_settings(&config_for(&dir), &mut device);

        assert_eq!(registry.len(), 3);
        assert!(registry.program("ok.prog").unwrap().is_linked());
        assert!(!registry.program("uses_bad.prog").unwrap().is_linked());
        assert!(!registry.program("dup.prog").unwrap().is_linked());
        assert!(!registry.shader("bad.frag").unwrap().is_compiled());

        let files: Vec<_> = registry.diagnostics().iter().map(|d| d.file.as_str()).collect();
        assert!(files.contains(&"bad.frag"));
        assert!(files.contains(&"uses_bad.prog"));
        assert!(files.contains(&"dup.prog"));
        assert!(registry
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("texture unit 3 is assigned twiced")));
    }

    #[test]
    fn test_reapplying_settings_reloads_from_scratch() {
        let dir = shader_dir(&[
            ("a.vert", "void main() {}"),
            ("a.prog", "shaders a.vert\n"),
        ]);
        let mut device = RecordingDevice::new();
        let mut registry = ProgramRegistry::new();
        registry.apply_settings(&config_for(&dir), &mut device);
        let first = registry.program("a.prog").unwrap().handle();

        fs::write(dir.path().join("b.prog"), "shaders a.vert\n").unwrap();
        assert_eq!(
            registry.apply_settings(&config_for(&dir), &mut device),
            RegistryState::Ready
        );
        assert_eq!(registry.len(), 2);
        assert_ne!(registry.program("a.prog").unwrap().handle(), first);
        // one shader + two programs
        assert_eq!(device.live_objects(), 3);
    }

    #[test]
    fn test_reinitialize_releases_before_reuse() {
        let dir = shader_dir(&[
            ("a.vert", "void main() {}"),
            ("a.prog", "shaders a.vert\n"),
        ]);
        let mut device = RecordingDevice::new();
        let mut registry = ProgramRegistry::new();
        registry.apply_settings(&config_for(&dir), &mut device);
        registry.reinitialize(&config_for(&dir), &mut device);
        assert!(registry.is_ready());
        assert_eq!(device.live_objects(), 2);
    }

    #[test]
    fn test_missing_directory_is_reported() {
        let mut device = RecordingDevice::new();
        let mut registry = ProgramRegistry::new();
        let config = ShaderConfig {
            shader_dir: Some(PathBuf::from("/nonexistent/shaders")),
            search_paths: Vec::new(),
            ..Default::default()
        };
        registry.apply_settings(&config, &mut device);
        assert!(registry.is_ready());
        assert!(registry.is_empty());
        assert_eq!(registry.diagnostics().len(), 1);
    }
}
