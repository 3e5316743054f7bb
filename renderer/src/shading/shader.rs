//! Compiled shader stages

use crate::error::ShaderError;
use crate::gpu::{GpuDevice, ShaderHandle};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Pipeline stage of a shader unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Stage implied by a file extension (`vert` / `frag`)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "vert" => Some(ShaderStage::Vertex),
            "frag" => Some(ShaderStage::Fragment),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vert",
            ShaderStage::Fragment => "frag",
        }
    }
}

/// One vertex or fragment stage, identified by its file name
#[derive(Debug)]
pub struct ShaderUnit {
    pub name: String,
    pub stage: ShaderStage,
    compiled: bool,
    handle: Option<ShaderHandle>,
    error: Option<String>,
}

impl ShaderUnit {
    pub fn new(name: impl Into<String>, stage: ShaderStage) -> Self {
        Self {
            name: name.into(),
            stage,
            compiled: false,
            handle: None,
            error: None,
        }
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    pub fn handle(&self) -> Option<ShaderHandle> {
        self.handle
    }

    /// Last load or compile error, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Read the source file and compile it
    pub fn load(&mut self, path: &Path, device: &mut dyn GpuDevice) -> Result<(), ShaderError> {
        let source = fs::read_to_string(path).map_err(|source| ShaderError::Io {
            path: path.to_path_buf(),
            source,
        });
        match source {
            Ok(source) => self.compile(&source, device),
            Err(e) => {
                self.compiled = false;
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Compile from source text
    ///
    /// On failure the GPU object is released immediately and the unit stays
    /// registered with `compiled == false`.
    pub fn compile(&mut self, source: &str, device: &mut dyn GpuDevice) -> Result<(), ShaderError> {
        self.release(device);

        let result = match device.create_shader(self.stage) {
            Some(handle) => {
                self.handle = Some(handle);
                device.compile_shader(handle, source).map_err(ShaderError::Compile)
            }
            None => Err(ShaderError::ObjectCreation),
        };

        match result {
            Ok(()) => {
                debug!(shader = %self.name, stage = ?self.stage, "Compiled shader");
                self.compiled = true;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!(shader = %self.name, error = %e, "Shader failed to compile");
                self.release(device);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn release(&mut self, device: &mut dyn GpuDevice) {
        if let Some(handle) = self.handle.take() {
            device.delete_shader(handle);
        }
        self.compiled = false;
    }
}
