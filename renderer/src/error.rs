//! Error types for shader units, program definitions and configuration

use std::path::PathBuf;

/// Errors raised while loading or compiling a single shader stage
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("couldn't open {path:?} for read access: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown shader stage for {0:?}")]
    UnknownStage(PathBuf),

    #[error("failed to create shader object")]
    ObjectCreation,

    #[error("compile error: {0}")]
    Compile(String),
}

/// Errors that make a single program unusable
///
/// Every variant is local to one definition file; the registry records it and
/// carries on with the next file.
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("couldn't open {path:?} for read access: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("shader {0} not found")]
    UnknownShader(String),

    #[error("depends on shader {0} which was not compiled successful")]
    ShaderNotCompiled(String),

    #[error("line {line}: mismatching checkgroup end tag")]
    UnbalancedGroupEnd { line: usize },

    #[error("line {line}: expected begin or end after checkgroup")]
    MalformedCheckGroup { line: usize },

    #[error("{open} checkgroup(s) left open at end of file")]
    UnclosedGroup { open: usize },

    #[error("line {line}: malformed texcoord tag")]
    MalformedTexcoords { line: usize },

    #[error("line {line}: texcoord tag refers to unknown texture id '{id}'")]
    UnknownTexcoordId { line: usize, id: String },

    #[error("line {line}: texture unit {unit} is assigned twiced")]
    DuplicateTextureUnit { line: usize, unit: u32 },

    #[error("failed to create program object")]
    ObjectCreation,

    #[error("link error: {0}")]
    Link(String),
}

/// Errors from reading or writing the renderer settings file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the shader directory watcher
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("file watcher error: {0}")]
    Notify(#[from] notify::Error),

    #[error("failed to join watcher thread")]
    Join,
}
