//! Shader units, program definitions and the registry that owns them

mod condition;
mod program;
mod registry;
mod shader;
mod uniforms;

pub use condition::{Comparison, Condition, ConditionExpr, ConditionGroup};
pub use program::{CoordKind, Program, ProgramDefinition};
pub use registry::{Diagnostic, ProgramRegistry, RegistryState, UnsupportedReason};
pub use shader::{ShaderStage, ShaderUnit};
pub use uniforms::{UniformSlot, UniformTable};
