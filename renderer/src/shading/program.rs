//! Program definitions
//!
//! A `.prog` file is line oriented:
//!
//! ```text
//! shaders sk_default.vert sk_default.frag
//! checkgroup begin or
//!     check HEADER/User Version 2 >= 130
//!     check not BSLightingShaderProperty/Skyrim Shader Type == 1
//! checkgroup end
//! texcoords 0 base
//! texcoords 1 tangents
//! ```
//!
//! Lines that match no directive are ignored.

use super::condition::{Condition, ConditionExpr, ConditionGroup};
use super::shader::ShaderUnit;
use super::uniforms::{UniformSlot, UniformTable};
use crate::attributes::{AttributeSource, BlockId};
use crate::error::ProgramError;
use crate::gpu::{GpuDevice, ProgramHandle, UniformLocation};
use crate::scene::TexSlot;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Vertex stream routed to a texture unit's coordinate array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordKind {
    Tangent,
    Bitangent,
    BoneIndex,
    BoneWeight,
    Texture(TexSlot),
}

impl CoordKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "tangents" => Some(CoordKind::Tangent),
            "bitangents" => Some(CoordKind::Bitangent),
            "indices" => Some(CoordKind::BoneIndex),
            "weights" => Some(CoordKind::BoneWeight),
            other => TexSlot::from_name(other).map(CoordKind::Texture),
        }
    }
}

/// Parsed contents of a definition file, before any GPU work
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramDefinition {
    pub shaders: Vec<String>,
    pub conditions: ConditionGroup,
    pub texcoords: BTreeMap<u32, CoordKind>,
}

impl ProgramDefinition {
    pub fn parse(text: &str) -> Result<Self, ProgramError> {
        let mut shaders = Vec::new();
        let mut texcoords = BTreeMap::new();
        // innermost open group last; the root group is never popped
        let mut groups = vec![ConditionGroup::new(false)];

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            let (keyword, rest) = match line.split_once(char::is_whitespace) {
                Some((keyword, rest)) => (keyword, rest.trim()),
                None => (line, ""),
            };

            match keyword {
                "shaders" => {
                    shaders.extend(rest.split_whitespace().map(str::to_string));
                }
                "checkgroup" => match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
                    ["begin", mode @ ..] => {
                        groups.push(ConditionGroup::new(mode.first() == Some(&"or")));
                    }
                    ["end", ..] => {
                        if groups.len() < 2 {
                            return Err(ProgramError::UnbalancedGroupEnd { line: line_no });
                        }
                        if let Some(done) = groups.pop() {
                            if let Some(parent) = groups.last_mut() {
                                parent.push(Condition::Group(done));
                            }
                        }
                    }
                    _ => return Err(ProgramError::MalformedCheckGroup { line: line_no }),
                },
                "check" => {
                    let (invert, expr) = match rest.strip_prefix("not ") {
                        Some(expr) => (true, expr),
                        None => (false, rest),
                    };
                    if let Some(group) = groups.last_mut() {
                        group.push(Condition::Expr(ConditionExpr::parse(expr, invert)));
                    }
                }
                "texcoords" => {
                    let mut words = rest.split_whitespace();
                    let (Some(unit), Some(id), None) = (words.next(), words.next(), words.next())
                    else {
                        return Err(ProgramError::MalformedTexcoords { line: line_no });
                    };
                    let unit: u32 = unit
                        .parse()
                        .map_err(|_| ProgramError::MalformedTexcoords { line: line_no })?;
                    let kind = CoordKind::from_name(&id.to_lowercase()).ok_or_else(|| {
                        ProgramError::UnknownTexcoordId {
                            line: line_no,
                            id: id.to_string(),
                        }
                    })?;
                    if texcoords.insert(unit, kind).is_some() {
                        return Err(ProgramError::DuplicateTextureUnit {
                            line: line_no,
                            unit,
                        });
                    }
                }
                _ => {}
            }
        }

        if groups.len() > 1 {
            return Err(ProgramError::UnclosedGroup {
                open: groups.len() - 1,
            });
        }
        let conditions = groups.pop().unwrap_or_default();

        Ok(Self {
            shaders,
            conditions,
            texcoords,
        })
    }
}

/// A linked program together with its match conditions
#[derive(Debug)]
pub struct Program {
    pub name: String,
    handle: Option<ProgramHandle>,
    linked: bool,
    error: Option<String>,
    definition: ProgramDefinition,
    uniforms: UniformTable,
}

impl Program {
    /// A program that failed before linking; registered but never selected
    pub fn failed(name: impl Into<String>, error: &ProgramError) -> Self {
        Self {
            name: name.into(),
            handle: None,
            linked: false,
            error: Some(error.to_string()),
            definition: ProgramDefinition::default(),
            uniforms: UniformTable::default(),
        }
    }

    /// Resolve the definition's shaders, link them and query uniforms
    pub fn build(
        name: impl Into<String>,
        definition: ProgramDefinition,
        shaders: &HashMap<String, ShaderUnit>,
        device: &mut dyn GpuDevice,
    ) -> Result<Self, ProgramError> {
        let name = name.into();

        let mut handles = Vec::with_capacity(definition.shaders.len());
        for shader_name in &definition.shaders {
            let unit = shaders
                .get(shader_name)
                .ok_or_else(|| ProgramError::UnknownShader(shader_name.clone()))?;
            match unit.handle() {
                Some(handle) if unit.is_compiled() => handles.push(handle),
                _ => return Err(ProgramError::ShaderNotCompiled(shader_name.clone())),
            }
        }

        let handle = device.create_program().ok_or(ProgramError::ObjectCreation)?;
        for shader in handles {
            device.attach_shader(handle, shader);
        }
        if let Err(log) = device.link_program(handle) {
            device.delete_program(handle);
            return Err(ProgramError::Link(log));
        }

        let uniforms = UniformTable::query(device, handle);
        debug!(
            program = %name,
            uniforms = uniforms.declared(),
            texcoords = definition.texcoords.len(),
            "Linked program"
        );

        Ok(Self {
            name,
            handle: Some(handle),
            linked: true,
            error: None,
            definition,
            uniforms,
        })
    }

    /// Eligible for selection
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn handle(&self) -> Option<ProgramHandle> {
        self.handle
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn conditions(&self) -> &ConditionGroup {
        &self.definition.conditions
    }

    pub fn texcoords(&self) -> &BTreeMap<u32, CoordKind> {
        &self.definition.texcoords
    }

    pub fn shader_names(&self) -> &[String] {
        &self.definition.shaders
    }

    pub fn uniform(&self, slot: UniformSlot) -> Option<UniformLocation> {
        self.uniforms.get(slot)
    }

    pub fn matches(&self, source: &dyn AttributeSource, blocks: &[BlockId]) -> bool {
        self.linked && self.definition.conditions.eval(source, blocks)
    }

    pub fn release(&mut self, device: &mut dyn GpuDevice) {
        if let Some(handle) = self.handle.take() {
            device.delete_program(handle);
        }
        debug!(program = %self.name, "Released program");
        self.linked = false;
    }
}
