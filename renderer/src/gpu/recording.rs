//! Recording GPU device
//!
//! Performs no GPU work. Every call is appended to a command log that tests
//! and the validation tool can inspect. Compilation fails for sources
//! containing `#error`, linking fails when an attached source contains
//! `LINK_ERROR`, and uniform locations exist for every `uniform <type> <name>`
//! declaration in the attached sources.

use super::{
    GpuDevice, ProgramHandle, RenderState, ShaderHandle, TexCoordStream, TextureClamp,
    TextureCombine, UniformLocation, UniformValue,
};
use crate::shading::ShaderStage;
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// One recorded device call
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateShader(ShaderHandle, ShaderStage),
    CompileShader(ShaderHandle),
    DeleteShader(ShaderHandle),
    CreateProgram(ProgramHandle),
    AttachShader(ProgramHandle, ShaderHandle),
    LinkProgram(ProgramHandle),
    DeleteProgram(ProgramHandle),
    UseProgram(Option<ProgramHandle>),
    SetUniform(String, UniformValue),
    ActiveTexture(u32),
    BindTexture(String, TextureClamp),
    BindCubeMap(String),
    UnbindTexture,
    TexCoordStream { kind: &'static str, len: usize },
    TextureCombine(TextureCombine),
    ResetTextureUnits,
    ApplyRenderState(RenderState),
}

#[derive(Debug)]
pub struct RecordingDevice {
    supports_shaders: bool,
    texture_units: u32,
    missing_textures: HashSet<String>,
    next_handle: u32,
    next_location: i32,
    sources: HashMap<ShaderHandle, String>,
    attached: HashMap<ProgramHandle, Vec<ShaderHandle>>,
    locations: HashMap<ProgramHandle, HashMap<String, UniformLocation>>,
    location_names: HashMap<UniformLocation, String>,
    live_shaders: HashSet<ShaderHandle>,
    live_programs: HashSet<ProgramHandle>,
    commands: Vec<Command>,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self {
            supports_shaders: true,
            texture_units: 16,
            missing_textures: HashSet::new(),
            next_handle: 1,
            next_location: 0,
            sources: HashMap::new(),
            attached: HashMap::new(),
            locations: HashMap::new(),
            location_names: HashMap::new(),
            live_shaders: HashSet::new(),
            live_programs: HashSet::new(),
            commands: Vec::new(),
        }
    }

    /// A context without programmable shading
    pub fn without_shaders(mut self) -> Self {
        self.supports_shaders = false;
        self
    }

    pub fn with_texture_units(mut self, units: u32) -> Self {
        self.texture_units = units;
        self
    }

    /// Make `bind_texture` / `bind_cube_map` fail for this path
    pub fn with_missing_texture(mut self, path: &str) -> Self {
        self.missing_textures.insert(path.to_string());
        self
    }

    pub fn set_supports_shaders(&mut self, supported: bool) {
        self.supports_shaders = supported;
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Number of shader and program objects not yet deleted
    pub fn live_objects(&self) -> usize {
        self.live_shaders.len() + self.live_programs.len()
    }

    /// Last value written to the named uniform
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.commands.iter().rev().find_map(|c| match c {
            Command::SetUniform(n, v) if n == name => Some(*v),
            _ => None,
        })
    }

    /// Texture paths bound since the last clear, in bind order
    pub fn bound_textures(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::BindTexture(path, _) | Command::BindCubeMap(path) => Some(path.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The render state most recently applied
    pub fn last_render_state(&self) -> Option<&RenderState> {
        self.commands.iter().rev().find_map(|c| match c {
            Command::ApplyRenderState(s) => Some(s),
            _ => None,
        })
    }

    /// The program most recently made current
    pub fn current_program(&self) -> Option<ProgramHandle> {
        self.commands.iter().rev().find_map(|c| match c {
            Command::UseProgram(p) => Some(*p),
            _ => None,
        })?
    }

    fn allocate(&mut self) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn declared_uniforms(source: &str) -> impl Iterator<Item = &str> {
        source.lines().filter_map(|line| {
            let mut words = line.split_whitespace();
            if words.next()? != "uniform" {
                return None;
            }
            let _ty = words.next()?;
            let name = words.next()?.trim_end_matches(';');
            Some(name.split('[').next().unwrap_or(name))
        })
    }
}

impl GpuDevice for RecordingDevice {
    fn supports_shaders(&self) -> bool {
        self.supports_shaders
    }

    fn max_texture_units(&self) -> u32 {
        self.texture_units
    }

    fn create_shader(&mut self, stage: ShaderStage) -> Option<ShaderHandle> {
        let handle = self.allocate();
        self.live_shaders.insert(handle);
        self.commands.push(Command::CreateShader(handle, stage));
        Some(handle)
    }

    fn compile_shader(&mut self, shader: ShaderHandle, source: &str) -> Result<(), String> {
        self.commands.push(Command::CompileShader(shader));
        self.sources.insert(shader, source.to_string());
        match source.lines().find(|l| l.trim_start().starts_with("#error")) {
            Some(line) => Err(line.trim().to_string()),
            None => Ok(()),
        }
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        self.live_shaders.remove(&shader);
        self.sources.remove(&shader);
        self.commands.push(Command::DeleteShader(shader));
    }

    fn create_program(&mut self) -> Option<ProgramHandle> {
        let handle = self.allocate();
        self.live_programs.insert(handle);
        self.commands.push(Command::CreateProgram(handle));
        Some(handle)
    }

    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        self.attached.entry(program).or_default().push(shader);
        self.commands.push(Command::AttachShader(program, shader));
    }

    fn link_program(&mut self, program: ProgramHandle) -> Result<(), String> {
        self.commands.push(Command::LinkProgram(program));
        let shaders = self.attached.get(&program).cloned().unwrap_or_default();

        let mut names = Vec::new();
        for shader in &shaders {
            let Some(source) = self.sources.get(shader) else {
                continue;
            };
            if source.contains("LINK_ERROR") {
                return Err(format!("program {program}: unresolved symbols"));
            }
            names.extend(Self::declared_uniforms(source).map(str::to_string));
        }

        let mut table = HashMap::new();
        for name in names {
            if table.contains_key(&name) {
                continue;
            }
            let location = UniformLocation(self.next_location);
            self.next_location += 1;
            self.location_names.insert(location, name.clone());
            table.insert(name, location);
        }
        self.locations.insert(program, table);
        Ok(())
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.live_programs.remove(&program);
        self.attached.remove(&program);
        self.locations.remove(&program);
        self.commands.push(Command::DeleteProgram(program));
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.locations.get(&program)?.get(name).copied()
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.commands.push(Command::UseProgram(program));
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let name = self
            .location_names
            .get(&location)
            .cloned()
            .unwrap_or_else(|| format!("#{}", location.0));
        trace!(uniform = %name, value = ?value, "set uniform");
        self.commands.push(Command::SetUniform(name, value));
    }

    fn active_texture(&mut self, unit: u32) {
        self.commands.push(Command::ActiveTexture(unit));
    }

    fn bind_texture(&mut self, path: &str, clamp: TextureClamp) -> bool {
        if path.is_empty() || self.missing_textures.contains(path) {
            return false;
        }
        self.commands.push(Command::BindTexture(path.to_string(), clamp));
        true
    }

    fn bind_cube_map(&mut self, path: &str) -> bool {
        if path.is_empty() || self.missing_textures.contains(path) {
            return false;
        }
        self.commands.push(Command::BindCubeMap(path.to_string()));
        true
    }

    fn unbind_texture(&mut self) {
        self.commands.push(Command::UnbindTexture);
    }

    fn set_texcoord_stream(&mut self, stream: TexCoordStream<'_>) {
        let kind = match stream {
            TexCoordStream::Tangents(_) => "tangents",
            TexCoordStream::Bitangents(_) => "bitangents",
            TexCoordStream::Coords(_) => "coords",
        };
        self.commands.push(Command::TexCoordStream {
            kind,
            len: stream.len(),
        });
    }

    fn set_texture_combine(&mut self, combine: TextureCombine) {
        self.commands.push(Command::TextureCombine(combine));
    }

    fn reset_texture_units(&mut self) {
        self.commands.push(Command::ResetTextureUnits);
    }

    fn apply_render_state(&mut self, state: &RenderState) {
        self.commands.push(Command::ApplyRenderState(*state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniforms_come_from_declarations() {
        let mut device = RecordingDevice::new();
        let vs = device.create_shader(ShaderStage::Vertex).unwrap();
        device
            .compile_shader(vs, "uniform mat4 worldMatrix;\nvoid main() {}")
            .unwrap();
        let fs = device.create_shader(ShaderStage::Fragment).unwrap();
        device
            .compile_shader(fs, "uniform sampler2D BaseMap;\nuniform float alpha;")
            .unwrap();

        let program = device.create_program().unwrap();
        device.attach_shader(program, vs);
        device.attach_shader(program, fs);
        device.link_program(program).unwrap();

        assert!(device.uniform_location(program, "worldMatrix").is_some());
        assert!(device.uniform_location(program, "BaseMap").is_some());
        assert!(device.uniform_location(program, "NormalMap").is_none());

        let alpha = device.uniform_location(program, "alpha").unwrap();
        device.set_uniform(alpha, UniformValue::Float(0.25));
        assert_eq!(device.uniform("alpha"), Some(UniformValue::Float(0.25)));
    }

    #[test]
    fn test_compile_and_link_failures() {
        let mut device = RecordingDevice::new();
        let bad = device.create_shader(ShaderStage::Fragment).unwrap();
        assert!(device.compile_shader(bad, "#error broken").is_err());

        let linky = device.create_shader(ShaderStage::Fragment).unwrap();
        device.compile_shader(linky, "// LINK_ERROR").unwrap();
        let program = device.create_program().unwrap();
        device.attach_shader(program, linky);
        assert!(device.link_program(program).is_err());
    }

    #[test]
    fn test_missing_textures_fail_to_bind() {
        let mut device = RecordingDevice::new().with_missing_texture("a.dds");
        assert!(!device.bind_texture("a.dds", TextureClamp::WrapSWrapT));
        assert!(!device.bind_texture("", TextureClamp::WrapSWrapT));
        assert!(device.bind_texture("b.dds", TextureClamp::WrapSWrapT));
        assert_eq!(device.bound_textures(), vec!["b.dds"]);
    }

    #[test]
    fn test_live_object_tracking() {
        let mut device = RecordingDevice::new();
        let s = device.create_shader(ShaderStage::Vertex).unwrap();
        let p = device.create_program().unwrap();
        assert_eq!(device.live_objects(), 2);
        device.delete_shader(s);
        device.delete_program(p);
        assert_eq!(device.live_objects(), 0);
    }
}
