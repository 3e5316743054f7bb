//! Quick shader directory validation utility

use renderer::config::ShaderConfig;
use renderer::gpu::recording::RecordingDevice;
use renderer::shading::{ProgramRegistry, RegistryState};
use std::{env, path::PathBuf};

fn main() {
    renderer::init_logging(Some("warn"));

    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(dir) => ShaderConfig::with_shader_dir(PathBuf::from(dir)),
        None => ShaderConfig::default(),
    };

    let Some(dir) = config.resolve_shader_dir() else {
        eprintln!("✗ No shader directory found");
        std::process::exit(1);
    };
    println!("Validating shaders: {}", dir.display());

    let mut device = RecordingDevice::new();
    let mut registry = ProgramRegistry::new();
    let state = registry.apply_settings(&config, &mut device);
    if state != RegistryState::Ready {
        eprintln!("✗ Registry not ready: {state:?}");
        std::process::exit(1);
    }

    println!("Shaders:");
    for unit in registry.shaders() {
        match unit.error() {
            None => println!("  ✓ {}", unit.name),
            Some(error) => println!("  ✗ {}: {error}", unit.name),
        }
    }

    println!("Programs (selection order):");
    for program in registry.programs() {
        match program.error() {
            None => println!(
                "  ✓ {} [{}]",
                program.name,
                program.shader_names().join(", ")
            ),
            Some(error) => println!("  ✗ {}: {error}", program.name),
        }
    }

    let diagnostics = registry.diagnostics();
    println!(
        "{} of {} programs usable, {} diagnostics",
        registry.linked_count(),
        registry.len(),
        diagnostics.len()
    );
    for diagnostic in diagnostics {
        eprintln!("  {diagnostic}");
    }

    if !diagnostics.is_empty() {
        std::process::exit(2);
    }
}
