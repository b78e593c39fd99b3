pub mod build;
pub mod targets;

use std::path::Path;
use std::process;

use polyemit::config::GenConfig;

fn load_config(toml_path: &Path) -> GenConfig {
    match GenConfig::load(toml_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

/// The configuration for `input`: the one given explicitly, else the
/// nearest polyemit.toml in the input's directory or its ancestors.
pub fn resolve_config(input: &Path, explicit: Option<&Path>) -> Option<GenConfig> {
    if let Some(path) = explicit {
        return Some(load_config(path));
    }
    let start = input.parent().unwrap_or(Path::new("."));
    GenConfig::find(start).map(|p| load_config(&p))
}
