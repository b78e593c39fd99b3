//! Library entry points: load a program, run a backend, write its files.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::ast::Program;
use crate::codegen::{create_backend, GenOptions, GenResult, OutputFile};

#[cfg(test)]
mod tests;

/// Why a program could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed program: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed program: {0}")]
    DanglingId(String),
}

/// A generated file that could not be written.
#[derive(Debug, Error)]
#[error("cannot write '{}': {source}", path.display())]
pub struct WriteError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

impl Program {
    /// Parse the JSON form of a program and check that every id resolves.
    pub fn from_json(json: &str) -> Result<Program, LoadError> {
        let program: Program = serde_json::from_str(json)?;
        if let Some(dangling) = program.find_dangling_id() {
            return Err(LoadError::DanglingId(dangling));
        }
        Ok(program)
    }
}

/// Read and validate a program from a JSON file.
pub fn load_program(path: &Path) -> Result<Program, LoadError> {
    let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let program = Program::from_json(&json)?;
    log::debug!(
        "loaded {}: {} enum(s), {} class(es)",
        path.display(),
        program.enums.len(),
        program.classes.len()
    );
    Ok(program)
}

/// Run the backend `options.target` names over `program`.
///
/// Nothing is written; on error no files are returned.
pub fn generate(program: &Program, options: &GenOptions) -> GenResult<Vec<OutputFile>> {
    let mut backend = create_backend(&options.target)?;
    log::debug!(
        "generating {} into {}",
        backend.target_name(),
        options.output.display()
    );
    backend.generate(program, options)
}

/// Write generated files, creating parent directories as needed.
pub fn write_outputs(files: &[OutputFile]) -> Result<(), WriteError> {
    for file in files {
        let wrap = |source| WriteError {
            path: file.path.clone(),
            source,
        };
        if let Some(parent) = file.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(wrap)?;
        }
        std::fs::write(&file.path, &file.contents).map_err(wrap)?;
        log::info!("wrote {} ({} bytes)", file.path.display(), file.contents.len());
    }
    Ok(())
}

/// Where output goes when neither the command line nor a config names it:
/// a directory next to the input for per-symbol targets, a sibling file
/// with the target's extension otherwise.
pub fn default_output(input: &Path, target: &str) -> PathBuf {
    match target {
        "as" => input.with_extension(""),
        other => input.with_extension(other),
    }
}
