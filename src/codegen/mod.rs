//! Code generation: the shared printing framework and the target backends.

pub mod backend;
pub mod error;
pub mod generator;
pub mod naming;
pub mod priority;
pub mod writer;

use std::path::PathBuf;

use crate::ast::Program;

pub use backend::create_backend;
pub use error::{GenError, GenResult};
pub use writer::{OutputFile, SourceWriter};

/// Target ids accepted by [`create_backend`].
pub const TARGETS: &[&str] = &["as", "c", "cl"];

/// What a run produces and where.
#[derive(Clone, Debug)]
pub struct GenOptions {
    /// Target id (see [`TARGETS`]).
    pub target: String,
    /// Output directory for per-symbol targets, output file for
    /// single-file targets.
    pub output: PathBuf,
    /// Package the generated code is placed in, where the target has one.
    pub namespace: Option<String>,
}

impl GenOptions {
    pub fn new(target: &str, output: impl Into<PathBuf>) -> Self {
        Self {
            target: target.to_string(),
            output: output.into(),
            namespace: None,
        }
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }
}

/// A target language.
///
/// A backend may be reused for any number of runs, one at a time. Nothing
/// one run records (helper usage, open blocks, pending output) is visible
/// to the next.
pub trait Backend {
    /// Target id (e.g. "cl").
    fn target_name(&self) -> &'static str;
    /// File extension of generated sources, without the dot.
    fn output_extension(&self) -> &'static str;
    /// Emit the whole program. On error no file is returned.
    fn generate(&mut self, program: &Program, options: &GenOptions)
        -> GenResult<Vec<OutputFile>>;
}

/// Run one emission against a reset writer and collect its files.
pub(crate) fn run_emission<F>(out: &mut SourceWriter, emit: F) -> GenResult<Vec<OutputFile>>
where
    F: FnOnce(&mut SourceWriter) -> GenResult<()>,
{
    out.reset();
    match emit(out) {
        Ok(()) => Ok(out.take_files()),
        Err(e) => {
            out.reset();
            Err(e)
        }
    }
}
