pub mod actionscript;
pub mod c;
pub mod opencl;

pub use actionscript::ActionScriptBackend;
pub use c::{CBackend, CDialect, StdC};
pub use opencl::{OpenCl, OpenClBackend};

use super::error::{GenError, GenResult};
use super::Backend;

// ─── Backend Factory ──────────────────────────────────────────────

/// Create the backend for a target id.
pub fn create_backend(target_name: &str) -> GenResult<Box<dyn Backend>> {
    match target_name {
        "as" => Ok(Box::new(ActionScriptBackend::new())),
        "c" => Ok(Box::new(CBackend::<StdC>::new())),
        "cl" => Ok(Box::new(OpenClBackend::new())),
        other => Err(GenError::UnknownTarget(other.to_string())),
    }
}
