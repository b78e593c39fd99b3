pub mod api;
pub mod ast;
pub mod codegen;
pub mod config;

// Re-export public API — `polyemit::generate()` etc.
pub use api::*;
pub use ast::Program;
