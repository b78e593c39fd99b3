pub mod project;

pub use project::{ConfigError, GenConfig, CONFIG_FILE};
