use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::codegen::GenOptions;

/// Name of the configuration file looked up by [`GenConfig::find`].
pub const CONFIG_FILE: &str = "polyemit.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("missing '{key}' in '{}'", path.display())]
    Missing { path: PathBuf, key: &'static str },
}

/// Generation settings from polyemit.toml.
///
/// ```toml
/// [output]
/// target = "c"
/// path = "build/decoder.c"
/// namespace = "com.example"
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenConfig {
    pub target: String,
    /// Output file or directory, relative paths resolved against `root_dir`.
    pub output: PathBuf,
    pub namespace: Option<String>,
    pub root_dir: PathBuf,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    output: Option<RawOutput>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOutput {
    target: Option<String>,
    path: Option<PathBuf>,
    namespace: Option<String>,
}

impl GenConfig {
    /// Load configuration from a polyemit.toml file.
    pub fn load(toml_path: &Path) -> Result<GenConfig, ConfigError> {
        let content = std::fs::read_to_string(toml_path).map_err(|source| ConfigError::Io {
            path: toml_path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: toml_path.to_path_buf(),
            source,
        })?;

        let missing = |key| ConfigError::Missing {
            path: toml_path.to_path_buf(),
            key,
        };
        let output = raw.output.ok_or_else(|| missing("output"))?;
        let target = output.target.ok_or_else(|| missing("output.target"))?;
        let path = output.path.ok_or_else(|| missing("output.path"))?;

        let root_dir = toml_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        log::debug!("loaded {} (target {})", toml_path.display(), target);
        Ok(GenConfig {
            target,
            output: root_dir.join(path),
            namespace: output.namespace,
            root_dir,
        })
    }

    /// Try to find a polyemit.toml in the given directory or its ancestors.
    pub fn find(start_dir: &Path) -> Option<PathBuf> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.exists() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    pub fn to_options(&self) -> GenOptions {
        GenOptions {
            target: self.target.clone(),
            output: self.output.clone(),
            namespace: self.namespace.clone(),
        }
    }
}
