//! Run configuration (veneer.toml format).

use crate::error::{DriverError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use veneer_codegen::DEFAULT_BRIDGE_MODULE;

/// Name of the configuration file picked up from the working directory.
pub const CONFIG_FILE_NAME: &str = "veneer.toml";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VeneerConfig {
    /// Where generated modules go.
    #[serde(default)]
    pub output: OutputConfig,

    /// How declarations are extracted.
    #[serde(default)]
    pub extract: ExtractConfig,
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: `generated`).
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Module the runtime bridge is imported from.
    #[serde(default = "default_bridge_module")]
    pub bridge_module: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            bridge_module: default_bridge_module(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

fn default_bridge_module() -> String {
    DEFAULT_BRIDGE_MODULE.to_string()
}

/// Extraction settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default)]
    pub strategy: ExtractionStrategy,

    /// Directory containing libclang (clang strategy only).
    #[serde(default)]
    pub libclang_path: Option<PathBuf>,

    /// SDK passed as `-isysroot` (clang strategy only).
    #[serde(default)]
    pub sdk_root: Option<PathBuf>,

    /// Additional clang arguments.
    #[serde(default)]
    pub clang_args: Vec<String>,
}

/// Which front-end reads the headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStrategy {
    /// Line-oriented scanner, no external dependencies.
    #[default]
    Text,
    /// libclang cursor walk.
    Clang,
}

impl FromStr for ExtractionStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "clang" => Ok(Self::Clang),
            other => Err(format!("unknown strategy `{}` (expected `text` or `clang`)", other)),
        }
    }
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Clang => "clang",
        })
    }
}

impl VeneerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| DriverError::UnreadableInput {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| DriverError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `veneer.toml` in `dir` if present, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading configuration");
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }
}
