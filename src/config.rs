// src/config.rs

//! Configuration for locating and launching the renderer engine.
//!
//! The configuration can be deserialized from a JSON file; every field has a
//! default, so a partial (or empty) file is valid. The process-wide [`CONFIG`]
//! is resolved once from the environment:
//!
//! - `PRENDER_CONFIG`: path to a JSON configuration file.
//! - `PRENDER_ENGINE`: engine executable, overriding the file's value.

use anyhow::Context;
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the renderer engine executable.
pub const DEFAULT_ENGINE_PATH: &str = "/usr/bin/prender/renderer";

pub const CONFIG_PATH_ENV: &str = "PRENDER_CONFIG";
pub const ENGINE_PATH_ENV: &str = "PRENDER_ENGINE";

/// Configuration resolved from the environment on first use.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// How to launch the renderer engine.
    pub engine: EngineConfig,
}

/// How to launch the renderer engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Path to the engine executable.
    pub program: PathBuf,
    /// Extra arguments passed to the engine.
    pub args: Vec<String>,
    /// Working directory for the engine. Relative DRAW paths resolve against
    /// it. If `None`, the engine inherits ours.
    pub working_directory: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            program: PathBuf::from(DEFAULT_ENGINE_PATH),
            args: Vec::new(),
            working_directory: None,
        }
    }
}

impl EngineConfig {
    /// Launch `program` with no arguments.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        EngineConfig {
            program: program.into(),
            ..EngineConfig::default()
        }
    }
}

impl Config {
    /// Reads a JSON configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Resolves configuration from `PRENDER_CONFIG` and `PRENDER_ENGINE`,
    /// falling back to defaults if the file cannot be loaded.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from),
            std::env::var_os(ENGINE_PATH_ENV).map(PathBuf::from),
        )
    }

    fn from_vars(config_path: Option<PathBuf>, engine_override: Option<PathBuf>) -> Self {
        let mut config = match config_path {
            Some(path) => Self::load(&path).unwrap_or_else(|e| {
                warn!("{:#}. Using default configuration.", e);
                Config::default()
            }),
            None => Config::default(),
        };
        if let Some(program) = engine_override {
            info!("Engine overridden by {}: {}", ENGINE_PATH_ENV, program.display());
            config.engine.program = program;
        }
        config
    }
}
