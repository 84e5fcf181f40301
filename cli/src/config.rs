//! Tool configuration loaded from `~/.fastled-wasm/config.yaml`.
//!
//! Every field is optional; an absent file yields all defaults. Command
//! line arguments take precedence over the file, which takes precedence
//! over the built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Sketch directory used when none is configured or given.
pub const DEFAULT_PROJECT_DIR: &str = "examples/wasm";

/// Build definition the compiler image is created from, relative to the
/// FastLED checkout the tool runs in.
pub const DEFAULT_DOCKERFILE: &str = "src/platforms/wasm/compiler/Dockerfile";

/// Top-level configuration stored in `~/.fastled-wasm/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FastledConfig {
    /// Sketch directory compiled when none is given on the command line.
    pub project_dir: Option<PathBuf>,
    /// Dockerfile the compiler image is built from.
    pub dockerfile: Option<PathBuf>,
    /// Compiler image versions retained after a build.
    pub keep_images: Option<usize>,
}

impl FastledConfig {
    /// Load the configuration, returning defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Load from an explicit path (used by tests and the env override).
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    /// Directory to compile: CLI argument, then config, then default.
    #[must_use]
    pub fn resolve_directory(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| self.project_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROJECT_DIR))
    }

    /// Dockerfile to build from: config, then default.
    #[must_use]
    pub fn resolve_dockerfile(&self) -> PathBuf {
        self.dockerfile
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCKERFILE))
    }
}

/// Path of the config file; `FASTLED_WASM_CONFIG` overrides the default
/// `~/.fastled-wasm/config.yaml`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_path() -> Result<PathBuf> {
    if let Ok(val) = std::env::var("FASTLED_WASM_CONFIG") {
        return Ok(PathBuf::from(val));
    }
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.join(".fastled-wasm").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = FastledConfig::load_from(&dir.path().join("config.yaml")).expect("load");
        assert!(cfg.project_dir.is_none());
        assert!(cfg.keep_images.is_none());
    }

    #[test]
    fn full_yaml_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "project_dir: /home/dev/sketches/blink\nkeep_images: 3\n",
        )
        .expect("write");

        let cfg = FastledConfig::load_from(&path).expect("load");
        assert_eq!(
            cfg.project_dir.as_deref(),
            Some(Path::new("/home/dev/sketches/blink"))
        );
        assert_eq!(cfg.keep_images, Some(3));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "keep_images: 2\nlegacy_option: true\n").expect("write");
        let cfg = FastledConfig::load_from(&path).expect("load");
        assert_eq!(cfg.keep_images, Some(2));
    }

    #[test]
    fn malformed_yaml_is_an_error_naming_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "keep_images: [not a number\n").expect("write");
        let err = FastledConfig::load_from(&path).expect_err("expected Err");
        assert!(err.to_string().contains("config.yaml"), "got: {err}");
    }

    #[test]
    fn cli_argument_wins_over_config_and_default() {
        let cfg = FastledConfig {
            project_dir: Some(PathBuf::from("/from/config")),
            ..FastledConfig::default()
        };
        assert_eq!(
            cfg.resolve_directory(Some(PathBuf::from("/from/cli"))),
            PathBuf::from("/from/cli")
        );
        assert_eq!(
            cfg.resolve_directory(None),
            PathBuf::from("/from/config")
        );
        assert_eq!(
            FastledConfig::default().resolve_directory(None),
            PathBuf::from(DEFAULT_PROJECT_DIR)
        );
    }
}
