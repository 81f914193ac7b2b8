//! Configuration loading from confine.toml.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Config file consulted when `CONFINE_CONFIG` is not set.
pub const SYSTEM_CONFIG: &str = "/etc/confine.toml";

/// Top-level configuration.
///
/// Only describes the host; capability tokens never live here.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Backend configuration.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Executable resolution.
    #[serde(default)]
    pub exec: ExecConfig,
}

/// Confinement backend configuration.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Backend executable, looked up on `PATH` when not absolute.
    #[serde(default = "default_command")]
    pub command: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExecConfig {
    /// Directory joined with by-name targets.
    #[serde(default = "default_bin_dir")]
    pub bin_dir: PathBuf,

    /// Hostname inside a private UTS namespace.
    #[serde(default = "default_hostname")]
    pub hostname: String,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            bin_dir: default_bin_dir(),
            hostname: default_hostname(),
        }
    }
}

fn default_command() -> String {
    "bwrap".to_string()
}

fn default_bin_dir() -> PathBuf {
    PathBuf::from("/usr/bin")
}

fn default_hostname() -> String {
    directive::DEFAULT_HOSTNAME.to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content).map_err(|message| Error::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> std::result::Result<Self, String> {
        toml::from_str(toml).map_err(|e| e.to_string())
    }

    /// Load the explicit file if given, else the system file if present,
    /// else built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let system = Path::new(SYSTEM_CONFIG);
        if system.exists() {
            Self::load(system)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[backend]
command = "/opt/bwrap/bin/bwrap"

[exec]
bin_dir = "/opt/apps/bin"
hostname = "jail"
"#;
        let config = Config::parse(toml).unwrap();
        assert_eq!(config.backend.command, "/opt/bwrap/bin/bwrap");
        assert_eq!(config.exec.bin_dir, PathBuf::from("/opt/apps/bin"));
        assert_eq!(config.exec.hostname, "jail");
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.backend.command, "bwrap");
        assert_eq!(config.exec.bin_dir, PathBuf::from("/usr/bin"));
        assert_eq!(config.exec.hostname, "sandbox");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = Config::parse("[exec]\nhostname = \"box\"\n").unwrap();
        assert_eq!(config.exec.bin_dir, PathBuf::from("/usr/bin"));
        assert_eq!(config.exec.hostname, "box");
    }

    #[test]
    fn test_tokens_are_rejected() {
        let err = Config::parse("[policy]\ndefaults = \"allowgpu\"\n");
        assert!(err.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("confine.toml");
        std::fs::write(&path, "[backend]\ncommand = \"bwrap-custom\"\n").unwrap();

        let config = Config::discover(Some(&path)).unwrap();
        assert_eq!(config.backend.command, "bwrap-custom");
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::discover(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
