//! Settings resolved once at startup and passed to every operation.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::str::FromStr;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use containerized_utils::PathQuotedDisplay;
use fn_error_context::context;
use serde::Deserialize;

use crate::Error;

/// The environment variable naming an optional YAML settings file.
pub const CONFIG_VAR: &str = "CONTAINERIZED_CONFIG";

/// The container runtime binary used unless overridden.
pub const DEFAULT_RUNTIME: &str = "podman";

/// Where the context directory appears inside the container.
pub const DEFAULT_MOUNT_POINT: &str = "/mnt";

/// The shell used when the image doesn't declare one.
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Runtime settings that may come from the file named by [`CONFIG_VAR`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RuntimeConfig {
    /// The container runtime binary.
    pub runtime: String,
    /// In-container path for the context directory.
    pub mount_point: String,
    /// Entrypoint for `shell` when the image sets no `SHELL`.
    pub default_shell: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            runtime: DEFAULT_RUNTIME.to_owned(),
            mount_point: DEFAULT_MOUNT_POINT.to_owned(),
            default_shell: DEFAULT_SHELL.to_owned(),
        }
    }
}

impl RuntimeConfig {
    /// Load from [`CONFIG_VAR`] if set, else the defaults.
    #[context("Loading runtime config")]
    pub fn load() -> Result<Self> {
        let Some(path) = std::env::var_os(CONFIG_VAR) else {
            return Ok(Self::default());
        };
        let f = File::open(&path)
            .with_context(|| format!("Opening {}", PathQuotedDisplay::new(&path)))
            .map(BufReader::new)?;
        serde_yaml::from_reader(f)
            .with_context(|| format!("Parsing config from {}", PathQuotedDisplay::new(&path)))
    }
}

/// An extra bind mount, `source:destination[:options]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeSpec(String);

impl VolumeSpec {
    /// The spec as handed to the runtime's `-v`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for VolumeSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((src, dest)) if !src.is_empty() && !dest.is_empty() && !dest.starts_with(':') => {
                Ok(Self(s.to_owned()))
            }
            _ => Err(format!("expected source:destination, got '{s}'")),
        }
    }
}

impl fmt::Display for VolumeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable settings for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// The container runtime binary.
    pub runtime: String,
    /// Absolute context directory; build context and mount source.
    pub directory: Utf8PathBuf,
    /// Extra bind mounts for `run` and `shell`.
    pub volumes: Vec<VolumeSpec>,
    /// In-container path for [`Self::directory`].
    pub mount_point: String,
    /// Fallback entrypoint for `shell`.
    pub default_shell: String,
}

impl Config {
    /// Resolve the context directory and combine it with the runtime
    /// settings. `directory` defaults to the current working directory,
    /// which is read here and nowhere else.
    pub fn new(
        directory: Option<&Utf8Path>,
        volumes: Vec<VolumeSpec>,
        runtime: RuntimeConfig,
    ) -> Result<Self> {
        let directory = resolve_directory(directory)?;
        Ok(Self {
            runtime: runtime.runtime,
            directory,
            volumes,
            mount_point: runtime.mount_point,
            default_shell: runtime.default_shell,
        })
    }

    /// The `-v` argument that mounts the context directory.
    pub fn context_mount(&self) -> String {
        format!("{}:{}", self.directory, self.mount_point)
    }
}

/// Make `directory` absolute (without resolving symlinks) and require
/// that it is an existing directory.
fn resolve_directory(directory: Option<&Utf8Path>) -> Result<Utf8PathBuf> {
    let cwd = || -> Result<Utf8PathBuf> {
        let cwd = std::env::current_dir().context("Reading current directory")?;
        Utf8PathBuf::try_from(cwd).context("Current directory is not UTF-8")
    };
    let absolute = match directory {
        Some(d) if d.is_absolute() => d.to_owned(),
        Some(d) => cwd()?.join(d),
        None => cwd()?,
    };
    let absolute = normalize(&absolute);
    if !absolute.is_dir() {
        return Err(Error::InvalidDirectory(absolute.into_string()).into());
    }
    Ok(absolute)
}

/// Lexically drop `.` and resolve `..` components.
fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    use camino::Utf8Component;

    let mut out = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                out.pop();
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_spec() {
        let v: VolumeSpec = "/srv/data:/data".parse().unwrap();
        assert_eq!(v.as_str(), "/srv/data:/data");
        let v: VolumeSpec = "/srv/data:/data:ro,z".parse().unwrap();
        assert_eq!(v.to_string(), "/srv/data:/data:ro,z");

        for bad in ["", "/srv/data", ":/data", "/srv/data:", "/srv/data::ro"] {
            assert!(bad.parse::<VolumeSpec>().is_err(), "{bad}");
        }
    }

    #[test]
    fn test_runtime_config_yaml() {
        let c: RuntimeConfig = serde_yaml::from_str("runtime: /usr/local/bin/podman\n").unwrap();
        assert_eq!(c.runtime, "/usr/local/bin/podman");
        assert_eq!(c.mount_point, DEFAULT_MOUNT_POINT);
        assert_eq!(c.default_shell, DEFAULT_SHELL);

        let r: std::result::Result<RuntimeConfig, _> = serde_yaml::from_str("image: foo\n");
        assert!(r.is_err());
    }

    #[test]
    fn test_config_directory() {
        let td = tempfile::tempdir().unwrap();
        let dir = Utf8Path::from_path(td.path()).unwrap();
        let sub = dir.join("sub");
        std::fs::create_dir(&sub).unwrap();

        let relative = sub.join("..").join("sub");
        let c = Config::new(Some(relative.as_path()), vec![], Default::default()).unwrap();
        assert_eq!(c.directory, sub);
        assert_eq!(c.context_mount(), format!("{sub}:/mnt"));
    }

    #[test]
    fn test_config_invalid_directory() {
        let td = tempfile::tempdir().unwrap();
        let dir = Utf8Path::from_path(td.path()).unwrap();
        let missing = dir.join("missing");
        let err = Config::new(Some(missing.as_path()), vec![], Default::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidDirectory(_))
        ));
        assert_eq!(err.to_string(), format!("{missing} is not a valid directory."));

        // A regular file is not a directory either
        let file = dir.join("file");
        std::fs::write(&file, "").unwrap();
        assert!(Config::new(Some(file.as_path()), vec![], Default::default()).is_err());
    }
}
