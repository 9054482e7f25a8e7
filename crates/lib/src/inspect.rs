//! Reading the default shell out of image metadata.

use std::process::Command;

use anyhow::Result;
use containerized_utils::CommandRunExt;
use serde::Deserialize;

use crate::{Config, Error};

/// The parts of `inspect` output we look at.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageInspect {
    /// The image configuration.
    #[serde(default)]
    pub config: Option<ImageConfig>,
}

/// The image configuration block.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageConfig {
    /// `KEY=VALUE` environment entries.
    #[serde(default)]
    pub env: Option<Vec<String>>,
}

/// Find the value of `SHELL` in `KEY=VALUE` entries. Entries without
/// `=` are skipped.
pub fn shell_from_env<S: AsRef<str>>(env: &[S]) -> Option<&str> {
    env.iter()
        .filter_map(|e| e.as_ref().split_once('='))
        .find_map(|(k, v)| (k == "SHELL").then_some(v))
}

/// Extract `SHELL` from parsed inspect output (only the first image is
/// considered).
pub fn shell_from_inspect(inspect: &[ImageInspect]) -> Option<String> {
    let env = inspect.first()?.config.as_ref()?.env.as_deref()?;
    shell_from_env(env).map(ToOwned::to_owned)
}

/// Inspect `image` with the configured runtime.
pub fn inspect_image(config: &Config, image: &str) -> Result<Vec<ImageInspect>> {
    Command::new(&config.runtime)
        .args(["inspect", image])
        .run_and_parse_json::<Vec<ImageInspect>>()
        .map_err(|e| {
            anyhow::Error::from(Error::RuntimeInspectFailed {
                image: image.to_owned(),
                reason: format!("{e:#}"),
            })
        })
}

/// The shell the image declares via `SHELL`, if any.
///
/// Never fails: a failed or unparseable inspection is logged and
/// treated the same as no `SHELL` entry.
pub fn get_shell_env(config: &Config, image: &str) -> Option<String> {
    match inspect_image(config, image) {
        Ok(inspect) => shell_from_inspect(&inspect),
        Err(e) => {
            tracing::warn!("{e:#}");
            None
        }
    }
}

/// [`get_shell_env`], falling back to the configured default shell.
pub fn shell_or_default(config: &Config, image: &str) -> String {
    get_shell_env(config, image).unwrap_or_else(|| {
        tracing::debug!("{image} declares no SHELL; using {}", config.default_shell);
        config.default_shell.clone()
    })
}
