//! Helpers intended for [`std::process::Command`] and related structures.

use std::borrow::Cow;
use std::process::{Command, ExitStatus, Output};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Helpers intended for [`std::process::Command`].
pub trait CommandRunExt {
    /// Render the program and its arguments as a single shell-quoted string.
    fn to_string_pretty(&self) -> String;

    /// Spawn with inherited stdio and wait, returning the exit status.
    /// A non-zero exit is not an error here; only a failure to spawn is.
    fn status_with_cmd_context(&mut self) -> Result<ExitStatus>;

    /// Spawn with captured stdout and stderr and wait for the output.
    /// As with [`Self::status_with_cmd_context`], the caller judges the status.
    fn run_get_output(&mut self) -> Result<Output>;

    /// Run, require success, and parse stdout as JSON.
    fn run_and_parse_json<T: DeserializeOwned>(&mut self) -> Result<T>;
}

fn quote_arg(s: &str) -> Cow<'_, str> {
    shlex::try_quote(s).unwrap_or(Cow::Borrowed(s))
}

impl CommandRunExt for Command {
    fn to_string_pretty(&self) -> String {
        std::iter::once(self.get_program())
            .chain(self.get_args())
            .map(|a| quote_arg(&a.to_string_lossy()).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn status_with_cmd_context(&mut self) -> Result<ExitStatus> {
        let pretty = self.to_string_pretty();
        tracing::debug!("exec: {pretty}");
        self.status().with_context(|| format!("Spawning {pretty}"))
    }

    fn run_get_output(&mut self) -> Result<Output> {
        let pretty = self.to_string_pretty();
        tracing::debug!("exec: {pretty}");
        self.output().with_context(|| format!("Spawning {pretty}"))
    }

    fn run_and_parse_json<T: DeserializeOwned>(&mut self) -> Result<T> {
        let pretty = self.to_string_pretty();
        let output = self.run_get_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{pretty} failed ({}): {}", output.status, stderr.trim());
        }
        serde_json::from_slice(&output.stdout)
            .with_context(|| format!("Parsing JSON output of {pretty}"))
    }
}
