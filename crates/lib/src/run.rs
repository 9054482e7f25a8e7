//! Running a container from a built image.

use std::process::{Command, ExitStatus};

use anyhow::Result;
use containerized_utils::CommandRunExt;

use crate::Config;

/// What the container should execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunTarget {
    /// The image's default command, with extra arguments appended.
    Default(Vec<String>),
    /// Override the entrypoint (e.g. a shell); no extra arguments.
    Entrypoint(String),
}

/// Assemble the runtime invocation for running `image`.
///
/// The container is always interactive with a TTY and removed on exit;
/// the context directory is always mounted, then any extra volumes.
pub fn run_command(config: &Config, image: &str, target: &RunTarget) -> Command {
    let mut cmd = Command::new(&config.runtime);
    cmd.args(["run", "--rm", "-it", "-v"])
        .arg(config.context_mount());
    for volume in &config.volumes {
        cmd.args(["-v", volume.as_str()]);
    }
    match target {
        RunTarget::Entrypoint(entrypoint) => {
            cmd.args(["--entrypoint", entrypoint.as_str(), image]);
        }
        RunTarget::Default(args) => {
            cmd.arg(image).args(args);
        }
    }
    cmd
}

/// Run `image` with inherited stdio and wait for it to exit.
///
/// The container's exit status is returned but is not itself an error.
pub fn run_container(config: &Config, image: &str, target: &RunTarget) -> Result<ExitStatus> {
    println!("{} is mounted at {}", config.directory, config.mount_point);
    let status = run_command(config, image, target).status_with_cmd_context()?;
    if !status.success() {
        tracing::debug!("container from {image} exited with {status}");
    }
    Ok(status)
}
