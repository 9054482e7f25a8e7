//! # buildcontainer
//!
//! The per-project variant: one `build.Containerfile` per directory,
//! with the image named after the directory.

use std::ffi::OsString;

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;

use crate::build::build_image;
use crate::containerfile::find_named;
use crate::name::{IMAGE_TAG, MAX_BASE_NAME_LEN};
use crate::prune::prune_image;
use crate::run::{run_container, RunTarget};
use crate::{Config, Error, RuntimeConfig};

/// The build file this tool looks for.
pub const BUILD_CONTAINERFILE: &str = "build.Containerfile";

/// Build and run Podman containers from build.Containerfile.
#[derive(Debug, Parser, PartialEq, Eq)]
#[clap(name = "buildcontainer", version)]
pub struct BuildContainerOpt {
    /// Directory to search for build.Containerfile and use as context.
    /// Defaults to the current directory.
    #[clap(short, long)]
    pub directory: Option<Utf8PathBuf>,

    #[clap(subcommand)]
    #[allow(missing_docs)]
    pub cmd: BuildContainerCmd,
}

/// The sub-commands.
#[derive(Debug, Clone, Copy, clap::Subcommand, PartialEq, Eq)]
pub enum BuildContainerCmd {
    /// Build the image, then run its default command
    Build,
    /// Build the image, then run an interactive shell in the container
    Shell,
    /// Remove the image built for this directory
    Prune,
}

/// Check a lowercased directory name for use in an image name: like a
/// base name, but `_` is allowed too.
fn is_valid_project_name(name: &str) -> bool {
    (1..=MAX_BASE_NAME_LEN).contains(&name.len())
        && name.bytes().all(|b| {
            b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'-' | b'.' | b'_')
        })
}

/// The image for a project directory: `build_<directory name>:latest`.
///
/// The directory name is lowercased first.
pub fn build_image_name(directory: &Utf8Path) -> Result<String, Error> {
    let dir_name = directory.file_name().unwrap_or_default().to_lowercase();
    if !is_valid_project_name(&dir_name) {
        return Err(Error::InvalidProjectName(dir_name));
    }
    Ok(format!("build_{dir_name}:{IMAGE_TAG}"))
}

/// Parse the command line (including the program name) and execute it.
pub fn run_from_iter<I>(args: I) -> Result<()>
where
    I: IntoIterator,
    I::Item: Into<OsString> + Clone,
{
    let opt = BuildContainerOpt::parse_from(args);
    let config = Config::new(opt.directory.as_deref(), vec![], RuntimeConfig::load()?)?;
    execute(&config, opt.cmd)
}

/// Execute `cmd` against the project in the configured directory.
pub fn execute(config: &Config, cmd: BuildContainerCmd) -> Result<()> {
    let containerfile = find_named(&config.directory, BUILD_CONTAINERFILE)?;
    let image = build_image_name(&config.directory)?;

    let target = match cmd {
        BuildContainerCmd::Prune => return prune_image(config, &image),
        BuildContainerCmd::Build => RunTarget::Default(vec![]),
        BuildContainerCmd::Shell => RunTarget::Entrypoint(config.default_shell.clone()),
    };
    build_image(config, &containerfile, &image)?;
    run_container(config, &image, &target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeRuntime;

    #[test]
    fn test_build_image_name() {
        let cases = [
            ("/home/me/src/MyApp", "build_myapp:latest"),
            ("/srv/web-1.2", "build_web-1.2:latest"),
            ("/home/me/my_app", "build_my_app:latest"),
            ("/home/me/My_App", "build_my_app:latest"),
        ];
        for (dir, expected) in cases {
            assert_eq!(build_image_name(Utf8Path::new(dir)).unwrap(), expected);
        }
        assert!(matches!(
            build_image_name(Utf8Path::new("/home/me/my app")),
            Err(Error::InvalidProjectName(n)) if n == "my app"
        ));
        assert!(matches!(
            build_image_name(Utf8Path::new("/home/me/café")),
            Err(Error::InvalidProjectName(_))
        ));
        assert!(build_image_name(Utf8Path::new("/")).is_err());
    }

    #[test]
    fn test_execute_underscore_project() {
        let td = tempfile::tempdir().unwrap();
        let project = td.path().join("my_app");
        std::fs::create_dir(&project).unwrap();
        std::fs::write(project.join(BUILD_CONTAINERFILE), "FROM alpine\n").unwrap();
        let rt = FakeRuntime::new("true");
        let mut config = crate::testutil::config_for(&project);
        config.runtime = rt.config().runtime;
        execute(&config, BuildContainerCmd::Prune).unwrap();
        assert_eq!(rt.calls(), ["rmi build_my_app:latest"]);
    }

    #[test]
    fn test_parse() {
        let opt =
            BuildContainerOpt::try_parse_from(["buildcontainer", "-d", "/tmp", "shell"]).unwrap();
        assert_eq!(opt.directory.as_deref(), Some(Utf8Path::new("/tmp")));
        assert_eq!(opt.cmd, BuildContainerCmd::Shell);
        assert!(BuildContainerOpt::try_parse_from(["buildcontainer"]).is_err());
    }

    #[test]
    fn test_execute_shell() {
        let rt = FakeRuntime::new("true");
        let config = rt.config();
        std::fs::write(config.directory.join(BUILD_CONTAINERFILE), "FROM alpine\n").unwrap();
        execute(&config, BuildContainerCmd::Shell).unwrap();
        let dir = &config.directory;
        assert_eq!(
            rt.calls(),
            [
                format!("build -f {dir}/build.Containerfile -t build_ctx:latest {dir}"),
                format!("run --rm -it -v {dir}:/mnt --entrypoint /bin/sh build_ctx:latest"),
            ]
        );
    }

    #[test]
    fn test_execute_missing_containerfile() {
        let rt = FakeRuntime::new("true");
        let err = execute(&rt.config(), BuildContainerCmd::Build).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("build.Containerfile not found in {}", rt.config().directory)
        );
        assert!(rt.calls().is_empty());
    }
}
