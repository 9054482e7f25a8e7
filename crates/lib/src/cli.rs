//! # Command line interface
//!
//! Argument parsing and the top-level sequencing of a command.

use std::ffi::OsString;

use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;

use crate::build::build_image;
use crate::containerfile::find_containerfile;
use crate::inspect::shell_or_default;
use crate::prune::prune_image;
use crate::run::{run_container, RunTarget};
use crate::{BaseName, Config, RuntimeConfig, VolumeSpec};

/// Build and run Podman containers from a Containerfile.
///
/// The Containerfile is `<BASE_NAME>.Containerfile` in the context
/// directory, and the image is tagged `<BASE_NAME>:latest`. When the
/// first argument is not a sub-command, `run` is assumed.
#[derive(Debug, Parser, PartialEq, Eq)]
#[clap(name = "containerized", version, disable_help_subcommand = true)]
pub struct Opt {
    /// Directory to search for the Containerfile and use as context.
    /// Defaults to the current directory.
    #[clap(short, long)]
    pub directory: Option<Utf8PathBuf>,

    /// Additional bind mount in the form source:destination
    #[clap(
        short = 'v',
        long = "volume",
        value_name = "SOURCE:DESTINATION",
        action = clap::ArgAction::Append
    )]
    pub volumes: Vec<VolumeSpec>,

    #[clap(subcommand)]
    #[allow(missing_docs)]
    pub cmd: Cmd,
}

/// The sub-commands.
#[derive(Debug, clap::Subcommand, PartialEq, Eq)]
pub enum Cmd {
    /// Build the image, then run an interactive shell in the container
    ///
    /// The shell is the image's `SHELL` environment variable, or /bin/sh.
    Shell(NameOpts),

    /// Remove the image built for this base name
    Prune(NameOpts),

    /// Build the image, then run its default command
    Run(RunOpts),
}

/// Options naming the Containerfile.
#[derive(Debug, clap::Args, PartialEq, Eq)]
pub struct NameOpts {
    /// Base name of the .Containerfile
    pub base_name: String,
}

/// Options for running the default command.
#[derive(Debug, clap::Args, PartialEq, Eq)]
pub struct RunOpts {
    /// Base name of the .Containerfile
    pub base_name: String,

    /// Additional arguments passed to the container
    #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl Cmd {
    /// The base name the command operates on.
    pub fn base_name(&self) -> &str {
        match self {
            Cmd::Shell(o) | Cmd::Prune(o) => &o.base_name,
            Cmd::Run(o) => &o.base_name,
        }
    }
}

/// Names that are parsed as sub-commands rather than base names.
const SUBCOMMANDS: &[&str] = &["shell", "prune", "run"];

/// Global options that take a separate value.
const OPTIONS_WITH_VALUE: &[&str] = &["-d", "--directory", "-v", "--volume"];

/// Insert `run` before the first positional argument if it isn't a
/// known sub-command, so `tool NAME ARGS...` means `tool run NAME ARGS...`.
///
/// The first element is the program name and is left alone.
pub fn with_implicit_run(mut args: Vec<OsString>) -> Vec<OsString> {
    let mut i = 1;
    while i < args.len() {
        let Some(arg) = args[i].to_str() else {
            break;
        };
        if arg == "--" {
            break;
        }
        if OPTIONS_WITH_VALUE.contains(&arg) {
            i += 2;
            continue;
        }
        if arg.starts_with('-') {
            // --opt=value, -dVALUE, or a flag such as --help
            i += 1;
            continue;
        }
        if !SUBCOMMANDS.contains(&arg) {
            args.insert(i, "run".into());
        }
        break;
    }
    args
}

/// Parse the command line (including the program name) and execute it.
pub fn run_from_iter<I>(args: I) -> Result<()>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    let args = with_implicit_run(args.into_iter().map(Into::into).collect());
    let opt = Opt::parse_from(args);
    run_from_opt(opt)
}

/// Resolve configuration for parsed options and execute the command.
pub fn run_from_opt(opt: Opt) -> Result<()> {
    let runtime = RuntimeConfig::load()?;
    let config = Config::new(opt.directory.as_deref(), opt.volumes, runtime)?;
    execute(&config, &opt.cmd)
}

/// Execute `cmd`: locate the Containerfile, then prune, or build and run.
pub fn execute(config: &Config, cmd: &Cmd) -> Result<()> {
    let name = BaseName::new(cmd.base_name())?;
    let containerfile = find_containerfile(&config.directory, &name)?;
    let image = name.image_name();
    tracing::debug!("Using {containerfile} for {image}");

    let target = match cmd {
        Cmd::Prune(_) => return prune_image(config, &image),
        Cmd::Shell(_) => {
            build_image(config, &containerfile, &image)?;
            RunTarget::Entrypoint(shell_or_default(config, &image))
        }
        Cmd::Run(o) => {
            build_image(config, &containerfile, &image)?;
            RunTarget::Default(o.args.clone())
        }
    };
    run_container(config, &image, &target)?;
    Ok(())
}
