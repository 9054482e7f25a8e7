//! Build an image, showing the log only when the build did real work.

use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use camino::Utf8Path;
use containerized_utils::CommandRunExt;
use rustix::pipe::PipeFlags;

use crate::buildlog::{CacheScanner, LogLines};
use crate::{Config, Error};

/// What was captured while relaying a build log.
#[derive(Debug, Default)]
pub struct BuildLog {
    /// Lines read before the scanner switched to passthrough, including
    /// the line that switched it; all lines if it never did.
    pub lines: Vec<String>,
    /// True if no line indicated real work.
    pub cache_used: bool,
}

/// Relay a build log to `out`.
///
/// Lines are held back while they look like a fully cached build. On the
/// first sign of real work, `header` and everything held back are written,
/// and the remaining lines are streamed as they arrive. Nothing is written
/// if the build stays cached.
pub fn relay_build_log<I, W>(lines: I, header: impl Display, out: &mut W) -> Result<BuildLog>
where
    I: IntoIterator<Item = io::Result<String>>,
    W: Write,
{
    let mut lines = lines.into_iter();
    let mut scanner = CacheScanner::new();
    let mut buffered = Vec::new();

    for line in lines.by_ref() {
        let line = line.context("Reading build output")?;
        let switched = scanner.feed(&line);
        buffered.push(line);
        if switched {
            writeln!(out, "{header}")?;
            for l in &buffered {
                writeln!(out, "{l}")?;
            }
            out.flush()?;
            break;
        }
    }

    let cache_used = scanner.cache_used();
    if !cache_used {
        for line in lines {
            let line = line.context("Reading build output")?;
            writeln!(out, "{line}")?;
            out.flush()?;
        }
    }

    Ok(BuildLog {
        lines: buffered,
        cache_used,
    })
}

/// Build `image` from `containerfile` using the configured context
/// directory, writing progress to stdout.
pub fn build_image(config: &Config, containerfile: &Utf8Path, image: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    build_image_to(config, containerfile, image, &mut stdout)
}

/// Like [`build_image`], writing to `out`.
///
/// A non-zero exit dumps every captured line, even ones already shown or
/// previously suppressed, and fails with [`Error::BuildFailed`].
pub fn build_image_to<W: Write>(
    config: &Config,
    containerfile: &Utf8Path,
    image: &str,
    out: &mut W,
) -> Result<()> {
    let (reader, writer) =
        rustix::pipe::pipe_with(PipeFlags::CLOEXEC).context("Creating build output pipe")?;
    let writer_err = writer.try_clone().context("Duplicating build output pipe")?;

    let mut child = {
        let mut cmd = Command::new(&config.runtime);
        cmd.args(["build", "-f", containerfile.as_str(), "-t", image])
            .arg(config.directory.as_str())
            .stdout(Stdio::from(writer))
            .stderr(Stdio::from(writer_err));
        let pretty = cmd.to_string_pretty();
        tracing::debug!("exec: {pretty}");
        // Dropping `cmd` at the end of this block closes our write ends,
        // so the reader sees EOF once the child exits.
        cmd.spawn().with_context(|| format!("Spawning {pretty}"))?
    };

    let header = format!("Building image from {containerfile} as {image}:");
    let lines = LogLines::new(BufReader::new(File::from(reader)));
    let relayed = relay_build_log(lines, header, out);
    let log = match relayed {
        Ok(log) => log,
        Err(e) => {
            child.wait().context("Waiting for build")?;
            return Err(e);
        }
    };
    // Reported at end of stream, whatever the exit status turns out to be.
    if log.cache_used {
        writeln!(out, "Nothing to do to build image {image}. Using cached version.")?;
        out.flush()?;
    }

    let status = child.wait().context("Waiting for build")?;
    if !status.success() {
        tracing::debug!("build of {image} exited with {status}");
        for l in &log.lines {
            writeln!(out, "{l}")?;
        }
        out.flush()?;
        return Err(Error::BuildFailed(image.to_owned()).into());
    }
    Ok(())
}
