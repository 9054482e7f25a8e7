//! Removing a built image.

use std::io::{self, Write};
use std::process::Command;

use anyhow::Result;
use containerized_utils::CommandRunExt;

use crate::{Config, Error};

/// Remove `image`, reporting progress on stdout.
pub fn prune_image(config: &Config, image: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    prune_image_to(config, image, &mut stdout)
}

/// Like [`prune_image`], writing to `out`.
///
/// A failed removal (image missing, in use, ...) is reported and
/// otherwise ignored; only a runtime that can't be started is an error.
pub fn prune_image_to<W: Write>(config: &Config, image: &str, out: &mut W) -> Result<()> {
    writeln!(out, "Pruning image {image}...")?;
    out.flush()?;
    let output = Command::new(&config.runtime)
        .args(["rmi", image])
        .run_get_output()?;
    if output.status.success() {
        writeln!(out, "Image {image} removed successfully.")?;
    } else {
        let err = Error::RuntimePruneFailed {
            image: image.to_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!("rmi exited with {}", output.status);
        writeln!(out, "{err}")?;
    }
    Ok(())
}
