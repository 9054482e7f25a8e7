//! Finding the build file for a base name.

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};

use crate::{BaseName, Error};

/// Resolve `<directory>/<name>.Containerfile`, failing with
/// [`Error::ContainerfileNotFound`] if it doesn't exist.
pub fn find_containerfile(directory: &Utf8Path, name: &BaseName) -> Result<Utf8PathBuf> {
    find_named(directory, &name.containerfile_name())
}

/// Resolve an exact file name within `directory`. No globbing and no
/// alternate extensions.
pub fn find_named(directory: &Utf8Path, filename: &str) -> Result<Utf8PathBuf> {
    let path = directory.join(filename);
    if path.try_exists()? {
        tracing::debug!("Found Containerfile at: {path}");
        Ok(path)
    } else {
        Err(Error::ContainerfileNotFound {
            filename: filename.to_owned(),
            directory: directory.to_owned(),
        }
        .into())
    }
}
