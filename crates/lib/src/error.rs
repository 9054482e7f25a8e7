//! Error kinds surfaced to the user.

use camino::Utf8PathBuf;

/// Failures that abort or degrade a command.
///
/// These are carried inside [`anyhow::Error`]; use `downcast_ref`
/// to tell them apart.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The base name doesn't satisfy the image naming rules.
    #[error("Invalid base name: '{0}'. Must be 1 to 128 characters and only contain lowercase letters, digits, dashes, and periods.")]
    InvalidName(String),

    /// A project directory name that can't be used in an image name.
    #[error("Invalid project directory name: '{0}'. Must be 1 to 128 characters and only contain lowercase letters, digits, underscores, dashes, and periods.")]
    InvalidProjectName(String),

    /// No `<base>.Containerfile` in the context directory.
    #[error("{filename} not found in {directory}")]
    ContainerfileNotFound {
        /// The file name that was looked for
        filename: String,
        /// The directory that was searched
        directory: Utf8PathBuf,
    },

    /// The context directory doesn't exist or isn't a directory.
    #[error("{0} is not a valid directory.")]
    InvalidDirectory(String),

    /// The build command exited unsuccessfully.
    #[error("Failed to build image {0}.")]
    BuildFailed(String),

    /// Image inspection failed; callers fall back to a default shell.
    #[error("Error running inspect on {image}: {reason}")]
    RuntimeInspectFailed {
        /// The image that was inspected
        image: String,
        /// What went wrong
        reason: String,
    },

    /// Image removal failed; reported but not fatal.
    #[error("Error pruning image {image}: {stderr}")]
    RuntimePruneFailed {
        /// The image that was being removed
        image: String,
        /// The runtime's error output
        stderr: String,
    },
}
