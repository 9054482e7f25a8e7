//! Base names and the artifacts derived from them.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Longest accepted base name.
pub const MAX_BASE_NAME_LEN: usize = 128;

/// Suffix appended to a base name to find its build file.
pub const CONTAINERFILE_SUFFIX: &str = ".Containerfile";

/// Tag used for every image we build.
pub const IMAGE_TAG: &str = "latest";

/// Check a candidate base name: 1 to 128 characters, each a lowercase
/// ASCII letter, a digit, `-` or `.`.
pub fn is_valid_base_name(name: &str) -> bool {
    (1..=MAX_BASE_NAME_LEN).contains(&name.len())
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
}

/// A validated base name. Names both the Containerfile and the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseName(String);

impl BaseName {
    /// Validate and wrap a base name.
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if is_valid_base_name(&name) {
            Ok(Self(name))
        } else {
            Err(Error::InvalidName(name))
        }
    }

    /// The raw name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The build file name, `<name>.Containerfile`.
    pub fn containerfile_name(&self) -> String {
        format!("{}{CONTAINERFILE_SUFFIX}", self.0)
    }

    /// The image reference, `<name>:latest`.
    pub fn image_name(&self) -> String {
        format!("{}:{IMAGE_TAG}", self.0)
    }
}

impl FromStr for BaseName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for BaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
