//! # containerized
//!
//! Build a container image from a Containerfile found by naming
//! convention, then run or shell into it, or prune the image.
//!
//! This crate provides functionality for:
//! - Validating base names and locating `<name>.Containerfile`
//! - Building with the container runtime, hiding the log of no-op builds
//! - Probing an image for its default shell
//! - Running containers with the context directory mounted

pub mod build;
pub mod buildcontainer;
pub mod buildlog;
pub mod cli;
mod config;
pub mod containerfile;
mod error;
pub mod inspect;
mod name;
pub mod prune;
pub mod run;

#[cfg(test)]
mod testutil;

pub use config::*;
pub use error::Error;
pub use name::*;
