//! The inevitable catchall "utils" crate. Generally only add
//! things here that only depend on the standard library and
//! "core" crates.
//!
mod command;
pub use command::*;
mod path;
pub use path::*;
mod tracing_util;
pub use tracing_util::*;

/// Intended for use in `main`, calls an inner function and
/// handles errors by printing them.
///
/// Errors go to standard output with an `Error:` prefix, and the
/// process exits with status 1.
pub fn run_main<F>(f: F)
where
    F: FnOnce() -> anyhow::Result<()>,
{
    use std::io::Write as _;

    use owo_colors::OwoColorize;

    if let Err(e) = f() {
        let mut stdout = anstream::stdout();
        // Don't panic if writing fails.
        let _ = writeln!(stdout, "{}{:#}", "Error: ".red(), e);
        std::process::exit(1);
    }
}
