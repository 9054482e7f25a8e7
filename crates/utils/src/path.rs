use std::fmt::Display;
use std::path::Path;

/// Display a filesystem path quoted the way a shell would need it,
/// so that paths with spaces or control characters are unambiguous
/// in error messages.
#[derive(Debug)]
pub struct PathQuotedDisplay<'a> {
    path: &'a Path,
}

impl<'a> PathQuotedDisplay<'a> {
    /// Wrap a path for display.
    pub fn new<P: AsRef<Path> + ?Sized>(path: &'a P) -> Self {
        Self {
            path: path.as_ref(),
        }
    }
}

impl Display for PathQuotedDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.path.to_string_lossy();
        match shlex::try_quote(&s) {
            Ok(quoted) => f.write_str(&quoted),
            // Interior NUL can't be quoted; fall back to debug escaping.
            Err(_) => write!(f, "{:?}", self.path),
        }
    }
}
