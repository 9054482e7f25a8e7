//! Deciding whether a build did anything worth showing.
//!
//! The runtime prints a `STEP i/n: ...` line at the start of every build
//! step, and a line containing `--> Using cache` right after it when the
//! step's layer came from the cache. Step 1 (`FROM`) is expected to be
//! followed directly by step 2; anything else there is a pull or similar.
//! These substrings are the whole contract with the runtime; if a runtime
//! upgrade changes them, builds are simply always shown.

use std::io::{self, BufRead};

/// Prefix of a line that starts a build step.
pub const STEP_PREFIX: &str = "STEP";

/// Text marking a step whose layer was reused.
pub const CACHE_HIT_MARKER: &str = "--> Using cache";

/// The label of the step that a log line opened, e.g. `STEP 3/7: RUN make`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepMarker {
    label: String,
}

impl StepMarker {
    /// Parse a log line; `None` unless it starts with `STEP`.
    pub fn parse(line: &str) -> Option<Self> {
        line.starts_with(STEP_PREFIX).then(|| Self {
            label: line.trim().to_owned(),
        })
    }

    /// Whether this is `STEP 1/n`.
    pub fn is_first(&self) -> bool {
        self.label.starts_with("STEP 1/")
    }

    /// The trimmed line.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Where the scanner is in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    /// The previous line didn't open a step.
    AwaitingStep,
    /// The previous line was `STEP 1/n`.
    InFirstStep(StepMarker),
    /// The previous line opened a later step.
    InLaterStep(StepMarker),
    /// Real work was seen; everything from here on is shown.
    Passthrough,
}

/// Finite-state scanner over build log lines.
///
/// Starts out assuming a fully cached build and moves to
/// [`ScanState::Passthrough`] exactly once, on the first line showing
/// otherwise. That state is terminal.
#[derive(Debug, Clone)]
pub struct CacheScanner {
    state: ScanState,
}

impl Default for CacheScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheScanner {
    /// A scanner that hasn't seen any line.
    pub fn new() -> Self {
        Self {
            state: ScanState::AwaitingStep,
        }
    }

    /// The current state.
    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// True while every step seen so far came from the cache.
    pub fn cache_used(&self) -> bool {
        self.state != ScanState::Passthrough
    }

    /// Consume one line. Returns true if this line switched the scanner
    /// into passthrough.
    pub fn feed(&mut self, line: &str) -> bool {
        let real_work = match &self.state {
            ScanState::Passthrough => return false,
            ScanState::AwaitingStep => false,
            // Any output between step 1 and step 2 forces the log, even
            // when it is not a pull.
            ScanState::InFirstStep(_) => !line.starts_with(STEP_PREFIX),
            ScanState::InLaterStep(_) => !line.contains(CACHE_HIT_MARKER),
        };
        self.state = if real_work {
            ScanState::Passthrough
        } else {
            match StepMarker::parse(line) {
                Some(m) if m.is_first() => ScanState::InFirstStep(m),
                Some(m) => ScanState::InLaterStep(m),
                None => ScanState::AwaitingStep,
            }
        };
        real_work
    }
}

/// Pull-based iterator over the lines of a child's output.
///
/// Unlike [`BufRead::lines`], invalid UTF-8 is replaced rather than
/// ending the stream, since build output is whatever the Containerfile's
/// commands print. Line terminators are stripped.
#[derive(Debug)]
pub struct LogLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LogLines<R> {
    /// Wrap a reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for LogLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.ends_with(b"\n") {
                    self.buf.pop();
                    if self.buf.ends_with(b"\r") {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    /// Feed a whole log; return whether it stayed cached, and the
    /// (zero-based) line that triggered passthrough.
    fn scan(log: &str) -> (bool, Option<usize>) {
        let mut s = CacheScanner::new();
        let mut trigger = None;
        for (i, line) in log.lines().enumerate() {
            if s.feed(line) {
                trigger = Some(i);
            }
        }
        (s.cache_used(), trigger)
    }

    const CACHED: &str = indoc! {"
        STEP 1/3: FROM registry.fedoraproject.org/fedora:40
        STEP 2/3: RUN dnf -y install make
        --> Using cache 5b1d5c1e0c6fbd7a4c0f3f0e8e2d
        --> 5b1d5c1e0c6f
        STEP 3/3: CMD [\"make\"]
        --> Using cache 9a1e3a3e2c0a6d1f2b7b0c4d9e8f
        COMMIT devbox:latest
        --> 9a1e3a3e2c0a
        Successfully tagged localhost/devbox:latest
        9a1e3a3e2c0a6d1f2b7b0c4d9e8f
    "};

    #[test]
    fn test_fully_cached_log() {
        assert_eq!(scan(CACHED), (true, None));
    }

    #[test]
    fn test_minimal_cached_shape() {
        let log = indoc! {"
            STEP 1/3
            STEP 2/3
            --> Using cache
            STEP 3/3
            --> Using cache
        "};
        assert_eq!(scan(log), (true, None));
    }

    #[test]
    fn test_later_step_without_cache() {
        let log = indoc! {"
            STEP 1/3: FROM fedora:40
            STEP 2/3: RUN dnf -y install make
            Updating and loading repositories:
            STEP 3/3: CMD [\"make\"]
        "};
        assert_eq!(scan(log), (false, Some(2)));
    }

    #[test]
    fn test_output_after_first_step_forces_log() {
        let log = indoc! {"
            STEP 1/3
            Pulling image...
            STEP 2/3
            --> Using cache
            STEP 3/3
            --> Using cache
        "};
        assert_eq!(scan(log), (false, Some(1)));
    }

    #[test]
    fn test_preamble_before_steps_ignored() {
        let log = indoc! {"
            time=\"2024-05-01\" level=warning msg=\"something\"
            STEP 1/2: FROM fedora:40
            STEP 2/2: RUN true
            --> Using cache abc
        "};
        assert_eq!(scan(log), (true, None));
    }

    #[test]
    fn test_step_ten_is_not_step_one() {
        let log = indoc! {"
            STEP 10/12: RUN true
            Resolving
        "};
        assert_eq!(scan(log), (false, Some(1)));
    }

    #[test]
    fn test_passthrough_is_terminal() {
        let mut s = CacheScanner::new();
        assert!(!s.feed("STEP 2/2: RUN make"));
        assert!(
            matches!(s.state(), ScanState::InLaterStep(m) if m.label() == "STEP 2/2: RUN make")
        );
        assert!(s.feed("gcc -o main main.c"));
        assert_eq!(s.state(), &ScanState::Passthrough);
        assert!(!s.feed("STEP 1/1"));
        assert!(!s.feed("--> Using cache"));
        assert!(!s.cache_used());
    }

    #[test]
    fn test_step_marker() {
        let m = StepMarker::parse("STEP 1/7: FROM alpine  ").unwrap();
        assert!(m.is_first());
        assert_eq!(m.label(), "STEP 1/7: FROM alpine");
        assert!(!StepMarker::parse("STEP 2/7: RUN x").unwrap().is_first());
        assert!(StepMarker::parse(" STEP 1/7").is_none());
        assert!(StepMarker::parse("--> Using cache").is_none());
    }

    #[test]
    fn test_log_lines() {
        let input: &[u8] = b"one\r\ntwo\n\xffthree";
        let lines: Vec<String> = LogLines::new(input).collect::<io::Result<_>>().unwrap();
        assert_eq!(lines, ["one", "two", "\u{fffd}three"]);
    }
}
