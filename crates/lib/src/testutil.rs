//! A stand-in container runtime for tests: a shell script that records
//! its arguments and then runs a canned body.

use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use camino::Utf8PathBuf;
use tempfile::TempDir;

use crate::{Config, RuntimeConfig};

pub(crate) struct FakeRuntime {
    dir: TempDir,
}

impl FakeRuntime {
    /// `body` is shell script run after the arguments are recorded.
    pub(crate) fn new(body: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir(root.join("ctx")).unwrap();
        let calls = root.join("calls");
        let script = format!(
            "#!/bin/sh\necho \"$*\" >> '{}'\n{body}\n",
            calls.display()
        );
        let path = root.join("runtime");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir }
    }

    /// A runtime whose `build` prints `log` and exits with `code`.
    pub(crate) fn with_build_log(log: &str, code: i32) -> Self {
        Self::new(&format!("cat <<'EOF'\n{log}EOF\nexit {code}"))
    }

    fn root(&self) -> Utf8PathBuf {
        Utf8PathBuf::try_from(self.dir.path().to_owned()).unwrap()
    }

    /// A config using this runtime, with `ctx/` as the context directory.
    pub(crate) fn config(&self) -> Config {
        let root = self.root();
        let runtime = RuntimeConfig {
            runtime: root.join("runtime").into_string(),
            ..Default::default()
        };
        Config::new(Some(root.join("ctx").as_path()), vec![], runtime).unwrap()
    }

    /// One entry per invocation, arguments joined by spaces.
    pub(crate) fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.dir.path().join("calls"))
            .unwrap_or_default()
            .lines()
            .map(ToOwned::to_owned)
            .collect()
    }
}

/// A default config rooted at `dir`.
pub(crate) fn config_for(dir: &Path) -> Config {
    let dir = Utf8PathBuf::try_from(dir.to_owned()).unwrap();
    Config::new(Some(dir.as_path()), vec![], RuntimeConfig::default()).unwrap()
}
