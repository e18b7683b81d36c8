//! Fake python, twine, git and gh programs for exercising the pipeline
//! without touching a real registry or hosting service.

use std::{
    fs, io,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use crate::config::{ApiToken, Config, Tools};

/// Token configured by [`FakeTools::config`].
pub(crate) const TEST_TOKEN: &str = "pypi-test-token";

/// Shared prologue: log the call, then honor `fail-<key>` marker files.
const PROLOGUE: &str = include_str!("../testdata/fake-tools/prologue.sh");

/// Script bodies, keyed by tool name. Failure keys: `build`, `install`,
/// `upload`, `gh`, and `git-<subcommand>`.
const SCRIPTS: [(&str, &str); 4] = [
    ("python", include_str!("../testdata/fake-tools/python.sh")),
    ("twine", include_str!("../testdata/fake-tools/twine.sh")),
    ("git", include_str!("../testdata/fake-tools/git.sh")),
    ("gh", include_str!("../testdata/fake-tools/gh.sh")),
];

/// One recorded invocation of a fake tool.
#[derive(Debug, Clone)]
pub(crate) struct Call {
    /// Which fake tool ran.
    pub tool: String,
    /// Working directory of the call.
    pub dir: PathBuf,
    /// Value of `TWINE_PASSWORD` seen by the tool, if any.
    pub token: Option<String>,
    /// Space-joined arguments.
    pub args: String,
}

/// A directory of executable fake tools that log every call.
pub(crate) struct FakeTools {
    /// Directory holding the scripts, the call log and failure markers.
    bin: PathBuf,
}

impl FakeTools {
    /// Write the fake tools under `<dir>/bin`.
    pub(crate) fn new(dir: &Path) -> io::Result<Self> {
        let bin = dir.join("bin");
        fs::create_dir_all(&bin)?;
        let tools = Self { bin };
        for (name, body) in SCRIPTS {
            tools.write_script(name, body)?;
        }
        Ok(tools)
    }

    /// Write one executable script.
    fn write_script(&self, name: &str, body: &str) -> io::Result<()> {
        let path = self.path(name);
        let prologue = PROLOGUE
            .replace("@BIN@", &self.bin.to_string_lossy())
            .replace("@TOOL@", name);
        fs::write(&path, format!("{prologue}{body}"))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
    }

    /// Make the step named `key` exit with `code`.
    pub(crate) fn fail(self, key: &str, code: i32) -> io::Result<Self> {
        fs::write(self.bin.join(format!("fail-{key}")), code.to_string())?;
        Ok(self)
    }

    /// Path of the fake `tool`.
    pub(crate) fn path(&self, tool: &str) -> PathBuf {
        self.bin.join(tool)
    }

    /// Configuration pointing every tool at its fake, with a token set.
    pub(crate) fn config(&self) -> Config {
        let mut config = Config::from_lookup(|_| None, &self.bin);
        config.token = Some(ApiToken::new(TEST_TOKEN));
        config.tools = Tools {
            python: self.path("python"),
            twine: self.path("twine"),
            git: self.path("git"),
            gh: self.path("gh"),
        };
        config
    }

    /// Calls recorded so far, in order.
    pub(crate) fn calls(&self) -> io::Result<Vec<Call>> {
        let log = match fs::read_to_string(self.bin.join("calls.log")) {
            Ok(log) => log,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };
        Ok(log
            .lines()
            .filter_map(|line| {
                let mut parts = line.splitn(4, '\t');
                let tool = parts.next()?.to_string();
                let dir = PathBuf::from(parts.next()?);
                let token = match parts.next()? {
                    "-" => None,
                    value => Some(value.to_string()),
                };
                let args = parts.next().unwrap_or_default().to_string();
                Some(Call {
                    tool,
                    dir,
                    token,
                    args,
                })
            })
            .collect())
    }

    /// Tools invoked so far, in order.
    pub(crate) fn tool_sequence(&self) -> io::Result<Vec<String>> {
        Ok(self.calls()?.into_iter().map(|call| call.tool).collect())
    }
}
