#![allow(dead_code)]

use anyhow::{Context, Result};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Token handed to the binary through its environment.
pub const TEST_TOKEN: &str = "pypi-test-token";

/// Return the path to the compiled `reserve` binary for integration-style tests.
pub fn reserve_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_reserve"))
}

/// Include one of the fake tool scripts shared with the library tests.
macro_rules! fake_tool {
    ($file:literal) => {
        include_str!(concat!("../../../libreserve/testdata/fake-tools/", $file))
    };
}

/// Script prologue: log the call, then honor `fail-<key>` marker files.
const PROLOGUE: &str = fake_tool!("prologue.sh");

/// Fake tool bodies, keyed by tool name. Failure keys: `build`, `install`,
/// `upload`, `gh`, and `git-<subcommand>`.
const SCRIPTS: [(&str, &str); 4] = [
    ("python", fake_tool!("python.sh")),
    ("twine", fake_tool!("twine.sh")),
    ("git", fake_tool!("git.sh")),
    ("gh", fake_tool!("gh.sh")),
];

/// A temporary area holding fake tools and a base directory for packages.
pub struct Fixture {
    /// Keeps the temporary directory alive.
    pub temp_dir: TempDir,
    /// Directory holding the fake tools and their call log.
    pub bin: PathBuf,
    /// Base directory packages are created in.
    pub base: PathBuf,
}

impl Fixture {
    /// Create the fixture and write the fake tools.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let bin = temp_dir.path().join("bin");
        let base = temp_dir.path().join("packages");
        fs::create_dir_all(&bin)?;
        for (tool, body) in SCRIPTS {
            let path = bin.join(tool);
            let prologue = PROLOGUE
                .replace("@BIN@", &bin.to_string_lossy())
                .replace("@TOOL@", tool);
            fs::write(&path, format!("{prologue}{body}"))?;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        }
        Ok(Self {
            temp_dir,
            bin,
            base,
        })
    }

    /// Make the step named `key` exit with `code`.
    pub fn fail(&self, key: &str, code: i32) -> Result<()> {
        fs::write(self.bin.join(format!("fail-{key}")), code.to_string())?;
        Ok(())
    }

    /// Prepare a `reserve` command wired to the fake tools.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(reserve_binary());
        cmd.current_dir(self.temp_dir.path())
            .env("HOME", self.temp_dir.path())
            .env("PYPI_API_TOKEN", TEST_TOKEN)
            .env("RESERVE_PYTHON", self.bin.join("python"))
            .env("RESERVE_TWINE", self.bin.join("twine"))
            .env("RESERVE_GIT", self.bin.join("git"))
            .env("RESERVE_GH", self.bin.join("gh"))
            .env_remove("BASE_URL")
            .env_remove("RESERVE_REPOSITORY_URL")
            .env_remove("RUST_LOG")
            .arg("--no-prompt")
            .arg("--no-color");
        cmd
    }

    /// Run `reserve` with `args`, returning the command output.
    pub fn run(&self, args: &[&str]) -> Result<Output> {
        let mut cmd = self.command();
        cmd.args(args);
        cmd.output()
            .with_context(|| format!("failed to run reserve {}", args.join(" ")))
    }

    /// Lines of the fake tools' call log.
    pub fn calls(&self) -> Result<Vec<String>> {
        let path = self.bin.join("calls.log");
        if !path.exists() {
            return Ok(Vec::new());
        }
        Ok(fs::read_to_string(path)?.lines().map(str::to_string).collect())
    }

    /// Tools invoked so far, in order.
    pub fn tools_called(&self) -> Result<Vec<String>> {
        Ok(self
            .calls()?
            .iter()
            .filter_map(|line| line.split('\t').next().map(str::to_string))
            .collect())
    }
}

/// Stdout with runs of whitespace collapsed, so terminal wrapping does not matter.
pub fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
