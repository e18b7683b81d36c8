use std::{fs, path::Path};

use tracing::info;

use crate::{
    config::Config,
    error::{RepoInitError, RepoStep},
    request::PackageRequest,
    tool::{self, ToolFailure},
};

/// Message used for the initial commit.
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit";

/// Ignore rules for build output written before the initial commit.
const GITIGNORE: &str = "dist/\nbuild/\n*.egg-info/\n__pycache__/\n";

/// Initialise a repository in `root`, commit everything, and create and push
/// a public GitHub repository named after the package.
pub fn init_and_push(
    config: &Config,
    request: &PackageRequest,
    root: &Path,
) -> Result<(), RepoInitError> {
    write_gitignore(root)?;
    init(config, root)?;
    add_all(config, root)?;
    commit(config, root, INITIAL_COMMIT_MESSAGE)?;
    create_remote(config, request, root)?;
    info!(name = request.name(), "repository created and pushed");
    Ok(())
}

/// Write `.gitignore` unless one already exists.
fn write_gitignore(root: &Path) -> Result<(), RepoInitError> {
    let path = root.join(".gitignore");
    if path.exists() {
        return Ok(());
    }
    fs::write(&path, GITIGNORE).map_err(|err| RepoInitError {
        step: RepoStep::Ignore,
        message: format!("{}: {err}", path.display()),
    })
}

/// Run a git command in `root`, attributing failures to `step`.
fn run_git(
    config: &Config,
    root: &Path,
    step: RepoStep,
    args: &[&str],
) -> Result<(), RepoInitError> {
    let mut command = tool::command(&config.tools.git, root);
    command.args(args);
    tool::run(&mut command)
        .map(|_| ())
        .map_err(|failure| step_error(step, &failure))
}

/// Initialise a repository in `root`. Re-running on an existing repository is harmless.
pub fn init(config: &Config, root: &Path) -> Result<(), RepoInitError> {
    run_git(config, root, RepoStep::Init, &["init"])
}

/// Stage all tracked and untracked files.
pub fn add_all(config: &Config, root: &Path) -> Result<(), RepoInitError> {
    run_git(config, root, RepoStep::Add, &["add", "."])
}

/// Create a commit with the provided `message`.
pub fn commit(config: &Config, root: &Path, message: &str) -> Result<(), RepoInitError> {
    run_git(config, root, RepoStep::Commit, &["commit", "-m", message])
}

/// Create a public GitHub repository from `root` and push to it.
pub fn create_remote(
    config: &Config,
    request: &PackageRequest,
    root: &Path,
) -> Result<(), RepoInitError> {
    let mut command = tool::command(&config.tools.gh, root);
    command.args(["repo", "create", request.name(), "--public", "--source=.", "--push"]);
    if !request.description().trim().is_empty() {
        command.args(["--description", request.description()]);
    }
    tool::run(&mut command)
        .map(|_| ())
        .map_err(|failure| step_error(RepoStep::Create, &failure))
}

/// Describe a failed tool run for `step`.
fn step_error(step: RepoStep, failure: &ToolFailure) -> RepoInitError {
    RepoInitError {
        step,
        message: failure.describe(),
    }
}
