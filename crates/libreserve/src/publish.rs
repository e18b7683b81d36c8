use std::{
    fs, io,
    path::{Path, PathBuf},
    process::Command,
};

use tracing::{info, warn};

use crate::{
    config::{Config, TOKEN_VAR},
    error::PublishError,
    request::DIST_DIR,
    tool::{self, ToolFailure},
};

/// Username twine expects for API token authentication.
const TOKEN_USERNAME: &str = "__token__";
/// Environment variable twine reads the password from.
const PASSWORD_ENV: &str = "TWINE_PASSWORD";
/// Extension of wheel artifacts.
const WHEEL_EXTENSION: &str = "whl";

/// How the upload client is started.
#[derive(Debug, Clone, PartialEq, Eq)]
enum UploadClient {
    /// A `twine` executable.
    Program(PathBuf),
    /// `python -m twine`, used right after installing it.
    Module(PathBuf),
}

impl UploadClient {
    /// Command that runs the client in `dir`.
    fn command(&self, dir: &Path) -> Command {
        match self {
            Self::Program(program) => tool::command(program, dir),
            Self::Module(python) => {
                let mut command = tool::command(python, dir);
                command.args(["-m", "twine"]);
                command
            }
        }
    }
}

/// Upload every wheel in `<root>/dist` and return the uploaded paths.
///
/// The token reaches the upload client only through its environment.
pub fn upload_wheels(config: &Config, root: &Path) -> Result<Vec<PathBuf>, PublishError> {
    let token = config
        .token
        .as_ref()
        .filter(|token| !token.expose().trim().is_empty())
        .ok_or(PublishError::MissingToken { var: TOKEN_VAR })?;

    let dist_dir = root.join(DIST_DIR);
    let wheels = find_wheels(&dist_dir)?;
    if wheels.is_empty() {
        return Err(PublishError::NoArtifacts { dist_dir });
    }

    let client = ensure_upload_client(config, root)?;
    let mut command = client.command(root);
    command
        .args(["upload", "--repository-url", &config.repository_url])
        .args(["-u", TOKEN_USERNAME, "--non-interactive"])
        .args(wheels.iter().map(|wheel| relative_to(wheel, root)))
        .env(PASSWORD_ENV, token.expose());

    tool::run(&mut command).map_err(|failure| match failure {
        ToolFailure::Spawn { program, source } => PublishError::Spawn { program, source },
        ToolFailure::Exit { code, output } => PublishError::Upload { code, output },
    })?;

    info!(count = wheels.len(), url = %config.repository_url, "upload finished");
    Ok(wheels)
}

/// Wheels directly inside `dist_dir`, sorted. A missing directory has none.
pub fn find_wheels(dist_dir: &Path) -> Result<Vec<PathBuf>, PublishError> {
    let entries = match fs::read_dir(dist_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(PublishError::ListArtifacts {
                dist_dir: dist_dir.to_path_buf(),
                source,
            });
        }
    };

    let mut wheels = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| PublishError::ListArtifacts {
                dist_dir: dist_dir.to_path_buf(),
                source,
            })?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == WHEEL_EXTENSION) {
            wheels.push(path);
        }
    }
    wheels.sort();
    Ok(wheels)
}

/// Locate twine, installing it with pip when it is not available.
fn ensure_upload_client(config: &Config, root: &Path) -> Result<UploadClient, PublishError> {
    if let Ok(program) = which::which(&config.tools.twine) {
        return Ok(UploadClient::Program(program));
    }

    warn!(twine = %config.tools.twine.display(), "twine not found, installing with pip");
    let mut command = tool::command(&config.tools.python, root);
    command.args(["-m", "pip", "install", "twine"]);
    tool::run(&mut command).map_err(|failure| PublishError::Install {
        message: failure.describe(),
    })?;

    Ok(UploadClient::Module(config.tools.python.clone()))
}

/// `path` relative to `base` when possible.
fn relative_to(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}
