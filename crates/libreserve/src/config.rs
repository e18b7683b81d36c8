use std::{
    collections::HashMap,
    env, fmt,
    path::{Path, PathBuf},
    result::Result as StdResult,
};

use tracing::debug;

use crate::error::{ReserveError, Result};

/// Dotenv file read from the working directory at startup.
pub const ENV_FILE: &str = ".env";

/// Environment variable holding the registry API token.
pub const TOKEN_VAR: &str = "PYPI_API_TOKEN";
/// Environment variable holding the default base directory.
pub const BASE_DIR_VAR: &str = "BASE_URL";
/// Environment variable overriding the upload endpoint.
pub const REPOSITORY_URL_VAR: &str = "RESERVE_REPOSITORY_URL";
/// Environment variable overriding the python interpreter.
pub const PYTHON_VAR: &str = "RESERVE_PYTHON";
/// Environment variable overriding the twine program.
pub const TWINE_VAR: &str = "RESERVE_TWINE";
/// Environment variable overriding the git program.
pub const GIT_VAR: &str = "RESERVE_GIT";
/// Environment variable overriding the GitHub CLI program.
pub const GH_VAR: &str = "RESERVE_GH";

/// Upload endpoint of the public Python Package Index.
pub const PYPI_UPLOAD_URL: &str = "https://upload.pypi.org/legacy/";

/// Placeholder author written into generated manifests.
const DEFAULT_AUTHOR: &str = "Your Name";
/// Placeholder author email written into generated manifests.
const DEFAULT_AUTHOR_EMAIL: &str = "your.email@example.com";

/// Registry API token. Never shown by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wrap a raw token value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw token, for handing to the upload client.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(****)")
    }
}

/// Programs invoked by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tools {
    /// Python interpreter running the build backend and pip.
    pub python: PathBuf,
    /// Upload client.
    pub twine: PathBuf,
    /// Version control CLI.
    pub git: PathBuf,
    /// Repository hosting CLI.
    pub gh: PathBuf,
}

impl Tools {
    /// Default tool set, preferring a `venv` interpreter under `cwd`.
    pub fn detect(cwd: &Path) -> Self {
        Self {
            python: default_python(cwd),
            twine: PathBuf::from("twine"),
            git: PathBuf::from("git"),
            gh: PathBuf::from("gh"),
        }
    }
}

/// Pick the project-local virtualenv interpreter when present.
fn default_python(cwd: &Path) -> PathBuf {
    let venv = if cfg!(windows) {
        cwd.join("venv").join("Scripts").join("python.exe")
    } else {
        cwd.join("venv").join("bin").join("python")
    };
    if venv.is_file() {
        venv
    } else if cfg!(windows) {
        PathBuf::from("python")
    } else {
        PathBuf::from("python3")
    }
}

/// Settings shared by every pipeline stage, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Upload credential.
    pub token: Option<ApiToken>,
    /// Base directory offered to the operator.
    pub default_base_dir: Option<PathBuf>,
    /// Registry upload endpoint.
    pub repository_url: String,
    /// External programs.
    pub tools: Tools,
    /// Author written into the manifest and license.
    pub author: String,
    /// Author email written into the manifest.
    pub author_email: String,
}

impl Config {
    /// Resolve configuration from the process environment, falling back to
    /// a `.env` file in the current directory.
    pub fn from_env() -> Result<Self> {
        let cwd = env::current_dir().unwrap_or_default();
        Self::from_env_in(|key| env::var(key).ok(), &cwd)
    }

    /// Resolve configuration from `lookup`, then from `<cwd>/.env` for keys
    /// `lookup` leaves unset or empty.
    pub fn from_env_in<F>(lookup: F, cwd: &Path) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = read_env_file(&cwd.join(ENV_FILE))?;
        Ok(Self::from_lookup(
            |key| {
                lookup(key)
                    .filter(|value| !value.trim().is_empty())
                    .or_else(|| file.get(key).cloned())
            },
            cwd,
        ))
    }

    /// Resolve configuration from `lookup`, treating empty values as unset.
    pub fn from_lookup<F>(lookup: F, cwd: &Path) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let home = get("HOME");

        let mut tools = Tools::detect(cwd);
        if let Some(python) = get(PYTHON_VAR) {
            tools.python = expand_tilde(&python, home.as_deref());
        }
        if let Some(twine) = get(TWINE_VAR) {
            tools.twine = expand_tilde(&twine, home.as_deref());
        }
        if let Some(git) = get(GIT_VAR) {
            tools.git = expand_tilde(&git, home.as_deref());
        }
        if let Some(gh) = get(GH_VAR) {
            tools.gh = expand_tilde(&gh, home.as_deref());
        }

        Self {
            token: get(TOKEN_VAR).map(ApiToken::new),
            default_base_dir: get(BASE_DIR_VAR).map(|dir| expand_tilde(&dir, home.as_deref())),
            repository_url: get(REPOSITORY_URL_VAR)
                .unwrap_or_else(|| PYPI_UPLOAD_URL.to_string()),
            tools,
            author: DEFAULT_AUTHOR.to_string(),
            author_email: DEFAULT_AUTHOR_EMAIL.to_string(),
        }
    }
}

/// Parse the dotenv file at `path`. A missing file has no entries.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let env_error = |err: dotenvy::Error| ReserveError::EnvFile {
        path: path.to_path_buf(),
        message: err.to_string(),
    };
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(err) if err.not_found() => return Ok(HashMap::new()),
        Err(err) => return Err(env_error(err)),
    };

    let vars = entries
        .collect::<StdResult<HashMap<_, _>, _>>()
        .map_err(env_error)?;
    debug!(path = %path.display(), count = vars.len(), "loaded dotenv file");
    Ok(vars)
}

/// Expand a leading `~` in a filesystem path using `home`.
pub fn expand_tilde(path: &str, home: Option<&str>) -> PathBuf {
    if path.starts_with('~')
        && let Some(home) = home
    {
        return PathBuf::from(path.replacen('~', home, 1));
    }
    PathBuf::from(path)
}
