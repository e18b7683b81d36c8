use std::{
    path::{Path, PathBuf},
    result::Result as StdResult,
};

use crate::error::{ReserveError, Result};

/// Name of the directory the build backend writes artifacts into.
pub const DIST_DIR: &str = "dist";

/// A validated request to reserve one package name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRequest {
    /// Distribution name, also used for the project and module directories.
    name: String,
    /// Free-form description written to the manifest and README.
    description: String,
    /// Directory the project directory is created in.
    base_dir: PathBuf,
}

impl PackageRequest {
    /// Validate and build a request. Surrounding whitespace is trimmed from
    /// the name; the description is kept verbatim.
    pub fn new(
        name: impl AsRef<str>,
        description: impl Into<String>,
        base_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let name = name.as_ref().trim();
        validate_name(name).map_err(ReserveError::InvalidRequest)?;

        let base_dir = base_dir.into();
        if base_dir.as_os_str().is_empty() {
            return Err(ReserveError::InvalidRequest(
                "base directory must not be empty".to_string(),
            ));
        }

        Ok(Self {
            name: name.to_string(),
            description: description.into(),
            base_dir,
        })
    }

    /// Distribution name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Directory the project is created in.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Root of the scaffolded project: `<base_dir>/<name>`.
    pub fn root(&self) -> PathBuf {
        self.base_dir.join(&self.name)
    }

    /// Directory holding built artifacts: `<root>/dist`.
    pub fn dist_dir(&self) -> PathBuf {
        self.root().join(DIST_DIR)
    }
}

/// Check that `name` is a valid distribution name: ASCII letters, digits,
/// `.`, `_` and `-`, starting and ending with a letter or digit.
pub fn validate_name(name: &str) -> StdResult<(), String> {
    if name.is_empty() {
        return Err("package name must not be empty".to_string());
    }

    if let Some(bad) = name
        .chars()
        .find(|ch| !(ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-')))
    {
        return Err(format!(
            "package name '{name}' contains invalid character {bad:?}; \
             use ASCII letters, digits, '.', '_' or '-'"
        ));
    }

    let first = name.chars().next().unwrap_or_default();
    let last = name.chars().last().unwrap_or_default();
    if !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() {
        return Err(format!(
            "package name '{name}' must start and end with a letter or digit"
        ));
    }

    Ok(())
}
