use std::path::PathBuf;

use liboutput::Output;
use libreserve::{BASE_DIR_VAR, Config, PackageRequest, ReserveError, expand_tilde, validate_name};

/// Answers supplied on the command line before any prompting.
#[derive(Debug, Default, Clone)]
pub struct Answers {
    /// Package name.
    pub name: Option<String>,
    /// Package description.
    pub description: Option<String>,
    /// Base directory, possibly starting with `~`.
    pub base_dir: Option<String>,
    /// Whether to create a GitHub repository.
    pub repo: Option<bool>,
}

/// A fully answered reservation.
#[derive(Debug)]
pub struct Gathered {
    /// The validated request.
    pub request: PackageRequest,
    /// Whether to create and push a GitHub repository afterwards.
    pub create_repo: bool,
}

/// Fill in whatever `answers` leaves open by prompting on `output`.
///
/// With `no_prompt` set, a missing name or base directory is an error, a
/// missing description is empty and no repository is created.
pub fn gather(
    answers: Answers,
    config: &Config,
    output: &dyn Output,
    no_prompt: bool,
    home: Option<&str>,
) -> Result<Gathered, ReserveError> {
    let name = match answers.name {
        Some(name) => name,
        None if no_prompt => {
            return Err(ReserveError::InvalidRequest(
                "package name is required; pass --name".to_string(),
            ));
        }
        None => output.input("Enter the package name", None)?,
    };
    let name = name.trim().to_string();
    validate_name(&name).map_err(ReserveError::InvalidRequest)?;

    let description = match answers.description {
        Some(description) => description,
        None if no_prompt => String::new(),
        None => output.input("Enter the package description", Some(""))?,
    };

    let base_dir = match answers.base_dir {
        Some(dir) => expand_tilde(&dir, home),
        None => base_dir(config, output, no_prompt, home)?,
    };

    let create_repo = match answers.repo {
        Some(repo) => repo,
        None if no_prompt => false,
        None => output.confirm("Create a public GitHub repository?", false)?,
    };

    Ok(Gathered {
        request: PackageRequest::new(name, description, base_dir)?,
        create_repo,
    })
}

/// Decide the base directory, offering the configured default first.
fn base_dir(
    config: &Config,
    output: &dyn Output,
    no_prompt: bool,
    home: Option<&str>,
) -> Result<PathBuf, ReserveError> {
    if let Some(default) = &config.default_base_dir {
        if no_prompt {
            return Ok(default.clone());
        }
        let options = [
            format!("Use the default ({})", default.display()),
            "Enter another directory".to_string(),
        ];
        if output.select("Base directory", &options, 0)? == 0 {
            return Ok(default.clone());
        }
    } else if no_prompt {
        return Err(ReserveError::InvalidRequest(format!(
            "base directory is required; pass --base-dir or set {BASE_DIR_VAR}"
        )));
    }

    let dir = output.input("Enter the base directory", None)?;
    Ok(expand_tilde(dir.trim(), home))
}
