use std::{fmt, sync::Arc};

use liboutput::{Output, Spinner};
use tracing::{info, warn};

use crate::{
    build,
    config::Config,
    error::{RepoInitError, Result},
    publish, repo,
    request::PackageRequest,
    scaffold,
};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Writing the package skeleton.
    Scaffold,
    /// Running the build backend.
    Build,
    /// Uploading wheels.
    Publish,
    /// Creating the optional GitHub repository.
    RepoInit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Scaffold => "scaffold",
            Self::Build => "build",
            Self::Publish => "publish",
            Self::RepoInit => "repo-init",
        };
        f.write_str(label)
    }
}

/// How a pipeline run that did not halt ended.
#[derive(Debug)]
pub enum Completion {
    /// Every requested stage succeeded.
    Succeeded,
    /// The package was uploaded but repository setup failed.
    SucceededWithWarning(RepoInitError),
}

impl Completion {
    /// The repository warning, if any.
    pub fn warning(&self) -> Option<&RepoInitError> {
        match self {
            Self::Succeeded => None,
            Self::SucceededWithWarning(err) => Some(err),
        }
    }
}

/// Runs the reservation pipeline for one package.
pub struct Reserver {
    /// Shared configuration.
    config: Config,
    /// Where progress and results are reported.
    output: Arc<dyn Output>,
}

impl Reserver {
    /// Create a pipeline runner reporting to `output`.
    pub fn new(config: Config, output: Arc<dyn Output>) -> Self {
        Self { config, output }
    }

    /// Scaffold, build and upload `request`, then optionally create the
    /// GitHub repository. Scaffold, build and publish failures halt the run;
    /// a repository failure is reported as a warning.
    pub fn run(&self, request: &PackageRequest, create_repo: bool) -> Result<Completion> {
        self.enter(Stage::Scaffold, "Creating package structure...")?;
        let root = scaffold::create_package(&self.config, request)?;

        self.enter(Stage::Build, "Building the package...")?;
        let spinner = self.output.spinner("building sdist and wheel");
        let built = build::build_distributions(&self.config, &root);
        spinner.finish();
        built?;

        self.enter(Stage::Publish, "Uploading the .whl package to PyPI...")?;
        let spinner = self.output.spinner("uploading");
        let uploaded = publish::upload_wheels(&self.config, &root);
        spinner.finish();
        let wheels = uploaded?;
        for wheel in &wheels {
            if let Some(file) = wheel.file_name() {
                self.output.message(&format!("uploaded {}", file.to_string_lossy()))?;
            }
        }
        self.output.success(&format!(
            "Package {} (.whl) with description '{}' has been uploaded to PyPI!",
            request.name(),
            request.description()
        ))?;

        if !create_repo {
            info!("done");
            return Ok(Completion::Succeeded);
        }

        self.enter(Stage::RepoInit, "Creating GitHub repository...")?;
        let section = self.output.section(&format!("repository: {}", request.name()));
        let spinner: Spinner = section.spinner("git init, commit and gh repo create");
        let outcome = repo::init_and_push(&self.config, request, &root);
        spinner.finish();

        match outcome {
            Ok(()) => {
                section.success("GitHub repository created and pushed")?;
                info!("done");
                Ok(Completion::Succeeded)
            }
            Err(err) => {
                warn!(step = %err.step, message = %err.message, "repository setup failed");
                section.warn(&format!("{err}; the package upload is unaffected"))?;
                Ok(Completion::SucceededWithWarning(err))
            }
        }
    }

    /// Announce and log the start of `stage`.
    fn enter(&self, stage: Stage, announcement: &str) -> Result<()> {
        info!(%stage, "entering stage");
        self.output.message(announcement)?;
        Ok(())
    }
}
