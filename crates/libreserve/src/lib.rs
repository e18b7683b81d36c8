#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
//! Core library for reserving a package name on PyPI.
//!
//! A reservation scaffolds a minimal placeholder package, builds it, uploads
//! the resulting wheel, and can optionally publish the source tree to a new
//! GitHub repository. The CLI binary in `crates/reserve` builds on top of
//! this library.

/// Running the build backend.
mod build;
/// Environment-derived configuration and tool locations.
mod config;
/// Error types and exit codes.
mod error;
/// Uploading wheels to the package index.
mod publish;
/// Git and GitHub repository setup.
mod repo;
/// Validated package requests.
mod request;
/// The end-to-end pipeline.
mod reserve;
/// Writing the placeholder package tree.
mod scaffold;
/// Running external programs.
mod tool;

/// Fake external tools for tests.
#[cfg(all(test, unix))]
mod testutil;

/// Re-exports of configuration types.
pub use config::{
    ApiToken, BASE_DIR_VAR, Config, ENV_FILE, GH_VAR, GIT_VAR, PYPI_UPLOAD_URL, PYTHON_VAR,
    REPOSITORY_URL_VAR, TOKEN_VAR, TWINE_VAR, Tools, expand_tilde, read_env_file,
};
/// Re-exports of error types.
pub use error::{
    BuildError, PublishError, RepoInitError, RepoStep, ReserveError, Result, ScaffoldError,
};
/// Re-exports of the individual pipeline stages.
pub use build::build_distributions;
pub use publish::{find_wheels, upload_wheels};
pub use repo::{INITIAL_COMMIT_MESSAGE, add_all, commit, create_remote, init, init_and_push};
pub use scaffold::{
    LICENSE_FILE, MANIFEST_FILE, PLACEHOLDER_VERSION, README_FILE, create_package,
    python_literal, render_license, render_manifest, render_readme,
};
/// Re-exports of the request and pipeline types.
pub use request::{DIST_DIR, PackageRequest, validate_name};
pub use reserve::{Completion, Reserver, Stage};
