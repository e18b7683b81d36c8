use std::{fmt, io, path::PathBuf, result::Result as StdResult};

use liboutput::OutputError;
use thiserror::Error;

/// Custom Result type for reserve operations.
pub type Result<T> = StdResult<T, ReserveError>;

/// Errors that halt the reservation pipeline.
#[derive(Error, Debug)]
pub enum ReserveError {
    /// The package request failed validation before any stage ran.
    #[error("Invalid package request: {0}")]
    InvalidRequest(String),

    /// Writing the package skeleton failed.
    #[error(transparent)]
    Scaffold(#[from] ScaffoldError),

    /// The build backend failed.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Uploading to the registry failed.
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// The dotenv file exists but could not be read.
    #[error("Failed to load {}: {message}", .path.display())]
    EnvFile {
        /// Path of the dotenv file.
        path: PathBuf,
        /// Parser or I/O error description.
        message: String,
    },

    /// Rendering output or prompting failed.
    #[error("Output operation failed: {0}")]
    Output(String),

    /// The operation was cancelled by the user.
    #[error("Aborted by user")]
    UserAborted,
}

impl ReserveError {
    /// Return the recommended process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidRequest(_) => 2,
            Self::Scaffold(_) => 3,
            Self::Build(_) => 4,
            Self::Publish(_) => 5,
            Self::UserAborted => 130,
            Self::EnvFile { .. } | Self::Output(_) => 1,
        }
    }
}

impl From<OutputError> for ReserveError {
    fn from(err: OutputError) -> Self {
        match err {
            OutputError::Cancelled => Self::UserAborted,
            other => Self::Output(other.to_string()),
        }
    }
}

/// Failure while writing the package skeleton.
#[derive(Error, Debug)]
pub enum ScaffoldError {
    /// The base directory exists but is not a directory.
    #[error("Base directory is not a directory: {}", .path.display())]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// A directory or file could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        /// Path that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Failure of the build backend.
#[derive(Error, Debug)]
pub enum BuildError {
    /// The python interpreter could not be started.
    #[error("Failed to run build backend {program}: {source}")]
    Spawn {
        /// Program that was invoked.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The build backend exited unsuccessfully.
    #[error("Build failed ({}):\n{output}", ExitLabel(.code))]
    Failed {
        /// Process exit code, absent when terminated by a signal.
        code: Option<i32>,
        /// Trailing diagnostic output from the build backend.
        output: String,
    },
}

/// Failure while uploading built artifacts.
#[derive(Error, Debug)]
pub enum PublishError {
    /// No upload credential is configured.
    #[error("{var} is not set; export an API token before uploading")]
    MissingToken {
        /// Environment variable expected to hold the token.
        var: &'static str,
    },

    /// Installing the upload client failed.
    #[error("Failed to install twine: {message}")]
    Install {
        /// Human-readable error description.
        message: String,
    },

    /// The build produced no wheel to upload.
    #[error("No wheel found in {}", .dist_dir.display())]
    NoArtifacts {
        /// Directory that was searched.
        dist_dir: PathBuf,
    },

    /// The artifact directory could not be read.
    #[error("Failed to read {}: {source}", .dist_dir.display())]
    ListArtifacts {
        /// Directory that was searched.
        dist_dir: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The upload client could not be started.
    #[error("Failed to run upload client {program}: {source}")]
    Spawn {
        /// Program that was invoked.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The upload client exited unsuccessfully.
    #[error("Upload failed ({}):\n{output}", ExitLabel(.code))]
    Upload {
        /// Process exit code, absent when terminated by a signal.
        code: Option<i32>,
        /// Trailing diagnostic output from the upload client.
        output: String,
    },
}

/// Step of the optional repository stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoStep {
    /// Writing `.gitignore`.
    Ignore,
    /// `git init`.
    Init,
    /// `git add .`.
    Add,
    /// `git commit`.
    Commit,
    /// `gh repo create --push`.
    Create,
}

impl fmt::Display for RepoStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Ignore => "write .gitignore",
            Self::Init => "git init",
            Self::Add => "git add",
            Self::Commit => "git commit",
            Self::Create => "create GitHub repository",
        };
        f.write_str(label)
    }
}

/// Failure of the optional repository stage. Never fatal to the pipeline.
#[derive(Error, Debug)]
#[error("Repository setup failed at {step}: {message}")]
pub struct RepoInitError {
    /// Step that failed.
    pub step: RepoStep,
    /// Human-readable error description.
    pub message: String,
}

/// Display helper for an optional process exit code.
struct ExitLabel<'a>(&'a Option<i32>);

impl fmt::Display for ExitLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self.0 {
            Some(code) => write!(f, "exit code {code}"),
            None => f.write_str("terminated by signal"),
        }
    }
}
