use std::path::Path;

use tracing::info;

use crate::{
    config::Config,
    error::BuildError,
    scaffold::MANIFEST_FILE,
    tool::{self, ToolFailure},
};

/// Build a source distribution and a wheel into `<root>/dist`.
///
/// The exit status of the build backend is always checked.
pub fn build_distributions(config: &Config, root: &Path) -> Result<(), BuildError> {
    let mut command = tool::command(&config.tools.python, root);
    command.args([MANIFEST_FILE, "sdist", "bdist_wheel"]);

    tool::run(&mut command).map_err(|failure| match failure {
        ToolFailure::Spawn { program, source } => BuildError::Spawn { program, source },
        ToolFailure::Exit { code, output } => BuildError::Failed { code, output },
    })?;

    info!(root = %root.display(), "build finished");
    Ok(())
}
