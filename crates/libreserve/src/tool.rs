use std::{
    io,
    path::Path,
    process::{Command, Output},
};

use tracing::debug;

/// Number of trailing output lines kept when a tool fails.
const TAIL_LINES: usize = 20;

/// Why an external tool invocation did not succeed.
#[derive(Debug)]
pub(crate) enum ToolFailure {
    /// The program could not be started.
    Spawn {
        /// Program that was invoked.
        program: String,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The program ran and exited unsuccessfully.
    Exit {
        /// Process exit code, absent when terminated by a signal.
        code: Option<i32>,
        /// Trailing diagnostic output.
        output: String,
    },
}

impl ToolFailure {
    /// One-line description suitable for warnings.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Spawn { program, source } if source.kind() == io::ErrorKind::NotFound => {
                format!("{program} not found")
            }
            Self::Spawn { program, source } => format!("failed to run {program}: {source}"),
            Self::Exit { code, output } => {
                let status = code.map_or_else(
                    || "terminated by signal".to_string(),
                    |code| format!("exited with code {code}"),
                );
                if output.is_empty() {
                    status
                } else {
                    format!("{status}: {output}")
                }
            }
        }
    }
}

/// Build a command for `program` running in `dir`.
pub(crate) fn command(program: &Path, dir: &Path) -> Command {
    let mut command = Command::new(program);
    command.current_dir(dir);
    command
}

/// Run `command` to completion, capturing its output. Non-zero exits are
/// returned as [`ToolFailure::Exit`] with the tail of stderr (or stdout when
/// stderr is empty).
pub(crate) fn run(command: &mut Command) -> Result<Output, ToolFailure> {
    let program = command.get_program().to_string_lossy().into_owned();
    // Only the argument vector is logged; environment overrides may hold secrets.
    debug!(
        program = %program,
        args = ?command.get_args().collect::<Vec<_>>(),
        dir = ?command.get_current_dir(),
        "running tool"
    );

    let output = command
        .output()
        .map_err(|source| ToolFailure::Spawn {
            program: program.clone(),
            source,
        })?;

    if !output.status.success() {
        debug!(program = %program, status = %output.status, "tool failed");
        return Err(ToolFailure::Exit {
            code: output.status.code(),
            output: failure_tail(&output),
        });
    }

    Ok(output)
}

/// Last few lines of the most useful output stream.
fn failure_tail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let text = if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout)
    } else {
        stderr
    };
    let lines: Vec<&str> = text.trim().lines().collect();
    let start = lines.len().saturating_sub(TAIL_LINES);
    lines[start..].join("\n")
}
