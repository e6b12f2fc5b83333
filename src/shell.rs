//! External command execution
//!
//! One primitive runs a command string through the configured shell and
//! captures both streams. The action filter and the command passthrough both
//! go through it.

use log::{debug, warn};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::config::ShellConfig;
use crate::error::{FsError, FsResult};
use crate::types::CommandOutput;

/// Stderr text reported when the shell process could not be started at all
pub const SUBPROCESS_ERROR: &str = "ERROR::TWINPANE: Could not run subprocess";

/// Run `command` through the shell in `working_dir`, waiting for it to exit.
///
/// Both streams are read to the end. Exit status is not inspected: a command
/// that runs and fails is still a successful execution here.
pub fn execute(shell: &ShellConfig, command: &str, working_dir: &Path) -> FsResult<CommandOutput> {
    debug!("execute: command={:?}, cwd={:?}", command, working_dir);

    let output = Command::new(&shell.program)
        .arg(&shell.arg)
        .arg(command)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            warn!("Failed to spawn {:?} for {:?}: {}", shell.program, command, e);
            FsError::Subprocess {
                command: command.to_string(),
                reason: e.to_string(),
            }
        })?;

    debug!("Command {:?} exited with {}", command, output.status);

    Ok(CommandOutput {
        stdout: Some(String::from_utf8_lossy(&output.stdout).to_string()),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Run a command and return its stdout with trailing whitespace removed
pub fn capture_trimmed(shell: &ShellConfig, command: &str, working_dir: &Path) -> FsResult<String> {
    let output = execute(shell, command, working_dir)?;
    Ok(output.stdout.unwrap_or_default().trim_end().to_string())
}

/// Passthrough variant: never fails, reports spawn errors as
/// `(None, SUBPROCESS_ERROR)`.
pub fn run_command(shell: &ShellConfig, command: &str, working_dir: &Path) -> CommandOutput {
    execute(shell, command, working_dir).unwrap_or_else(|_| CommandOutput {
        stdout: None,
        stderr: SUBPROCESS_ERROR.to_string(),
    })
}

/// Quote a value so the shell passes it through as a single word
pub fn quote_arg(value: &str) -> String {
    if cfg!(target_os = "windows") {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}

/// Open a path with the platform's default application
pub fn launch_default_app(path: &Path) -> FsResult<()> {
    let spawned = if cfg!(target_os = "macos") {
        Command::new("open").arg(path).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", ""]).arg(path).spawn()
    } else {
        Command::new("xdg-open").arg(path).spawn()
    };

    spawned.map(|_| ()).map_err(|e| {
        warn!("Failed to open {:?}: {}", path, e);
        FsError::Subprocess {
            command: format!("open {}", path.display()),
            reason: e.to_string(),
        }
    })
}
