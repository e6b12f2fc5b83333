//! System commands: volumes, shell passthrough and prompt

use std::path::Path;

use crate::config::ShellConfig;
use crate::disks::list_disks;
use crate::session::FileManager;
use crate::shell;
use crate::types::{CommandOutput, DiskInfo};

pub fn get_disks() -> Vec<DiskInfo> {
    list_disks().iter().map(|d| d.info()).collect()
}

/// Run `command` in `working_dir`. A process that cannot start yields
/// `stdout: None` and the subprocess sentinel as stderr.
pub fn run_command(shell_config: &ShellConfig, command: String, working_dir: String) -> CommandOutput {
    shell::run_command(shell_config, &command, Path::new(&working_dir))
}

/// Prompt for a pane browsing `path`
pub fn get_prompt(path: String) -> Result<String, String> {
    FileManager::new(&path)
        .map(|fm| fm.get_prompt())
        .map_err(|e| e.to_string())
}
