//! twinpane - filesystem operation engine for a dual-pane file manager
//!
//! This is the library entry point that exposes all modules and the
//! command-line front end.

// Module declarations
pub mod cli;
pub mod commands;
pub mod config;
pub mod disks;
pub mod error;
pub mod files;
pub mod session;
pub mod shell;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{FsError, FsResult};
pub use session::{FileManager, Workspace};
pub use types::*;

/// Run the command-line application
pub fn run() -> std::process::ExitCode {
    cli::run()
}
