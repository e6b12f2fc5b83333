//! Command-line front end
//!
//! Every subcommand runs against the focused pane of a fresh workspace, so
//! relative paths resolve against `--dir` (or the configured root).

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::error::{FsError, FsResult};
use crate::files::{BatchAction, BatchReport, BatchRunner, DuplicatePolicy, Folder, Item, ItemStatus};
use crate::session::{FileManager, Workspace};
use crate::shell;
use crate::types::SizeUnit;

/// Filesystem operation engine of a dual-pane file manager
#[derive(Parser, Debug)]
#[command(name = "twinpane")]
#[command(about = "Batch file operations gated by shell-command filters", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Folder the pane starts in (overrides the configured root)
    #[arg(long, value_name = "DIR", global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List a folder, folders first
    Ls {
        path: Option<PathBuf>,
        /// Include entries starting with a dot
        #[arg(short, long)]
        all: bool,
    },
    /// Show size, modification time and entry count of an item
    Info {
        path: PathBuf,
        #[arg(long, default_value = "B")]
        unit: SizeUnit,
    },
    /// Create a folder
    Mkdir { path: PathBuf },
    /// Create an empty file
    Touch { path: PathBuf },
    /// Rename an item within its folder
    Rename { path: PathBuf, new_name: String },
    /// Delete items permanently
    Rm {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Action filter, e.g. "test -f $! && echo yes == yes"
        #[arg(long, default_value = "")]
        filter: String,
    },
    /// Move items to the trash
    Trash {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long, default_value = "")]
        filter: String,
    },
    /// Copy items into a folder
    Cp {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long, value_name = "DEST")]
        to: PathBuf,
        #[arg(long, default_value = "")]
        filter: String,
        /// refuse, rename or overwrite
        #[arg(long, default_value = "refuse")]
        on_duplicate: DuplicatePolicy,
    },
    /// Move items into a folder (copy, then remove the source)
    Mv {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long, value_name = "DEST")]
        to: PathBuf,
        #[arg(long, default_value = "")]
        filter: String,
        #[arg(long, default_value = "refuse")]
        on_duplicate: DuplicatePolicy,
    },
    /// List mounted volumes
    Disks {
        #[arg(long, default_value = "GB")]
        unit: SizeUnit,
    },
    /// Run a shell command in the pane folder
    Run {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Print the shell prompt for the pane folder
    Prompt,
}

/// Install the log subscriber. `RUST_LOG` overrides the `info` default.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

fn load_config(cli: &Cli) -> FsResult<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(dir) = &cli.dir {
        config.root = dir.clone();
    }
    Ok(config)
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match execute(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("twinpane: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns false when a batch finished with failed items
fn execute(cli: Cli) -> FsResult<bool> {
    let config = load_config(&cli)?;
    let runner = BatchRunner::new(config.shell.clone());
    let shell_config = config.shell.clone();
    let mut workspace = Workspace::new(config)?;
    let pane = workspace.focused_pane_mut();

    match cli.command {
        Command::Ls { path, all } => {
            if let Some(path) = path {
                pane.enter(path)?;
            }
            if all {
                pane.set_show_hidden(true);
            }
            for entry in pane.list_entries()? {
                println!(
                    "{} {:>12} {:<19} {}",
                    if entry.is_dir { 'd' } else { '-' },
                    entry.size,
                    entry.modified.as_deref().unwrap_or("-"),
                    entry.name
                );
            }
        }
        Command::Info { path, unit } => print_info(&pane.item(path)?, unit)?,
        Command::Mkdir { path } => {
            let (parent, name) = split_target(pane, &path)?;
            let folder = parent.create_folder(&name)?;
            println!("{}", folder.get_path().display());
        }
        Command::Touch { path } => {
            let (parent, name) = split_target(pane, &path)?;
            let file = parent.create_file(&name)?;
            println!("{}", file.get_path().display());
        }
        Command::Rename { path, new_name } => {
            let mut item = pane.item(path)?;
            item.rename(&new_name)?;
            println!("{}", item.get_path().display());
        }
        Command::Rm { paths, filter } => {
            return run_batch(&runner, pane, paths, &filter, BatchAction::Delete);
        }
        Command::Trash { paths, filter } => {
            return run_batch(&runner, pane, paths, &filter, BatchAction::Trash);
        }
        Command::Cp {
            paths,
            to,
            filter,
            on_duplicate,
        } => {
            let action = BatchAction::Copy {
                destination: pane.resolve(to),
                on_duplicate,
            };
            return run_batch(&runner, pane, paths, &filter, action);
        }
        Command::Mv {
            paths,
            to,
            filter,
            on_duplicate,
        } => {
            let action = BatchAction::Move {
                destination: pane.resolve(to),
                on_duplicate,
            };
            return run_batch(&runner, pane, paths, &filter, action);
        }
        Command::Disks { unit } => {
            for disk in pane.get_disks() {
                println!(
                    "{}\t: {} ({:.1}/{:.1} {})",
                    disk.get_name(),
                    disk.get_path().display(),
                    disk.get_free_space(unit),
                    disk.get_capacity(unit),
                    unit.label()
                );
            }
        }
        Command::Run { command } => {
            let output = shell::run_command(&shell_config, &command.join(" "), pane.active().get_path());
            if let Some(stdout) = &output.stdout {
                print!("{}", stdout);
            }
            eprint!("{}", output.stderr);
            return Ok(output.stdout.is_some());
        }
        Command::Prompt => println!("{}", pane.get_prompt()),
    }
    Ok(true)
}

/// Existing parent folder and final name of a path to be created
fn split_target(pane: &FileManager, path: &Path) -> FsResult<(Folder, String)> {
    let target = pane.resolve(path);
    match (target.parent(), target.file_name()) {
        (Some(parent), Some(name)) => Ok((Folder::at(parent)?, name.to_string_lossy().to_string())),
        _ => Err(FsError::InvalidName {
            name: target.to_string_lossy().to_string(),
            reason: "path has no final component".to_string(),
        }),
    }
}

fn print_info(item: &Item, unit: SizeUnit) -> FsResult<()> {
    println!("name:     {}", item.get_name());
    println!("path:     {}", item.get_path().display());
    println!("kind:     {}", if item.is_folder() { "folder" } else { "file" });
    println!("size:     {} {}", item.get_size(unit)?, unit.label());
    println!(
        "modified: {}",
        item.format_modified().unwrap_or_else(|| "-".to_string())
    );
    if let Some(folder) = item.as_folder() {
        println!("items:    {}", folder.get_item_count()?);
    }
    Ok(())
}

fn run_batch(
    runner: &BatchRunner,
    pane: &FileManager,
    paths: Vec<PathBuf>,
    filter: &str,
    action: BatchAction,
) -> FsResult<bool> {
    let paths = paths.into_iter().map(|p| pane.resolve(p)).collect();
    let report = runner.run_paths(paths, filter, action)?;
    print_report(&report);
    Ok(report.is_complete_success())
}

fn print_report(report: &BatchReport) {
    for outcome in &report.outcomes {
        match &outcome.status {
            ItemStatus::Done { new_path: Some(p) } => {
                println!("done      {} -> {}", outcome.path.display(), p.display())
            }
            ItemStatus::Done { new_path: None } => println!("done      {}", outcome.path.display()),
            ItemStatus::Skipped => println!("skipped   {}", outcome.path.display()),
            ItemStatus::Cancelled => println!("cancelled {}", outcome.path.display()),
            ItemStatus::Failed { error } => println!("failed    {}: {}", outcome.path.display(), error),
        }
    }
    println!(
        "{}: {} done, {} failed, {} skipped",
        report.action, report.success, report.failed, report.skipped
    );
}
