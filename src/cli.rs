use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Simple, file-backed personal task manager CLI.
/// Storage defaults to ~/.quicktasks/tasks.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "qt", version, about = "Personal task management CLI")]
pub struct Cli {
    /// Path to the tasks JSON file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
