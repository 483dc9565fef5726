use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{
    EnhancementCommands, HistoryCommands, ItemCommands, PlanCommands, SyncCommands,
};

/// Command-line front end for the Cairn plan store
///
/// Cairn keeps versioned plans, lets you review proposed enhancements to
/// them change by change, records every applied change so it can be rolled
/// back, and queues edits made while offline for later replay.
#[derive(Parser)]
#[command(version, about, name = "cairn")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/cairn/cairn.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Queue mutations for later replay instead of treating them as synced
    #[arg(long, global = true)]
    pub offline: bool,

    /// Who is acting; used as the owner of new plans and recorded in history
    #[arg(long, global = true, default_value = "user")]
    pub user: String,

    /// Print machine-readable JSON instead of markdown
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Cairn CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Manage plans
    #[command(alias = "p")]
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Manage items within a plan
    #[command(alias = "i")]
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },
    /// Review proposed enhancements
    #[command(alias = "e")]
    Enhancement {
        #[command(subcommand)]
        command: EnhancementCommands,
    },
    /// Inspect and roll back applied changes
    #[command(alias = "h")]
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Inspect and replay the offline queue
    Sync {
        #[command(subcommand)]
        command: SyncCommands,
    },
}
