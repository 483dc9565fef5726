//! Cairn CLI Application
//!
//! Command-line interface for the cairn plan store.

mod args;
mod cli;
mod handlers;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use cairn_core::PlannerBuilder;
use clap::Parser;
use handlers::Cli;
use log::info;
use renderer::Renderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        offline,
        user,
        json,
        no_color,
        command,
    } = Args::parse();

    let planner = PlannerBuilder::new()
        .with_database_path(database_file)
        .offline(offline)
        .build()
        .await
        .context("Failed to initialize planner")?;

    info!("Cairn started (offline: {offline})");

    let cli = Cli::new(planner, Renderer::for_terminal(json, no_color), user);
    match command {
        Some(Plan { command }) => cli.handle_plan_command(command).await,
        Some(Item { command }) => cli.handle_item_command(command).await,
        Some(Enhancement { command }) => cli.handle_enhancement_command(command).await,
        Some(History { command }) => cli.handle_history_command(command).await,
        Some(Sync { command }) => cli.handle_sync_command(command).await,
        None => cli.list_plans().await,
    }
}
