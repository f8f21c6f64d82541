//! Waypoint CLI Application
//!
//! Command-line driver for agent plans stored by `waypoint-core`.

mod args;
mod cli;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands, ListPlansArgs};
use clap::Parser;
use cli::Cli;
use log::info;
use renderer::TerminalRenderer;
use waypoint_core::PlanRegistryBuilder;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        failure_policy,
        command,
    } = Args::parse();

    let registry = PlanRegistryBuilder::new()
        .with_database_path(database_file)
        .with_failure_policy(failure_policy.into())
        .build()
        .await
        .context("Failed to initialize plan registry")?;

    let renderer = TerminalRenderer::new(!no_color);
    let cli = Cli::new(registry, renderer);

    info!("Waypoint started");

    match command {
        Some(Plan { command }) => cli.handle_plan_command(command).await,
        Some(Task { command }) => cli.handle_task_command(command).await,
        None => cli.list_plans(ListPlansArgs { agent: None }).await,
    }
}
