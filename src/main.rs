mod app;
mod cache;
mod commands;
mod config;
mod error;
mod event;
mod logging;
mod pagination;
mod query;
mod remotive;
mod routes;
mod ui;

use clap::Parser;
use color_eyre::Result;
use routes::Route;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "jobdeck")]
#[command(about = "A terminal job board for remote listings, inspired by k9s")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/jobdeck/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Job category to list (e.g. software-dev, devops)
  #[arg(short = 'C', long)]
  category: Option<String>,

  /// Number of jobs to fetch for the list
  #[arg(short, long)]
  limit: Option<u32>,

  /// Route to open at startup: "/" or "/jobs/<id>"
  route: Option<String>,
}

// Single-threaded: input, ticks and fetches share one cooperative loop
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let _log_guard = logging::init()?;

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Command line wins over the config file
  if let Some(category) = args.category {
    config.api.category = category;
  }
  if let Some(limit) = args.limit {
    config.api.limit = limit;
  }

  let start = args.route.as_deref().map(Route::parse).unwrap_or_default();
  info!(
    category = %config.api.category,
    limit = config.api.limit,
    route = %start.path(),
    "Starting jobdeck"
  );

  let mut app = app::App::new(config, start)?;
  app.run().await?;

  Ok(())
}
