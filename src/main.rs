mod app;
mod event;
mod ui;

use anyhow::Result;
use clap::Parser;
use std::time::Duration;

use app::{App, LaunchOptions};
use cjc::config::Config;
use cjc::telemetry;
use event::EventHandler;

/// Download CodeJudger exercises: descriptions, sample fixtures and starter files.
#[derive(Debug, Parser)]
#[command(name = "cjc", version)]
struct Cli {
    /// Login account (email)
    #[arg(long)]
    account: Option<String>,

    /// Login password
    #[arg(long)]
    password: Option<String>,

    /// Output path
    #[arg(long)]
    output_dir: Option<String>,
}

impl Cli {
    fn into_options(self) -> LaunchOptions {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        LaunchOptions {
            account: non_empty(self.account),
            password: non_empty(self.password),
            output_dir: non_empty(self.output_dir),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let options = Cli::parse().into_options();

    let config = Config::load()?;
    telemetry::init_tracing(&Config::log_path()?)?;
    tracing::info!(base_url = %config.base_url, "starting");

    let mut terminal = ratatui::init();
    let mut events = EventHandler::new(Duration::from_millis(100));
    let mut app = App::new(config, options)?;

    let result = app.run(&mut terminal, &mut events).await;

    ratatui::restore();

    if let Some(msg) = &app.exit_message {
        println!("{msg}");
    }
    // Print the output directory so a shell wrapper can cd into it
    if let Some(dir) = &app.last_output_dir {
        println!("{}", dir.display());
    }

    result
}
