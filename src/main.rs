use anyhow::Result;
use clap::Parser;
use log::info;

use praxis_dashboard::cli::commands::{TuiCommands, config_command, courses_command, tui_command};
use praxis_dashboard::cli::{Cli, Commands};
use praxis_dashboard::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Log to a file so the terminal UI is left alone (truncate on each run)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("praxis.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let cli = Cli::parse();
    info!("Starting praxis");

    let mut config = Config::load()?;
    if let Some(url) = cli.api_base_url {
        config.api_base_url = url;
    }
    if let Some(url) = cli.template_base_url {
        config.template_base_url = url;
    }

    match cli.command {
        Some(Commands::Tui(args)) => tui_command(args, &config).await,
        None => tui_command(TuiCommands::default(), &config).await,
        Some(Commands::Courses) => courses_command(&config).await,
        Some(Commands::Config(args)) => config_command(args, &config),
    }
}
