mod cli;
mod demo;

use clap::Parser;
use cli::{Cli, Commands, ConfigArgs};
use tryguard::config::Config;

fn load_config(args: &ConfigArgs) -> Result<Config, tryguard::config::ConfigError> {
    match &args.config {
        Some(path) => Config::load_from_path(path.clone()),
        None => Config::load(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tryguard::observability::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo(args) => {
            let config = load_config(&args.config)?;
            demo::run(args.scenario, &config).await?
        }
        Commands::ShowConfig(args) => demo::show_config(&load_config(&args)?)?,
    }

    Ok(())
}
