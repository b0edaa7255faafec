use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tryguard")]
#[command(about = "Guarded execution demos", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one of the usage scenarios against a failing operation
    Demo(DemoArgs),
    /// Print the loaded configuration as JSON
    ShowConfig(ConfigArgs),
}

#[derive(clap::Args, Debug)]
pub struct DemoArgs {
    /// Scenario to run
    #[arg(value_enum)]
    pub scenario: Scenario,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(clap::Args, Debug)]
pub struct ConfigArgs {
    /// Configuration file (defaults to $TRYGUARD_CONFIG or config/tryguard.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scenario {
    /// Pre-configured options only
    Simple,
    /// Every option set at construction
    AllOptions,
    /// Per-call overrides on top of the base options
    OverrideOptions,
    /// Default reporting replaced by a custom handler
    OverrideHandler,
    /// Async operation through the async entry point
    Async,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_demo() {
        let cli = Cli::parse_from(["tryguard", "demo", "override-options", "--config", "x.toml"]);
        match cli.command {
            Commands::Demo(args) => {
                assert_eq!(args.scenario, Scenario::OverrideOptions);
                assert_eq!(args.config.config, Some(PathBuf::from("x.toml")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
