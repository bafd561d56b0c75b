use anyhow::Context;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use climate_clock_core::{Config, provider_from_config, render};
use inquire::CustomType;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "climate-clock", version, about = "Climate Clock in your terminal")]
pub struct Cli {
    /// Defaults to `show` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the clock and print the report.
    Show(ShowArgs),

    /// Edit the saved request timeout and headline count.
    Configure,
}

#[derive(Debug, Default, Args)]
pub struct ShowArgs {
    /// Show at most this many headlines.
    #[arg(long)]
    pub headlines: Option<usize>,

    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl ShowArgs {
    /// Flags win over whatever is in the config file.
    fn apply(&self, mut config: Config) -> Config {
        if let Some(limit) = self.headlines {
            config.headline_limit = limit;
        }
        if let Some(secs) = self.timeout {
            config.timeout_secs = secs;
        }
        config
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command.unwrap_or(Command::Show(ShowArgs::default())) {
            Command::Show(args) => show(args.apply(config)).await,
            Command::Configure => configure(config),
        }
    }
}

async fn show(config: Config) -> anyhow::Result<()> {
    tracing::debug!(?config, "showing climate clock");

    let provider = provider_from_config(&config)?;
    let snapshot = provider.retrieve().await.context("Failed to retrieve clock data")?;

    let report = render(&snapshot, &Local::now(), config.headline_limit)
        .context("Clock data is missing something the report needs")?;

    print!("{report}");
    Ok(())
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    config.timeout_secs = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(config.timeout_secs)
        .with_error_message("Please enter a whole number of seconds")
        .prompt()?;

    config.headline_limit = CustomType::<usize>::new("Headlines to show:")
        .with_default(config.headline_limit)
        .with_error_message("Please enter a whole number")
        .prompt()?;

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}
