use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Select, Text};
use lookup_core::{
    Config, HttpTransport, LookupOptions, LookupOutcome, PathEncoding, Sequencing,
    WeatherLookupHandler,
};
use tokio::task::{self, JoinHandle};
use tracing::{debug, info};

use crate::page::Page;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-lookup", version, about = "Look up current weather by city")]
pub struct Cli {
    /// Override the configured backend origin, e.g. http://localhost:3000.
    #[arg(long, global = true, env = "WEATHER_LOOKUP_BASE_URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up one city and print the result.
    Lookup {
        /// City name, sent as typed. An empty string is allowed.
        city: String,
    },

    /// Prompt for cities until Esc or Ctrl-C.
    Interactive,

    /// Edit and save the configuration.
    Configure,

    /// Print the config file path and effective settings.
    Config,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Lookup { city } => {
                let config = effective_config(self.base_url)?;
                let handler = handler_from_config(&config)?;
                let page = Page::new(city);
                handler.activate(&page.handles).await;
            }
            Command::Interactive => {
                let config = effective_config(self.base_url)?;
                let handler = Arc::new(handler_from_config(&config)?);
                interactive(handler).await?;
            }
            Command::Configure => configure()?,
            Command::Config => {
                let path = Config::config_file_path()?;
                let config = effective_config(self.base_url)?;
                let toml = toml::to_string_pretty(&config)
                    .context("Failed to serialize configuration to TOML")?;
                println!("# {}", path.display());
                print!("{toml}");
            }
        }

        Ok(())
    }
}

fn effective_config(base_url: Option<String>) -> anyhow::Result<Config> {
    with_overrides(Config::load()?, base_url)
}

/// Apply command-line overrides, then validate the result once.
fn with_overrides(mut config: Config, base_url: Option<String>) -> anyhow::Result<Config> {
    if let Some(base_url) = base_url {
        debug!(base_url = %base_url, "Overriding configured base URL");
        config.base_url = base_url;
    }
    config.validate()?;
    Ok(config)
}

fn handler_from_config(config: &Config) -> anyhow::Result<WeatherLookupHandler> {
    let transport = HttpTransport::from_config(config).context("Failed to set up HTTP client")?;
    info!(base_url = %transport.base_url(), "Using weather backend");
    Ok(WeatherLookupHandler::new(Arc::new(transport), LookupOptions::from(config)))
}

/// Each submitted line is typed into the field, then the button is pressed.
///
/// The prompt returns right away; earlier lookups keep running and print
/// whenever they settle.
async fn interactive(handler: Arc<WeatherLookupHandler>) -> anyhow::Result<()> {
    let page = Page::new("");
    let mut pending: Vec<JoinHandle<LookupOutcome>> = Vec::new();

    loop {
        let prompt = task::spawn_blocking(|| {
            Text::new("City:").with_help_message("Esc to quit").prompt()
        });
        let city = match prompt.await.context("Prompt task failed")? {
            Ok(city) => city,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read city"),
        };

        pending.retain(|lookup| !lookup.is_finished());
        pending.push(press(&handler, &page, city));
    }

    debug!(in_flight = pending.len(), "Waiting for pending lookups");
    for lookup in pending {
        lookup.await.context("Lookup task failed")?;
    }

    Ok(())
}

fn press(
    handler: &Arc<WeatherLookupHandler>,
    page: &Page,
    city: String,
) -> JoinHandle<LookupOutcome> {
    page.field.set(city);
    handler.spawn_activation(&page.handles)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    config.base_url = Text::new("Backend base URL:")
        .with_default(&config.base_url)
        .with_help_message("Origin serving /api/weather/<city>")
        .prompt()
        .context("Failed to read base URL")?;

    config.path_encoding = Select::new("City path encoding:", PathEncoding::all().to_vec())
        .with_starting_cursor(position(PathEncoding::all(), &config.path_encoding))
        .with_help_message("percent: New%20York, raw: New York")
        .prompt()
        .context("Failed to read path encoding")?;

    config.sequencing = Select::new("Overlapping lookups:", Sequencing::all().to_vec())
        .with_starting_cursor(position(Sequencing::all(), &config.sequencing))
        .with_help_message(
            "completion-order: last to finish is shown, latest-wins: last started is shown",
        )
        .prompt()
        .context("Failed to read sequencing")?;

    let current_timeout = config.timeout_secs.map(|t| t.to_string()).unwrap_or_default();
    let timeout = Text::new("Request timeout in seconds:")
        .with_default(&current_timeout)
        .with_help_message("Leave empty to wait indefinitely")
        .prompt()
        .context("Failed to read timeout")?;
    config.timeout_secs = parse_timeout(&timeout)?;

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

fn position<T: PartialEq>(all: &[T], current: &T) -> usize {
    all.iter().position(|item| item == current).unwrap_or(0)
}

fn parse_timeout(input: &str) -> anyhow::Result<Option<u64>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    input
        .parse::<u64>()
        .map(Some)
        .map_err(|_| anyhow!("Invalid timeout '{input}': expected a whole number of seconds"))
}
