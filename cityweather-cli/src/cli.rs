use std::sync::Arc;

use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use cityweather_core::{
    Config, FetchOutcome, FileStore, FlowController, ForecastRequest, KeyValueStore,
    provider_from_config,
};
use inquire::{Password, PasswordDisplayMode, Text};

use crate::{app, screens::home};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "City weather lookup")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `app`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com key and defaults.
    Configure,

    /// Print the forecast for a city, or for the last selected city.
    Show {
        /// "<name>,<country>" or anything the API resolves; defaults to the last selected city.
        city: Option<String>,

        /// Number of forecast days.
        #[arg(long)]
        days: Option<u8>,
    },

    /// List cities matching a name.
    Search {
        query: String,

        /// Select the N-th match (1-based) and remember it as the last city.
        #[arg(long)]
        pick: Option<usize>,
    },

    /// Interactive home screen.
    App,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::App) {
            Command::Configure => configure(),
            Command::Show { city, days } => show(city, days).await,
            Command::Search { query, pick } => search(&query, pick).await,
            Command::App => app::run(controller(&Config::load()?, None)?).await,
        }
    }
}

fn controller(config: &Config, days: Option<u8>) -> anyhow::Result<FlowController> {
    let provider = provider_from_config(config)?;
    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::open_default()?);

    let mut settings = config.flow_settings();
    if let Some(days) = days {
        settings.forecast_days = days;
    }

    Ok(FlowController::new(provider, storage, settings))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if config.is_configured() {
        println!("An API key is already stored; entering a new one replaces it.");
    }

    let api_key = Password::new("WeatherAPI.com API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    config.set_api_key(api_key.trim().to_string());

    let current_city = config.flow_settings().default_city;
    let default_city = Text::new("City to show before you pick one:")
        .with_default(&current_city)
        .prompt()
        .context("Failed to read default city")?;
    config.default_city = Some(default_city);

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    println!("Your last selected city is kept in {}", FileStore::open_default()?.path().display());

    Ok(())
}

async fn show(city: Option<String>, days: Option<u8>) -> anyhow::Result<()> {
    let config = Config::load()?;

    let Some(city) = city else {
        let controller = controller(&config, days)?;
        return match controller.load().await {
            FetchOutcome::Applied => print_weather(&controller),
            FetchOutcome::Failed(e) => Err(e.into()),
            FetchOutcome::Superseded => Err(anyhow!("Forecast request was superseded")),
        };
    };

    let provider = provider_from_config(&config)?;
    let days = days.unwrap_or(config.flow_settings().forecast_days);
    let request = ForecastRequest::new(city, days)?;
    let snapshot = provider.fetch_forecast(&request).await?;
    print!("{}", home::render_weather(&snapshot));

    Ok(())
}

async fn search(query: &str, pick: Option<usize>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let min_chars = config.flow_settings().min_query_chars;
    if query.trim().chars().count() < min_chars {
        bail!("Search needs at least {min_chars} characters");
    }

    let provider = provider_from_config(&config)?;
    let found = provider.search_locations(query.trim()).await?;
    if found.is_empty() {
        println!("No locations match '{query}'.");
        return Ok(());
    }
    print!("{}", home::render_candidates(&found));

    let Some(n) = pick else {
        return Ok(());
    };
    let candidate = n
        .checked_sub(1)
        .and_then(|i| found.get(i))
        .ok_or_else(|| anyhow!("--pick {n} is out of range (1..={})", found.len()))?;

    let controller = controller(&config, None)?;
    match controller.select_location(candidate).await {
        FetchOutcome::Applied => {
            println!();
            print_weather(&controller)?;
            println!("\nSaved {} as your city.", candidate.city_query());
            Ok(())
        }
        FetchOutcome::Failed(e) => Err(e.into()),
        FetchOutcome::Superseded => Err(anyhow!("Forecast request was superseded")),
    }
}

fn print_weather(controller: &FlowController) -> anyhow::Result<()> {
    let weather = controller
        .view()
        .weather
        .ok_or_else(|| anyhow!("No forecast available"))?;
    print!("{}", home::render_weather(&weather));
    Ok(())
}
