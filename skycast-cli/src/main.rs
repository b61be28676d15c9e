//! Skycast CLI
//!
//! Runs the weather dashboard server and answers one-off weather lookups
//! from the terminal.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skycast_api::{ApiConfig, ApiServer};
use skycast_core::traits::WeatherProvider;
use skycast_core::types::{Units, WeatherReport};
use skycast_weather::{MockWeatherProvider, OpenWeatherClient, WeatherClientConfig};

/// Skycast - cached weather dashboard backend
#[derive(Parser)]
#[command(name = "skycast")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
        /// Directory holding the frontend
        #[arg(long, env = "STATIC_DIR")]
        static_dir: Option<PathBuf>,
        /// Serve mock data instead of calling OpenWeatherMap
        #[arg(long)]
        test_mode: bool,
    },

    /// Look up current weather for a city
    Weather {
        /// City name
        city: String,
        /// metric, imperial or kelvin
        #[arg(short, long, default_value = "metric")]
        units: Units,
        /// Use mock data
        #[arg(long)]
        mock: bool,
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// List the cities known to test mode
    Cities,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "skycast=debug,info"
    } else {
        "skycast=info,warn"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());
    if cli.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    match cli.command {
        Commands::Serve {
            port,
            bind,
            static_dir,
            test_mode,
        } => cmd_serve(port, &bind, static_dir, test_mode).await,
        Commands::Weather {
            city,
            units,
            mock,
            json,
        } => cmd_weather(&city, units, mock, json).await,
        Commands::Cities => cmd_cities(),
    }
}

/// Run API server
async fn cmd_serve(port: u16, bind: &str, static_dir: Option<PathBuf>, test_mode: bool) -> Result<()> {
    let mut config = ApiConfig::from_env().context("Failed to load configuration")?;
    if let Some(dir) = static_dir {
        config.static_dir = dir;
    }
    config.test_mode |= test_mode;
    debug!(static_dir = ?config.static_dir, "Resolved static directory");

    let mode = if config.test_mode {
        "test mode (mock data)".yellow()
    } else {
        "live (OpenWeatherMap)".green()
    };

    let server = ApiServer::new(config).context("Invalid server configuration")?;
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .context("Invalid bind address")?;

    println!("{}", "🌤  Starting Skycast API server...".cyan().bold());
    println!("   {} http://{}", "Listening on:".green(), addr);
    println!("   {} http://{}/api/health", "Health check:".dimmed(), addr);
    println!("   {} {}", "Mode:".dimmed(), mode);
    println!("\n   Press Ctrl+C to stop.\n");

    server.run(addr).await?;

    Ok(())
}

/// Fetch and print current weather
async fn cmd_weather(city: &str, units: Units, mock: bool, json: bool) -> Result<()> {
    let provider: Arc<dyn WeatherProvider> = if mock {
        Arc::new(MockWeatherProvider::new())
    } else {
        let config = ApiConfig::from_env().context("Failed to load configuration")?;
        let api_key = config
            .api_key
            .context("OPENWEATHERMAP_API_KEY is not set (use --mock for offline data)")?;
        let client_config = WeatherClientConfig::new(api_key)
            .with_base_url(config.base_url)
            .with_timeout(config.request_timeout_seconds);
        Arc::new(OpenWeatherClient::with_config(client_config)?)
    };

    let report = provider
        .current(city, units)
        .await
        .with_context(|| format!("Failed to fetch weather for '{}'", city))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &WeatherReport) {
    let current = &report.current;
    let labels = &report.units;

    println!("\n{} {}", "📍".cyan(), report.city.bold());
    println!(
        "   {} {}{}",
        "Temperature:".dimmed(),
        current.temperature,
        labels.temperature
    );
    if let Some(feels_like) = current.feels_like {
        println!("   {} {}{}", "Feels like:".dimmed(), feels_like, labels.temperature);
    }
    println!("   {} {}", "Conditions:".dimmed(), current.description);
    println!("   {} {}%", "Humidity:".dimmed(), current.humidity);
    println!(
        "   {} {} {}",
        "Wind:".dimmed(),
        current.wind_speed,
        labels.wind_speed
    );
    if let Some(pressure) = current.pressure {
        println!("   {} {} {}", "Pressure:".dimmed(), pressure, labels.pressure);
    }
    if let Some(sun) = &report.sun {
        println!(
            "   {} {} / {}",
            "Sun:".dimmed(),
            sun.sunrise.format("%H:%M UTC"),
            sun.sunset.format("%H:%M UTC")
        );
    }

    let source = if report.is_mock_data {
        format!("{} (mock)", report.source).yellow()
    } else {
        report.source.normal()
    };
    println!("\n   {} {}", "Source:".dimmed(), source);
}

/// List mock cities
fn cmd_cities() -> Result<()> {
    let cities = MockWeatherProvider::new()
        .available_cities()
        .context("Mock provider has no city table")?;

    println!("{}", "🏙  Test mode cities:".cyan().bold());
    for city in cities {
        println!("   • {}", city);
    }

    Ok(())
}
