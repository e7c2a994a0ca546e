mod cli;
mod config;
mod datasources;
mod error;
mod logic;
mod models;
mod notify;

use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use datasources::{BikeShareClient, GeocodingClient, StationFeed};
use error::Result;
use logic::station_lookup::{find_station, lookup_by_address};
use logic::AlertScheduler;
use notify::EmailNotifier;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .init();

    // Load configuration before touching the network
    let config = match Config::load(cli.config.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Copy conf.json.example to conf.json or pass --config <path>");
            std::process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_alerts(config).await,
        Commands::Check => check(config).await,
        Commands::Station { address, limit } => station(config, &address, limit).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run_alerts(config: Config) -> Result<()> {
    let feed = BikeShareClient::new(config.feed_url.clone(), config.request_timeout())?;
    let notifier = EmailNotifier::from_config(&config)?;

    let mut scheduler =
        AlertScheduler::new(feed, notifier, config.jobs.clone(), config.poll_interval());

    scheduler
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    tracing::info!(
        state = ?scheduler.state(),
        stations = scheduler.snapshot().len(),
        tracked = scheduler.alert_log().len(),
        sent = scheduler.alert_log().sent_count(),
        "alert loop stopped"
    );

    Ok(())
}

async fn check(config: Config) -> Result<()> {
    // Surfaces address problems before a real alert would
    EmailNotifier::from_config(&config)?;

    let feed = BikeShareClient::new(config.feed_url.clone(), config.request_timeout())?;
    let stations = feed.refresh().await?;
    println!("Feed OK: {} stations", stations.len());

    let mut missing = 0;
    for job in &config.jobs {
        match find_station(&stations, &job.station_id) {
            Some(s) => println!(
                "  {} {:<40} bikes={:<3} docks={:<3} installed={:<5} window={}",
                job.station_id,
                s.name,
                s.nb_bikes,
                s.nb_empty_docks,
                s.field("installed").unwrap_or("?"),
                job.window
            ),
            None => {
                missing += 1;
                println!("  {} NOT FOUND in feed", job.station_id);
            }
        }
    }

    if missing > 0 {
        return Err(error::BikeAlertError::UnknownStation(format!(
            "{} job(s) reference stations absent from the feed",
            missing
        )));
    }

    Ok(())
}

async fn station(config: Config, address: &str, limit: usize) -> Result<()> {
    let feed = BikeShareClient::new(config.feed_url.clone(), config.request_timeout())?;
    let geocoder = GeocodingClient::new(config.geocoding_api_key.clone(), config.request_timeout())?;

    let nearby = lookup_by_address(&feed, &geocoder, address, limit).await?;
    if nearby.is_empty() {
        println!("No stations found near '{}'", address);
    }
    for s in nearby {
        println!("{:<8} {}", s.terminal_name, s.name);
    }

    Ok(())
}
