//! Statline - sports standings aggregation and verification service
//!
//! Fetches team standings from a primary provider, corroborates them
//! against a per-league secondary source, reconciles the two into
//! normalized standings, and serves the results over HTTP alongside
//! player stat trends.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::time::interval;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use statline_backend::api::{create_router, AppState};
use statline_backend::core::reconciler;
use statline_backend::models::{Config, League};
use statline_backend::picks::CoinFlipStrategy;
use statline_backend::providers::{
    secondary::SecondaryFeed, sportsdataio::SportsDataIo, PrimarySource, SecondarySource,
};
use statline_backend::storage::Storage;

#[derive(Parser, Debug)]
#[command(name = "statline", about = "Sports standings aggregation service")]
struct Args {
    /// Override the listen port
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Override the SQLite database path
    #[arg(long, env = "DATABASE_PATH")]
    database: Option<String>,

    /// Serve embedded mock data instead of hitting live providers
    #[arg(long)]
    mock: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(database) = args.database {
        config.database_path = database;
    }
    if args.mock {
        config.use_mock_data = true;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "statline=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🏟️ Statline starting (mock mode: {})", config.use_mock_data);

    let storage = Arc::new(Storage::open(&config.database_path)?);
    if config.use_mock_data {
        storage.seed_demo_players()?;
    }

    let primary: Arc<dyn PrimarySource> = Arc::new(SportsDataIo::new(
        config.sportsdataio_key.clone(),
        config.use_mock_data,
    ));
    let secondary: Arc<dyn SecondarySource> = Arc::new(SecondaryFeed::new(
        config.use_mock_data,
        config.secondary_nba_feed.clone(),
        config.secondary_nfl_feed.clone(),
    ));

    let state = AppState {
        storage: storage.clone(),
        primary: primary.clone(),
        secondary: secondary.clone(),
        strategy: Arc::new(CoinFlipStrategy::new()),
    };

    // Periodic standings refresh, the cron trigger's stand-in.
    let refresh_secs = config.standings_refresh_secs;
    tokio::spawn(async move {
        refresh_loop(storage, primary, secondary, refresh_secs).await;
    });

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🚀 Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Refresh every league's standings on a fixed cadence. A failed cycle for
/// one league is logged and the loop keeps going.
async fn refresh_loop(
    storage: Arc<Storage>,
    primary: Arc<dyn PrimarySource>,
    secondary: Arc<dyn SecondarySource>,
    refresh_secs: u64,
) {
    let mut ticker = interval(Duration::from_secs(refresh_secs));

    loop {
        ticker.tick().await;

        for league in League::ALL {
            match refresh_league(&storage, primary.as_ref(), secondary.as_ref(), league).await {
                Ok(count) => info!("🔄 Refreshed {} {} standings", count, league),
                Err(err) => error!("Standings refresh failed for {}: {:#}", league, err),
            }
        }
    }
}

async fn refresh_league(
    storage: &Storage,
    primary: &dyn PrimarySource,
    secondary: &dyn SecondarySource,
    league: League,
) -> Result<usize> {
    let primary_teams = primary.fetch_standings(league).await?;
    let secondary_teams = secondary.fetch_standings(league).await?;

    let as_of = Utc::now().date_naive();
    let sources = vec![
        primary.source_id().to_string(),
        secondary.source_id(league).to_string(),
    ];

    let standings =
        reconciler::reconcile(league, as_of, &sources, &primary_teams, &secondary_teams)?;
    storage.upsert_standings(&standings)?;

    Ok(standings.len())
}
