use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::core::{self, CoreError};
use crate::models::{
    GeneratedAt, League, StatSummary, TeamIdentity, TeamStanding,
};
use crate::picks::{PickDecision, PickRequest, TotalsStrategy};
use crate::providers::{PrimarySource, SecondarySource};
use crate::storage::Storage;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub primary: Arc<dyn PrimarySource>,
    pub secondary: Arc<dyn SecondarySource>,
    pub strategy: Arc<dyn TotalsStrategy>,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/standings/:league", get(get_standings))
        .route("/api/team/record", get(get_team_record))
        .route("/api/player/trend", get(get_player_trend))
        .route("/api/pick/total", post(post_pick_total))
        .with_state(state)
}

// ===== Route Handlers =====

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Fetch both sources, reconcile, persist, and return the league standings.
async fn get_standings(
    State(state): State<AppState>,
    Path(league): Path<String>,
) -> Result<Json<StandingsResponse>, ApiError> {
    let league = parse_league(&league)?;

    let primary = state
        .primary
        .fetch_standings(league)
        .await
        .map_err(ApiError::Upstream)?;
    let secondary = state
        .secondary
        .fetch_standings(league)
        .await
        .map_err(ApiError::Upstream)?;

    let as_of = Utc::now().date_naive();
    let sources = vec![
        state.primary.source_id().to_string(),
        state.secondary.source_id(league).to_string(),
    ];

    let teams = core::reconciler::reconcile(league, as_of, &sources, &primary, &secondary)?;

    state.storage.upsert_standings(&teams)?;
    info!("Reconciled and stored {} {} standings", teams.len(), league);

    Ok(Json(StandingsResponse {
        league,
        as_of: as_of.to_string(),
        teams,
        generated: GeneratedAt::now(),
        sources,
    }))
}

/// Current stored standing for one team.
async fn get_team_record(
    State(state): State<AppState>,
    Query(params): Query<TeamRecordQuery>,
) -> Result<Json<TeamRecordResponse>, ApiError> {
    let league = parse_league(&params.league)?;

    let standing = state
        .storage
        .current_standing(league, &params.team)?
        .ok_or_else(|| ApiError::NotFound(format!("Team '{}' not found", params.team)))?;

    Ok(Json(TeamRecordResponse {
        league,
        team: standing.team.clone(),
        record: RecordWithAsOf {
            wins: standing.record.wins,
            losses: standing.record.losses,
            ties_or_ot: standing.record.ties_or_ot,
            as_of: standing.record_as_of.to_string(),
        },
        streak: standing.streak,
        last_five: standing.last_five,
        notes: standing.verification.notes,
        generated: GeneratedAt::now(),
        sources: standing.sources,
    }))
}

/// Per-game values and a summary for one player statistic.
async fn get_player_trend(
    State(state): State<AppState>,
    Query(params): Query<PlayerTrendQuery>,
) -> Result<Json<PlayerTrendResponse>, ApiError> {
    let league = parse_league(&params.league)?;

    // The trend endpoint is strict about league vocabulary even though
    // extraction itself accepts the cross-league union.
    if !core::extractor::league_vocabulary(league).contains(&params.stat.as_str()) {
        return Err(ApiError::BadRequest(format!(
            "Stat '{}' is not valid for {}",
            params.stat, league
        )));
    }

    let games = if params.games.as_deref() == Some("10") {
        10
    } else {
        5
    };

    let player_id = state
        .storage
        .find_player(league, &params.player, &params.team)?
        .ok_or_else(|| ApiError::NotFound(format!("Player '{}' not found", params.player)))?;

    let logs = state.storage.player_game_logs(player_id, games)?;

    let mut series = Vec::with_capacity(logs.len());
    let mut values = Vec::with_capacity(logs.len());
    for log in &logs {
        let value = core::extractor::extract_stat(log, &params.stat)?;
        series.push(GamePoint {
            game_date: log.date.to_string(),
            opponent: log.opponent.clone(),
            home_away: log.home_away.as_str().to_string(),
            value,
        });
        values.push(value);
    }

    let summary = core::summary::summarize(&values);

    Ok(Json(PlayerTrendResponse {
        league,
        player: PlayerRef {
            name: params.player,
            team: params.team,
        },
        stat: params.stat,
        games,
        series,
        summary,
        generated: GeneratedAt::now(),
        sources: vec!["https://sportsdata.io".to_string()],
    }))
}

/// Over/Under pick from the configured strategy (placeholder by default).
async fn post_pick_total(
    State(state): State<AppState>,
    Json(request): Json<PickRequest>,
) -> Result<Json<PickResponse>, ApiError> {
    if request.away.trim().is_empty() || request.home.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Missing required fields: away and home".to_string(),
        ));
    }

    let decision = state.strategy.pick(&request);

    Ok(Json(PickResponse {
        league: request.league,
        game: GameRef {
            away: request.away,
            home: request.home,
            line: request.line,
            odds: request.odds,
        },
        decision,
        generated: GeneratedAt::now(),
        sources: vec![
            "https://sportsdata.io".to_string(),
            "https://api.the-odds-api.com".to_string(),
        ],
    }))
}

fn parse_league(raw: &str) -> Result<League, ApiError> {
    League::parse(raw)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid league parameter: '{}'", raw)))
}

// ===== Request/Response Types =====

#[derive(Deserialize)]
struct TeamRecordQuery {
    league: String,
    team: String,
}

#[derive(Deserialize)]
struct PlayerTrendQuery {
    league: String,
    player: String,
    team: String,
    stat: String,
    games: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StandingsResponse {
    league: League,
    as_of: String,
    teams: Vec<TeamStanding>,
    #[serde(flatten)]
    generated: GeneratedAt,
    sources: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordWithAsOf {
    wins: u32,
    losses: u32,
    ties_or_ot: Option<u32>,
    as_of: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TeamRecordResponse {
    league: League,
    team: TeamIdentity,
    record: RecordWithAsOf,
    streak: String,
    last_five: String,
    notes: Option<String>,
    #[serde(flatten)]
    generated: GeneratedAt,
    sources: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerRef {
    name: String,
    team: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GamePoint {
    game_date: String,
    opponent: String,
    home_away: String,
    value: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerTrendResponse {
    league: League,
    player: PlayerRef,
    stat: String,
    games: u32,
    series: Vec<GamePoint>,
    summary: StatSummary,
    #[serde(flatten)]
    generated: GeneratedAt,
    sources: Vec<String>,
}

#[derive(Serialize)]
struct GameRef {
    away: String,
    home: String,
    line: f64,
    odds: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PickResponse {
    league: League,
    game: GameRef,
    #[serde(flatten)]
    decision: PickDecision,
    #[serde(flatten)]
    generated: GeneratedAt,
    sources: Vec<String>,
}

// ===== Error Handling =====

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    NotFound(String),
    Upstream(anyhow::Error),
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownStat(_) => ApiError::BadRequest(err.to_string()),
            CoreError::MalformedInput(_) => ApiError::Internal(err.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Upstream(err) => {
                tracing::error!("Upstream provider error: {:#}", err);
                (
                    StatusCode::BAD_GATEWAY,
                    "Upstream data source unavailable".to_string(),
                )
            }
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
