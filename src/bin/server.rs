use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use beam_match::allocator::Allocator;
use beam_match::config::MatchConfig;
use beam_match::matcher::Matcher;
use beam_match::report::{MatchRow, PlanRow};
use beam_match::{Demand, EfficiencySummary, Inventory, ProfileCatalog, SupplyItem};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize)]
struct MatchRequest {
    /// Snapshot of the stock to match against.
    supply: Vec<SupplyItem>,
    demands: Vec<Demand>,
    #[serde(default)]
    config: MatchConfig,
}

#[derive(Serialize)]
struct AllocateResponse {
    results: Vec<MatchRow>,
    plans: Vec<PlanRow>,
    summary: EfficiencySummary,
}

#[derive(Serialize)]
struct MatchResponse {
    results: Vec<MatchRow>,
    summary: EfficiencySummary,
}

fn bad_request(e: beam_match::Error) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}

async fn allocate(
    Json(req): Json<MatchRequest>,
) -> Result<Json<AllocateResponse>, (StatusCode, String)> {
    tracing::info!(
        supply = req.supply.len(),
        demands = req.demands.len(),
        "POST /allocate"
    );

    let inventory = Inventory::from_items(req.supply);
    let allocation = Allocator::new(&inventory, &req.config)
        .allocate(&req.demands)
        .map_err(bad_request)?;

    let catalog = ProfileCatalog::standard();
    Ok(Json(AllocateResponse {
        results: allocation
            .results
            .iter()
            .map(|r| MatchRow::from_result(r, &catalog))
            .collect(),
        plans: allocation.plans.iter().map(PlanRow::from_plan).collect(),
        summary: allocation.summary().rounded(),
    }))
}

async fn best_match(
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, (StatusCode, String)> {
    tracing::info!(
        supply = req.supply.len(),
        demands = req.demands.len(),
        "POST /match"
    );

    let inventory = Inventory::from_items(req.supply);
    let matcher = Matcher::new(&inventory, &req.config);
    let results = req
        .demands
        .iter()
        .enumerate()
        .map(|(i, d)| matcher.best_match_line(d, i))
        .collect::<Result<Vec<_>, _>>()
        .map_err(bad_request)?;

    let catalog = ProfileCatalog::standard();
    Ok(Json(MatchResponse {
        summary: EfficiencySummary::from_results(&results).rounded(),
        results: results
            .iter()
            .map(|r| MatchRow::from_result(r, &catalog))
            .collect(),
    }))
}

fn app() -> Router {
    Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/allocate", post(allocate))
        .route("/match", post(best_match))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

#[tokio::main]
async fn main() {
    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app()).await.unwrap();
}
