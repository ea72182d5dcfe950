use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{extract::State, routing::get, Json, Router};
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::info;

use crate::dataset::Dataset;
use crate::filter::RawFilterInput;
use crate::present::{self, DisplayBundle};

#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
}

pub fn router(dataset: Arc<Dataset>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/options", get(options))
        .route("/api/dashboard", get(default_dashboard).post(dashboard))
        .with_state(AppState { dataset })
}

pub async fn serve(dataset: Arc<Dataset>, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "dashboard listening");
    axum::serve(listener, router(dataset))
        .await
        .context("dashboard server stopped")
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Debug, Serialize)]
struct OptionsResponse {
    destinations: Vec<String>,
    first_call: NaiveDateTime,
    last_call: NaiveDateTime,
    defaults: RawFilterInput,
}

async fn options(State(state): State<AppState>) -> Json<OptionsResponse> {
    let dataset = &state.dataset;
    Json(OptionsResponse {
        destinations: dataset.destinations().to_vec(),
        first_call: dataset.min_timestamp(),
        last_call: dataset.max_timestamp(),
        defaults: RawFilterInput::defaults_for(dataset),
    })
}

async fn default_dashboard(State(state): State<AppState>) -> Json<DisplayBundle> {
    let raw = RawFilterInput::defaults_for(&state.dataset);
    Json(present::dashboard(&raw, &state.dataset))
}

async fn dashboard(
    State(state): State<AppState>,
    Json(raw): Json<RawFilterInput>,
) -> Json<DisplayBundle> {
    Json(present::dashboard(&raw, &state.dataset))
}
