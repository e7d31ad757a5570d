//! Health and rule table handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use coach_core::{Language, TriggerRule};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub categories: usize,
    pub triggers: usize,
}

/// GET /api/health - Liveness check with rule table size
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        categories: state.rules.len(),
        triggers: state.rules.trigger_count(),
    })
}

/// GET /api/rules - List trigger rules in match order
pub async fn list_rules(State(state): State<Arc<AppState>>) -> Json<Vec<TriggerRule>> {
    Json(state.rules.rules().to_vec())
}

#[derive(Serialize)]
pub struct LanguagesResponse {
    pub default: String,
    pub languages: Vec<Language>,
}

/// GET /api/languages - List selectable response languages
pub async fn list_languages(State(state): State<Arc<AppState>>) -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        default: state.rules.default_language().code.clone(),
        languages: state.rules.languages().to_vec(),
    })
}
