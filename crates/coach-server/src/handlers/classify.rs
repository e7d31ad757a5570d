//! Classification and card download handlers

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Multipart, Query, State},
    http::{header, Response, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{AppError, AppState, MAX_UPLOAD_SIZE};
use coach_core::export::export_cards;
use coach_core::{CoachCard, CoachSession, CsvStyle, ExportFormat, MatchPolicy, DOWNLOAD_FILE_NAME};

/// Query parameters shared by the classify and export endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ClassifyQuery {
    /// Response language code (default language when absent or unknown)
    pub language: Option<String>,
    /// Only return cards of this category
    pub category: Option<String>,
    /// "first_match" (default) or "every_category"
    pub policy: Option<String>,
    /// CSV column holding the customer's message (default: content)
    pub content_column: Option<String>,
}

impl ClassifyQuery {
    fn session_options(&self) -> SessionOptions<'_> {
        SessionOptions {
            language: self.language.as_deref(),
            category: self.category.as_deref(),
            policy: self.policy.as_deref(),
            content_column: self.content_column.as_deref(),
        }
    }
}

/// Classification result
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub language: String,
    pub language_label: String,
    pub policy: MatchPolicy,
    pub rows: usize,
    /// Categories present in the result, in first-seen order
    pub categories: Vec<String>,
    pub cards: Vec<CoachCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<String>,
}

/// Request options shared by every classification endpoint
#[derive(Debug, Default)]
struct SessionOptions<'a> {
    language: Option<&'a str>,
    category: Option<&'a str>,
    policy: Option<&'a str>,
    content_column: Option<&'a str>,
}

/// Load a transcript into a fresh session using the request's options
fn load_session(
    state: &AppState,
    opts: SessionOptions<'_>,
    data: &[u8],
) -> Result<(CoachSession, Option<String>), AppError> {
    let SessionOptions {
        language,
        category,
        policy,
        content_column,
    } = opts;

    let policy = match policy.filter(|p| !p.is_empty()) {
        Some(p) => p
            .parse::<MatchPolicy>()
            .map_err(|e: String| AppError::bad_request(&e))?,
        None => MatchPolicy::default(),
    };
    let language = match language.filter(|l| !l.is_empty()) {
        Some(code) => state.rules.language(code).code.clone(),
        None => state.rules.default_language().code.clone(),
    };

    let mut session = CoachSession::new(language).with_policy(policy);
    if let Some(column) = content_column.filter(|c| !c.trim().is_empty()) {
        session = session.with_content_column(column);
    }
    let summary = session.load_csv(&state.rules, data);
    if let Some(err) = &summary.decode_error {
        warn!("Transcript could not be decoded, returning no cards: {}", err);
    }

    if let Some(category) = category.filter(|c| !c.is_empty()) {
        session.set_filter(Some(category.to_string()));
    }

    Ok((session, summary.decode_error))
}

fn classify_response(
    state: &AppState,
    session: &CoachSession,
    decode_error: Option<String>,
) -> ClassifyResponse {
    let language = state.rules.language(session.language());
    let cards: Vec<CoachCard> = session.visible_cards().into_iter().cloned().collect();

    ClassifyResponse {
        language: language.code.clone(),
        language_label: language.label.clone(),
        policy: session.policy(),
        rows: session.rows().len(),
        categories: session.categories().into_iter().map(String::from).collect(),
        cards,
        decode_error,
    }
}

/// POST /api/classify - Classify a raw CSV request body
pub async fn classify_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClassifyQuery>,
    body: Bytes,
) -> Result<Json<ClassifyResponse>, AppError> {
    let (session, decode_error) = load_session(&state, params.session_options(), &body)?;

    let response = classify_response(&state, &session, decode_error);
    info!(
        "Classified {} rows into {} cards ({})",
        response.rows,
        response.cards.len(),
        response.language
    );

    Ok(Json(response))
}

/// POST /api/upload - Classify an uploaded transcript file
///
/// Expects multipart form with:
/// - file: CSV file (required, max 10MB)
/// - language: response language code (optional)
/// - category: category filter (optional)
/// - policy: match policy (optional)
/// - content_column: CSV column holding the message (optional)
pub async fn upload_csv(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ClassifyResponse>, AppError> {
    let mut file_data: Option<Bytes> = None;
    let mut language: Option<String> = None;
    let mut category: Option<String> = None;
    let mut policy: Option<String> = None;
    let mut content_column: Option<String> = None;

    // Extract fields from multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read file data"))?;

                if bytes.len() > MAX_UPLOAD_SIZE {
                    return Err(AppError::payload_too_large(&format!(
                        "File too large. Maximum size is {} MB",
                        MAX_UPLOAD_SIZE / 1024 / 1024
                    )));
                }

                file_data = Some(bytes);
            }
            "language" | "category" | "policy" | "content_column" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::bad_request(&format!("Failed to read {}", name)))?;
                let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
                match name.as_str() {
                    "language" => language = value,
                    "category" => category = value,
                    "policy" => policy = value,
                    _ => content_column = value,
                }
            }
            _ => {}
        }
    }

    let file_data = file_data.ok_or_else(|| AppError::bad_request("Missing file field"))?;

    let opts = SessionOptions {
        language: language.as_deref(),
        category: category.as_deref(),
        policy: policy.as_deref(),
        content_column: content_column.as_deref(),
    };
    let (session, decode_error) = load_session(&state, opts, &file_data)?;

    let response = classify_response(&state, &session, decode_error);
    info!(
        "Uploaded transcript: {} rows, {} cards ({})",
        response.rows,
        response.cards.len(),
        response.language
    );

    Ok(Json(response))
}

/// Query parameters for card export
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub language: Option<String>,
    pub category: Option<String>,
    pub policy: Option<String>,
    pub content_column: Option<String>,
    /// Output format (default: csv)
    #[serde(default = "default_format")]
    pub format: String,
    /// Quote CSV fields instead of the legacy bare layout
    #[serde(default)]
    pub quoted: bool,
}

fn default_format() -> String {
    "csv".to_string()
}

/// POST /api/export - Classify a raw CSV body and return the cards as a download
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportQuery>,
    body: Bytes,
) -> Result<Response<Body>, AppError> {
    let format: ExportFormat = params
        .format
        .parse()
        .map_err(|_| AppError::bad_request("Invalid format. Use 'csv' or 'json'"))?;
    let style = if params.quoted {
        CsvStyle::Quoted
    } else {
        CsvStyle::Legacy
    };

    let opts = SessionOptions {
        language: params.language.as_deref(),
        category: params.category.as_deref(),
        policy: params.policy.as_deref(),
        content_column: params.content_column.as_deref(),
    };
    let (session, _) = load_session(&state, opts, &body)?;

    let cards: Vec<CoachCard> = session.visible_cards().into_iter().cloned().collect();
    let content = export_cards(&cards, format, style)?;
    info!("Exported {} coach cards as {}", cards.len(), format);

    let file_name = Path::new(DOWNLOAD_FILE_NAME).with_extension(format.as_str());

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, format.content_type())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name.display()),
        )
        .body(Body::from(content))
        .map_err(|e| AppError::internal(&e.to_string()))
}
