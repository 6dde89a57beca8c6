// Copyright 2026 Billcheck Contributors
// SPDX-License-Identifier: MIT

//! HTTP REST API for Billcheck.
//!
//! Read-only catalog endpoints, the bill-check endpoint, recent-check history
//! and bill reminders. Errors are JSON bodies of the form
//! `{"error": "...", "details": ...}`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use billcheck::{
    BillCheckOrchestrator, Category, CheckError, CheckRecord, CheckRequest, ClientMeta,
    FieldError, NewReminder, Provider, ReminderPatch, StoreError, ValidationError,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Default number of recent checks returned.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Upper bound on `?limit=` for recent checks.
pub const MAX_RECENT_LIMIT: usize = 100;

/// Shared state behind every handler.
pub struct AppState {
    pub orchestrator: Arc<BillCheckOrchestrator>,
    /// Whether a browser binary was discovered at startup.
    pub browser_available: bool,
}

/// Build the axum Router with all REST endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/services", get(list_services))
        .route("/api/services/:id", get(get_service))
        .route("/api/services/category/:category", get(services_by_category))
        .route("/api/bills/check", post(check_bill))
        .route("/api/bills/recent", get(recent_checks))
        .route("/api/reminders", post(create_reminder).get(list_reminders))
        .route("/api/reminders/:id", patch(update_reminder))
        .layer(cors)
        .with_state(state)
}

/// Serve the REST API until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("REST API listening on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        info!("received shutdown signal");
    })
    .await?;
    Ok(())
}

// ── Errors ──────────────────────────────────────────────────────

/// An error response.
#[derive(Debug)]
pub enum ApiError {
    BadRequest {
        message: String,
        details: Vec<FieldError>,
    },
    NotFound(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a [FieldError]>,
}

impl ApiError {
    fn invalid(e: ValidationError) -> Self {
        ApiError::BadRequest {
            message: "Invalid request data".into(),
            details: e.fields,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CheckError> for ApiError {
    fn from(e: CheckError) -> Self {
        match e {
            CheckError::Validation(v) => ApiError::invalid(v),
            CheckError::ServiceNotFound(_) => ApiError::NotFound("Service not found".into()),
            CheckError::Store(s) => s.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        error!(error = %e, "record store failure");
        ApiError::Internal("Internal storage error".into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest {
            message: "Invalid request data".into(),
            details: vec![FieldError {
                field: "body".into(),
                message: e.body_text(),
            }],
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        ApiError::BadRequest {
            message: "Invalid query parameters".into(),
            details: vec![FieldError {
                field: "query".into(),
                message: e.body_text(),
            }],
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::BadRequest { message, details } => ErrorBody {
                error: message,
                details: Some(details.as_slice()),
            },
            ApiError::NotFound(message) | ApiError::Internal(message) => ErrorBody {
                error: message,
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ── Catalog ─────────────────────────────────────────────────────

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "providers": state.orchestrator.catalog().len(),
        "browser": state.browser_available,
    }))
}

async fn list_services(State(state): State<Arc<AppState>>) -> Json<Vec<Provider>> {
    Json(state.orchestrator.catalog().list_active().cloned().collect())
}

async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Provider> {
    state
        .orchestrator
        .catalog()
        .lookup(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Service not found".into()))
}

/// Unknown categories yield an empty list.
async fn services_by_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Json<Vec<Provider>> {
    let providers = match category.parse::<Category>() {
        Ok(category) => state
            .orchestrator
            .catalog()
            .list_by_category(category)
            .into_iter()
            .cloned()
            .collect(),
        Err(_) => Vec::new(),
    };
    Json(providers)
}

// ── Bill checks ─────────────────────────────────────────────────

async fn check_bill(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    connect: Option<ConnectInfo<SocketAddr>>,
    body: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body?;
    let client = client_meta(&headers, connect.map(|ConnectInfo(addr)| addr));
    let response = state.orchestrator.check_bill(request, client).await?;
    Ok(Json(response).into_response())
}

/// Client metadata: User-Agent header and the first forwarded address,
/// falling back to the peer address.
pub fn client_meta(headers: &HeaderMap, peer: Option<SocketAddr>) -> ClientMeta {
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let source_address = forwarded
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_default();

    ClientMeta {
        user_agent,
        source_address,
    }
}

#[derive(Debug, Deserialize)]
struct RecentQuery {
    limit: Option<usize>,
}

/// A check record annotated with its provider's names.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentCheck {
    #[serde(flatten)]
    pub record: CheckRecord,
    pub service_name: String,
    pub service_provider: String,
}

async fn recent_checks(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RecentQuery>, QueryRejection>,
) -> ApiResult<Vec<RecentCheck>> {
    let Query(query) = query?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .min(MAX_RECENT_LIMIT);

    let catalog = state.orchestrator.catalog();
    let records = state.orchestrator.store().list_recent(limit).await?;
    let enriched = records
        .into_iter()
        .map(|record| {
            let (service_name, service_provider) = match catalog.lookup(&record.provider_id) {
                Some(p) => (p.name.clone(), p.display_provider.clone()),
                None => ("Unknown".to_string(), "Unknown".to_string()),
            };
            RecentCheck {
                record,
                service_name,
                service_provider,
            }
        })
        .collect();
    Ok(Json(enriched))
}

// ── Reminders ───────────────────────────────────────────────────

fn validate_reminder_day(day: u8, fields: &mut Vec<FieldError>) {
    if !(1..=31).contains(&day) {
        fields.push(FieldError {
            field: "reminderDay".into(),
            message: "must be between 1 and 31".into(),
        });
    }
}

async fn create_reminder(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewReminder>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(mut reminder) = body?;

    let mut fields = Vec::new();
    reminder.bill_number = reminder.bill_number.trim().to_string();
    if reminder.bill_number.is_empty() {
        fields.push(FieldError {
            field: "billNumber".into(),
            message: "Bill number is required".into(),
        });
    }
    validate_reminder_day(reminder.reminder_day, &mut fields);
    if !fields.is_empty() {
        return Err(ApiError::invalid(ValidationError { fields }));
    }

    let created = state.orchestrator.store().append_reminder(reminder).await?;
    info!(reminder_id = %created.id, day = created.reminder_day, "reminder created");
    Ok(Json(created).into_response())
}

async fn list_reminders(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<billcheck::ReminderRecord>> {
    Ok(Json(state.orchestrator.store().list_reminders().await?))
}

async fn update_reminder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<ReminderPatch>, JsonRejection>,
) -> ApiResult<billcheck::ReminderRecord> {
    let Json(patch) = body?;

    if let Some(day) = patch.reminder_day {
        let mut fields = Vec::new();
        validate_reminder_day(day, &mut fields);
        if !fields.is_empty() {
            return Err(ApiError::invalid(ValidationError { fields }));
        }
    }

    state
        .orchestrator
        .store()
        .update_reminder(&id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Reminder not found".into()))
}
