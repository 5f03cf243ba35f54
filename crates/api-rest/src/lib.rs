//! # API REST
//!
//! REST API for drugcheck.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (request validation, JSON errors, CORS)
//!
//! All report logic lives in `drugcheck-core`; handlers only validate input and map results.

#![warn(rust_2018_idioms)]

pub mod error;

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use drugcheck_core::{
    Alert, AlertKind, CatalogEntry, DrugRecord, DrugReport, PatientProfile, ReportService,
};

pub use error::{ApiError, ErrorRes};

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    reports: Arc<ReportService>,
}

impl AppState {
    pub fn new(reports: ReportService) -> Self {
        Self {
            reports: Arc::new(reports),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Body of `POST /check-drug`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckDrugReq {
    #[serde(default)]
    pub profile: Option<PatientProfile>,
    #[serde(default)]
    pub drug_name: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, catalog, generate_report, check_drug),
    components(schemas(
        HealthRes,
        ErrorRes,
        CheckDrugReq,
        PatientProfile,
        DrugRecord,
        DrugReport,
        Alert,
        AlertKind,
        CatalogEntry,
    ))
)]
pub struct ApiDoc;

/// Build the REST router with CORS, panic handling and Swagger UI.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/catalog", get(catalog))
        .route("/generate-report", post(generate_report))
        .route("/check-drug", post(check_drug))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
#[axum::debug_handler]
async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "drugcheck REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/catalog",
    responses(
        (status = 200, description = "Drugs analysed by /generate-report, in order", body = [CatalogEntry])
    )
)]
/// List the drugs the batch report covers.
#[axum::debug_handler]
async fn catalog(State(state): State<AppState>) -> Json<Vec<CatalogEntry>> {
    Json(state.reports.catalog().entries().to_vec())
}

#[utoipa::path(
    post,
    path = "/generate-report",
    request_body = PatientProfile,
    responses(
        (status = 200, description = "One report per catalog drug, in catalog order", body = [DrugReport]),
        (status = 400, description = "Missing or malformed patient profile", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Generate reports for every catalog drug.
///
/// Drug-level failures are embedded as `ERROR` alerts; only a missing or malformed profile is
/// an HTTP error.
#[axum::debug_handler]
async fn generate_report(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Vec<DrugReport>>, ApiError> {
    let profile = parse_profile(&body)?;

    tracing::info!("generating batch report");
    let reports = state.reports.batch_report(&profile).await;
    Ok(Json(reports))
}

#[utoipa::path(
    post,
    path = "/check-drug",
    request_body = CheckDrugReq,
    responses(
        (status = 200, description = "Report for the requested drug", body = DrugReport),
        (status = 400, description = "Missing profile or drugName", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Check a single, custom drug name against the profile.
///
/// An unresolvable drug name is still a 200 with a single `ERROR` alert.
#[axum::debug_handler]
async fn check_drug(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DrugReport>, ApiError> {
    let (profile, drug_name) = parse_check_drug(&body)?;

    tracing::info!(drug = %drug_name, "checking single drug");
    let report = state.reports.single_report(&profile, &drug_name).await;
    Ok(Json(report))
}

fn parse_json_object(body: &[u8]) -> Result<Option<Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))?;

    match value {
        Value::Null => Ok(None),
        Value::Object(ref map) if map.is_empty() => Ok(None),
        Value::Object(_) => Ok(Some(value)),
        _ => Err(ApiError::BadRequest("Request body must be a JSON object".into())),
    }
}

fn parse_profile(body: &[u8]) -> Result<PatientProfile, ApiError> {
    let value = parse_json_object(body)?
        .ok_or_else(|| ApiError::BadRequest("No patient profile provided".into()))?;

    serde_json::from_value(value)
        .map_err(|e| ApiError::BadRequest(format!("Invalid patient profile: {e}")))
}

fn parse_check_drug(body: &[u8]) -> Result<(PatientProfile, String), ApiError> {
    let missing = || ApiError::BadRequest("Missing profile or drugName".into());

    let value = parse_json_object(body)?.ok_or_else(missing)?;
    let req: CheckDrugReq = serde_json::from_value(value)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))?;

    let profile = req.profile.ok_or_else(missing)?;
    let drug_name = req
        .drug_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(missing)?;

    Ok((profile, drug_name))
}
