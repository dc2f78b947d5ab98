//! API request handlers
//!
//! Handlers for all REST API endpoints. Bodies and responses use internal
//! field names; the spreadsheet headers never leave the server.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assistant::Assistant;
use crate::client::{search_products as filter_products, Dashboard, OrderFormOptions};
use crate::dates::{elapsed_for, format_duration};
use crate::error::PlantError;
use crate::gateway::WriteOutcome;
use crate::mapping::{unknown_fields, Sheet};
use crate::types::{KpiData, PrioritySuggestion, Product, ProductionOrder, Record};

use super::server::AppState;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Error returned by handlers, rendered as an `ApiResponse` with a status code
#[derive(Debug)]
pub struct ApiError(pub PlantError);

impl From<PlantError> for ApiError {
    fn from(err: PlantError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            PlantError::NotFound(_) => StatusCode::NOT_FOUND,
            PlantError::Validation(_) | PlantError::Json(_) => StatusCode::BAD_REQUEST,
            PlantError::Connection { .. }
            | PlantError::Http(_)
            | PlantError::Backend(_)
            | PlantError::UnexpectedPayload { .. }
            | PlantError::Assistant(_) => StatusCode::BAD_GATEWAY,
            PlantError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            PlantError::Io(_) | PlantError::Yaml(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self.0, "request failed");
        }
        (status, Json(ApiResponse::<()>::err(self.0.to_string()))).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn parse_sheet(name: &str) -> Result<Sheet, ApiError> {
    Ok(name.parse::<Sheet>()?)
}

fn assistant(state: &AppState) -> Result<&Assistant, ApiError> {
    state.assistant.as_ref().ok_or_else(|| {
        ApiError(PlantError::Config(
            "assistant is not configured (set GEMINI_API_KEY)".to_string(),
        ))
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// SERVICE ENDPOINTS
// ═══════════════════════════════════════════════════════════════════════════

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

fn endpoint(method: &str, path: &str, description: &str) -> EndpointInfo {
    EndpointInfo {
        path: path.to_string(),
        method: method.to_string(),
        description: description.to_string(),
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Plantops API Server".to_string(),
        version: state.version.clone(),
        description: "Manufacturing operations over a spreadsheet-backed store".to_string(),
        endpoints: vec![
            endpoint("GET", "/health", "Health check endpoint"),
            endpoint("GET", "/version", "Get server version"),
            endpoint("GET", "/api/v1/sheets/:sheet", "List a sheet's records"),
            endpoint("POST", "/api/v1/sheets/:sheet", "Append a record to a sheet"),
            endpoint("GET", "/api/v1/sheets/:sheet/headers", "Column mapping of a sheet"),
            endpoint("GET", "/api/v1/dashboard", "Orders with their KPIs"),
            endpoint("GET", "/api/v1/kpis", "Order completion KPIs"),
            endpoint("GET", "/api/v1/order-form", "Clients and products for a new order"),
            endpoint("GET", "/api/v1/orders/:no_ot", "Order detail with elapsed time"),
            endpoint("POST", "/api/v1/orders/:no_ot/priority", "AI priority suggestion"),
            endpoint("POST", "/api/v1/orders/:no_ot/email", "AI client status email"),
            endpoint("GET", "/api/v1/products/search?q=", "Search products by name or code"),
            endpoint("PUT", "/api/v1/products/:codigo", "Edit a product in place"),
            endpoint("POST", "/api/v1/staff/job-description", "AI job description"),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub assistant: bool,
}

/// GET /health - Health check
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        assistant: state.assistant.is_some(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub sheets: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        sheets: Sheet::ALL.iter().map(|s| s.alias().to_string()).collect(),
    }))
}

// ═══════════════════════════════════════════════════════════════════════════
// SHEET ENDPOINTS
// ═══════════════════════════════════════════════════════════════════════════

/// GET /api/v1/sheets/:sheet - Every record of a sheet
pub async fn list_sheet(
    State(state): State<Arc<AppState>>,
    Path(sheet): Path<String>,
) -> ApiResult<Vec<Record>> {
    let sheet = parse_sheet(&sheet)?;
    let records = state.client.fetch_records(sheet).await?;
    Ok(Json(ApiResponse::ok(records)))
}

/// Result of a write
#[derive(Serialize)]
pub struct WriteResponse {
    pub outcome: WriteOutcome,
    /// Fields the sheet has no column for; they were not sent
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored_fields: Vec<String>,
}

/// POST /api/v1/sheets/:sheet - Append a record
pub async fn create_row(
    State(state): State<Arc<AppState>>,
    Path(sheet): Path<String>,
    Json(record): Json<Record>,
) -> ApiResult<WriteResponse> {
    let sheet = parse_sheet(&sheet)?;
    let ignored_fields = unknown_fields(sheet, &record);
    if ignored_fields.len() == record.len() {
        return Err(ApiError(PlantError::Validation(format!(
            "no field of the request belongs to sheet '{}'",
            sheet
        ))));
    }
    let outcome = state.client.create_record(sheet, &record).await?;
    Ok(Json(ApiResponse::ok(WriteResponse {
        outcome,
        ignored_fields,
    })))
}

/// One header/field pair
#[derive(Serialize)]
pub struct ColumnInfo {
    pub header: String,
    pub field: String,
}

/// GET /api/v1/sheets/:sheet/headers - Column mapping
pub async fn sheet_headers(Path(sheet): Path<String>) -> ApiResult<Vec<ColumnInfo>> {
    let sheet = parse_sheet(&sheet)?;
    let columns = sheet
        .mapping()
        .pairs()
        .map(|(header, field)| ColumnInfo {
            header: header.to_string(),
            field: field.to_string(),
        })
        .collect();
    Ok(Json(ApiResponse::ok(columns)))
}

// ═══════════════════════════════════════════════════════════════════════════
// ORDER ENDPOINTS
// ═══════════════════════════════════════════════════════════════════════════

/// GET /api/v1/dashboard - Orders plus KPIs
pub async fn dashboard(State(state): State<Arc<AppState>>) -> ApiResult<Dashboard> {
    Ok(Json(ApiResponse::ok(state.client.dashboard().await?)))
}

/// GET /api/v1/kpis - Completion counters
pub async fn kpis(State(state): State<Arc<AppState>>) -> ApiResult<KpiData> {
    Ok(Json(ApiResponse::ok(state.client.fetch_kpis().await?)))
}

/// GET /api/v1/order-form - Clients and products to pick from
pub async fn order_form(State(state): State<Arc<AppState>>) -> ApiResult<OrderFormOptions> {
    Ok(Json(ApiResponse::ok(
        state.client.order_form_options().await?,
    )))
}

/// Order detail response
#[derive(Serialize)]
pub struct OrderDetailResponse {
    pub orden: ProductionOrder,
    /// Time since issue, only for pending or in-progress orders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiempo_transcurrido: Option<String>,
}

/// GET /api/v1/orders/:no_ot - One order
pub async fn order_detail(
    State(state): State<Arc<AppState>>,
    Path(no_ot): Path<String>,
) -> ApiResult<OrderDetailResponse> {
    let orden = state.client.find_order(&no_ot).await?;
    let now = chrono::Local::now().naive_local();
    let tiempo_transcurrido = elapsed_for(&orden, now).map(format_duration);
    Ok(Json(ApiResponse::ok(OrderDetailResponse {
        orden,
        tiempo_transcurrido,
    })))
}

/// POST /api/v1/orders/:no_ot/priority - AI priority suggestion
pub async fn suggest_priority(
    State(state): State<Arc<AppState>>,
    Path(no_ot): Path<String>,
) -> ApiResult<PrioritySuggestion> {
    let assistant = assistant(&state)?;
    let order = state.client.find_order(&no_ot).await?;
    let suggestion = assistant.suggest_priority(&order).await?;
    Ok(Json(ApiResponse::ok(suggestion)))
}

/// Generated text response
#[derive(Serialize)]
pub struct TextResponse {
    pub text: String,
}

/// POST /api/v1/orders/:no_ot/email - AI client email
pub async fn draft_email(
    State(state): State<Arc<AppState>>,
    Path(no_ot): Path<String>,
) -> ApiResult<TextResponse> {
    let assistant = assistant(&state)?;
    let order = state.client.find_order(&no_ot).await?;
    let text = assistant.draft_client_email(&order).await?;
    Ok(Json(ApiResponse::ok(TextResponse { text })))
}

// ═══════════════════════════════════════════════════════════════════════════
// PRODUCT AND STAFF ENDPOINTS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/v1/products/search?q= - Products by name or code
pub async fn search_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<Product>> {
    let products = state.client.fetch_products().await?;
    let found = filter_products(&products, &query.q)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(ApiResponse::ok(found)))
}

/// PUT /api/v1/products/:codigo - Edit a product
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(codigo): Path<String>,
    Json(changes): Json<Record>,
) -> ApiResult<WriteResponse> {
    let ignored_fields = unknown_fields(Sheet::Products, &changes);
    let outcome = state.client.update_product(&codigo, &changes).await?;
    Ok(Json(ApiResponse::ok(WriteResponse {
        outcome,
        ignored_fields,
    })))
}

#[derive(Deserialize)]
pub struct JobDescriptionRequest {
    pub cargo: String,
}

/// POST /api/v1/staff/job-description - AI job description
pub async fn job_description(
    State(state): State<Arc<AppState>>,
    Json(req): Json<JobDescriptionRequest>,
) -> ApiResult<TextResponse> {
    let text = assistant(&state)?
        .generate_job_description(&req.cargo)
        .await?;
    Ok(Json(ApiResponse::ok(TextResponse { text })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_ok_creates_success_response() {
        let response = ApiResponse::ok("test data");
        assert!(response.success);
        assert!(response.data.is_some());
        assert!(response.error.is_none());
        assert!(!response.request_id.is_empty());
    }

    #[test]
    fn test_api_response_err_creates_error_response() {
        let response: ApiResponse<()> = ApiResponse::err("Something went wrong");
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error, Some("Something went wrong".to_string()));
    }

    #[test]
    fn test_api_response_request_id_is_unique() {
        let a = ApiResponse::ok(1);
        let b = ApiResponse::ok(2);
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (PlantError::NotFound("orden 1".into()), StatusCode::NOT_FOUND),
            (PlantError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (PlantError::Connection { status: 500 }, StatusCode::BAD_GATEWAY),
            (PlantError::Backend("x".into()), StatusCode::BAD_GATEWAY),
            (PlantError::Assistant("x".into()), StatusCode::BAD_GATEWAY),
            (PlantError::Config("x".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }
}
