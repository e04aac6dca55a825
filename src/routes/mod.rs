//! API routes

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::conversation::Message;
use crate::core::{ChatError, ChatReply, ChatRequest};
use crate::payments::{self, PaymentError, SchedulePlan, ScheduleRequest, SendPlan, SendRequest};
use crate::transactions::{
    export_csv, export_file_name, page_index, query, update_selection, FilterCriteria, FilterRequest,
    PageRequest, QueryRequest, QuerySession, SelectionAction, SelectionSet, SessionView, SortDirection,
    SortKey, SortSpec, Transaction, TransactionView,
};
use crate::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    #[serde(default)]
    pub selection: SelectionSet,
    pub view_ids: Vec<String>,
    pub action: SelectionAction,
}

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub selection: SelectionSet,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub ids: Vec<String>,
}

/// Column-header click; an explicit direction replaces the toggle
#[derive(Debug, Deserialize)]
pub struct SortRequest {
    pub key: SortKey,
    #[serde(default)]
    pub direction: Option<SortDirection>,
}

#[derive(Debug, Serialize)]
struct FieldError {
    field: &'static str,
    message: String,
}

/// Errors returned to API clients
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Transaction not found: {0}")]
    NotFound(String),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid payment request")]
    InvalidPayment(Vec<PaymentError>),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyMessage => ApiError::BadRequest(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::NotFound(_) | ApiError::SessionNotFound(_) => {
                (StatusCode::NOT_FOUND, json!({ "error": self.to_string() }))
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() })),
            ApiError::InvalidPayment(errors) => {
                let fields: Vec<FieldError> = errors
                    .iter()
                    .map(|e| FieldError {
                        field: e.field(),
                        message: e.to_string(),
                    })
                    .collect();
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    json!({ "error": self.to_string(), "fields": fields }),
                )
            }
            ApiError::Internal(_) => {
                tracing::error!("{}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": self.to_string() }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn query_transactions(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Json<TransactionView> {
    let criteria = FilterCriteria::from_request(&request.filters);
    let page_size = request
        .page_size
        .filter(|size| *size > 0)
        .unwrap_or(state.config.page_size);

    let page = page_index(request.page);
    let view = query(&state.ledger, &criteria, request.sort, page, page_size);
    tracing::debug!(
        total = view.total_count,
        page = view.page,
        pages = view.total_pages,
        "Transaction query"
    );
    Json(view)
}

async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Transaction>, ApiError> {
    state
        .ledger
        .iter()
        .find(|tx| tx.id == id)
        .cloned()
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

async fn select(Json(request): Json<SelectionRequest>) -> Json<SelectionResponse> {
    let selection = update_selection(&request.selection, &request.view_ids, &request.action);
    tracing::debug!(selected = ?selection.ids(), "Selection updated");
    Json(SelectionResponse { selection })
}

async fn export(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, ApiError> {
    let selection: SelectionSet = request.ids.into_iter().collect();
    csv_download(&state.ledger, &selection)
}

fn csv_download(ledger: &[Transaction], selection: &SelectionSet) -> Result<Response, ApiError> {
    if selection.is_empty() {
        return Err(ApiError::BadRequest("No transactions selected".into()));
    }

    let csv = export_csv(ledger, selection);
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(Utc::now().date_naive())
    );
    tracing::info!(rows = selection.len(), "Exporting transactions");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

async fn open_session(State(state): State<AppState>) -> (StatusCode, Json<SessionView>) {
    let view = state.sessions.create(state.config.page_size, &state.ledger).await;
    (StatusCode::CREATED, Json(view))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    state
        .sessions
        .view(id, &state.ledger)
        .await
        .map(Json)
        .ok_or(ApiError::SessionNotFound(id))
}

async fn close_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::SessionNotFound(id))
    }
}

async fn set_session_filters(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(filters): Json<FilterRequest>,
) -> Result<Json<SessionView>, ApiError> {
    update_session(&state, id, |session| session.set_filters(&filters)).await
}

async fn sort_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SortRequest>,
) -> Result<Json<SessionView>, ApiError> {
    update_session(&state, id, |session| match request.direction {
        Some(direction) => session.set_sort(SortSpec::new(request.key, direction)),
        None => session.toggle_sort(request.key),
    })
    .await
}

async fn set_session_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<PageRequest>,
) -> Result<Json<SessionView>, ApiError> {
    update_session(&state, id, |session| session.set_page(page_index(request.page))).await
}

async fn select_in_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(action): Json<SelectionAction>,
) -> Result<Json<SessionView>, ApiError> {
    let ledger = &state.ledger;
    update_session(&state, id, |session| {
        session.refresh(ledger);
        session.select(&action);
    })
    .await
}

async fn export_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response, ApiError> {
    let view = state
        .sessions
        .view(id, &state.ledger)
        .await
        .ok_or(ApiError::SessionNotFound(id))?;
    csv_download(&state.ledger, &view.selection)
}

async fn update_session<F>(state: &AppState, id: Uuid, change: F) -> Result<Json<SessionView>, ApiError>
where
    F: FnOnce(&mut QuerySession),
{
    state
        .sessions
        .update(id, &state.ledger, change)
        .await
        .map(Json)
        .ok_or(ApiError::SessionNotFound(id))
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let reply = state.chat_engine.send(request).await?;
    Ok(Json(reply))
}

async fn chat_history(State(state): State<AppState>) -> Result<Json<Vec<Message>>, ApiError> {
    let history = state.chat_engine.history().await?;
    Ok(Json(history.messages().to_vec()))
}

async fn clear_history(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.chat_engine.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn send_preview(
    State(state): State<AppState>,
    Json(request): Json<SendRequest>,
) -> Result<Json<SendPlan>, ApiError> {
    payments::validate_send(&request, state.config.wallet_balance)
        .map(Json)
        .map_err(ApiError::InvalidPayment)
}

async fn schedule_preview(Json(request): Json<ScheduleRequest>) -> Result<Json<SchedulePlan>, ApiError> {
    payments::validate(&request, Utc::now().date_naive())
        .map(Json)
        .map_err(ApiError::InvalidPayment)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/v1/transactions/query", post(query_transactions))
        .route("/v1/transactions/selection", post(select))
        .route("/v1/transactions/export", post(export))
        .route("/v1/transactions/:id", get(get_transaction))
        .route("/v1/sessions", post(open_session))
        .route("/v1/sessions/:id", get(get_session).delete(close_session))
        .route("/v1/sessions/:id/filters", put(set_session_filters))
        .route("/v1/sessions/:id/sort", post(sort_session))
        .route("/v1/sessions/:id/page", put(set_session_page))
        .route("/v1/sessions/:id/selection", post(select_in_session))
        .route("/v1/sessions/:id/export", post(export_session))
        .route("/v1/chat", post(chat))
        .route("/v1/chat/history", get(chat_history).delete(clear_history))
        .route("/v1/payments/send/preview", post(send_preview))
        .route("/v1/payments/schedule/preview", post(schedule_preview))
}
