use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::service::{self, ServiceError};
use crate::state::AppState;

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub async fn readyz() -> StatusCode {
    StatusCode::OK
}

/// CORS preflight: 200 with an empty body.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> impl IntoResponse {
    let err = ServiceError::method_not_allowed();
    (err.status, Json(err.body))
}

pub async fn check_printers(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let printers = match service::parse_request(&body) {
        Ok(printers) => printers,
        Err(err) => return (err.status, Json(err.body)).into_response(),
    };

    tracing::info!(printers = printers.len(), "checking printer status");
    let results = service::check_printers(&state, printers).await;
    (StatusCode::OK, Json(results)).into_response()
}

pub async fn check_printer_details(
    State(state): State<AppState>,
    body: Bytes,
) -> impl IntoResponse {
    let printers = match service::parse_request(&body) {
        Ok(printers) => printers,
        Err(err) => return (err.status, Json(err.body)).into_response(),
    };

    tracing::info!(printers = printers.len(), "getting printer details");
    let details = service::check_printer_details(&state, printers).await;
    let offline = details
        .iter()
        .filter(|detail| detail.error.is_some())
        .count();
    tracing::info!(total = details.len(), offline, "printer details generated");
    (StatusCode::OK, Json(details)).into_response()
}
