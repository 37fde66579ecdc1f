use axum::http::StatusCode;
use chrono::{SecondsFormat, Utc};
use futures::future::join_all;
use serde_json::Value;
use std::time::{Duration, Instant};

use crate::models::{DetailResult, ErrorResponse, PrinterRef, PrinterStatus, StatusResult};
use crate::simulate::{
    coin_flip, empty_toners, latency_ms, maintenance, page_count, printer_model, toner_levels,
    tray_status, unknown_trays, OFFLINE_ERROR,
};
use crate::state::AppState;

#[derive(Debug)]
pub struct ServiceError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ServiceError {
    pub fn new(status: StatusCode, error: &'static str, message: Option<String>) -> Self {
        Self {
            status,
            body: ErrorResponse { error, message },
        }
    }

    pub fn invalid_request(message: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid request format", message)
    }

    pub fn internal(message: String) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            Some(message),
        )
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", None)
    }
}

pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses `{"printers": [{"name", "ip"}, ...]}`.
///
/// A body that is not JSON at all is treated as an unexpected failure (500).
/// Valid JSON with the wrong shape is the caller's fault (400), and every
/// element is checked, not just the outer array.
pub fn parse_request(body: &[u8]) -> Result<Vec<PrinterRef>, ServiceError> {
    let value: Value = serde_json::from_slice(body).map_err(|err| {
        tracing::error!(error = %err, "request body is not valid JSON");
        ServiceError::internal(err.to_string())
    })?;

    let items = value
        .get("printers")
        .and_then(Value::as_array)
        .ok_or_else(|| ServiceError::invalid_request(None))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let name = item.get("name").and_then(Value::as_str);
            let ip = item.get("ip").and_then(Value::as_str);
            match (name, ip) {
                (Some(name), Some(ip)) => Ok(PrinterRef {
                    name: name.to_string(),
                    ip: ip.to_string(),
                }),
                _ => Err(ServiceError::invalid_request(Some(format!(
                    "printers[{index}] must have string fields name and ip"
                )))),
            }
        })
        .collect()
}

pub async fn check_printers(state: &AppState, printers: Vec<PrinterRef>) -> Vec<StatusResult> {
    // join_all keeps input order, so results line up with the request.
    let checks = printers
        .into_iter()
        .enumerate()
        .map(|(index, printer)| check_status(state, index, printer));
    join_all(checks).await
}

async fn check_status(state: &AppState, index: usize, printer: PrinterRef) -> StatusResult {
    let started = Instant::now();
    let mut rng = state.sim.rng_for(index);

    if let Err(err) = state.resolver.resolve(&printer.ip).await {
        tracing::warn!(
            printer = printer.name.as_str(),
            ip = printer.ip.as_str(),
            error = %err,
            "reachability probe failed"
        );
        return StatusResult {
            name: printer.name,
            ip: printer.ip,
            status: PrinterStatus::Offline,
            response_time: None,
            error: Some(err),
            timestamp: now_timestamp(),
        };
    }

    let status = if coin_flip(&mut rng, state.sim.status_online_ratio) {
        PrinterStatus::Online
    } else {
        PrinterStatus::Offline
    };
    let response_time = started.elapsed().as_millis() as u64;
    tracing::debug!(
        printer = printer.name.as_str(),
        card_id = printer.card_id().as_str(),
        status = status.as_str(),
        response_time,
        "status simulated"
    );

    StatusResult {
        name: printer.name,
        ip: printer.ip,
        status,
        response_time: Some(response_time),
        error: None,
        timestamp: now_timestamp(),
    }
}

pub async fn check_printer_details(
    state: &AppState,
    printers: Vec<PrinterRef>,
) -> Vec<DetailResult> {
    let fetches = printers
        .into_iter()
        .enumerate()
        .map(|(index, printer)| fetch_details(state, index, printer));
    join_all(fetches).await
}

async fn fetch_details(state: &AppState, index: usize, printer: PrinterRef) -> DetailResult {
    if let Err(err) = state.resolver.resolve(&printer.ip).await {
        tracing::warn!(
            printer = printer.name.as_str(),
            error = %err,
            "details probe failed"
        );
        return offline_details(printer);
    }

    let mut rng = state.sim.rng_for(index);
    let delay = latency_ms(
        &mut rng,
        state.sim.delay_min.as_millis() as u64,
        state.sim.delay_max.as_millis() as u64,
    );
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if !coin_flip(&mut rng, state.sim.details_online_ratio) {
        tracing::debug!(printer = printer.name.as_str(), "simulated offline");
        return offline_details(printer);
    }

    let is_color = printer.is_color();
    DetailResult {
        model: Some(printer_model(&printer.name)),
        status: PrinterStatus::Online,
        toners: toner_levels(&mut rng, is_color),
        trays: tray_status(&mut rng),
        page_count: Some(page_count(&mut rng)),
        maintenance: Some(maintenance(&mut rng)),
        error: None,
        timestamp: now_timestamp(),
        name: printer.name,
        ip: printer.ip,
    }
}

pub fn offline_details(printer: PrinterRef) -> DetailResult {
    let is_color = printer.is_color();
    DetailResult {
        name: printer.name,
        ip: printer.ip,
        status: PrinterStatus::Offline,
        model: None,
        toners: empty_toners(is_color),
        trays: unknown_trays(),
        page_count: None,
        maintenance: None,
        error: Some(OFFLINE_ERROR.to_string()),
        timestamp: now_timestamp(),
    }
}
