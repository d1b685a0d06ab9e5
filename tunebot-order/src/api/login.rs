//! QR login endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::services::{LoginOutcome, QrLoginKind};
use crate::{ApiError, ApiResult, AppState};

/// The most recent QR login attempt
#[derive(Debug, Clone)]
pub struct LoginRecord {
    /// Increments per challenge; a late outcome from an older attempt is dropped
    pub attempt: u64,
    pub kind: QrLoginKind,
    pub mime: &'static str,
    /// `None` while the poll loop is still running
    pub outcome: Option<LoginOutcome>,
}

/// Current login attempt, all fields null before the first one
#[derive(Debug, Serialize)]
pub struct LoginStatusResponse {
    pub kind: Option<QrLoginKind>,
    /// Image type of the QR code returned by `/get_qrcode`
    pub mime: Option<&'static str>,
    pub last_outcome: Option<LoginOutcome>,
}

/// GET /get_qrcode/:qr_type
///
/// Returns the QR image as a base64 string and starts polling in the
/// background. The attempt and, later, its outcome are recorded for
/// `/login/status`.
pub async fn get_qrcode(
    State(state): State<AppState>,
    Path(qr_type): Path<String>,
) -> ApiResult<Json<String>> {
    let kind: QrLoginKind = qr_type.parse().map_err(|_| {
        ApiError::BadRequest("Invalid login type, only 'wx' or 'qq' are supported".to_string())
    })?;

    let ticket = state
        .qr_login
        .start_login(kind)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to get QR code: {}", e)))?;

    let attempt = {
        let mut current = state.last_login.write().await;
        let attempt = current.as_ref().map_or(1, |record| record.attempt + 1);
        *current = Some(LoginRecord {
            attempt,
            kind: ticket.kind,
            mime: ticket.mime,
            outcome: None,
        });
        attempt
    };

    let last_login = Arc::clone(&state.last_login);
    let outcome = ticket.outcome;
    tokio::spawn(async move {
        let Ok(outcome) = outcome.await else {
            return;
        };
        tracing::info!(attempt, outcome = ?outcome, "QR login finished");
        let mut current = last_login.write().await;
        match current.as_mut() {
            Some(record) if record.attempt == attempt => record.outcome = Some(outcome),
            _ => tracing::debug!(attempt, "Outcome of a superseded QR login dropped"),
        }
    });

    Ok(Json(ticket.image_base64))
}

/// GET /login/status
pub async fn login_status(State(state): State<AppState>) -> Json<LoginStatusResponse> {
    let response = match state.last_login.read().await.as_ref() {
        Some(record) => LoginStatusResponse {
            kind: Some(record.kind),
            mime: Some(record.mime),
            last_outcome: record.outcome.clone(),
        },
        None => LoginStatusResponse {
            kind: None,
            mime: None,
            last_outcome: None,
        },
    };
    Json(response)
}

/// Build login routes
pub fn login_routes() -> Router<AppState> {
    Router::new()
        .route("/get_qrcode/:qr_type", get(get_qrcode))
        .route("/login/status", get(login_status))
}
