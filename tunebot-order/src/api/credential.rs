//! Credential maintenance endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tunebot_common::Error;

use crate::services::CredentialStore;
use crate::{ApiError, ApiResult, AppState};

/// Credential validity
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub valid: bool,
}

/// Refresh result
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
}

fn store(state: &AppState) -> CredentialStore {
    CredentialStore::new(Arc::clone(&state.slot), Arc::clone(&state.catalog))
}

/// Map load failures: an absent credential is 404
async fn load_or_404(store: &mut CredentialStore) -> ApiResult<()> {
    match store.load().await {
        Ok(_) => Ok(()),
        Err(Error::NotFound(_)) => Err(ApiError::NotFound("Credential file not found".to_string())),
        Err(e) => Err(e.into()),
    }
}

/// GET /credential/status
///
/// Valid means loaded and not expired. Any failure reads as invalid.
pub async fn credential_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let mut store = store(&state);

    let valid = match store.load().await {
        Ok(_) => match store.check_status().await {
            Ok(status) => !status.expired,
            Err(e) => {
                tracing::warn!("Credential status check failed: {}", e);
                false
            }
        },
        Err(e) => {
            tracing::info!("No usable credential: {}", e);
            false
        }
    };

    Json(StatusResponse { valid })
}

/// POST /credential/refresh
pub async fn refresh_credential(State(state): State<AppState>) -> ApiResult<Json<RefreshResponse>> {
    let mut store = store(&state);
    load_or_404(&mut store).await?;

    let status = store.check_status().await?;
    if !status.refreshable {
        return Err(ApiError::BadRequest("This credential does not support refresh".to_string()));
    }
    if status.expired {
        tracing::info!("Refreshing expired credential");
    }

    store.refresh().await?;

    Ok(Json(RefreshResponse {
        success: true,
        message: "Credential refreshed".to_string(),
    }))
}

/// GET /credential/info
///
/// All credential fields as strings, sensitive values truncated.
pub async fn credential_info(State(state): State<AppState>) -> ApiResult<Json<BTreeMap<String, String>>> {
    let mut store = store(&state);
    load_or_404(&mut store).await?;

    let info = store
        .credential()
        .map(|credential| credential.info())
        .ok_or_else(|| ApiError::NotFound("Credential file not found".to_string()))?;

    Ok(Json(info))
}

/// Build credential routes
pub fn credential_routes() -> Router<AppState> {
    Router::new()
        .route("/credential/status", get(credential_status))
        .route("/credential/refresh", post(refresh_credential))
        .route("/credential/info", get(credential_info))
}
