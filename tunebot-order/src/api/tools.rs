//! Agent tool endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// `send_music_test` arguments
#[derive(Debug, Deserialize)]
pub struct SendMusicRequest {
    /// Chat key, e.g. `onebot_v11-private_12345678`
    pub chat_key: String,
    /// Search keywords: song title and artist
    pub keyword: String,
}

#[derive(Debug, Serialize)]
pub struct SendMusicResponse {
    pub result: String,
}

/// POST /tools/send_music_test
///
/// Always 200; the outcome is described in `result`, including a body
/// that does not parse.
pub async fn send_music_test(
    State(state): State<AppState>,
    request: Result<Json<SendMusicRequest>, JsonRejection>,
) -> Json<SendMusicResponse> {
    let result = match request {
        Ok(Json(request)) => state.delivery.deliver(&request.chat_key, &request.keyword).await,
        Err(rejection) => {
            tracing::warn!("Rejected send_music_test body: {}", rejection.body_text());
            format!("Invalid request: {}", rejection.body_text())
        }
    };
    Json(SendMusicResponse { result })
}

/// Build tool routes
pub fn tool_routes() -> Router<AppState> {
    Router::new().route("/tools/send_music_test", post(send_music_test))
}
