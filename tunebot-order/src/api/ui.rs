//! Login page assets

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use crate::AppState;

const INDEX_HTML: &str = include_str!("ui/index.html");
const STYLE_CSS: &str = include_str!("ui/style.css");
const SCRIPT_JS: &str = include_str!("ui/script.js");

/// GET /
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /style.css
pub async fn serve_style() -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/css")], STYLE_CSS).into_response()
}

/// GET /script.js
pub async fn serve_script() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/javascript")],
        SCRIPT_JS,
    )
        .into_response()
}

/// Build login page routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(serve_index))
        .route("/style.css", get(serve_style))
        .route("/script.js", get(serve_script))
}
