//! tunebot-order library interface
//!
//! Music ordering service: searches the music catalog, resolves a
//! playable link and delivers it to a chat, plus the QR login and
//! credential maintenance surface.

pub mod api;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::api::login::LoginRecord;
use crate::services::{
    ChatTransport, CredentialSlot, DeliveryConfig, MusicCatalog, MusicDelivery, PollPolicy,
    QrLoginFlow, QrLoginService,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Music catalog client
    pub catalog: Arc<dyn MusicCatalog>,
    /// Persisted credential slot
    pub slot: Arc<dyn CredentialSlot>,
    /// Song delivery pipeline
    pub delivery: Arc<MusicDelivery>,
    /// QR login flow
    pub qr_login: Arc<QrLoginFlow>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Most recent QR login attempt and its outcome once finished
    pub last_login: Arc<RwLock<Option<LoginRecord>>>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn MusicCatalog>,
        qr_service: Arc<dyn QrLoginService>,
        transport: Arc<dyn ChatTransport>,
        slot: Arc<dyn CredentialSlot>,
        delivery_config: DeliveryConfig,
        poll_policy: PollPolicy,
    ) -> Self {
        let delivery = MusicDelivery::new(
            Arc::clone(&catalog),
            transport,
            Arc::clone(&slot),
            delivery_config,
        );
        let qr_login = QrLoginFlow::new(
            qr_service,
            Arc::clone(&slot),
            Arc::clone(&catalog),
            poll_policy,
        );

        Self {
            catalog,
            slot,
            delivery: Arc::new(delivery),
            qr_login: Arc::new(qr_login),
            startup_time: Utc::now(),
            last_login: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Login page
        .merge(api::ui_routes())
        // QR login and credential maintenance
        .merge(api::login_routes())
        .merge(api::credential_routes())
        // Agent tool
        .merge(api::tool_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
