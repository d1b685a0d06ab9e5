//! HTTP API handlers for tunebot-order

pub mod credential;
pub mod health;
pub mod login;
pub mod tools;
pub mod ui;

pub use credential::credential_routes;
pub use health::health_routes;
pub use login::login_routes;
pub use tools::tool_routes;
pub use ui::ui_routes;
