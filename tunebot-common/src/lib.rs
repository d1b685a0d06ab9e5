//! # tunebot Common Library
//!
//! Shared code for the tunebot services:
//! - Error taxonomy
//! - Configuration loading
//! - Chat target parsing
//! - Cover art link construction
//! - Quality tiers and their fallback order
//! - Credential model and redaction

pub mod chat;
pub mod config;
pub mod cover;
pub mod credential;
pub mod error;
pub mod quality;

pub use chat::{ChannelKind, ChatTarget, DeliveryStage};
pub use credential::Credential;
pub use error::{Error, Result};
pub use quality::QualityTier;
