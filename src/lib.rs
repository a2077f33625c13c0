pub mod appresult;
pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod matches;
pub mod notify;
pub mod profiles;
pub mod rooms;
pub mod scoring;
pub mod session;

use axum::extract::FromRef;
use sqlx::SqlitePool;

pub use appresult::{AppError, AppResult};

use auth::CredentialVerifier;
use config::Config;
use notify::{FeatureGate, NotificationSink};
use rooms::address::ConversationRouter;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub router: ConversationRouter,
    pub verifier: CredentialVerifier,
    pub gate: FeatureGate,
    pub notifier: NotificationSink,
    pub config: Config,
}
