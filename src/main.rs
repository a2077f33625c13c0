use std::sync::Arc;

use axum::Router;
use kindred::{
    AppState,
    auth::CredentialVerifier,
    config::Config,
    db, matches,
    notify::{FeatureGate, NotificationSink},
    rooms,
    rooms::{address::ConversationRouter, registry::SessionRegistry},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kindred=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| e.0)?;
    let db_pool = db::connect(&config.database_url).await.map_err(|e| e.0)?;
    db::init_schema(&db_pool).await.map_err(|e| e.0)?;

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(30)));

    let registry = Arc::new(SessionRegistry::new());
    let state = AppState {
        db_pool,
        router: ConversationRouter::new(registry),
        verifier: CredentialVerifier::new(config.identity_url.clone()),
        gate: FeatureGate::new(config.gate_url.clone()),
        notifier: NotificationSink::new(config.notify_url.clone()),
        config: config.clone(),
    };

    let app = Router::new()
        .nest("/m", matches::router())
        .nest("/r", rooms::router())
        .with_state(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    info!("listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
