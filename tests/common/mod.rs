//! Shared harness for the flow tests: an in-memory database behind a
//! fully wired AppState (open gate, disabled sink, nothing listening on
//! the collaborator URLs) plus profile seeding.

// Each test binary compiles its own copy; not every binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use kindred::{
    AppState,
    auth::CredentialVerifier,
    config::Config,
    db,
    notify::{FeatureGate, NotificationSink},
    rooms::{address::ConversationRouter, registry::SessionRegistry},
};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use uuid::Uuid;

pub async fn test_state() -> AppState {
    // One connection: every task shares the same in-memory database.
    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    db::init_schema(&db_pool).await.expect("schema");

    AppState {
        db_pool,
        router: ConversationRouter::new(Arc::new(SessionRegistry::new())),
        verifier: CredentialVerifier::new("http://127.0.0.1:9/verify".to_string()),
        gate: FeatureGate::open(),
        notifier: NotificationSink::disabled(),
        config: test_config(),
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        identity_url: "http://127.0.0.1:9/verify".to_string(),
        notify_url: None,
        gate_url: None,
        default_cooldown_days: 30,
        max_suggestions: 50,
    }
}

pub struct SeedProfile {
    pub name: &'static str,
    pub gender: &'static str,
    pub prefs: &'static [&'static str],
    pub age: i64,
    pub beliefs: &'static [&'static str],
    pub intention: Option<&'static str>,
    pub coords: Option<(f64, f64)>,
    pub last_active_at: i64,
    pub complete: bool,
}

impl Default for SeedProfile {
    fn default() -> Self {
        SeedProfile {
            name: "someone",
            gender: "female",
            prefs: &["all"],
            age: 30,
            beliefs: &[],
            intention: None,
            coords: None,
            last_active_at: 0,
            complete: true,
        }
    }
}

pub async fn insert_profile(pool: &SqlitePool, seed: SeedProfile) -> Uuid {
    let user_id = Uuid::now_v7();
    let prefs: Vec<&str> = seed.prefs.to_vec();
    let beliefs: Vec<&str> = seed.beliefs.to_vec();

    sqlx::query(
        "INSERT INTO profiles (user_id,display_name,age,age_min,age_max,gender,gender_prefs,
            latitude,longitude,beliefs,intention,is_complete,is_approved,last_active_at)
         VALUES (?,?,?,18,99,?,?,?,?,?,?,?,?,?)",
    )
    .bind(user_id.to_string())
    .bind(seed.name)
    .bind(seed.age)
    .bind(seed.gender)
    .bind(serde_json::to_string(&prefs).unwrap())
    .bind(seed.coords.map(|(lat, _)| lat))
    .bind(seed.coords.map(|(_, lng)| lng))
    .bind(serde_json::to_string(&beliefs).unwrap())
    .bind(seed.intention)
    .bind(seed.complete)
    .bind(seed.complete)
    .bind(seed.last_active_at)
    .execute(pool)
    .await
    .expect("seed profile");

    user_id
}

pub async fn match_row_count(pool: &SqlitePool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM matches")
        .fetch_one(pool)
        .await
        .expect("count matches");
    count
}
