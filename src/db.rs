//! Pool construction and schema init.
//!
//! The `profiles` table is owned by the profile service; it is created
//! here too so single-binary deployments and tests can run against one
//! SQLite file, but this core only ever reads it.

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

use crate::appresult::AppResult;

pub async fn connect(database_url: &str) -> AppResult<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect(database_url)
        .await?;

    Ok(pool)
}

pub async fn init_schema(pool: &SqlitePool) -> AppResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS profiles (
            user_id TEXT PRIMARY KEY,
            display_name TEXT NOT NULL,
            age INTEGER NOT NULL,
            age_min INTEGER NOT NULL,
            age_max INTEGER NOT NULL,
            gender TEXT NOT NULL,
            gender_prefs TEXT NOT NULL DEFAULT '[]',
            latitude REAL,
            longitude REAL,
            max_distance_km REAL NOT NULL DEFAULT 100,
            beliefs TEXT NOT NULL DEFAULT '[]',
            practices TEXT NOT NULL DEFAULT '[]',
            healing_stage TEXT,
            lifestyle TEXT NOT NULL DEFAULT '[]',
            activity_level TEXT,
            intention TEXT,
            intent_badges TEXT NOT NULL DEFAULT '[]',
            life_purpose TEXT,
            is_complete INTEGER NOT NULL DEFAULT 0,
            is_approved INTEGER NOT NULL DEFAULT 0,
            last_active_at INTEGER NOT NULL DEFAULT 0
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS matches (
            id TEXT PRIMARY KEY,
            user_lo TEXT NOT NULL,
            user_hi TEXT NOT NULL,
            liked_by_lo INTEGER NOT NULL DEFAULT 0,
            liked_by_hi INTEGER NOT NULL DEFAULT 0,
            is_mutual INTEGER NOT NULL DEFAULT 0,
            score INTEGER,
            labels TEXT,
            breakdown TEXT,
            matched_at INTEGER,
            last_interaction INTEGER NOT NULL,
            UNIQUE (user_lo, user_hi)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS rejections (
            actor_id TEXT NOT NULL,
            target_id TEXT NOT NULL,
            expires_at INTEGER NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            PRIMARY KEY (actor_id, target_id)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            match_id TEXT NOT NULL,
            sender_id TEXT NOT NULL,
            recipient_id TEXT NOT NULL,
            content TEXT NOT NULL,
            kind TEXT NOT NULL DEFAULT 'text',
            is_read INTEGER NOT NULL DEFAULT 0,
            read_at INTEGER,
            sent_at INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_messages_match_sent
         ON messages (match_id, sent_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
