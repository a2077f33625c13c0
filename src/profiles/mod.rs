//! Read-only view of the profile service's store.
//!
//! Profile CRUD, photos and moderation live elsewhere; the match core
//! only reads the fields that feed scoring and candidate filtering.

use std::collections::HashSet;

use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::appresult::AppResult;

/// The preference-set value that opts into every gender.
pub const PREF_ALL: &str = "all";

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub display_name: String,
    pub age: i64,
    pub age_min: i64,
    pub age_max: i64,
    pub gender: String,
    pub gender_prefs: HashSet<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub max_distance_km: f64,
    pub beliefs: HashSet<String>,
    pub practices: HashSet<String>,
    pub healing_stage: Option<String>,
    pub lifestyle: HashSet<String>,
    pub activity_level: Option<String>,
    pub intention: Option<String>,
    pub intent_badges: HashSet<String>,
    pub life_purpose: Option<String>,
    pub is_complete: bool,
    pub is_approved: bool,
    pub last_active_at: i64,
}

impl Profile {
    pub fn is_scorable(&self) -> bool {
        self.is_complete && self.is_approved
    }

    /// Whether this profile's preference set accepts the given gender.
    pub fn accepts_gender(&self, gender: &str) -> bool {
        self.gender_prefs.contains(PREF_ALL) || self.gender_prefs.contains(gender)
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    user_id: String,
    display_name: String,
    age: i64,
    age_min: i64,
    age_max: i64,
    gender: String,
    gender_prefs: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    max_distance_km: f64,
    beliefs: String,
    practices: String,
    healing_stage: Option<String>,
    lifestyle: String,
    activity_level: Option<String>,
    intention: Option<String>,
    intent_badges: String,
    life_purpose: Option<String>,
    is_complete: bool,
    is_approved: bool,
    last_active_at: i64,
}

fn parse_set(json: &str) -> AppResult<HashSet<String>> {
    let items: Vec<String> = serde_json::from_str(json)?;
    Ok(items.into_iter().collect())
}

impl ProfileRow {
    fn into_profile(self) -> AppResult<Profile> {
        Ok(Profile {
            user_id: Uuid::parse_str(&self.user_id)?,
            display_name: self.display_name,
            age: self.age,
            age_min: self.age_min,
            age_max: self.age_max,
            gender: self.gender,
            gender_prefs: parse_set(&self.gender_prefs)?,
            latitude: self.latitude,
            longitude: self.longitude,
            max_distance_km: self.max_distance_km,
            beliefs: parse_set(&self.beliefs)?,
            practices: parse_set(&self.practices)?,
            healing_stage: self.healing_stage,
            lifestyle: parse_set(&self.lifestyle)?,
            activity_level: self.activity_level,
            intention: self.intention,
            intent_badges: parse_set(&self.intent_badges)?,
            life_purpose: self.life_purpose,
            is_complete: self.is_complete,
            is_approved: self.is_approved,
            last_active_at: self.last_active_at,
        })
    }
}

const PROFILE_COLUMNS: &str = "user_id,display_name,age,age_min,age_max,gender,gender_prefs,\
     latitude,longitude,max_distance_km,beliefs,practices,healing_stage,lifestyle,\
     activity_level,intention,intent_badges,life_purpose,is_complete,is_approved,last_active_at";

pub async fn fetch(pool: &SqlitePool, user_id: Uuid) -> AppResult<Option<Profile>> {
    let row: Option<ProfileRow> =
        sqlx::query_as(&format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id=?"))
            .bind(user_id.to_string())
            .fetch_optional(pool)
            .await?;

    row.map(ProfileRow::into_profile).transpose()
}

/// Candidate pool for the suggestion pipeline: complete, approved, inside
/// the actor's accepted age range, and of a gender the actor's preference
/// set admits. The mutual-preference check is the scorer's veto.
pub async fn candidates_for(pool: &SqlitePool, actor: &Profile) -> AppResult<Vec<Profile>> {
    let mut sql = format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles
         WHERE user_id != ? AND is_complete=1 AND is_approved=1
           AND age BETWEEN ? AND ?"
    );

    let prefs: Vec<&String> = actor
        .gender_prefs
        .iter()
        .filter(|p| p.as_str() != PREF_ALL)
        .collect();
    let filter_gender = !actor.gender_prefs.contains(PREF_ALL) && !prefs.is_empty();
    if filter_gender {
        let placeholders = vec!["?"; prefs.len()].join(",");
        sql += &format!(" AND gender IN ({placeholders})");
    }

    let mut query = sqlx::query_as::<_, ProfileRow>(&sql)
        .bind(actor.user_id.to_string())
        .bind(actor.age_min)
        .bind(actor.age_max);
    if filter_gender {
        for pref in prefs {
            query = query.bind(pref.clone());
        }
    }

    let rows = query.fetch_all(pool).await?;
    rows.into_iter().map(ProfileRow::into_profile).collect()
}
