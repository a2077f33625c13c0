//! Identity verification seam.
//!
//! Requests carry a bearer token; the first sighting is exchanged at the
//! identity service and the verified id is cached in the tower session,
//! so later requests on the same client skip the round trip.

mod verify;

use anyhow::anyhow;
use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use tower_sessions::Session;
use uuid::Uuid;

pub use verify::CredentialVerifier;

use crate::{AppState, appresult::AppError, error::CoreError, session::USER_ID};

/// The verified caller. Extracting this fails the request with 401
/// before the handler body runs.
pub struct Identity(pub Uuid);

impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| anyhow!("session layer: {msg}"))?;

        if let Some(user_id) = session.get::<Uuid>(USER_ID).await? {
            return Ok(Identity(user_id));
        }

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(CoreError::Unauthorized)?;

        let user_id = state.verifier.verify(token).await?;
        session.insert(USER_ID, user_id).await?;

        Ok(Identity(user_id))
    }
}
