use thiserror::Error;
use uuid::Uuid;

/// Domain failure conditions surfaced by the match core.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("profile {0} is incomplete or unapproved")]
    IncompleteProfile(Uuid),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("storage conflict persisted after retry")]
    TransientConflict,

    #[error("no mutual match between {0} and {1}")]
    MatchRequired(Uuid, Uuid),

    #[error("'{0}' is not enabled for this account")]
    FeatureGated(&'static str),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("credential missing or not accepted")]
    Unauthorized,
}
