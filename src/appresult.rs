use axum::{http::StatusCode, response::{IntoResponse, Response}};

use crate::error::CoreError;

pub type AppResult<T> = Result<T, AppError>;
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<CoreError>() {
            Some(CoreError::IncompleteProfile(_)) => StatusCode::BAD_REQUEST,
            Some(CoreError::InvalidIdentifier(_)) => StatusCode::BAD_REQUEST,
            Some(CoreError::TransientConflict) => StatusCode::CONFLICT,
            Some(CoreError::MatchRequired(_, _)) => StatusCode::FORBIDDEN,
            Some(CoreError::FeatureGated(_)) => StatusCode::FORBIDDEN,
            Some(CoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            Some(CoreError::Unauthorized) => StatusCode::UNAUTHORIZED,
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            return (status, format!("{}\n\n{}", self.0, self.0.backtrace())).into_response();
        }

        (status, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
