use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use grams_types::api::{FieldError, ValidationErrorsResponse};

/// Where anonymous requests for protected actions are sent.
pub const LOGIN_PATH: &str = "/users/sign_in";

pub type GramResult<T> = Result<T, GramError>;

/// Every way a gram request can end without success.
///
/// All variants are terminal for the request.
#[derive(Debug, Error)]
pub enum GramError {
    #[error("gram {0} not found")]
    NotFound(String),

    #[error("authentication required")]
    AuthenticationRequired,

    #[error("actor {actor} does not own gram {gram}")]
    Forbidden { actor: Uuid, gram: Uuid },

    #[error("validation failed")]
    ValidationFailed(Vec<FieldError>),

    #[error("store failure")]
    Store(#[from] anyhow::Error),
}

impl GramError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AuthenticationRequired => StatusCode::SEE_OTHER,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GramError {
    fn into_response(self) -> Response {
        match self {
            Self::AuthenticationRequired => Redirect::to(LOGIN_PATH).into_response(),
            Self::ValidationFailed(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationErrorsResponse { errors }),
            )
                .into_response(),
            Self::Store(ref e) => {
                error!("Gram store error: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            other => other.status_code().into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn each_failure_has_its_own_status() {
        let forbidden = GramError::Forbidden {
            actor: Uuid::new_v4(),
            gram: Uuid::new_v4(),
        };
        assert_eq!(GramError::NotFound("HARAMBE".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            GramError::ValidationFailed(vec![]).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            GramError::Store(anyhow::anyhow!("disk gone")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn authentication_required_redirects_to_login() {
        let response = GramError::AuthenticationRequired.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], LOGIN_PATH);
    }
}
