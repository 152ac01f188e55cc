use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Gram;

// -- JWT Claims --

/// Bearer token claims. `sub` is the actor id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

/// Body of `GET /users/sign_in`, the target of every redirect-to-login.
#[derive(Debug, Serialize)]
pub struct SignInForm {
    pub action: &'static str,
    pub fields: [&'static str; 2],
}

// -- Grams --

/// Submitted fields for create and update.
///
/// On update an absent field keeps the stored value. `picture` is base64.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GramFields {
    pub message: Option<String>,
    pub picture: Option<String>,
}

impl GramFields {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            picture: None,
        }
    }
}

/// Accepted body shapes: `{"gram": {...}}` or the bare fields.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GramParams {
    Nested { gram: GramFields },
    Flat(GramFields),
}

impl GramParams {
    pub fn into_fields(self) -> GramFields {
        match self {
            Self::Nested { gram } => gram,
            Self::Flat(fields) => fields,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GramResponse {
    pub id: Uuid,
    pub message: String,
    pub picture_url: Option<String>,
    pub owner_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Gram> for GramResponse {
    fn from(gram: &Gram) -> Self {
        Self {
            id: gram.id,
            message: gram.message.clone(),
            picture_url: gram
                .has_picture()
                .then(|| format!("/grams/{}/picture", gram.id)),
            owner_id: gram.owner_id,
            created_at: gram.created_at,
            updated_at: gram.updated_at,
        }
    }
}

/// Form context for `new` and `edit`. `gram` is `None` on `new`.
#[derive(Debug, Serialize)]
pub struct GramForm {
    pub gram: Option<GramResponse>,
    pub message: String,
    pub has_picture: bool,
}

impl GramForm {
    pub fn blank() -> Self {
        Self {
            gram: None,
            message: String::new(),
            has_picture: false,
        }
    }

    pub fn for_gram(gram: &Gram) -> Self {
        Self {
            gram: Some(GramResponse::from(gram)),
            message: gram.message.clone(),
            has_picture: gram.has_picture(),
        }
    }
}

/// One failed field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ValidationErrorsResponse {
    pub errors: Vec<FieldError>,
}
