use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{error, info, warn};
use uuid::Uuid;

use grams_db::Database;
use grams_types::api::{
    Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, SignInForm,
};

use crate::error::LOGIN_PATH;

/// How long a token issued by register or sign in stays valid.
const TOKEN_LIFETIME_DAYS: i64 = 30;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

/// Outcome of the blocking part of a request, before it becomes a status.
enum Account {
    Created(Uuid),
    Taken,
    Verified { id: Uuid, username: String },
    Rejected,
}

/// Run password hashing and SQLite work on the blocking pool.
async fn blocking<F>(state: &AppState, f: F) -> Result<Account, StatusCode>
where
    F: FnOnce(&Database) -> anyhow::Result<Account> + Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| {
            error!("Account lookup failed: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("argon2 hash failed: {}", e))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(stored).map_err(|e| anyhow::anyhow!("stored hash unreadable: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn issue_token(state: &AppState, user_id: Uuid, username: &str) -> Result<String, StatusCode> {
    create_token(&state.jwt_secret, user_id, username).map_err(|e| {
        error!("Token signing failed: {:#}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// POST /users — create an account and hand back a token.
///
/// The name is claimed by the insert itself, so two concurrent sign ups for
/// the same name end in one 201 and one 409.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.username.len() < 3 || req.username.len() > 32 {
        return Err(StatusCode::BAD_REQUEST);
    }
    if req.password.len() < 8 {
        return Err(StatusCode::BAD_REQUEST);
    }

    let username = req.username.clone();
    let outcome = blocking(&state, move |db| {
        let password_hash = hash_password(&req.password)?;
        let user_id = Uuid::new_v4();
        if db.create_user(&user_id.to_string(), &req.username, &password_hash)? {
            Ok(Account::Created(user_id))
        } else {
            Ok(Account::Taken)
        }
    })
    .await?;

    let user_id = match outcome {
        Account::Created(id) => id,
        _ => {
            info!("Username {} is already taken", username);
            return Err(StatusCode::CONFLICT);
        }
    };

    let token = issue_token(&state, user_id, &username)?;
    info!("Registered user {}", username);
    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id, token })))
}

/// POST /users/sign_in
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let outcome = blocking(&state, move |db| {
        let Some(user) = db.get_user_by_username(&req.username)? else {
            return Ok(Account::Rejected);
        };
        if !verify_password(&req.password, &user.password)? {
            return Ok(Account::Rejected);
        }
        let id = user.id.parse()?;
        Ok(Account::Verified {
            id,
            username: user.username,
        })
    })
    .await?;

    let Account::Verified { id, username } = outcome else {
        warn!("Rejected sign in attempt");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let token = issue_token(&state, id, &username)?;
    Ok(Json(LoginResponse {
        user_id: id,
        username,
        token,
    }))
}

/// GET /users/sign_in — where unauthenticated gram actions are redirected.
pub async fn sign_in_form() -> Json<SignInForm> {
    Json(SignInForm {
        action: LOGIN_PATH,
        fields: ["username", "password"],
    })
}

pub fn create_token(secret: &str, user_id: Uuid, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_LIFETIME_DAYS)).timestamp()
            as usize,
    };
    sign_token(secret, &claims)
}

/// Sign arbitrary claims with the shared HS256 secret.
pub fn sign_token(secret: &str, claims: &Claims) -> anyhow::Result<String> {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passwords_verify_against_their_own_hash_only() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
        assert!(verify_password("correct horse", "not-a-phc-string").is_err());
    }
}
