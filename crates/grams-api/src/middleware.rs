use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::{debug, error, warn};

use grams_types::api::Claims;
use grams_types::models::Actor;

use crate::auth::AppState;

/// Resolve the bearer token, if any, into an [`Actor`] request extension.
///
/// Never rejects: a missing or unusable token leaves the request anonymous
/// and the controller decides whether that matters.
pub async fn identify(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let actor = resolve_actor(&state, req.headers()).await;
    if let Some(actor) = actor {
        req.extensions_mut().insert(actor);
    }
    next.run(req).await
}

async fn resolve_actor(state: &AppState, headers: &HeaderMap) -> Option<Actor> {
    let bearer = headers.typed_get::<Authorization<Bearer>>()?;

    let claims = decode_token(&state.jwt_secret, bearer.token())
        .map_err(|e| debug!("Ignoring bearer token: {}", e))
        .ok()?;

    let db = state.clone();
    let sub = claims.sub.to_string();
    let user = tokio::task::spawn_blocking(move || db.db.get_user_by_id(&sub))
        .await
        .map_err(|e| error!("spawn_blocking join error: {}", e))
        .ok()?
        .map_err(|e| error!("DB get_user_by_id error: {}", e))
        .ok()?;

    match user {
        Some(row) => Some(Actor {
            id: claims.sub,
            username: row.username,
        }),
        None => {
            warn!("Token for unknown user {}", claims.sub);
            None
        }
    }
}

pub fn decode_token(secret: &str, token: &str) -> jsonwebtoken::errors::Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// The actor for this request, or `None` when anonymous.
pub struct CurrentActor(pub Option<Actor>);

impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentActor(parts.extensions.get::<Actor>().cloned()))
    }
}
